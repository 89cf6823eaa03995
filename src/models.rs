//! Core data models for hymn reconciliation.
//!
//! This module contains the canonical reference model (`SongReference`,
//! `SongLink`), the merged `Hymn` entity the pipeline mutates in place, and the
//! id sequence handed to whatever stage constructs hymns.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use thiserror::Error;

use crate::hymn_type::{HymnType, Language};
use crate::normalize::is_letter_affixed;

// ============================================================================
// References
// ============================================================================

/// Reference string that could not be parsed into `<type>/<number>`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized song reference: {0:?}")]
pub struct InvalidReference(pub String);

/// Identifies one hymn variant in the canonical space.
///
/// Serialized in its compact form, e.g. `"h/1b"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SongReference {
    pub hymn_type: HymnType,
    pub number: String,
}

impl SongReference {
    pub fn new(hymn_type: HymnType, number: impl Into<String>) -> Self {
        Self {
            hymn_type,
            number: number.into(),
        }
    }

    /// Parse `"<abbreviation>/<number>"`. The number must be non-empty.
    pub fn parse(s: &str) -> Result<Self, InvalidReference> {
        let (abbreviation, number) = s
            .trim()
            .split_once('/')
            .ok_or_else(|| InvalidReference(s.to_string()))?;
        let hymn_type =
            HymnType::from_abbreviation(abbreviation).ok_or_else(|| InvalidReference(s.to_string()))?;
        if number.is_empty() {
            return Err(InvalidReference(s.to_string()));
        }
        Ok(Self::new(hymn_type, number))
    }

    /// True for alternate renditions such as `"1b"` or `"c333"`.
    pub fn is_letter_affixed(&self) -> bool {
        is_letter_affixed(&self.number)
    }
}

impl fmt::Display for SongReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.hymn_type.abbreviation(), self.number)
    }
}

impl TryFrom<String> for SongReference {
    type Error = InvalidReference;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        SongReference::parse(&value)
    }
}

impl From<SongReference> for String {
    fn from(reference: SongReference) -> Self {
        reference.to_string()
    }
}

/// Render a list of references as `[h/1, ch/1]` for error messages.
pub fn format_references<'a>(references: impl IntoIterator<Item = &'a SongReference>) -> String {
    let parts: Vec<String> = references.into_iter().map(|r| r.to_string()).collect();
    format!("[{}]", parts.join(", "))
}

/// Directed, labeled edge from the owning hymn to `reference`.
///
/// An empty `name` means the link was discovered rather than declared.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SongLink {
    pub reference: SongReference,
    #[serde(default)]
    pub name: String,
}

impl SongLink {
    pub fn new(reference: SongReference, name: impl Into<String>) -> Self {
        Self {
            reference,
            name: name.into(),
        }
    }

    pub fn unnamed(reference: SongReference) -> Self {
        Self::new(reference, "")
    }

    pub fn is_named(&self) -> bool {
        !self.name.is_empty()
    }
}

// ============================================================================
// Relations
// ============================================================================

/// The two link collections every hymn carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Relation {
    /// Cross-language translations
    Languages,
    /// Same-language alternate tunes and versions
    Relevants,
}

impl Relation {
    pub const ALL: [Relation; 2] = [Relation::Languages, Relation::Relevants];

    pub fn label(self) -> &'static str {
        match self {
            Relation::Languages => "languages",
            Relation::Relevants => "relevants",
        }
    }

    /// Label a patch writes on the reciprocal edge it creates.
    pub fn generic_label(self) -> &'static str {
        match self {
            Relation::Languages => "English",
            Relation::Relevants => "Original Tune",
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// Hymns
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerseKind {
    #[default]
    Verse,
    Chorus,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Verse {
    #[serde(default)]
    pub kind: VerseKind,
    pub lines: Vec<String>,
}

impl Verse {
    pub fn new(kind: VerseKind, lines: Vec<String>) -> Self {
        Self { kind, lines }
    }
}

/// Canonical merged hymn.
///
/// `references` is never empty: the first entry is the primary alias, and no
/// two hymns in one snapshot share an alias. Deserialization rejects an
/// empty alias list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hymn {
    #[serde(default)]
    pub id: i64,
    #[serde(deserialize_with = "non_empty_references")]
    pub references: Vec<SongReference>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub lyrics: Vec<Verse>,
    #[serde(default)]
    pub languages: Vec<SongLink>,
    #[serde(default)]
    pub relevants: Vec<SongLink>,
}

fn non_empty_references<'de, D>(deserializer: D) -> Result<Vec<SongReference>, D::Error>
where
    D: Deserializer<'de>,
{
    let references = Vec::<SongReference>::deserialize(deserializer)?;
    if references.is_empty() {
        return Err(serde::de::Error::custom("hymn has no references"));
    }
    Ok(references)
}

impl Hymn {
    pub fn new(id: i64, primary: SongReference) -> Self {
        Self {
            id,
            references: vec![primary],
            title: String::new(),
            lyrics: Vec::new(),
            languages: Vec::new(),
            relevants: Vec::new(),
        }
    }

    pub fn primary_reference(&self) -> &SongReference {
        &self.references[0]
    }

    pub fn has_reference(&self, reference: &SongReference) -> bool {
        self.references.contains(reference)
    }

    /// Language of the primary alias.
    pub fn language(&self) -> Language {
        self.primary_reference().hymn_type.language()
    }

    pub fn links(&self, relation: Relation) -> &Vec<SongLink> {
        match relation {
            Relation::Languages => &self.languages,
            Relation::Relevants => &self.relevants,
        }
    }

    pub fn links_mut(&mut self, relation: Relation) -> &mut Vec<SongLink> {
        match relation {
            Relation::Languages => &mut self.languages,
            Relation::Relevants => &mut self.relevants,
        }
    }

    /// True if any link in `relation` points at one of `other`'s aliases.
    pub fn links_to(&self, relation: Relation, other: &Hymn) -> bool {
        self.links(relation)
            .iter()
            .any(|link| other.has_reference(&link.reference))
    }
}

// ============================================================================
// Id Sequence
// ============================================================================

/// Hands out hymn ids for one run. Passed explicitly to whatever constructs
/// hymns so that two loaders never share a counter.
#[derive(Debug, Clone)]
pub struct HymnIdSequence {
    next: i64,
}

impl HymnIdSequence {
    pub fn new(start: i64) -> Self {
        Self { next: start }
    }

    pub fn next_id(&mut self) -> i64 {
        let id = self.next;
        self.next += 1;
        id
    }
}

impl Default for HymnIdSequence {
    fn default() -> Self {
        Self::new(1)
    }
}
