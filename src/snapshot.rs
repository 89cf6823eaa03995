//! JSON snapshots of merged hymns.
//!
//! Snapshots come from scrapers that do not validate references, so loading
//! goes through loosely-typed records: a reference that does not parse is
//! reported and dropped instead of failing the whole file.

use serde::Deserialize;
use tracing::info;

use crate::errors::{ErrorLog, ErrorType, PipelineError, Result};
use crate::hymn_type::HymnType;
use crate::models::{Hymn, HymnIdSequence, SongLink, SongReference, Verse};
use crate::sources::Source;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawLink {
    pub reference: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawHymn {
    pub references: Vec<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub lyrics: Vec<Verse>,
    #[serde(default)]
    pub languages: Vec<RawLink>,
    #[serde(default)]
    pub relevants: Vec<RawLink>,
}

/// Parse one reference, recording why it was rejected.
fn parse_reference(raw: &str, context: &str, source: Source, errors: &mut ErrorLog) -> Option<SongReference> {
    match SongReference::parse(raw) {
        Ok(reference) => Some(reference),
        Err(err) => {
            let unknown_type = raw
                .trim()
                .split_once('/')
                .is_some_and(|(abbr, _)| HymnType::from_abbreviation(abbr).is_none());
            let error_type = if unknown_type {
                ErrorType::UnrecognizedHymnType
            } else {
                ErrorType::ParseError
            };
            errors.push(PipelineError::error(
                error_type,
                source,
                vec![err.to_string(), context.to_string()],
            ));
            None
        }
    }
}

fn convert_links(
    raw: Vec<RawLink>,
    context: &str,
    source: Source,
    errors: &mut ErrorLog,
) -> Vec<SongLink> {
    raw.into_iter()
        .filter_map(|link| {
            parse_reference(&link.reference, context, source, errors)
                .map(|reference| SongLink::new(reference, link.name))
        })
        .collect()
}

/// Convert raw records into hymns, assigning ids from `ids`.
///
/// A record none of whose aliases parse is dropped.
pub fn load(raw: Vec<RawHymn>, source: Source, ids: &mut HymnIdSequence, errors: &mut ErrorLog) -> Vec<Hymn> {
    let total = raw.len();
    let mut hymns = Vec::with_capacity(total);

    for record in raw {
        let context = format!("hymn {:?}", record.references);
        let references: Vec<SongReference> = record
            .references
            .iter()
            .filter_map(|r| parse_reference(r, &context, source, errors))
            .collect();
        let Some(primary) = references.first().cloned() else {
            continue;
        };

        let mut hymn = Hymn::new(ids.next_id(), primary);
        hymn.references = references;
        hymn.title = record.title;
        hymn.lyrics = record.lyrics;
        hymn.languages = convert_links(record.languages, &context, source, errors);
        hymn.relevants = convert_links(record.relevants, &context, source, errors);
        hymns.push(hymn);
    }

    info!(source = %source, records = total, hymns = hymns.len(), "snapshot loaded");
    hymns
}

pub fn from_json(
    json: &str,
    source: Source,
    ids: &mut HymnIdSequence,
    errors: &mut ErrorLog,
) -> Result<Vec<Hymn>> {
    let raw: Vec<RawHymn> = serde_json::from_str(json)?;
    Ok(load(raw, source, ids, errors))
}

/// Read a snapshot already in canonical form, such as a reconciled output or
/// the merged list. Any unparseable reference fails the whole file.
pub fn from_canonical_json(json: &str) -> Result<Vec<Hymn>> {
    Ok(serde_json::from_str(json)?)
}

pub fn to_json(hymns: &[Hymn]) -> Result<String> {
    Ok(serde_json::to_string_pretty(hymns)?)
}
