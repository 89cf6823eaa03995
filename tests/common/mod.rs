#![allow(dead_code)]

use std::collections::BTreeSet;

use hymnal_reconcile::hymn_type::HymnType;
use hymnal_reconcile::{Hymn, Relation, SongLink, SongReference};

pub fn song(hymn_type: HymnType, number: &str) -> SongReference {
    SongReference::new(hymn_type, number)
}

pub fn link(hymn_type: HymnType, number: &str, name: &str) -> SongLink {
    SongLink::new(song(hymn_type, number), name)
}

/// Builds a snapshot with ids assigned in insertion order.
#[derive(Default)]
pub struct Snapshot {
    hymns: Vec<Hymn>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hymn(mut self, hymn_type: HymnType, number: &str, languages: Vec<SongLink>, relevants: Vec<SongLink>) -> Self {
        let mut hymn = Hymn::new(self.hymns.len() as i64 + 1, song(hymn_type, number));
        hymn.languages = languages;
        hymn.relevants = relevants;
        self.hymns.push(hymn);
        self
    }

    pub fn build(self) -> Vec<Hymn> {
        self.hymns
    }
}

pub fn find<'a>(hymns: &'a [Hymn], reference: &SongReference) -> &'a Hymn {
    hymns
        .iter()
        .find(|h| h.has_reference(reference))
        .unwrap_or_else(|| panic!("no hymn owns {reference}"))
}

/// Relation list of the hymn owning `reference`, as a set of strings.
pub fn targets(hymns: &[Hymn], reference: &SongReference, relation: Relation) -> BTreeSet<String> {
    find(hymns, reference)
        .links(relation)
        .iter()
        .map(|l| l.reference.to_string())
        .collect()
}

pub fn set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Every hymn's relation lists as sets, keyed by primary alias.
pub fn relation_sets(hymns: &[Hymn]) -> BTreeSet<(String, Relation, BTreeSet<String>)> {
    hymns
        .iter()
        .flat_map(|h| {
            Relation::ALL.into_iter().map(move |relation| {
                (
                    h.primary_reference().to_string(),
                    relation,
                    h.links(relation).iter().map(|l| l.reference.to_string()).collect(),
                )
            })
        })
        .collect()
}
