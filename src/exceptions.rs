//! Documented, accepted invariant violations.
//!
//! An exception is a set of references allowed to share a component even
//! though they break a cardinality or compatibility rule. Each run records
//! which exceptions were actually needed; the rest are reported as obsolete
//! so that overrides disappear once upstream data gets fixed.

use std::collections::BTreeSet;

use crate::models::{format_references, SongReference};

/// Immutable group of references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExceptionSet {
    references: BTreeSet<SongReference>,
}

impl ExceptionSet {
    pub fn new(references: impl IntoIterator<Item = SongReference>) -> Self {
        Self {
            references: references.into_iter().collect(),
        }
    }

    pub fn references(&self) -> &BTreeSet<SongReference> {
        &self.references
    }

    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }

    /// An empty set is never contained; it would match every component.
    pub fn is_contained_in(&self, component: &BTreeSet<SongReference>) -> bool {
        !self.references.is_empty() && self.references.is_subset(component)
    }
}

impl std::fmt::Display for ExceptionSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&format_references(&self.references))
    }
}

/// Exceptions for one relation of one source, with per-run consumption.
#[derive(Debug, Clone, Default)]
pub struct ExceptionRegistry {
    sets: Vec<ExceptionSet>,
    consumed: Vec<bool>,
}

impl ExceptionRegistry {
    pub fn new(sets: Vec<ExceptionSet>) -> Self {
        let consumed = vec![false; sets.len()];
        Self { sets, consumed }
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Find the first exception fully contained in `component`, mark it
    /// consumed and return it.
    pub fn consume_contained(&mut self, component: &BTreeSet<SongReference>) -> Option<&ExceptionSet> {
        let index = self.sets.iter().position(|set| set.is_contained_in(component))?;
        self.consumed[index] = true;
        Some(&self.sets[index])
    }

    pub fn unconsumed(&self) -> impl Iterator<Item = &ExceptionSet> {
        self.sets
            .iter()
            .zip(self.consumed.iter())
            .filter(|(_, consumed)| !**consumed)
            .map(|(set, _)| set)
    }

    pub fn consumed_count(&self) -> usize {
        self.consumed.iter().filter(|c| **c).count()
    }
}
