//! Upstream sources and the corrections each one owns.
//!
//! Every source has its own numbering quirks, so patches and exceptions are
//! kept per source and only ever applied to that source's hymns.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::exceptions::ExceptionSet;
use crate::hymn_type::HymnType;
use crate::models::{Relation, SongLink, SongReference};
use crate::patch::Patch;

pub mod hymnal_net;
pub mod hymns_for_god;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Source {
    /// Legacy scraped website
    HymnalNet,
    /// Community SQLite export
    HymnsForGod,
}

impl Source {
    pub const ALL: [Source; 2] = [Source::HymnalNet, Source::HymnsForGod];

    pub fn name(self) -> &'static str {
        match self {
            Source::HymnalNet => "hymnal-net",
            Source::HymnsForGod => "hymns-for-god",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Source::ALL.iter().copied().find(|s| s.name() == name)
    }

    /// Ordered corrections for this source.
    pub fn patches(self) -> Vec<Patch> {
        match self {
            Source::HymnalNet => hymnal_net::patches(),
            Source::HymnsForGod => hymns_for_god::patches(),
        }
    }

    pub fn exceptions(self, relation: Relation) -> Vec<ExceptionSet> {
        match (self, relation) {
            (Source::HymnalNet, Relation::Languages) => hymnal_net::language_exceptions(),
            (Source::HymnalNet, Relation::Relevants) => hymnal_net::relevant_exceptions(),
            (Source::HymnsForGod, Relation::Languages) => hymns_for_god::language_exceptions(),
            (Source::HymnsForGod, Relation::Relevants) => hymns_for_god::relevant_exceptions(),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// Terse constructors for the literal correction tables.

pub(crate) fn song(hymn_type: HymnType, number: &str) -> SongReference {
    SongReference::new(hymn_type, number)
}

pub(crate) fn link(hymn_type: HymnType, number: &str, name: &str) -> SongLink {
    SongLink::new(song(hymn_type, number), name)
}

pub(crate) fn exception(references: &[(HymnType, &str)]) -> ExceptionSet {
    ExceptionSet::new(references.iter().map(|(t, n)| song(*t, n)))
}
