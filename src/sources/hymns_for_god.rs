//! Corrections for the community SQLite export.
//!
//! This export only links outward from English hymns, reuses Howard Higashi
//! numbers for songs already present from the website, and carries a handful
//! of off-by-one Korean and Japanese numbers.

use super::{exception, link, song};
use crate::exceptions::ExceptionSet;
use crate::hymn_type::HymnType as T;
use crate::models::Relation;
use crate::patch::Patch;

pub fn patches() -> Vec<Patch> {
    vec![
        // Duplicates of songs the website already provides
        Patch::remove_reference(song(T::HowardHigashi, "12")),
        Patch::remove_reference(song(T::HowardHigashi, "38")),
        // Off-by-one Korean numbers
        Patch::remove_link(song(T::ClassicHymn, "100"), Relation::Languages, vec![song(T::Korean, "101")]),
        Patch::add_link(song(T::ClassicHymn, "100"), Relation::Languages, link(T::Korean, "100", "Korean")),
        Patch::remove_link(song(T::ClassicHymn, "208"), Relation::Languages, vec![song(T::Korean, "209")]),
        Patch::add_link(song(T::ClassicHymn, "208"), Relation::Languages, link(T::Korean, "208", "Korean")),
        // Japanese translation belongs to the new tune, not the original
        Patch::reset_link(
            song(T::Japanese, "395"),
            Relation::Languages,
            vec![link(T::ClassicHymn, "395b", "English")],
        ),
        // Tune links pointing at an unrelated hymn
        Patch::clear_link(song(T::ClassicHymn, "1082"), Relation::Relevants),
        Patch::remove_link(
            song(T::ClassicHymn, "500"),
            Relation::Relevants,
            vec![song(T::ClassicHymn, "501"), song(T::NewTune, "501")],
        ),
        Patch::add_link(song(T::ClassicHymn, "500"), Relation::Relevants, link(T::NewTune, "500", "New Tune")),
    ]
}

pub fn language_exceptions() -> Vec<ExceptionSet> {
    vec![
        exception(&[(T::ClassicHymn, "395b")]),
        exception(&[(T::Korean, "642"), (T::Korean, "643")]),
    ]
}

pub fn relevant_exceptions() -> Vec<ExceptionSet> {
    vec![exception(&[(T::NewTune, "1151")])]
}
