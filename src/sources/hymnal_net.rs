//! Corrections for the legacy scraped website.
//!
//! The site links most translations in both directions, but alternate tunes
//! are frequently filed under languages, a few numbers were renumbered after
//! scraping, and some German and Chinese pages point at the wrong hymn.

use super::{exception, link, song};
use crate::exceptions::ExceptionSet;
use crate::hymn_type::HymnType as T;
use crate::models::Relation;
use crate::patch::Patch;

pub fn patches() -> Vec<Patch> {
    vec![
        // Alternate tunes filed under languages
        Patch::remove_link(song(T::ClassicHymn, "1151"), Relation::Languages, vec![song(T::NewTune, "1151")]),
        Patch::add_link(
            song(T::ClassicHymn, "1151"),
            Relation::Relevants,
            link(T::NewTune, "1151", "New Tune"),
        ),
        Patch::remove_link(song(T::ClassicHymn, "8"), Relation::Languages, vec![song(T::NewTune, "8")]),
        Patch::add_link(song(T::ClassicHymn, "8"), Relation::Relevants, link(T::NewTune, "8", "New Tune")),
        // h/445 and h/1359 are the same song under two numbers
        Patch::reset_link(
            song(T::ClassicHymn, "445"),
            Relation::Relevants,
            vec![link(T::ClassicHymn, "1359", "Alternate Tune")],
        ),
        // ch/37 is a different hymn; the Chinese of h/43 is ch/33
        Patch::remove_link(song(T::ClassicHymn, "43"), Relation::Languages, vec![song(T::Chinese, "37")]),
        Patch::add_link(song(T::ClassicHymn, "43"), Relation::Languages, link(T::Chinese, "33", "詩歌(繁)")),
        Patch::remove_link(song(T::Chinese, "37"), Relation::Languages, vec![song(T::ClassicHymn, "43")]),
        // German pages pointing at the previous hymn in the book
        Patch::reset_link(
            song(T::German, "11"),
            Relation::Languages,
            vec![link(T::ClassicHymn, "12", "English")],
        ),
        Patch::reset_link(
            song(T::German, "16"),
            Relation::Languages,
            vec![link(T::ClassicHymn, "17", "English")],
        ),
        // Children's song mislabeled as translation of the classic hymn
        Patch::remove_link(song(T::ClassicHymn, "267"), Relation::Languages, vec![song(T::ChildrenSong, "5")]),
        Patch::clear_link(song(T::ChildrenSong, "5"), Relation::Languages),
        // Tagalog page lists every verse variant as its own relevant
        Patch::clear_link(song(T::Tagalog, "1017"), Relation::Relevants),
        // New song duplicated as a classic hymn number that was later retired
        Patch::remove_reference(song(T::NewSong, "157")),
        Patch::remove_link(
            song(T::ChineseSimplified, "621"),
            Relation::Languages,
            vec![song(T::ChineseSupplementalSimplified, "621")],
        ),
        Patch::remove_link(
            song(T::Chinese, "621"),
            Relation::Languages,
            vec![song(T::ChineseSupplemental, "621")],
        ),
    ]
}

pub fn language_exceptions() -> Vec<ExceptionSet> {
    vec![
        // h/1248 and ns/1 are genuinely the same song published twice
        exception(&[(T::NewSong, "1")]),
        // Two English versions share one Chinese translation
        exception(&[(T::ClassicHymn, "1360")]),
        exception(&[(T::ChildrenSong, "31")]),
        exception(&[(T::ChineseSupplemental, "52"), (T::ChineseSupplementalSimplified, "52")]),
        exception(&[(T::NewSong, "195")]),
    ]
}

pub fn relevant_exceptions() -> Vec<ExceptionSet> {
    vec![
        exception(&[(T::NewSong, "47")]),
        exception(&[(T::ChildrenSong, "109")]),
        exception(&[(T::ClassicHymn, "1033"), (T::ClassicHymn, "1034")]),
    ]
}
