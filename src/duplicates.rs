//! Near-duplicate lyric detection over the merged English hymns.
//!
//! For every English hymn, find the closest other English hymn by Levenshtein
//! distance over flattened lyrics, skipping pairs that declare each other as
//! relevants (alternate tunes are expected to be near-identical). Each closest
//! pair is filed into every bucket whose threshold it meets, so a distance-0
//! pair appears in all four. This is a report only; hymns are not touched.

use indicatif::ProgressBar;
use rayon::prelude::*;
use rustc_hash::FxHashSet;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

use crate::hymn_type::Language;
use crate::models::{Hymn, Relation, SongReference};
use crate::normalize::flatten_lyrics;
use crate::progress::log_progress;

// ============================================================================
// Thresholds
// ============================================================================

pub const UNDER_5: usize = 5;
pub const UNDER_10: usize = 10;
pub const UNDER_50: usize = 50;

/// Log every N hymns in log-only mode
const PROGRESS_INTERVAL: u64 = 500;

// ============================================================================
// Report
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicatePair {
    pub first: Vec<SongReference>,
    pub first_title: String,
    pub second: Vec<SongReference>,
    pub second_title: String,
    pub distance: usize,
}

/// Buckets overlap: a pair lands in every bucket whose threshold it meets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DuplicateReport {
    pub no_difference: Vec<DuplicatePair>,
    pub under_5: Vec<DuplicatePair>,
    pub under_10: Vec<DuplicatePair>,
    pub under_50: Vec<DuplicatePair>,
}

impl DuplicateReport {
    fn insert(&mut self, pair: DuplicatePair) {
        let distance = pair.distance;
        if distance == 0 {
            self.no_difference.push(pair.clone());
        }
        if distance < UNDER_5 {
            self.under_5.push(pair.clone());
        }
        if distance < UNDER_10 {
            self.under_10.push(pair.clone());
        }
        if distance < UNDER_50 {
            self.under_50.push(pair);
        }
    }

    fn sort(&mut self) {
        for bucket in [
            &mut self.no_difference,
            &mut self.under_5,
            &mut self.under_10,
            &mut self.under_50,
        ] {
            bucket.sort_by_key(|pair| pair.distance);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.under_50.is_empty()
    }
}

// ============================================================================
// Detection
// ============================================================================

/// Either hymn lists the other among its relevants.
fn declared_relevant(a: &Hymn, b: &Hymn) -> bool {
    a.links_to(Relation::Relevants, b) || b.links_to(Relation::Relevants, a)
}

/// Run detection without progress output.
pub fn find_duplicates(hymns: &[Hymn]) -> DuplicateReport {
    find_duplicates_with_progress(hymns, &ProgressBar::hidden())
}

pub fn find_duplicates_with_progress(hymns: &[Hymn], pb: &ProgressBar) -> DuplicateReport {
    let candidates: Vec<(usize, String)> = hymns
        .iter()
        .enumerate()
        .filter(|(_, hymn)| hymn.language() == Language::English)
        .map(|(i, hymn)| (i, flatten_lyrics(&hymn.lyrics)))
        .filter(|(_, lyrics)| !lyrics.is_empty())
        .collect();
    let lengths: Vec<usize> = candidates.iter().map(|(_, l)| l.chars().count()).collect();

    info!(english = candidates.len(), "searching for near-duplicate lyrics");
    pb.set_length(candidates.len() as u64);

    let done = AtomicU64::new(0);
    let total = candidates.len() as u64;

    // (first, second, distance) per hymn, in input order
    let closest: Vec<Option<(usize, usize, usize)>> = candidates
        .par_iter()
        .enumerate()
        .map(|(ci, (i, lyrics))| {
            let h1 = &hymns[*i];
            let mut best: Option<(usize, usize)> = None;

            for (cj, (j, other)) in candidates.iter().enumerate() {
                if ci == cj {
                    continue;
                }
                let h2 = &hymns[*j];
                if h1.language() != h2.language() || declared_relevant(h1, h2) {
                    continue;
                }
                // Distance is at least the length difference
                let floor = lengths[ci].abs_diff(lengths[cj]);
                if best.is_some_and(|(_, d)| floor >= d) {
                    continue;
                }
                let distance = strsim::levenshtein(lyrics, other);
                if best.map_or(true, |(_, d)| distance < d) {
                    best = Some((*j, distance));
                }
            }

            pb.inc(1);
            let current = done.fetch_add(1, Ordering::Relaxed) + 1;
            log_progress("Near-duplicates", current, total, PROGRESS_INTERVAL);
            best.map(|(j, distance)| (*i, j, distance))
        })
        .collect();

    let mut report = DuplicateReport::default();
    let mut seen: FxHashSet<(usize, usize)> = FxHashSet::default();
    for (i, j, distance) in closest.into_iter().flatten() {
        if distance >= UNDER_50 {
            continue;
        }
        if !seen.insert((i.min(j), i.max(j))) {
            continue;
        }
        report.insert(DuplicatePair {
            first: hymns[i].references.clone(),
            first_title: hymns[i].title.clone(),
            second: hymns[j].references.clone(),
            second_title: hymns[j].title.clone(),
            distance,
        });
    }
    report.sort();

    info!(
        no_difference = report.no_difference.len(),
        under_5 = report.under_5.len(),
        under_10 = report.under_10.len(),
        under_50 = report.under_50.len(),
        "near-duplicate search finished"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hymn_type::HymnType;
    use crate::models::{SongLink, Verse, VerseKind};

    fn hymn(id: i64, t: HymnType, n: &str, lyrics: &str) -> Hymn {
        let mut h = Hymn::new(id, SongReference::new(t, n));
        h.title = format!("{t:?} {n}");
        h.lyrics = vec![Verse::new(
            VerseKind::Verse,
            lyrics.lines().map(String::from).collect(),
        )];
        h
    }

    const LYRICS: &str = "Oh, the love of God is greater far\nThan tongue or pen can ever tell";

    #[test]
    fn test_identical_pair_lands_in_every_bucket() {
        let hymns = vec![
            hymn(1, HymnType::ClassicHymn, "1", LYRICS),
            hymn(2, HymnType::Songbase, "77", LYRICS),
        ];
        let report = find_duplicates(&hymns);
        assert_eq!(report.no_difference.len(), 1);
        assert_eq!(report.under_5.len(), 1);
        assert_eq!(report.under_10.len(), 1);
        assert_eq!(report.under_50.len(), 1);
        assert_eq!(report.no_difference[0].distance, 0);
    }

    #[test]
    fn test_single_hymn_never_pairs_with_itself() {
        let hymns = vec![hymn(1, HymnType::ClassicHymn, "1", LYRICS)];
        assert!(find_duplicates(&hymns).is_empty());
    }

    #[test]
    fn test_small_difference_skips_no_difference_bucket() {
        let altered = LYRICS.replace("greater", "greatr");
        let hymns = vec![
            hymn(1, HymnType::ClassicHymn, "1", LYRICS),
            hymn(2, HymnType::NewSong, "5", &altered),
        ];
        let report = find_duplicates(&hymns);
        assert!(report.no_difference.is_empty());
        assert_eq!(report.under_5.len(), 1);
        assert_eq!(report.under_5[0].distance, 1);
    }

    #[test]
    fn test_declared_relevants_are_skipped() {
        let mut h1 = hymn(1, HymnType::ClassicHymn, "1", LYRICS);
        h1.relevants
            .push(SongLink::new(SongReference::new(HymnType::NewTune, "1"), "New Tune"));
        let nt1 = hymn(2, HymnType::NewTune, "1", LYRICS);
        assert!(find_duplicates(&[h1, nt1]).is_empty());
    }

    #[test]
    fn test_non_english_hymns_are_ignored() {
        let hymns = vec![
            hymn(1, HymnType::German, "1", LYRICS),
            hymn(2, HymnType::Dutch, "1", LYRICS),
        ];
        assert!(find_duplicates(&hymns).is_empty());
    }

    #[test]
    fn test_pairs_are_deduplicated_and_sorted() {
        let near = LYRICS.replace("far", "fr");
        let hymns = vec![
            hymn(1, HymnType::ClassicHymn, "1", LYRICS),
            hymn(2, HymnType::ClassicHymn, "2", LYRICS),
            hymn(3, HymnType::ChildrenSong, "3", &near),
        ];
        let report = find_duplicates(&hymns);
        // h/1 <-> h/2 found from both sides, recorded once
        assert_eq!(report.no_difference.len(), 1);
        // c/3 finds h/1 at distance 1
        assert_eq!(report.under_5.len(), 2);
        assert!(report.under_5.windows(2).all(|w| w[0].distance <= w[1].distance));
    }

    #[test]
    fn test_empty_lyrics_are_not_compared() {
        let hymns = vec![
            hymn(1, HymnType::ClassicHymn, "1", ""),
            hymn(2, HymnType::ClassicHymn, "2", ""),
        ];
        assert!(find_duplicates(&hymns).is_empty());
    }
}
