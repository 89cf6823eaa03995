//! Shared text helpers for reconciliation and duplicate detection.
//!
//! CRITICAL: `is_letter_affixed` decides which alternate renditions are allowed
//! to share a component. Changing it changes audit results on every source.

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::models::Verse;

// ============================================================================
// REGEX PATTERNS
// ============================================================================

/// Hymn numbers carrying a letter prefix or suffix: "1b", "c333", "ns12a".
pub static LETTER_AFFIXED: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"^\D+\d+\D*$").unwrap(),
        Regex::new(r"^\D*\d+\D+$").unwrap(),
    ]
});

/// Regex to collapse runs of whitespace into a single space
pub static MULTI_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s{2,}").unwrap());

// ============================================================================
// NUMBERS
// ============================================================================

/// True if the hymn number denotes a distinguishable alternate rendition.
pub fn is_letter_affixed(number: &str) -> bool {
    LETTER_AFFIXED.iter().any(|p| p.is_match(number))
}

// ============================================================================
// LYRICS
// ============================================================================

/// Fold typographic quotes so that transcriptions differing only in quote
/// style compare equal.
pub fn normalize_punctuation(s: &str) -> String {
    s.replace(['\u{2018}', '\u{2019}'], "'")
        .replace(['\u{201C}', '\u{201D}'], "\"")
        .replace(['\u{00B4}', '\u{0060}'], "'")
}

/// Normalize one lyric line: NFC, folded quotes, collapsed whitespace.
pub fn normalize_line(line: &str) -> String {
    let composed: String = line.nfc().collect();
    let folded = normalize_punctuation(&composed);
    MULTI_SPACE.replace_all(folded.trim(), " ").to_string()
}

/// Flatten all verses into one comparable text, one line per lyric line.
/// Blank lines are dropped.
pub fn flatten_lyrics(verses: &[Verse]) -> String {
    verses
        .iter()
        .flat_map(|verse| verse.lines.iter())
        .map(|line| normalize_line(line))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

// ============================================================================
// TESTS
// ============================================================================
