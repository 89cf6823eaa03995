//! Canonical hymnal catalogue.
//!
//! Every source identifier is translated into one of these editions before it
//! reaches the reconciliation pass. The abbreviation is the stable key used in
//! `SongReference` strings (`"h/1"`, `"ch/1b"`), so it must never change once
//! a snapshot has been written with it.

use serde::{Deserialize, Serialize};

/// Language a hymnal edition is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Language {
    English,
    Dutch,
    German,
    ChineseTraditional,
    ChineseSimplified,
    Cebuano,
    Tagalog,
    French,
    Spanish,
    Korean,
    Japanese,
    Indonesian,
    Farsi,
    Russian,
    Portuguese,
    Slovak,
    Estonian,
    Arabic,
    Hebrew,
}

/// Hymnal edition / language combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HymnType {
    #[serde(rename = "h")]
    ClassicHymn,
    #[serde(rename = "nt")]
    NewTune,
    #[serde(rename = "ns")]
    NewSong,
    #[serde(rename = "c")]
    ChildrenSong,
    #[serde(rename = "lb")]
    HowardHigashi,
    #[serde(rename = "bf")]
    BeFilled,
    #[serde(rename = "sb")]
    Songbase,
    #[serde(rename = "hd")]
    Dutch,
    #[serde(rename = "de")]
    German,
    #[serde(rename = "lde")]
    Liederbuch,
    #[serde(rename = "ch")]
    Chinese,
    #[serde(rename = "chx")]
    ChineseSimplified,
    #[serde(rename = "ts")]
    ChineseSupplemental,
    #[serde(rename = "tsx")]
    ChineseSupplementalSimplified,
    #[serde(rename = "cb")]
    Cebuano,
    #[serde(rename = "ht")]
    Tagalog,
    #[serde(rename = "hf")]
    French,
    #[serde(rename = "S")]
    Spanish,
    #[serde(rename = "K")]
    Korean,
    #[serde(rename = "J")]
    Japanese,
    #[serde(rename = "I")]
    Indonesian,
    #[serde(rename = "F")]
    Farsi,
    #[serde(rename = "R")]
    Russian,
    #[serde(rename = "pt")]
    Portuguese,
    #[serde(rename = "sk")]
    Slovak,
    #[serde(rename = "et")]
    Estonian,
    #[serde(rename = "ar")]
    Arabic,
    #[serde(rename = "hb")]
    Hebrew,
}

impl HymnType {
    pub const ALL: [HymnType; 28] = [
        HymnType::ClassicHymn,
        HymnType::NewTune,
        HymnType::NewSong,
        HymnType::ChildrenSong,
        HymnType::HowardHigashi,
        HymnType::BeFilled,
        HymnType::Songbase,
        HymnType::Dutch,
        HymnType::German,
        HymnType::Liederbuch,
        HymnType::Chinese,
        HymnType::ChineseSimplified,
        HymnType::ChineseSupplemental,
        HymnType::ChineseSupplementalSimplified,
        HymnType::Cebuano,
        HymnType::Tagalog,
        HymnType::French,
        HymnType::Spanish,
        HymnType::Korean,
        HymnType::Japanese,
        HymnType::Indonesian,
        HymnType::Farsi,
        HymnType::Russian,
        HymnType::Portuguese,
        HymnType::Slovak,
        HymnType::Estonian,
        HymnType::Arabic,
        HymnType::Hebrew,
    ];

    /// Stable key used in reference strings.
    pub fn abbreviation(self) -> &'static str {
        match self {
            HymnType::ClassicHymn => "h",
            HymnType::NewTune => "nt",
            HymnType::NewSong => "ns",
            HymnType::ChildrenSong => "c",
            HymnType::HowardHigashi => "lb",
            HymnType::BeFilled => "bf",
            HymnType::Songbase => "sb",
            HymnType::Dutch => "hd",
            HymnType::German => "de",
            HymnType::Liederbuch => "lde",
            HymnType::Chinese => "ch",
            HymnType::ChineseSimplified => "chx",
            HymnType::ChineseSupplemental => "ts",
            HymnType::ChineseSupplementalSimplified => "tsx",
            HymnType::Cebuano => "cb",
            HymnType::Tagalog => "ht",
            HymnType::French => "hf",
            HymnType::Spanish => "S",
            HymnType::Korean => "K",
            HymnType::Japanese => "J",
            HymnType::Indonesian => "I",
            HymnType::Farsi => "F",
            HymnType::Russian => "R",
            HymnType::Portuguese => "pt",
            HymnType::Slovak => "sk",
            HymnType::Estonian => "et",
            HymnType::Arabic => "ar",
            HymnType::Hebrew => "hb",
        }
    }

    /// Case-sensitive: `"S"` (Spanish) and `"sk"` (Slovak) only differ by case rules
    /// the upstream sources already agree on.
    pub fn from_abbreviation(abbreviation: &str) -> Option<Self> {
        HymnType::ALL
            .iter()
            .copied()
            .find(|t| t.abbreviation() == abbreviation)
    }

    pub fn display_name(self) -> &'static str {
        match self {
            HymnType::ClassicHymn => "Classic Hymn",
            HymnType::NewTune => "New Tune",
            HymnType::NewSong => "New Song",
            HymnType::ChildrenSong => "Children's Song",
            HymnType::HowardHigashi => "Howard Higashi Songs",
            HymnType::BeFilled => "Be Filled",
            HymnType::Songbase => "Songbase",
            HymnType::Dutch => "Dutch",
            HymnType::German => "German",
            HymnType::Liederbuch => "Liederbuch",
            HymnType::Chinese => "Chinese",
            HymnType::ChineseSimplified => "Chinese (Simplified)",
            HymnType::ChineseSupplemental => "Chinese Supplemental",
            HymnType::ChineseSupplementalSimplified => "Chinese Supplemental (Simplified)",
            HymnType::Cebuano => "Cebuano",
            HymnType::Tagalog => "Tagalog",
            HymnType::French => "French",
            HymnType::Spanish => "Spanish",
            HymnType::Korean => "Korean",
            HymnType::Japanese => "Japanese",
            HymnType::Indonesian => "Indonesian",
            HymnType::Farsi => "Farsi",
            HymnType::Russian => "Russian",
            HymnType::Portuguese => "Portuguese",
            HymnType::Slovak => "Slovak",
            HymnType::Estonian => "Estonian",
            HymnType::Arabic => "Arabic",
            HymnType::Hebrew => "Hebrew",
        }
    }

    pub fn language(self) -> Language {
        match self {
            HymnType::ClassicHymn
            | HymnType::NewTune
            | HymnType::NewSong
            | HymnType::ChildrenSong
            | HymnType::HowardHigashi
            | HymnType::BeFilled
            | HymnType::Songbase => Language::English,
            HymnType::Dutch => Language::Dutch,
            HymnType::German | HymnType::Liederbuch => Language::German,
            HymnType::Chinese | HymnType::ChineseSupplemental => Language::ChineseTraditional,
            HymnType::ChineseSimplified | HymnType::ChineseSupplementalSimplified => {
                Language::ChineseSimplified
            }
            HymnType::Cebuano => Language::Cebuano,
            HymnType::Tagalog => Language::Tagalog,
            HymnType::French => Language::French,
            HymnType::Spanish => Language::Spanish,
            HymnType::Korean => Language::Korean,
            HymnType::Japanese => Language::Japanese,
            HymnType::Indonesian => Language::Indonesian,
            HymnType::Farsi => Language::Farsi,
            HymnType::Russian => Language::Russian,
            HymnType::Portuguese => Language::Portuguese,
            HymnType::Slovak => Language::Slovak,
            HymnType::Estonian => Language::Estonian,
            HymnType::Arabic => Language::Arabic,
            HymnType::Hebrew => Language::Hebrew,
        }
    }
}
