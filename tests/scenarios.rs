mod common;

use common::{link, set, song, targets, Snapshot};
use hymnal_reconcile::errors::ErrorType;
use hymnal_reconcile::hymn_type::HymnType as T;
use hymnal_reconcile::{Relation, SongLink, Source, SourcePipeline};

fn pipeline() -> SourcePipeline {
    SourcePipeline::new(Source::HymnalNet)
}

#[test]
fn test_closed_graph_is_left_unchanged() {
    let mut hymns = Snapshot::new()
        .hymn(
            T::ClassicHymn,
            "1",
            vec![link(T::Chinese, "1", "詩歌(繁)"), link(T::German, "1", "German")],
            vec![link(T::NewTune, "1", "New Tune")],
        )
        .hymn(
            T::Chinese,
            "1",
            vec![link(T::ClassicHymn, "1", "English"), link(T::German, "1", "German")],
            vec![],
        )
        .hymn(
            T::German,
            "1",
            vec![link(T::ClassicHymn, "1", "English"), link(T::Chinese, "1", "詩歌(繁)")],
            vec![],
        )
        .hymn(T::NewTune, "1", vec![], vec![link(T::ClassicHymn, "1", "Original Tune")])
        .hymn(T::Portuguese, "1", vec![], vec![])
        .build();

    let outcome = pipeline().run(&mut hymns).unwrap();

    assert!(outcome.errors.is_empty(), "{:?}", outcome.errors);
    let h1 = song(T::ClassicHymn, "1");
    assert_eq!(targets(&hymns, &h1, Relation::Languages), set(&["ch/1", "de/1"]));
    assert_eq!(targets(&hymns, &h1, Relation::Relevants), set(&["nt/1"]));
    assert_eq!(
        targets(&hymns, &song(T::Chinese, "1"), Relation::Languages),
        set(&["h/1", "de/1"])
    );
    assert_eq!(
        targets(&hymns, &song(T::German, "1"), Relation::Languages),
        set(&["h/1", "ch/1"])
    );
    assert_eq!(
        targets(&hymns, &song(T::NewTune, "1"), Relation::Relevants),
        set(&["h/1"])
    );
    let pt1 = song(T::Portuguese, "1");
    assert!(targets(&hymns, &pt1, Relation::Languages).is_empty());
    assert!(targets(&hymns, &pt1, Relation::Relevants).is_empty());
}

#[test]
fn test_self_reference_is_reported_and_dangles() {
    let mut hymns = Snapshot::new()
        .hymn(T::ClassicHymn, "1", vec![link(T::ClassicHymn, "1", "English")], vec![])
        .build();

    let outcome = pipeline().run(&mut hymns).unwrap();

    assert!(hymns[0].languages.is_empty());
    assert_eq!(outcome.errors.len(), 2, "{:?}", outcome.errors);

    let self_refs: Vec<_> = outcome.errors_of_type(ErrorType::SelfReference).collect();
    assert_eq!(self_refs.len(), 1);
    assert!(self_refs[0].messages.iter().any(|m| m.contains("[h/1]")));
    assert_eq!(outcome.errors_of_type(ErrorType::DanglingLanguageSet).count(), 1);
}

#[test]
fn test_unnamed_self_reference_leaves_empty_list() {
    let mut hymns = Snapshot::new()
        .hymn(T::ClassicHymn, "1", vec![SongLink::unnamed(song(T::ClassicHymn, "1"))], vec![])
        .build();

    let outcome = pipeline().run(&mut hymns).unwrap();

    assert!(hymns[0].languages.is_empty());
    assert_eq!(outcome.errors_of_type(ErrorType::SelfReference).count(), 1);
    // Nothing can name the placeholder, so no component survives to dangle
    assert_eq!(outcome.errors_of_type(ErrorType::ParseError).count(), 1);
    assert_eq!(outcome.errors.len(), 2, "{:?}", outcome.errors);
}

#[test]
fn test_unnamed_link_is_named_by_inference() {
    let mut hymns = Snapshot::new()
        .hymn(T::ClassicHymn, "1", vec![SongLink::unnamed(song(T::Korean, "1"))], vec![])
        .hymn(T::Korean, "1", vec![link(T::ClassicHymn, "1", "English")], vec![])
        .build();

    let outcome = pipeline().run(&mut hymns).unwrap();

    assert!(outcome.errors.is_empty(), "{:?}", outcome.errors);
    assert_eq!(hymns[0].languages, vec![link(T::Korean, "1", "Korean")]);
    assert_eq!(hymns[1].languages, vec![link(T::ClassicHymn, "1", "English")]);
}

#[test]
fn test_unnamed_link_without_inference_is_dropped() {
    let mut hymns = Snapshot::new()
        .hymn(T::ClassicHymn, "1", vec![SongLink::unnamed(song(T::Chinese, "1"))], vec![])
        .hymn(T::Chinese, "1", vec![link(T::ClassicHymn, "1", "English")], vec![])
        .build();

    let outcome = pipeline().run(&mut hymns).unwrap();

    assert_eq!(outcome.errors_of_type(ErrorType::ParseError).count(), 1);
    assert_eq!(outcome.errors_of_type(ErrorType::DanglingLanguageSet).count(), 1);
    assert!(hymns[0].languages.is_empty());
    for hymn in &hymns {
        assert!(hymn.languages.iter().all(|l| !hymn.has_reference(&l.reference)));
    }
}

#[test]
fn test_two_aliases_of_one_hymn_share_a_component() {
    // S/1 names the classic hymn through its ns/900 alias; both aliases
    // enter the component and are audited as separate types.
    let mut hymns = Snapshot::new()
        .hymn(T::ClassicHymn, "1", vec![link(T::Spanish, "1", "Spanish")], vec![])
        .hymn(T::Spanish, "1", vec![link(T::NewSong, "900", "English")], vec![])
        .build();
    hymns[0].references.push(song(T::NewSong, "900"));

    let outcome = pipeline().run(&mut hymns).unwrap();

    let incompatible: Vec<_> = outcome.errors_of_type(ErrorType::IncompatibleLanguages).collect();
    assert_eq!(incompatible.len(), 1, "{:?}", outcome.errors);
    assert!(incompatible[0].messages[0].contains("[h/1] is incompatible with [ns/900]"));
    assert_eq!(
        targets(&hymns, &song(T::Spanish, "1"), Relation::Languages),
        set(&["h/1", "ns/900"])
    );
    assert_eq!(
        targets(&hymns, &song(T::ClassicHymn, "1"), Relation::Languages),
        set(&["S/1"])
    );
}

fn two_classic_hymns(second: &str) -> Vec<hymnal_reconcile::Hymn> {
    Snapshot::new()
        .hymn(T::ClassicHymn, "1", vec![], vec![])
        .hymn(T::ClassicHymn, second, vec![], vec![])
        .hymn(
            T::German,
            "1",
            vec![link(T::ClassicHymn, "1", "English"), link(T::ClassicHymn, second, "English")],
            vec![],
        )
        .build()
}

#[test]
fn test_two_plain_classic_hymns_in_one_language_set() {
    let mut hymns = two_classic_hymns("2");
    let outcome = pipeline().run(&mut hymns).unwrap();

    let overcounts: Vec<_> = outcome.errors_of_type(ErrorType::TooManyInstances).collect();
    assert_eq!(overcounts.len(), 1, "{:?}", outcome.errors);
    assert!(overcounts[0].messages[0].contains("Classic Hymn"));
}

#[test]
fn test_letter_affixed_alternate_is_allowed() {
    let mut hymns = two_classic_hymns("2b");
    let outcome = pipeline().run(&mut hymns).unwrap();

    assert_eq!(outcome.errors_of_type(ErrorType::TooManyInstances).count(), 0);
    assert!(outcome.errors.is_empty(), "{:?}", outcome.errors);
    assert_eq!(
        targets(&hymns, &song(T::ClassicHymn, "1"), Relation::Languages),
        set(&["h/2b", "de/1"])
    );
}

#[test]
fn test_classic_hymn_and_new_song_are_incompatible() {
    let mut hymns = Snapshot::new()
        .hymn(T::ClassicHymn, "1", vec![link(T::NewSong, "1", "New Song")], vec![])
        .hymn(T::NewSong, "1", vec![link(T::ClassicHymn, "1", "English")], vec![])
        .build();

    let outcome = pipeline().run(&mut hymns).unwrap();

    let incompatible: Vec<_> = outcome.errors_of_type(ErrorType::IncompatibleLanguages).collect();
    assert_eq!(incompatible.len(), 1, "{:?}", outcome.errors);
    assert!(incompatible[0].messages[0].contains("h/1"));
    assert!(incompatible[0].messages[0].contains("ns/1"));
    assert_eq!(outcome.errors.len(), 1);
}

#[test]
fn test_incompatible_relevants_use_their_own_type() {
    let mut hymns = Snapshot::new()
        .hymn(T::ClassicHymn, "1", vec![], vec![link(T::ChildrenSong, "1", "Children")])
        .hymn(T::ChildrenSong, "1", vec![], vec![link(T::ClassicHymn, "1", "Original Tune")])
        .build();

    let outcome = pipeline().run(&mut hymns).unwrap();

    assert_eq!(outcome.errors_of_type(ErrorType::IncompatibleRelevants).count(), 1);
    assert_eq!(outcome.errors_of_type(ErrorType::IncompatibleLanguages).count(), 0);
}

#[test]
fn test_one_directional_link_is_named_by_inference() {
    // Nothing links to J/5, so its name comes from the inference table.
    let mut hymns = Snapshot::new()
        .hymn(T::ClassicHymn, "5", vec![link(T::Korean, "5", "Korean")], vec![])
        .hymn(T::Korean, "5", vec![link(T::ClassicHymn, "5", "English")], vec![])
        .hymn(T::Japanese, "5", vec![link(T::ClassicHymn, "5", "English")], vec![])
        .build();

    let outcome = pipeline().run(&mut hymns).unwrap();

    assert!(outcome.errors.is_empty(), "{:?}", outcome.errors);
    assert_eq!(
        targets(&hymns, &song(T::ClassicHymn, "5"), Relation::Languages),
        set(&["K/5", "J/5"])
    );
    let japanese = common::find(&hymns, &song(T::ClassicHymn, "5"))
        .languages
        .iter()
        .find(|l| l.reference == song(T::Japanese, "5"))
        .map(|l| l.name.clone());
    assert_eq!(japanese.as_deref(), Some("Japanese"));
}

#[test]
fn test_unnamed_placeholder_is_dropped_with_parse_error() {
    // Nothing names ch/9 and Chinese has no inferred label.
    let mut hymns = Snapshot::new()
        .hymn(T::ClassicHymn, "9", vec![], vec![])
        .hymn(T::German, "9", vec![], vec![])
        .hymn(
            T::Chinese,
            "9",
            vec![link(T::ClassicHymn, "9", "English"), link(T::German, "9", "German")],
            vec![],
        )
        .build();

    let outcome = pipeline().run(&mut hymns).unwrap();

    assert_eq!(outcome.errors_of_type(ErrorType::ParseError).count(), 1);
    assert_eq!(
        targets(&hymns, &song(T::ClassicHymn, "9"), Relation::Languages),
        set(&["de/9"])
    );
    // The dropped hymn keeps what it declared
    assert_eq!(
        targets(&hymns, &song(T::Chinese, "9"), Relation::Languages),
        set(&["h/9", "de/9"])
    );
}

#[test]
fn test_link_to_missing_hymn_aborts() {
    let mut hymns = Snapshot::new()
        .hymn(T::ClassicHymn, "1", vec![link(T::German, "1", "German")], vec![])
        .build();
    let err = pipeline().run(&mut hymns).unwrap_err();
    assert!(err.to_string().contains("de/1"));
}

#[test]
fn test_shared_alias_aborts() {
    let mut hymns = Snapshot::new()
        .hymn(T::ClassicHymn, "1", vec![], vec![])
        .hymn(T::NewTune, "1", vec![], vec![])
        .build();
    hymns[1].references.push(song(T::ClassicHymn, "1"));
    assert!(pipeline().run(&mut hymns).is_err());
}
