//! Closure engine.
//!
//! Turns the locally-declared, often one-directional links of one relation
//! into closed components: every reference reachable from another through
//! declared links, in either direction, ends up in the same component. The
//! finished components are written back onto each hymn as its full relation
//! list, minus its own aliases.
//!
//! ## Layout
//!
//! `LinkGraph` is an arena indexed by hymn position. Each declared link is
//! resolved to the index of the hymn owning its reference, and components are
//! found by BFS over those indices. Names are resolved afterwards as a pure
//! function of the finished component:
//!
//! 1. A hymn that declares links enters its component as a nameless
//!    placeholder for its primary alias.
//! 2. A placeholder adopts the name any member declares for one of the hymn's
//!    aliases (most hymns are mutually referential).
//! 3. Otherwise a fixed per-type label is inferred for sources known to be
//!    one-directional.
//! 4. Otherwise the placeholder is dropped and a `PARSE_ERROR` is recorded.
//!
//! Self-referencing links are reported but stay in the graph.

use rustc_hash::FxHashMap;
use std::collections::{BTreeSet, VecDeque};
use tracing::{debug, info};

use crate::errors::{ErrorLog, ErrorType, PipelineError, ReconcileError, Result};
use crate::hymn_type::HymnType;
use crate::models::{format_references, Hymn, Relation, SongLink, SongReference};
use crate::sources::Source;

// ============================================================================
// Components
// ============================================================================

/// Closed set of links for one relation, unique by reference, every member
/// named.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    links: Vec<SongLink>,
}

impl Component {
    pub fn from_links(links: Vec<SongLink>) -> Self {
        Self { links }
    }

    pub fn links(&self) -> &[SongLink] {
        &self.links
    }

    pub fn references(&self) -> BTreeSet<SongReference> {
        self.links.iter().map(|l| l.reference.clone()).collect()
    }

    pub fn contains(&self, reference: &SongReference) -> bool {
        self.links.iter().any(|l| &l.reference == reference)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

impl std::fmt::Display for Component {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&format_references(self.links.iter().map(|l| &l.reference)))
    }
}

/// Label inferred for types whose sources only ever link outward.
pub fn inferred_name(relation: Relation, hymn_type: HymnType) -> Option<&'static str> {
    match relation {
        Relation::Languages => match hymn_type {
            HymnType::German
            | HymnType::Japanese
            | HymnType::Korean
            | HymnType::Farsi
            | HymnType::Indonesian => Some(hymn_type.display_name()),
            _ => None,
        },
        Relation::Relevants => None,
    }
}

// ============================================================================
// Link Graph
// ============================================================================

/// Resolved adjacency for one relation over a hymn slice.
pub struct LinkGraph<'a> {
    hymns: &'a [Hymn],
    relation: Relation,
    owner_of: FxHashMap<&'a SongReference, usize>,
    outgoing: Vec<Vec<usize>>,
    incoming: Vec<Vec<usize>>,
}

impl<'a> LinkGraph<'a> {
    /// Resolve every declared link. Records `SELF_REFERENCE` for hymns that
    /// link to one of their own aliases; those edges are kept.
    pub fn build(
        hymns: &'a [Hymn],
        relation: Relation,
        source: Source,
        errors: &mut ErrorLog,
    ) -> Result<Self> {
        let mut owner_of: FxHashMap<&'a SongReference, usize> = FxHashMap::default();
        for (index, hymn) in hymns.iter().enumerate() {
            for reference in &hymn.references {
                if let Some(&other) = owner_of.get(reference) {
                    if other != index {
                        return Err(ReconcileError::AmbiguousReference {
                            reference: reference.clone(),
                            matches: 2,
                        });
                    }
                }
                owner_of.insert(reference, index);
            }
        }

        let mut outgoing = vec![Vec::new(); hymns.len()];
        let mut incoming = vec![Vec::new(); hymns.len()];
        for (index, hymn) in hymns.iter().enumerate() {
            let mut self_referencing = false;
            for link in hymn.links(relation) {
                let target = *owner_of.get(&link.reference).ok_or_else(|| {
                    ReconcileError::UnresolvedReference {
                        reference: link.reference.clone(),
                        context: format!("{} link from {}", relation, hymn.primary_reference()),
                    }
                })?;
                if target == index {
                    self_referencing = true;
                }
                outgoing[index].push(target);
                incoming[target].push(index);
            }
            if self_referencing {
                errors.push(PipelineError::error(
                    ErrorType::SelfReference,
                    source,
                    vec![format!(
                        "{} references itself in {}",
                        format_references(&hymn.references),
                        relation
                    )],
                ));
            }
        }

        Ok(Self {
            hymns,
            relation,
            owner_of,
            outgoing,
            incoming,
        })
    }

    /// Hymn indices grouped by undirected reachability. Hymns with no edge in
    /// either direction belong to no group.
    pub fn groups(&self) -> Vec<Vec<usize>> {
        let mut component_of: Vec<Option<usize>> = vec![None; self.hymns.len()];
        let mut groups: Vec<Vec<usize>> = Vec::new();

        for start in 0..self.hymns.len() {
            if component_of[start].is_some()
                || (self.outgoing[start].is_empty() && self.incoming[start].is_empty())
            {
                continue;
            }

            let id = groups.len();
            let mut members = Vec::new();
            let mut queue = VecDeque::from([start]);
            component_of[start] = Some(id);

            while let Some(node) = queue.pop_front() {
                members.push(node);
                for &next in self.outgoing[node].iter().chain(self.incoming[node].iter()) {
                    if component_of[next].is_none() {
                        component_of[next] = Some(id);
                        queue.push_back(next);
                    }
                }
            }

            members.sort_unstable();
            groups.push(members);
        }

        groups
    }

    /// Collect the links of one group and resolve the nameless ones.
    fn assemble(&self, members: &[usize], source: Source, errors: &mut ErrorLog) -> Component {
        let mut links: Vec<SongLink> = Vec::new();
        let mut position: FxHashMap<SongReference, usize> = FxHashMap::default();

        for &node in members {
            let hymn = &self.hymns[node];
            let declared = hymn.links(self.relation);
            if declared.is_empty() {
                continue;
            }

            let primary = hymn.primary_reference();
            if !position.contains_key(primary) {
                position.insert(primary.clone(), links.len());
                links.push(SongLink::unnamed(primary.clone()));
            }

            for link in declared {
                match position.get(&link.reference) {
                    Some(&at) => {
                        if !links[at].is_named() && link.is_named() {
                            links[at].name = link.name.clone();
                        }
                    }
                    None => {
                        position.insert(link.reference.clone(), links.len());
                        links.push(link.clone());
                    }
                }
            }
        }

        let mut resolved = Vec::with_capacity(links.len());
        for link in links {
            if link.is_named() {
                resolved.push(link);
                continue;
            }
            match self.resolve_name(&link.reference, members) {
                Some(name) => resolved.push(SongLink::new(link.reference, name)),
                None => errors.push(PipelineError::error(
                    ErrorType::ParseError,
                    source,
                    vec![
                        format!("dangling reference: {} has no name", link.reference),
                        format!(
                            "{} component {}",
                            self.relation,
                            format_references(members.iter().map(|&m| self.hymns[m].primary_reference()))
                        ),
                    ],
                )),
            }
        }

        Component::from_links(resolved)
    }

    fn resolve_name(&self, reference: &SongReference, members: &[usize]) -> Option<String> {
        if let Some(&owner) = self.owner_of.get(reference) {
            let owner = &self.hymns[owner];
            let declared = members
                .iter()
                .flat_map(|&m| self.hymns[m].links(self.relation).iter())
                .find(|link| link.is_named() && owner.has_reference(&link.reference));
            if let Some(link) = declared {
                return Some(link.name.clone());
            }
        }
        inferred_name(self.relation, reference.hymn_type).map(String::from)
    }
}

// ============================================================================
// Entry Points
// ============================================================================

/// Build the closed components of `relation` over `hymns`.
pub fn build_components(
    hymns: &[Hymn],
    relation: Relation,
    source: Source,
    errors: &mut ErrorLog,
) -> Result<Vec<Component>> {
    let graph = LinkGraph::build(hymns, relation, source, errors)?;
    let groups = graph.groups();

    let mut components = Vec::with_capacity(groups.len());
    for members in &groups {
        let component = graph.assemble(members, source, errors);
        if component.is_empty() {
            continue;
        }
        debug!(relation = %relation, component = %component, "component closed");
        components.push(component);
    }

    verify_components(&components, relation)?;

    info!(
        relation = %relation,
        source = %source,
        components = components.len(),
        "components built"
    );
    Ok(components)
}

/// Structural invariants: members are named and components are disjoint.
fn verify_components(components: &[Component], relation: Relation) -> Result<()> {
    let mut seen: FxHashMap<&SongReference, usize> = FxHashMap::default();
    for (index, component) in components.iter().enumerate() {
        for link in component.links() {
            if !link.is_named() {
                return Err(ReconcileError::UnnamedMember {
                    reference: link.reference.clone(),
                    relation,
                });
            }
            if let Some(&other) = seen.get(&link.reference) {
                if other != index {
                    return Err(ReconcileError::OverlappingComponents {
                        reference: link.reference.clone(),
                        relation,
                    });
                }
            }
            seen.insert(&link.reference, index);
        }
    }
    Ok(())
}

/// Replace each hymn's `relation` list with its component minus its own
/// aliases. Hymns in no component keep their list, minus any self-links.
/// Returns the number of hymns rewritten.
pub fn write_back(hymns: &mut [Hymn], relation: Relation, components: &[Component]) -> Result<usize> {
    let mut component_of: FxHashMap<&SongReference, usize> = FxHashMap::default();
    for (index, component) in components.iter().enumerate() {
        for link in component.links() {
            component_of.insert(&link.reference, index);
        }
    }

    let mut rewritten = 0;
    for hymn in hymns.iter_mut() {
        let mut found: Option<usize> = None;
        for alias in &hymn.references {
            if let Some(&index) = component_of.get(alias) {
                match found {
                    Some(existing) if existing != index => {
                        return Err(ReconcileError::OverlappingComponents {
                            reference: alias.clone(),
                            relation,
                        });
                    }
                    _ => found = Some(index),
                }
            }
        }

        if let Some(index) = found {
            let links: Vec<SongLink> = components[index]
                .links()
                .iter()
                .filter(|link| !hymn.has_reference(&link.reference))
                .cloned()
                .collect();
            *hymn.links_mut(relation) = links;
            rewritten += 1;
        } else {
            // Dropped placeholders can still carry a self-link
            let aliases = hymn.references.clone();
            let links = hymn.links_mut(relation);
            let before = links.len();
            links.retain(|link| !aliases.contains(&link.reference));
            if links.len() != before {
                debug!(hymn = %format_references(&aliases), relation = %relation, "self-links stripped");
                rewritten += 1;
            }
        }
    }

    info!(relation = %relation, rewritten, "relation lists written back");
    Ok(rewritten)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn song(t: HymnType, n: &str) -> SongReference {
        SongReference::new(t, n)
    }

    fn hymn(id: i64, reference: SongReference, languages: Vec<SongLink>) -> Hymn {
        let mut h = Hymn::new(id, reference);
        h.languages = languages;
        h
    }

    fn link(t: HymnType, n: &str, name: &str) -> SongLink {
        SongLink::new(song(t, n), name)
    }

    fn names(component: &Component) -> Vec<(String, String)> {
        let mut pairs: Vec<_> = component
            .links()
            .iter()
            .map(|l| (l.reference.to_string(), l.name.clone()))
            .collect();
        pairs.sort();
        pairs
    }

    #[test]
    fn test_one_directional_links_close() {
        // Only h/1 declares anything; ch/1 must still end up linking back.
        let hymns = vec![
            hymn(1, song(HymnType::ClassicHymn, "1"), vec![link(HymnType::Chinese, "1", "詩歌(繁)")]),
            hymn(2, song(HymnType::Chinese, "1"), vec![]),
            hymn(3, song(HymnType::ClassicHymn, "2"), vec![link(HymnType::Chinese, "1", "詩歌(繁)")]),
        ];
        let mut errors = ErrorLog::new();
        let components = build_components(&hymns, Relation::Languages, Source::HymnalNet, &mut errors).unwrap();
        assert_eq!(components.len(), 1);
        // h/1 and h/2 placeholders have no declared name and no inference
        assert_eq!(errors.of_type(ErrorType::ParseError).count(), 2);
        assert_eq!(names(&components[0]), vec![("ch/1".to_string(), "詩歌(繁)".to_string())]);
    }

    #[test]
    fn test_placeholder_adopts_declared_name() {
        let hymns = vec![
            hymn(1, song(HymnType::ClassicHymn, "1"), vec![link(HymnType::German, "1", "German")]),
            hymn(2, song(HymnType::German, "1"), vec![link(HymnType::ClassicHymn, "1", "English")]),
        ];
        let mut errors = ErrorLog::new();
        let components = build_components(&hymns, Relation::Languages, Source::HymnalNet, &mut errors).unwrap();
        assert!(errors.is_empty());
        assert_eq!(
            names(&components[0]),
            vec![
                ("de/1".to_string(), "German".to_string()),
                ("h/1".to_string(), "English".to_string()),
            ]
        );
    }

    #[test]
    fn test_placeholder_adopts_name_declared_for_other_alias() {
        let mut h1 = hymn(1, song(HymnType::ClassicHymn, "1"), vec![link(HymnType::Spanish, "1", "Spanish")]);
        h1.references.push(song(HymnType::NewSong, "900"));
        let s1 = hymn(2, song(HymnType::Spanish, "1"), vec![link(HymnType::NewSong, "900", "English")]);
        let mut errors = ErrorLog::new();
        let components = build_components(&[h1, s1], Relation::Languages, Source::HymnalNet, &mut errors).unwrap();
        assert!(errors.is_empty());
        let pairs = names(&components[0]);
        assert!(pairs.contains(&("h/1".to_string(), "English".to_string())));
        assert!(pairs.contains(&("ns/900".to_string(), "English".to_string())));
    }

    #[test]
    fn test_placeholder_name_inferred_for_one_directional_types() {
        // de/1 links out but nobody declares a name for it
        let hymns = vec![
            hymn(1, song(HymnType::German, "1"), vec![link(HymnType::ClassicHymn, "1", "English")]),
            hymn(2, song(HymnType::ClassicHymn, "1"), vec![]),
        ];
        let mut errors = ErrorLog::new();
        let components = build_components(&hymns, Relation::Languages, Source::HymnalNet, &mut errors).unwrap();
        assert!(errors.is_empty());
        assert!(names(&components[0]).contains(&("de/1".to_string(), "German".to_string())));
    }

    #[test]
    fn test_isolated_hymns_form_no_component() {
        let hymns = vec![hymn(1, song(HymnType::Portuguese, "1"), vec![])];
        let mut errors = ErrorLog::new();
        let components = build_components(&hymns, Relation::Languages, Source::HymnalNet, &mut errors).unwrap();
        assert!(components.is_empty());
        assert!(errors.is_empty());
    }

    #[test]
    fn test_self_reference_is_reported_and_kept() {
        let hymns = vec![hymn(1, song(HymnType::ClassicHymn, "1"), vec![link(HymnType::ClassicHymn, "1", "English")])];
        let mut errors = ErrorLog::new();
        let components = build_components(&hymns, Relation::Languages, Source::HymnalNet, &mut errors).unwrap();
        assert_eq!(errors.of_type(ErrorType::SelfReference).count(), 1);
        assert_eq!(components.len(), 1);
        assert_eq!(components[0].len(), 1);
    }

    #[test]
    fn test_unresolved_link_is_fatal() {
        let hymns = vec![hymn(1, song(HymnType::ClassicHymn, "1"), vec![link(HymnType::Korean, "77", "Korean")])];
        let mut errors = ErrorLog::new();
        let result = build_components(&hymns, Relation::Languages, Source::HymnalNet, &mut errors);
        assert!(matches!(result, Err(ReconcileError::UnresolvedReference { .. })));
    }

    #[test]
    fn test_shared_alias_is_fatal() {
        let hymns = vec![
            hymn(1, song(HymnType::ClassicHymn, "1"), vec![]),
            hymn(2, song(HymnType::ClassicHymn, "1"), vec![]),
        ];
        let mut errors = ErrorLog::new();
        let result = build_components(&hymns, Relation::Languages, Source::HymnalNet, &mut errors);
        assert!(matches!(result, Err(ReconcileError::AmbiguousReference { .. })));
    }

    #[test]
    fn test_write_back_removes_own_aliases() {
        let mut hymns = vec![
            hymn(1, song(HymnType::ClassicHymn, "1"), vec![link(HymnType::Chinese, "1", "詩歌(繁)")]),
            hymn(2, song(HymnType::Chinese, "1"), vec![link(HymnType::ClassicHymn, "1", "English")]),
            hymn(3, song(HymnType::German, "1"), vec![link(HymnType::Chinese, "1", "詩歌(繁)")]),
        ];
        let mut errors = ErrorLog::new();
        let components = build_components(&hymns, Relation::Languages, Source::HymnalNet, &mut errors).unwrap();
        let rewritten = write_back(&mut hymns, Relation::Languages, &components).unwrap();
        assert_eq!(rewritten, 3);
        for h in &hymns {
            assert_eq!(h.languages.len(), 2);
            assert!(h.languages.iter().all(|l| !h.has_reference(&l.reference)));
        }
    }

    #[test]
    fn test_unnamed_self_link_is_stripped_without_component() {
        let mut hymns = vec![hymn(
            1,
            song(HymnType::ClassicHymn, "1"),
            vec![SongLink::unnamed(song(HymnType::ClassicHymn, "1"))],
        )];
        let mut errors = ErrorLog::new();
        let components = build_components(&hymns, Relation::Languages, Source::HymnalNet, &mut errors).unwrap();
        assert!(components.is_empty());
        assert_eq!(errors.of_type(ErrorType::SelfReference).count(), 1);
        assert_eq!(errors.of_type(ErrorType::ParseError).count(), 1);

        let rewritten = write_back(&mut hymns, Relation::Languages, &components).unwrap();
        assert_eq!(rewritten, 1);
        assert!(hymns[0].languages.is_empty());
    }

    #[test]
    fn test_dropped_placeholder_keeps_links_to_others() {
        let mut hymns = vec![
            hymn(
                1,
                song(HymnType::Chinese, "9"),
                vec![
                    SongLink::unnamed(song(HymnType::Chinese, "9")),
                    link(HymnType::ClassicHymn, "9", "English"),
                ],
            ),
            hymn(2, song(HymnType::ClassicHymn, "9"), vec![]),
        ];
        let mut errors = ErrorLog::new();
        let components = build_components(&hymns, Relation::Languages, Source::HymnalNet, &mut errors).unwrap();
        write_back(&mut hymns, Relation::Languages, &components).unwrap();
        let kept: Vec<String> = hymns[0].languages.iter().map(|l| l.reference.to_string()).collect();
        assert_eq!(kept, vec!["h/9"]);
    }

    #[test]
    fn test_write_back_rejects_hymn_spanning_components() {
        let mut h1 = hymn(1, song(HymnType::ClassicHymn, "1"), vec![]);
        h1.references.push(song(HymnType::NewSong, "1"));
        let components = vec![
            Component::from_links(vec![link(HymnType::ClassicHymn, "1", "English")]),
            Component::from_links(vec![link(HymnType::NewSong, "1", "English")]),
        ];
        let result = write_back(&mut [h1], Relation::Languages, &components);
        assert!(matches!(result, Err(ReconcileError::OverlappingComponents { .. })));
    }
}
