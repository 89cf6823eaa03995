//! Component auditor.
//!
//! Validates each closed component against cardinality and type
//! compatibility rules. A registered exception fully contained in a component
//! suppresses the violation: the exception's members are subtracted and the
//! rest is audited again, so the component must still be valid otherwise.
//! Exceptions that nothing needed are reported at the end of the run.

use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

use crate::errors::{ErrorLog, ErrorType, PipelineError};
use crate::exceptions::{ExceptionRegistry, ExceptionSet};
use crate::hymn_type::HymnType;
use crate::models::{format_references, Relation, SongReference};
use crate::sources::Source;

// ============================================================================
// Rules
// ============================================================================

/// Types whose letter-affixed numbers denote an alternate rendition rather
/// than a duplicate slot. Each such reference raises the allowed count of its
/// type by one.
pub fn alternate_bearing_types(relation: Relation) -> &'static [HymnType] {
    match relation {
        Relation::Languages => &[
            HymnType::ClassicHymn,
            HymnType::NewSong,
            HymnType::HowardHigashi,
            HymnType::German,
        ],
        Relation::Relevants => &[
            HymnType::ClassicHymn,
            HymnType::NewSong,
            HymnType::HowardHigashi,
            HymnType::German,
            HymnType::Chinese,
            HymnType::ChineseSimplified,
        ],
    }
}

/// Types that may never share a component.
pub const INCOMPATIBLE_TYPES: [(HymnType, HymnType); 5] = [
    (HymnType::ClassicHymn, HymnType::NewSong),
    (HymnType::ClassicHymn, HymnType::ChildrenSong),
    (HymnType::ChildrenSong, HymnType::NewSong),
    (HymnType::Chinese, HymnType::ChineseSupplemental),
    (HymnType::ChineseSimplified, HymnType::ChineseSupplementalSimplified),
];

/// Audit knobs that differ per relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuditPolicy {
    /// Skip the dangling-set check on the remainder of a component that an
    /// exception just shrank.
    pub suppress_dangling_after_exception: bool,
}

impl AuditPolicy {
    /// Relevants skip the check, languages keep it.
    pub fn for_relation(relation: Relation) -> Self {
        match relation {
            Relation::Languages => Self {
                suppress_dangling_after_exception: false,
            },
            Relation::Relevants => Self {
                suppress_dangling_after_exception: true,
            },
        }
    }
}

/// Per-type count exceeding what the rules allow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overcount {
    pub hymn_type: HymnType,
    pub count: usize,
    pub allowed: usize,
}

pub fn overcounts(relation: Relation, set: &BTreeSet<SongReference>) -> Vec<Overcount> {
    let mut counts: BTreeMap<HymnType, (usize, usize)> = BTreeMap::new();
    for reference in set {
        let entry = counts.entry(reference.hymn_type).or_insert((0, 0));
        entry.0 += 1;
        if reference.is_letter_affixed() {
            entry.1 += 1;
        }
    }

    let alternate_bearing = alternate_bearing_types(relation);
    counts
        .into_iter()
        .filter_map(|(hymn_type, (count, affixed))| {
            let allowed = if alternate_bearing.contains(&hymn_type) {
                1 + affixed
            } else {
                1
            };
            (count > allowed).then_some(Overcount {
                hymn_type,
                count,
                allowed,
            })
        })
        .collect()
}

pub fn incompatible_pairs(set: &BTreeSet<SongReference>) -> Vec<(HymnType, HymnType)> {
    let present: BTreeSet<HymnType> = set.iter().map(|r| r.hymn_type).collect();
    INCOMPATIBLE_TYPES
        .iter()
        .copied()
        .filter(|(a, b)| present.contains(a) && present.contains(b))
        .collect()
}

// ============================================================================
// Auditor
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuditSummary {
    pub components: usize,
    pub exceptions_consumed: usize,
    pub exceptions_obsolete: usize,
}

/// Audits every component of one relation for one source.
pub struct Auditor {
    relation: Relation,
    source: Source,
    policy: AuditPolicy,
    exceptions: ExceptionRegistry,
}

impl Auditor {
    pub fn new(relation: Relation, source: Source, exceptions: Vec<ExceptionSet>) -> Self {
        Self {
            relation,
            source,
            policy: AuditPolicy::for_relation(relation),
            exceptions: ExceptionRegistry::new(exceptions),
        }
    }

    pub fn with_policy(mut self, policy: AuditPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Audit all components, then report every exception nothing consumed.
    pub fn audit(mut self, components: &[BTreeSet<SongReference>], errors: &mut ErrorLog) -> AuditSummary {
        for component in components {
            self.audit_set(component.clone(), true, errors);
        }

        let mut obsolete = 0;
        for exception in self.exceptions.unconsumed() {
            errors.push(PipelineError::warning(
                ErrorType::ObsoleteException,
                self.source,
                vec![format!(
                    "{} exception {} was not needed and can be deleted",
                    self.relation, exception
                )],
            ));
            obsolete += 1;
        }

        let summary = AuditSummary {
            components: components.len(),
            exceptions_consumed: self.exceptions.consumed_count(),
            exceptions_obsolete: obsolete,
        };
        info!(
            relation = %self.relation,
            source = %self.source,
            components = summary.components,
            consumed = summary.exceptions_consumed,
            obsolete = summary.exceptions_obsolete,
            "audit finished"
        );
        summary
    }

    fn audit_set(&mut self, set: BTreeSet<SongReference>, check_dangling: bool, errors: &mut ErrorLog) {
        if set.len() <= 1 {
            if set.len() == 1 && check_dangling {
                errors.push(PipelineError::error(
                    ErrorType::dangling(self.relation),
                    self.source,
                    vec![format!(
                        "{} set has a single member: {}",
                        self.relation,
                        format_references(&set)
                    )],
                ));
            }
            return;
        }

        for overcount in overcounts(self.relation, &set) {
            if self.apply_exception(&set, errors) {
                return;
            }
            errors.push(PipelineError::error(
                ErrorType::TooManyInstances,
                self.source,
                vec![
                    format!(
                        "{} instances of {} in {} set (allowed {})",
                        overcount.count,
                        overcount.hymn_type.display_name(),
                        self.relation,
                        overcount.allowed
                    ),
                    format_references(&set),
                ],
            ));
        }

        for (a, b) in incompatible_pairs(&set) {
            if self.apply_exception(&set, errors) {
                return;
            }
            let of_type = |t: HymnType| format_references(set.iter().filter(|r| r.hymn_type == t));
            errors.push(PipelineError::error(
                ErrorType::incompatible(self.relation),
                self.source,
                vec![
                    format!("{} is incompatible with {}", of_type(a), of_type(b)),
                    format_references(&set),
                ],
            ));
        }
    }

    /// Subtract the first contained exception and audit the remainder.
    /// Returns false when no exception applies.
    fn apply_exception(&mut self, set: &BTreeSet<SongReference>, errors: &mut ErrorLog) -> bool {
        let reduced: BTreeSet<SongReference> = match self.exceptions.consume_contained(set) {
            Some(exception) => {
                debug!(relation = %self.relation, exception = %exception, "exception consumed");
                set.difference(exception.references()).cloned().collect()
            }
            None => return false,
        };
        let check_dangling = !self.policy.suppress_dangling_after_exception;
        self.audit_set(reduced, check_dangling, errors);
        true
    }
}
