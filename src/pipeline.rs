//! Per-source reconciliation pass.
//!
//! Order is fixed: patches, then languages (close, audit, write back), then
//! relevants. The relevants closure sees the languages lists already
//! rewritten, but the two relations never share edges.

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Instant;
use tracing::info;

use crate::audit::{AuditPolicy, Auditor};
use crate::closure::{build_components, write_back};
use crate::errors::{ErrorLog, ErrorType, PipelineError, Result};
use crate::exceptions::ExceptionSet;
use crate::models::{Hymn, Relation};
use crate::patch::{Patch, Patcher};
use crate::sources::Source;

// ============================================================================
// Statistics
// ============================================================================

/// Counts for one relation's closure and audit.
#[derive(Default, Debug, Clone, Serialize)]
pub struct RelationStats {
    pub components: usize,
    pub hymns_rewritten: usize,
    pub exceptions_consumed: usize,
    pub exceptions_obsolete: usize,
}

#[derive(Default, Debug, Clone, Serialize)]
pub struct RunStats {
    pub source: Option<Source>,
    pub hymns_in: usize,
    pub hymns_out: usize,
    pub patches_applied: usize,
    pub languages: RelationStats,
    pub relevants: RelationStats,
    pub errors_by_type: BTreeMap<ErrorType, usize>,
    pub elapsed_seconds: f64,
}

impl RunStats {
    pub fn relation(&self, relation: Relation) -> &RelationStats {
        match relation {
            Relation::Languages => &self.languages,
            Relation::Relevants => &self.relevants,
        }
    }

    fn relation_mut(&mut self, relation: Relation) -> &mut RelationStats {
        match relation {
            Relation::Languages => &mut self.languages,
            Relation::Relevants => &mut self.relevants,
        }
    }

    pub fn total_errors(&self) -> usize {
        self.errors_by_type.values().sum()
    }

    /// Log stats as pretty JSON
    pub fn log_phase(&self, phase: &str) {
        if let Ok(json) = serde_json::to_string_pretty(self) {
            info!(phase, "run stats\n{}", json);
        }
    }

    /// Write stats to a JSON file
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// Everything a run produces besides the mutated hymns.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub errors: Vec<PipelineError>,
    pub stats: RunStats,
}

impl RunOutcome {
    pub fn errors_of_type(&self, error_type: ErrorType) -> impl Iterator<Item = &PipelineError> {
        self.errors.iter().filter(move |e| e.error_type == error_type)
    }
}

// ============================================================================
// Pipeline
// ============================================================================

/// Corrections and audit configuration for one source.
#[derive(Debug, Clone)]
pub struct SourcePipeline {
    source: Source,
    patches: Vec<Patch>,
    language_exceptions: Vec<ExceptionSet>,
    relevant_exceptions: Vec<ExceptionSet>,
    language_policy: AuditPolicy,
    relevant_policy: AuditPolicy,
}

impl SourcePipeline {
    /// Pipeline with no patches or exceptions and the default audit policies.
    pub fn new(source: Source) -> Self {
        Self {
            source,
            patches: Vec::new(),
            language_exceptions: Vec::new(),
            relevant_exceptions: Vec::new(),
            language_policy: AuditPolicy::for_relation(Relation::Languages),
            relevant_policy: AuditPolicy::for_relation(Relation::Relevants),
        }
    }

    /// Pipeline carrying the source's own correction tables.
    pub fn for_source(source: Source) -> Self {
        Self::new(source)
            .with_patches(source.patches())
            .with_exceptions(Relation::Languages, source.exceptions(Relation::Languages))
            .with_exceptions(Relation::Relevants, source.exceptions(Relation::Relevants))
    }

    pub fn with_patches(mut self, patches: Vec<Patch>) -> Self {
        self.patches = patches;
        self
    }

    pub fn with_exceptions(mut self, relation: Relation, sets: Vec<ExceptionSet>) -> Self {
        match relation {
            Relation::Languages => self.language_exceptions = sets,
            Relation::Relevants => self.relevant_exceptions = sets,
        }
        self
    }

    pub fn with_policy(mut self, relation: Relation, policy: AuditPolicy) -> Self {
        match relation {
            Relation::Languages => self.language_policy = policy,
            Relation::Relevants => self.relevant_policy = policy,
        }
        self
    }

    pub fn source(&self) -> Source {
        self.source
    }

    fn exceptions(&self, relation: Relation) -> Vec<ExceptionSet> {
        match relation {
            Relation::Languages => self.language_exceptions.clone(),
            Relation::Relevants => self.relevant_exceptions.clone(),
        }
    }

    fn policy(&self, relation: Relation) -> AuditPolicy {
        match relation {
            Relation::Languages => self.language_policy,
            Relation::Relevants => self.relevant_policy,
        }
    }

    /// Run the pass over `hymns` in place.
    ///
    /// Soft findings come back in the outcome. A fatal error leaves `hymns`
    /// partially rewritten; callers must not persist them.
    pub fn run(&self, hymns: &mut Vec<Hymn>) -> Result<RunOutcome> {
        let start = Instant::now();
        let mut errors = ErrorLog::new();
        let mut stats = RunStats {
            source: Some(self.source),
            hymns_in: hymns.len(),
            ..Default::default()
        };

        info!(source = %self.source, hymns = hymns.len(), "starting reconciliation");

        let patcher = Patcher::new(self.source, self.patches.clone());
        stats.patches_applied = patcher.apply(hymns, &mut errors)?;

        for relation in Relation::ALL {
            self.run_relation(relation, hymns, &mut errors, &mut stats)?;
        }

        stats.hymns_out = hymns.len();
        stats.errors_by_type = errors.count_by_type();
        stats.elapsed_seconds = start.elapsed().as_secs_f64();

        info!(
            source = %self.source,
            errors = errors.len(),
            elapsed = stats.elapsed_seconds,
            "reconciliation finished"
        );

        Ok(RunOutcome {
            errors: errors.into_vec(),
            stats,
        })
    }

    fn run_relation(
        &self,
        relation: Relation,
        hymns: &mut [Hymn],
        errors: &mut ErrorLog,
        stats: &mut RunStats,
    ) -> Result<()> {
        let components = build_components(hymns, relation, self.source, errors)?;

        let sets: Vec<_> = components.iter().map(|c| c.references()).collect();
        let summary = Auditor::new(relation, self.source, self.exceptions(relation))
            .with_policy(self.policy(relation))
            .audit(&sets, errors);

        let rewritten = write_back(hymns, relation, &components)?;

        let entry = stats.relation_mut(relation);
        entry.components = summary.components;
        entry.hymns_rewritten = rewritten;
        entry.exceptions_consumed = summary.exceptions_consumed;
        entry.exceptions_obsolete = summary.exceptions_obsolete;
        Ok(())
    }
}
