//! Error types for the reconciliation pass.
//!
//! Two tiers:
//! - `PipelineError`: data-quality findings. Accumulated in an `ErrorLog` and
//!   reported after the run; they never abort it.
//! - `ReconcileError`: structural violations of the pass's own invariants.
//!   Returned as `Err` and abort the run before anything is written.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;
use tracing::warn;

use crate::models::{Relation, SongReference};
use crate::sources::Source;

// ============================================================================
// Soft errors
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorType {
    DanglingLanguageSet,
    DanglingRelevantSet,
    TooManyInstances,
    IncompatibleLanguages,
    IncompatibleRelevants,
    SelfReference,
    ObsoleteException,
    ObsoletePatchTarget,
    ParseError,
    UnrecognizedHymnType,
}

impl ErrorType {
    pub fn label(self) -> &'static str {
        match self {
            ErrorType::DanglingLanguageSet => "DANGLING_LANGUAGE_SET",
            ErrorType::DanglingRelevantSet => "DANGLING_RELEVANT_SET",
            ErrorType::TooManyInstances => "TOO_MANY_INSTANCES",
            ErrorType::IncompatibleLanguages => "INCOMPATIBLE_LANGUAGES",
            ErrorType::IncompatibleRelevants => "INCOMPATIBLE_RELEVANTS",
            ErrorType::SelfReference => "SELF_REFERENCE",
            ErrorType::ObsoleteException => "OBSOLETE_EXCEPTION",
            ErrorType::ObsoletePatchTarget => "OBSOLETE_PATCH_TARGET",
            ErrorType::ParseError => "PARSE_ERROR",
            ErrorType::UnrecognizedHymnType => "UNRECOGNIZED_HYMN_TYPE",
        }
    }

    pub fn dangling(relation: Relation) -> Self {
        match relation {
            Relation::Languages => ErrorType::DanglingLanguageSet,
            Relation::Relevants => ErrorType::DanglingRelevantSet,
        }
    }

    pub fn incompatible(relation: Relation) -> Self {
        match relation {
            Relation::Languages => ErrorType::IncompatibleLanguages,
            Relation::Relevants => ErrorType::IncompatibleRelevants,
        }
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One data-quality finding, surfaced for operator review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineError {
    pub severity: Severity,
    pub error_type: ErrorType,
    pub source: Source,
    pub messages: Vec<String>,
}

impl PipelineError {
    pub fn new(severity: Severity, error_type: ErrorType, source: Source, messages: Vec<String>) -> Self {
        Self {
            severity,
            error_type,
            source,
            messages,
        }
    }

    pub fn error(error_type: ErrorType, source: Source, messages: Vec<String>) -> Self {
        Self::new(Severity::Error, error_type, source, messages)
    }

    pub fn warning(error_type: ErrorType, source: Source, messages: Vec<String>) -> Self {
        Self::new(Severity::Warning, error_type, source, messages)
    }
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{:?}] {} ({}): {}",
            self.severity,
            self.error_type,
            self.source,
            self.messages.join("; ")
        )
    }
}

/// Append-only accumulator for soft errors.
#[derive(Debug, Default, Clone)]
pub struct ErrorLog {
    errors: Vec<PipelineError>,
}

impl ErrorLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: PipelineError) {
        warn!(
            error_type = %error.error_type,
            source = %error.source,
            "{}",
            error.messages.join("; ")
        );
        self.errors.push(error);
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PipelineError> {
        self.errors.iter()
    }

    pub fn of_type(&self, error_type: ErrorType) -> impl Iterator<Item = &PipelineError> {
        self.errors.iter().filter(move |e| e.error_type == error_type)
    }

    pub fn count_by_type(&self) -> BTreeMap<ErrorType, usize> {
        let mut counts = BTreeMap::new();
        for error in &self.errors {
            *counts.entry(error.error_type).or_insert(0) += 1;
        }
        counts
    }

    pub fn into_vec(self) -> Vec<PipelineError> {
        self.errors
    }
}

// ============================================================================
// Fatal errors
// ============================================================================

/// Violations of the pass's own invariants. Any of these means the input
/// contract or the algorithm is broken, so the run stops.
#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("reference {reference} matched {matches} hymns")]
    AmbiguousReference {
        reference: SongReference,
        matches: usize,
    },

    #[error("reference {reference} does not resolve to any hymn ({context})")]
    UnresolvedReference {
        reference: SongReference,
        context: String,
    },

    #[error("{relation} components overlap on {reference}")]
    OverlappingComponents {
        reference: SongReference,
        relation: Relation,
    },

    #[error("{relation} component member {reference} has no name after resolution")]
    UnnamedMember {
        reference: SongReference,
        relation: Relation,
    },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias for results using `ReconcileError`.
pub type Result<T> = std::result::Result<T, ReconcileError>;
