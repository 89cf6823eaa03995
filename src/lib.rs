//! Hymnal link reconciliation - shared modules for both binaries.
//!
//! The per-source pass (`pipeline`) patches known upstream mistakes, closes
//! the languages and relevants relations into symmetric components, audits
//! them against per-source exceptions and writes the lists back. The
//! near-duplicate detector (`duplicates`) is a separate report over the merged
//! English hymns.

pub mod audit;
pub mod closure;
pub mod duplicates;
pub mod errors;
pub mod exceptions;
pub mod hymn_type;
pub mod models;
pub mod normalize;
pub mod patch;
pub mod pipeline;
pub mod progress;
pub mod safety;
pub mod snapshot;
pub mod sources;

pub use errors::{ErrorLog, PipelineError, ReconcileError, Result};
pub use models::{Hymn, Relation, SongLink, SongReference};
pub use pipeline::{RunOutcome, RunStats, SourcePipeline};
pub use sources::Source;
