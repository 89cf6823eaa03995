//! Safety checks before writing reports or snapshots.
//!
//! Every output the binaries produce carries a marker in its file name
//! (`reconciled`, `errors`, `stats`, `duplicates`), so a mistyped argument
//! can never overwrite the input snapshot.

use anyhow::{bail, Result};
use std::path::Path;

pub const RECONCILED_MARKER: &str = "reconciled";
pub const ERRORS_MARKER: &str = "errors";
pub const STATS_MARKER: &str = "stats";
pub const DUPLICATES_MARKER: &str = "duplicates";

/// Validates that an output path is safe to overwrite.
///
/// The file name must contain `required_pattern`, and the path may not equal
/// any of `source_paths`.
pub fn validate_output_path(output: &Path, required_pattern: &str, source_paths: &[&Path]) -> Result<()> {
    let output_name = output.file_name().and_then(|n| n.to_str()).unwrap_or("");

    if !output_name.contains(required_pattern) {
        bail!(
            "Safety check failed: output file '{}' must contain '{}' in the name",
            output.display(),
            required_pattern
        );
    }

    for source in source_paths {
        if output == *source {
            bail!(
                "Safety check failed: output '{}' cannot be the same as source '{}'",
                output.display(),
                source.display()
            );
        }
    }

    Ok(())
}
