//! Report English hymns whose lyrics are near-identical.
//!
//! Usage: find-duplicates <merged.json> <report-duplicates.json> [--workers N]
//!
//! Read-only with respect to the snapshot; the report is for manual review.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

use hymnal_reconcile::duplicates::{find_duplicates_with_progress, UNDER_10, UNDER_5, UNDER_50};
use hymnal_reconcile::progress::{format_duration, set_log_only, Phase};
use hymnal_reconcile::safety::{validate_output_path, DUPLICATES_MARKER};
use hymnal_reconcile::snapshot;

#[derive(Parser)]
#[command(name = "find-duplicates")]
#[command(about = "Find near-duplicate lyrics among merged English hymns")]
struct Args {
    /// Merged JSON snapshot
    input: PathBuf,

    /// Report path (file name must contain "duplicates")
    report: PathBuf,

    #[arg(long, default_value = "0")]
    workers: usize,

    /// Hide progress bars and log periodically instead
    #[arg(long)]
    log_only: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .init();
    set_log_only(args.log_only);

    if args.workers > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(args.workers)
            .build_global()
            .context("Failed to set thread pool size")?;
    }

    validate_output_path(&args.report, DUPLICATES_MARKER, &[&args.input])?;

    let start = Instant::now();

    let json = std::fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read snapshot {:?}", args.input))?;
    // Merged snapshots are already canonical and mix sources
    let hymns = snapshot::from_canonical_json(&json).context("Failed to parse merged snapshot")?;
    info!(hymns = hymns.len(), "snapshot loaded");

    let phase = Phase::counted("Comparing lyrics", hymns.len() as u64);
    let report = find_duplicates_with_progress(&hymns, phase.bar());
    phase.finish(format!("{} pairs under {}", report.under_50.len(), UNDER_50));

    let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
    std::fs::write(&args.report, json)
        .with_context(|| format!("Failed to write {:?}", args.report))?;

    println!("\n{:=<60}", "");
    println!("Near-duplicate search complete!");
    println!("  Identical lyrics: {}", report.no_difference.len());
    println!("  Distance < {}: {}", UNDER_5, report.under_5.len());
    println!("  Distance < {}: {}", UNDER_10, report.under_10.len());
    println!("  Distance < {}: {}", UNDER_50, report.under_50.len());
    println!("  Elapsed: {}", format_duration(start.elapsed()));
    println!("{:=<60}", "");

    Ok(())
}
