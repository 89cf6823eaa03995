use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

use hymnal_reconcile::errors::{ErrorLog, Severity};
use hymnal_reconcile::models::HymnIdSequence;
use hymnal_reconcile::progress::{format_duration, set_log_only, Phase};
use hymnal_reconcile::safety::{validate_output_path, ERRORS_MARKER, RECONCILED_MARKER, STATS_MARKER};
use hymnal_reconcile::snapshot;
use hymnal_reconcile::sources::Source;
use hymnal_reconcile::SourcePipeline;

#[derive(Parser)]
#[command(name = "hymnal-reconcile")]
#[command(about = "Patch, close and audit the language and tune links of one source's hymns")]
struct Args {
    /// JSON snapshot of the source's hymns
    input: PathBuf,

    /// Reconciled snapshot (file name must contain "reconciled")
    output: PathBuf,

    /// Source the snapshot came from (hymnal-net, hymns-for-god)
    #[arg(long, default_value = "hymnal-net")]
    source: String,

    /// Write every soft error as JSON
    #[arg(long)]
    errors: Option<PathBuf>,

    /// Write run statistics as JSON
    #[arg(long)]
    stats: Option<PathBuf>,

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

    let Some(source) = Source::from_name(&args.source) else {
        bail!(
            "Unknown source '{}' (expected one of: {})",
            args.source,
            Source::ALL.map(Source::name).join(", ")
        );
    };

    validate_output_path(&args.output, RECONCILED_MARKER, &[&args.input])?;
    if let Some(path) = &args.errors {
        validate_output_path(path, ERRORS_MARKER, &[&args.input, &args.output])?;
    }
    if let Some(path) = &args.stats {
        validate_output_path(path, STATS_MARKER, &[&args.input, &args.output])?;
    }

    let start = Instant::now();

    let phase = Phase::spinner("Loading snapshot");
    let json = std::fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read snapshot {:?}", args.input))?;
    let mut load_errors = ErrorLog::new();
    let mut ids = HymnIdSequence::default();
    let mut hymns = snapshot::from_json(&json, source, &mut ids, &mut load_errors)
        .context("Failed to parse snapshot")?;
    phase.finish(format!("{} hymns, {} load errors", hymns.len(), load_errors.len()));

    let phase = Phase::spinner("Reconciling");
    let outcome = SourcePipeline::for_source(source)
        .run(&mut hymns)
        .context("Reconciliation aborted; nothing was written")?;
    phase.finish(format!("{} soft errors", outcome.errors.len()));

    let mut errors = load_errors.into_vec();
    errors.extend(outcome.errors);
    // Load errors are counted alongside the pass's own
    let mut stats = outcome.stats;
    stats.errors_by_type.clear();
    for error in &errors {
        *stats.errors_by_type.entry(error.error_type).or_default() += 1;
    }

    let output = snapshot::to_json(&hymns).context("Failed to serialize hymns")?;
    std::fs::write(&args.output, output)
        .with_context(|| format!("Failed to write {:?}", args.output))?;

    if let Some(path) = &args.errors {
        let json = serde_json::to_string_pretty(&errors).context("Failed to serialize errors")?;
        std::fs::write(path, json).with_context(|| format!("Failed to write {:?}", path))?;
        info!(path = ?path, count = errors.len(), "error report written");
    }

    stats.log_phase("final");
    if let Some(path) = &args.stats {
        stats
            .write_to_file(path)
            .with_context(|| format!("Failed to write {:?}", path))?;
    }

    let hard = errors.iter().filter(|e| e.severity == Severity::Error).count();

    println!("\n{:=<60}", "");
    println!("Reconciliation complete! ({})", source);
    println!("  Hymns: {} -> {}", stats.hymns_in, stats.hymns_out);
    println!("  Patches applied: {}", stats.patches_applied);
    println!(
        "  Components: {} languages, {} relevants",
        stats.languages.components, stats.relevants.components
    );
    println!("  Errors: {} ({} warnings)", hard, errors.len() - hard);
    for (error_type, count) in &stats.errors_by_type {
        println!("    {:<28} {}", error_type.to_string(), count);
    }
    println!("  Elapsed: {}", format_duration(start.elapsed()));
    println!("{:=<60}", "");

    Ok(())
}
