//! Phase progress for the binaries.
//!
//! A `Phase` owns one bar or spinner plus its start time and logs a summary
//! through `tracing` when finished. In log-only mode the bar is never drawn and
//! counted phases emit a periodic event instead, so output stays greppable
//! under `tail -f`.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::info;

static LOG_ONLY: AtomicBool = AtomicBool::new(false);

const BAR_TEMPLATE: &str = "{msg} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} (ETA: {eta})";
const SPINNER_TEMPLATE: &str = "{msg} {spinner} [{elapsed_precise}]";

pub fn set_log_only(value: bool) {
    LOG_ONLY.store(value, Ordering::Relaxed);
}

pub fn is_log_only() -> bool {
    LOG_ONLY.load(Ordering::Relaxed)
}

/// "2.5s" under a minute, "1.5m" above.
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 60.0 {
        format!("{secs:.1}s")
    } else {
        format!("{:.1}m", secs / 60.0)
    }
}

/// True when a counted phase at `current` of `total` should log in log-only
/// mode: every `every` items and at the end.
pub fn should_log(current: u64, total: u64, every: u64) -> bool {
    total > 0 && every > 0 && (current % every == 0 || current == total)
}

/// Emit a periodic progress event for a counted phase (log-only mode only).
pub fn log_progress(phase: &str, current: u64, total: u64, every: u64) {
    if is_log_only() && should_log(current, total, every) {
        let pct = 100.0 * current as f64 / total as f64;
        info!(phase, current, total, "{pct:.1}%");
    }
}

pub struct Phase {
    name: &'static str,
    bar: ProgressBar,
    started: Instant,
}

impl Phase {
    fn with_bar(name: &'static str, bar: ProgressBar, template: &str) -> Self {
        if is_log_only() {
            bar.set_draw_target(ProgressDrawTarget::hidden());
        } else if let Ok(style) = ProgressStyle::with_template(template) {
            bar.set_style(style.progress_chars("=> "));
        }
        bar.set_message(name);
        info!(phase = name, "started");
        Self {
            name,
            bar,
            started: Instant::now(),
        }
    }

    /// Phase with a known number of steps.
    pub fn counted(name: &'static str, len: u64) -> Self {
        Self::with_bar(name, ProgressBar::new(len), BAR_TEMPLATE)
    }

    /// Phase of unknown length.
    pub fn spinner(name: &'static str) -> Self {
        let phase = Self::with_bar(name, ProgressBar::new_spinner(), SPINNER_TEMPLATE);
        if !is_log_only() {
            phase.bar.enable_steady_tick(Duration::from_millis(100));
        }
        phase
    }

    pub fn bar(&self) -> &ProgressBar {
        &self.bar
    }

    /// Stop drawing, log `summary` with the elapsed time and return it.
    pub fn finish(self, summary: impl Into<String>) -> Duration {
        let elapsed = self.started.elapsed();
        let summary = summary.into();
        info!(phase = self.name, elapsed = %format_duration(elapsed), "{summary}");
        self.bar.finish_with_message(format!("{}: {}", self.name, summary));
        elapsed
    }
}
