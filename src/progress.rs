//! Progress reporting for the folder scanner
//!
//! Provides real-time progress display using indicatif progress bars.

use crate::diff::ChangeSummary;
use crate::walker::{ScanProgress, ScanReport};
use console::style;
use humansize::{format_size, BINARY};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Progress reporter that displays scan status
pub struct ProgressReporter {
    bar: ProgressBar,
}

impl ProgressReporter {
    /// Create a new progress reporter
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();

        let style = ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");
        bar.set_style(style);
        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Update the progress display
    pub fn update(&self, progress: &ScanProgress) {
        let msg = format!(
            "Dirs: {} | Files: {} | Size: {} | Rate: {:.0}/s | Queue: {} | Workers: {}/{}",
            format_number(progress.dirs),
            format_number(progress.files),
            format_size(progress.bytes, BINARY),
            progress.files_per_second(),
            progress.queued,
            progress.active_workers,
            progress.total_workers,
        );

        self.bar.set_message(msg);
    }

    /// Set a status message
    pub fn set_status(&self, status: &str) {
        self.bar.set_message(status.to_string());
    }

    /// Finish and clear the progress display
    pub fn finish_and_clear(&self) {
        self.bar.finish_and_clear();
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Format a number with thousands separators
pub fn format_number(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }

    out
}

/// Print a header at the start of the scan
pub fn print_header(root: &str, workers: usize, output: &str) {
    println!();
    println!(
        "{} {}",
        style("folder-scan").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!("{}", style("─".repeat(50)).dim());
    println!("  {} {}", style("Root:").bold(), root);
    println!("  {} {}", style("Workers:").bold(), workers);
    println!("  {} {}", style("Output:").bold(), output);
    println!();
}

/// Print a summary of the scan results
pub fn print_summary(report: &ScanReport, output: &str) {
    let stats = &report.stats;
    let duration_secs = report.duration.as_secs_f64();
    let rate = if duration_secs > 0.0 {
        stats.files as f64 / duration_secs
    } else {
        0.0
    };

    let title = if report.completed {
        style("Scan Complete").green().bold()
    } else {
        style("Scan Cancelled").yellow().bold()
    };

    println!();
    println!("{}", title);
    println!("{}", style("─".repeat(50)).dim());
    println!("  {} {}", style("Directories:").bold(), format_number(stats.dirs));
    println!("  {} {}", style("Files:").bold(), format_number(stats.files));
    println!(
        "  {} {}",
        style("Total Size:").bold(),
        format_size(u64::try_from(report.snapshot.total_size()).unwrap_or(0), BINARY)
    );
    println!(
        "  {} {:.1}s ({:.0} files/sec)",
        style("Duration:").bold(),
        duration_secs,
        rate
    );
    if stats.errors > 0 {
        println!(
            "  {} {}",
            style("Errors:").yellow().bold(),
            format_number(stats.errors)
        );
    }
    if stats.unscanned > 0 {
        println!(
            "  {} {}",
            style("Unscanned:").yellow().bold(),
            format_number(stats.unscanned)
        );
    }
    println!("  {} {}", style("Snapshot:").bold(), output);
    println!();
}

/// Print mode counts for a diff
pub fn print_change_summary(summary: &ChangeSummary) {
    println!("{}", style("Changes").cyan().bold());
    println!("{}", style("─".repeat(50)).dim());
    for (label, counts) in [("Folders:", &summary.folders), ("Files:", &summary.files)] {
        println!(
            "  {} {} changed, {} new, {} deleted, {} same",
            style(label).bold(),
            style(format_number(counts.changed)).yellow(),
            style(format_number(counts.new)).green(),
            style(format_number(counts.deleted)).red(),
            format_number(counts.same),
        );
    }
    println!();
}
