//! folder-scan - Parallel folder-size scanner with snapshot diffing
//!
//! Entry point for the CLI application.

use anyhow::{Context, Result};
use clap::Parser;
use folder_scan::config::{CliArgs, Command, DiffConfig, ScanConfig};
use folder_scan::diff::diff;
use folder_scan::progress::{print_change_summary, print_header, print_summary, ProgressReporter};
use folder_scan::report::{render_change_levels, render_folder_change, render_snapshot, Navigator};
use folder_scan::snapshot::{load_snapshot, save_snapshot};
use folder_scan::walker::ScanCoordinator;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let args = CliArgs::parse();
    setup_logging(args.verbose())?;

    match &args.command {
        Command::Scan { .. } => {
            let config = ScanConfig::from_args(&args).context("Invalid configuration")?;
            run_scan(config)
        }
        Command::Diff { .. } => {
            let config = DiffConfig::from_args(&args).context("Invalid configuration")?;
            run_diff(config)
        }
        Command::Show { snapshot, depth } => run_show(snapshot, *depth),
    }
}

fn run_scan(config: ScanConfig) -> Result<()> {
    let output = config
        .output_path
        .clone()
        .context("No output path configured")?;
    let output_display = output.display().to_string();

    if config.show_progress {
        print_header(&config.root_path(), config.worker_count, &output_display);
    }

    let coordinator =
        ScanCoordinator::new(config.clone()).context("Failed to initialize scanner")?;

    // Setup signal handler for graceful shutdown
    let cancel = coordinator.cancel_handle();
    ctrlc::set_handler(move || {
        eprintln!("\nInterrupt received, shutting down...");
        cancel.cancel();
    })
    .context("Failed to set signal handler")?;

    let progress = config.show_progress.then(ProgressReporter::new);
    if let Some(ref p) = progress {
        p.set_status("Scanning...");
    }

    let report = coordinator
        .run_with_progress(|update| {
            if let Some(ref p) = progress {
                p.update(update);
            }
        })
        .context("Scan failed")?;

    if let Some(ref p) = progress {
        p.finish_and_clear();
    }

    save_snapshot(&report.snapshot, &output)
        .with_context(|| format!("Failed to save snapshot to {}", output_display))?;

    if config.show_progress {
        print_summary(&report, &output_display);
    }

    if !report.completed {
        warn!(
            unscanned = report.stats.unscanned,
            "Scan was interrupted; the snapshot is partial"
        );
    }

    if report.stats.errors > 0 {
        info!(errors = report.stats.errors, "Scan completed with errors");
    }

    Ok(())
}

fn run_diff(config: DiffConfig) -> Result<()> {
    let old = load_snapshot(&config.old)
        .with_context(|| format!("Failed to load {}", config.old.display()))?;
    let cur = load_snapshot(&config.new)
        .with_context(|| format!("Failed to load {}", config.new.display()))?;

    let change = diff(&old, &cur).context("Snapshots cannot be compared")?;
    info!(
        old_size = change.data.old.size,
        new_size = change.data.cur.size,
        mode = %change.change_mode(),
        "Diff complete"
    );

    if let Some(path) = &config.json_output {
        write_json(path, &change)?;
        info!(path = %path.display(), "Change tree written");
    }

    if config.interactive {
        let stdin = io::stdin();
        Navigator::new(&change)
            .run(stdin.lock(), io::stdout().lock())
            .context("Interactive session failed")?;
        return Ok(());
    }

    print_change_summary(&change.summary());
    let rendered = match config.depth {
        Some(depth) => render_change_levels(&change, depth),
        None => render_folder_change(&change),
    };
    print!("{}", rendered);

    Ok(())
}

fn run_show(path: &Path, depth: Option<usize>) -> Result<()> {
    let snapshot = load_snapshot(path)
        .with_context(|| format!("Failed to load {}", path.display()))?;
    print!("{}", render_snapshot(&snapshot, depth));
    Ok(())
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    writer.flush()?;
    Ok(())
}

fn setup_logging(verbose: bool) -> Result<()> {
    let default = if verbose {
        "folder_scan=debug,warn"
    } else {
        "folder_scan=info,warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    Ok(())
}
