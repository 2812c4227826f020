//! Configuration types for folder-scan
//!
//! This module defines:
//! - CLI argument parsing using clap derive macros
//! - Runtime configuration with validation

use crate::error::ConfigError;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

/// Maximum reasonable worker count
pub const MAX_WORKERS: usize = 1024;

/// Minimum dispatch channel capacity
const MIN_CHANNEL_CAPACITY: usize = 1;

/// Default dispatch channel capacity
pub const DEFAULT_CHANNEL_CAPACITY: usize = 128;

/// Parallel folder-size scanner with snapshot diffing
#[derive(Parser, Debug, Clone)]
#[command(
    name = "folder-scan",
    version,
    about = "Parallel folder-size scanner with snapshot diffing",
    long_about = "Scans a folder tree in parallel, records the size of every file and folder \
                  into a JSON snapshot, and compares two snapshots to show what grew, shrank, \
                  appeared or disappeared.",
    after_help = "EXAMPLES:\n    \
        folder-scan scan /data -o monday.json\n    \
        folder-scan scan /data -w 64 -o tuesday.json\n    \
        folder-scan diff monday.json tuesday.json\n    \
        folder-scan diff monday.json tuesday.json --json changes.json --no-interactive\n    \
        folder-scan show tuesday.json -d 2"
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Scan a folder tree and write a snapshot
    Scan {
        /// Folder to scan
        #[arg(value_name = "ROOT")]
        root: PathBuf,

        /// Number of worker threads
        #[arg(short = 'w', long, default_value_t = default_workers(), value_name = "NUM")]
        workers: usize,

        /// Capacity of the dispatch channel between the queue and the workers
        #[arg(long, default_value_t = DEFAULT_CHANNEL_CAPACITY, value_name = "NUM")]
        channel_capacity: usize,

        /// Output snapshot file
        #[arg(short, long, default_value = "report.json", value_name = "FILE")]
        output: PathBuf,

        /// Quiet mode - suppress progress output
        #[arg(short = 'q', long)]
        quiet: bool,

        /// Verbose output (show skipped folders)
        #[arg(short = 'v', long)]
        verbose: bool,
    },

    /// Compare two snapshots of the same root
    Diff {
        /// Older snapshot
        #[arg(value_name = "OLD")]
        old: PathBuf,

        /// Newer snapshot
        #[arg(value_name = "NEW")]
        new: PathBuf,

        /// Also write the change tree as JSON
        #[arg(long, value_name = "FILE")]
        json: Option<PathBuf>,

        /// Print the root changes and exit instead of browsing
        #[arg(long)]
        no_interactive: bool,

        /// Print the change tree down to this depth instead of browsing
        #[arg(short = 'd', long, value_name = "NUM")]
        depth: Option<usize>,

        /// Verbose output
        #[arg(short = 'v', long)]
        verbose: bool,
    },

    /// Print a stored snapshot as a tree
    Show {
        /// Snapshot file
        #[arg(value_name = "SNAPSHOT")]
        snapshot: PathBuf,

        /// Maximum depth to print
        #[arg(short = 'd', long, value_name = "NUM")]
        depth: Option<usize>,
    },
}

impl CliArgs {
    /// Whether verbose logging was requested
    pub fn verbose(&self) -> bool {
        match &self.command {
            Command::Scan { verbose, .. } | Command::Diff { verbose, .. } => *verbose,
            Command::Show { .. } => false,
        }
    }
}

fn default_workers() -> usize {
    // Listing is I/O bound; oversubscribe the cores
    num_cpus::get() * 8
}

/// Validated scan configuration
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Folder to scan
    pub root: PathBuf,

    /// Number of worker threads
    pub worker_count: usize,

    /// Dispatch channel capacity
    pub channel_capacity: usize,

    /// Where to write the snapshot
    pub output_path: Option<PathBuf>,

    /// Show progress indicator
    pub show_progress: bool,
}

impl ScanConfig {
    /// Configuration with defaults for `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            worker_count: default_workers(),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            output_path: None,
            show_progress: false,
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.worker_count = workers;
        self
    }

    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    /// Check the numeric limits
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.worker_count == 0 || self.worker_count > MAX_WORKERS {
            return Err(ConfigError::InvalidWorkerCount {
                count: self.worker_count,
                max: MAX_WORKERS,
            });
        }

        if self.channel_capacity < MIN_CHANNEL_CAPACITY {
            return Err(ConfigError::InvalidChannelCapacity {
                size: self.channel_capacity,
                min: MIN_CHANNEL_CAPACITY,
            });
        }

        Ok(())
    }

    /// Create and validate configuration from the `scan` subcommand
    pub fn from_args(args: &CliArgs) -> Result<Self, ConfigError> {
        let Command::Scan {
            root,
            workers,
            channel_capacity,
            output,
            quiet,
            ..
        } = &args.command
        else {
            return Err(ConfigError::InvalidRoot {
                path: PathBuf::new(),
                reason: "not a scan command".into(),
            });
        };

        let config = Self {
            root: canonical_root(root)?,
            worker_count: *workers,
            channel_capacity: *channel_capacity,
            output_path: Some(output.clone()),
            show_progress: !quiet,
        };
        config.validate()?;
        validate_output(output)?;

        Ok(config)
    }

    /// Root path as stored in the snapshot
    pub fn root_path(&self) -> String {
        self.root.to_string_lossy().into_owned()
    }
}

/// Validated diff configuration
#[derive(Debug, Clone)]
pub struct DiffConfig {
    pub old: PathBuf,
    pub new: PathBuf,
    pub json_output: Option<PathBuf>,
    pub interactive: bool,
    pub depth: Option<usize>,
}

impl DiffConfig {
    /// Create and validate configuration from the `diff` subcommand
    pub fn from_args(args: &CliArgs) -> Result<Self, ConfigError> {
        let Command::Diff {
            old,
            new,
            json,
            no_interactive,
            depth,
            ..
        } = &args.command
        else {
            return Err(ConfigError::InvalidOutputPath {
                path: PathBuf::new(),
                reason: "not a diff command".into(),
            });
        };

        if let Some(json) = json {
            validate_output(json)?;
        }

        Ok(Self {
            old: old.clone(),
            new: new.clone(),
            json_output: json.clone(),
            // A depth-limited printout replaces browsing
            interactive: !no_interactive && depth.is_none(),
            depth: *depth,
        })
    }
}

/// Resolve the root to an absolute path and make sure it is a folder
fn canonical_root(root: &Path) -> Result<PathBuf, ConfigError> {
    let canonical = root.canonicalize().map_err(|e| ConfigError::InvalidRoot {
        path: root.to_path_buf(),
        reason: e.to_string(),
    })?;

    if !canonical.is_dir() {
        return Err(ConfigError::InvalidRoot {
            path: root.to_path_buf(),
            reason: "not a directory".into(),
        });
    }

    Ok(canonical)
}

fn validate_output(path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            return Err(ConfigError::InvalidOutputPath {
                path: path.to_path_buf(),
                reason: format!("Parent directory '{}' does not exist", parent.display()),
            });
        }
    }
    Ok(())
}
