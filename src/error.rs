//! Error types for folder-scan
//!
//! This module defines the error hierarchy for the scanner and differ:
//! - Per-folder filesystem errors (recoverable, the scan continues)
//! - Snapshot load/save errors (fatal for the run)
//! - Structural diff errors (fatal for the diff)
//! - Configuration and worker thread errors
//!
//! Per-node errors never propagate past the folder they occurred on. Everything
//! else bubbles up to the binary, which reports it and exits non-zero.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for the folder-scan application
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Worker/concurrency errors
    #[error("Worker error: {0}")]
    Worker(#[from] WorkerError),

    /// Snapshot persistence errors
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),

    /// Snapshots that cannot be compared
    #[error("Diff error: {0}")]
    Diff(#[from] DiffError),

    /// I/O errors (terminal, output files, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Filesystem errors raised while listing a single folder
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    /// Directory could not be listed
    #[error("Failed to read directory '{path}': {reason}")]
    ReadDirFailed { path: String, reason: String },

    /// Entry metadata could not be read
    #[error("Failed to stat '{path}': {reason}")]
    StatFailed { path: String, reason: String },

    /// Permission denied
    #[error("Permission denied: '{path}'")]
    PermissionDenied { path: String },

    /// Path vanished between discovery and listing
    #[error("Path not found: '{path}'")]
    NotFound { path: String },
}

impl ScanError {
    /// Build a scan error from an I/O error on `path`
    pub fn from_io(path: &str, err: &std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => ScanError::NotFound { path: path.into() },
            std::io::ErrorKind::PermissionDenied => {
                ScanError::PermissionDenied { path: path.into() }
            }
            _ => ScanError::ReadDirFailed {
                path: path.into(),
                reason: err.to_string(),
            },
        }
    }

    /// Build a per-entry metadata error from an I/O error on `path`
    pub fn stat_failed(path: &str, err: &std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => ScanError::NotFound { path: path.into() },
            std::io::ErrorKind::PermissionDenied => {
                ScanError::PermissionDenied { path: path.into() }
            }
            _ => ScanError::StatFailed {
                path: path.into(),
                reason: err.to_string(),
            },
        }
    }

    /// Check if this error is recoverable (node treated as empty, scan continues)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ScanError::ReadDirFailed { .. }
                | ScanError::StatFailed { .. }
                | ScanError::PermissionDenied { .. }
                | ScanError::NotFound { .. }
        )
    }

    /// Returns the path associated with this error
    pub fn path(&self) -> &str {
        match self {
            ScanError::ReadDirFailed { path, .. } => path,
            ScanError::StatFailed { path, .. } => path,
            ScanError::PermissionDenied { path } => path,
            ScanError::NotFound { path } => path,
        }
    }
}

/// Snapshot load/save errors
#[derive(Error, Debug)]
pub enum SnapshotError {
    /// Snapshot file could not be read
    #[error("Failed to read snapshot '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Snapshot file could not be written
    #[error("Failed to write snapshot '{path}': {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Snapshot content is not valid
    #[error("Malformed snapshot '{path}': {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Snapshot could not be encoded
    #[error("Failed to encode snapshot: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Errors raised when two snapshots cannot be compared
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DiffError {
    /// Root folders differ in name or path
    #[error(
        "Root folders must be the same: old is '{old_name}' at '{old_path}', \
         current is '{cur_name}' at '{cur_path}'"
    )]
    StructuralMismatch {
        old_name: String,
        old_path: String,
        cur_name: String,
        cur_path: String,
    },
}

/// Configuration and CLI errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Invalid worker count
    #[error("Invalid worker count {count}: must be between 1 and {max}")]
    InvalidWorkerCount { count: usize, max: usize },

    /// Invalid dispatch channel capacity
    #[error("Invalid channel capacity {size}: must be at least {min}")]
    InvalidChannelCapacity { size: usize, min: usize },

    /// Root folder unusable
    #[error("Invalid root folder '{path}': {reason}")]
    InvalidRoot { path: PathBuf, reason: String },

    /// Output path error
    #[error("Invalid output path '{path}': {reason}")]
    InvalidOutputPath { path: PathBuf, reason: String },
}

/// Worker thread errors
#[derive(Error, Debug)]
pub enum WorkerError {
    /// Thread could not be started
    #[error("Failed to spawn {name}: {reason}")]
    SpawnFailed { name: String, reason: String },

    /// Worker panicked
    #[error("Worker {id} panicked: {message}")]
    Panicked { id: usize, message: String },

    /// Dispatcher panicked
    #[error("Dispatcher thread panicked")]
    DispatcherPanicked,
}

/// Result type alias for AppError
pub type Result<T> = std::result::Result<T, AppError>;

/// Result type alias for ScanError
pub type ScanResult<T> = std::result::Result<T, ScanError>;

/// Result type alias for SnapshotError
pub type SnapshotResult<T> = std::result::Result<T, SnapshotError>;

/// Represents the outcome of scanning a single folder
#[derive(Debug)]
pub enum ScanOutcome {
    /// Folder listed
    Success {
        path: String,
        files: usize,
        subfolders: usize,
        entry_errors: usize,
    },

    /// Folder could not be listed; it stays empty in the snapshot
    Skipped { path: String, error: ScanError },
}

impl ScanOutcome {
    /// Returns true if this outcome represents success
    pub fn is_success(&self) -> bool {
        matches!(self, ScanOutcome::Success { .. })
    }

    /// Returns the path associated with this outcome
    pub fn path(&self) -> &str {
        match self {
            ScanOutcome::Success { path, .. } => path,
            ScanOutcome::Skipped { path, .. } => path,
        }
    }
}
