//! folder-scan - Parallel folder-size scanner with snapshot diffing
//!
//! Scans a folder tree with a pool of worker threads, records the size of
//! every file and folder into a snapshot, and compares two snapshots of the
//! same root to show what grew, shrank, appeared or disappeared.
//!
//! # Features
//!
//! - **Parallel Scanning**: A fixed pool of workers pulls folders from a
//!   shared queue and pushes every subfolder it finds back onto it.
//!
//! - **Exact Completion**: An in-flight task counter with a condition
//!   variable detects the end of the scan; no polling tail.
//!
//! - **Arena Snapshots**: Folders live in one vector and refer to their
//!   parent by index, so snapshots are cheap to build, walk and serialize.
//!
//! - **Deterministic Diffs**: Children are matched by name and deleted
//!   entries are emitted in name order.
//!
//! # Architecture
//!
//! ```text
//!  ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//!  │   listing    │◄────┤    walker    ├────►│   snapshot   │
//!  │  DirLister   │     │ queue/worker │     │ arena + JSON │
//!  └──────────────┘     └──────────────┘     └──────┬───────┘
//!                                                   │ two snapshots
//!                                                   ▼
//!                       ┌──────────────┐     ┌──────────────┐
//!                       │    report    │◄────┤     diff     │
//!                       │ table / tree │     │ change tree  │
//!                       └──────────────┘     └──────────────┘
//! ```
//!
//! # Example
//!
//! ```bash
//! # Scan twice, a day apart
//! folder-scan scan /data -o monday.json
//! folder-scan scan /data -o tuesday.json
//!
//! # Browse what changed
//! folder-scan diff monday.json tuesday.json
//! ```

pub mod config;
pub mod diff;
pub mod error;
pub mod listing;
pub mod progress;
pub mod report;
pub mod snapshot;
pub mod walker;

pub use config::{CliArgs, DiffConfig, ScanConfig};
pub use diff::{diff, ChangeMode, FolderChange};
pub use error::{AppError, Result};
pub use snapshot::{load_snapshot, save_snapshot, Snapshot};
pub use walker::{ScanCoordinator, ScanReport};
