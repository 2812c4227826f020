//! Parallel folder walker
//!
//! A shared work queue feeds a fixed pool of worker threads. Each worker
//! lists one folder, records its files, and pushes every subfolder back onto
//! the queue. The coordinator waits on the task tracker until nothing is
//! queued or in flight, then stops everyone and assembles the snapshot.
//!
//! # Architecture
//!
//! ```text
//!   enqueue (unbounded)          dispatch (bounded)
//!  ┌──────────────────┐  ┌────────────┐  ┌──────────────┐
//!  │  WorkQueue buffer ├─►│ Dispatcher ├─►│ dispatch chan │
//!  └────────▲─────────┘  └────────────┘  └──────┬───────┘
//!           │                                   │
//!           │        ┌──────────┬──────────┬────▼─────┐
//!           └────────┤ Worker 1 │ Worker 2 │ Worker N │
//!          subfolders└──────────┴──────────┴──────────┘
//!                                   │
//!                          TaskTracker (queued / in flight)
//!                                   │
//!                           ScanCoordinator::run
//! ```

pub mod coordinator;
pub mod queue;
pub mod tracker;
pub mod worker;

pub use coordinator::{assemble_snapshot, ScanCoordinator, ScanProgress, ScanReport, ScanStats};
pub use queue::{DirTask, QueueStats, TaskId, WorkQueue, ROOT_TASK};
pub use tracker::{CancelHandle, TaskGuard, TaskTracker, WaitStatus};
pub use worker::{scan_folder, ChildFolder, FolderRecord, Worker, WorkerStats};
