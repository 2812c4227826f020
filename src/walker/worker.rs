//! Worker thread logic for parallel folder scanning
//!
//! Each worker:
//! - Pulls folder tasks from the dispatch channel
//! - Lists the folder through the shared [`DirLister`]
//! - Records files and their sizes into a folder record it alone owns
//! - Enqueues every subfolder as a new task (fan-out)
//!
//! Records stay with the worker until it is joined, so no folder is ever
//! written by two threads and nothing per-node needs a lock.

use crate::error::{ScanOutcome, WorkerError};
use crate::listing::{join_path, DirLister, EntryKind};
use crate::snapshot::FsData;
use crate::walker::queue::{DirTask, TaskId, WorkQueueReceiver, WorkQueueSender};
use crate::walker::tracker::TaskGuard;
use crossbeam_channel::Receiver;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, trace, warn};

/// A subfolder discovered while scanning its parent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildFolder {
    /// Task scheduled to scan this folder
    pub task_id: TaskId,

    /// Folder name and path (size filled in by aggregation)
    pub data: FsData,
}

/// Everything one worker learned about one folder
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderRecord {
    /// Task that produced this record
    pub task_id: TaskId,

    /// Subfolders in listing order
    pub subfolders: Vec<ChildFolder>,

    /// Files in listing order
    pub files: Vec<FsData>,

    /// Sum of `files` sizes
    pub files_size: i64,
}

impl FolderRecord {
    fn new(task_id: TaskId) -> Self {
        Self {
            task_id,
            ..Self::default()
        }
    }
}

/// Statistics collected by a worker
#[derive(Debug, Default)]
pub struct WorkerStats {
    /// Folders listed
    pub dirs_processed: AtomicU64,

    /// Files found
    pub files_found: AtomicU64,

    /// Bytes found (sum of file sizes)
    pub bytes_found: AtomicU64,

    /// Folders or entries that could not be read
    pub errors: AtomicU64,
}

impl WorkerStats {
    fn record_dir(&self) {
        self.dirs_processed.fetch_add(1, Ordering::Relaxed);
    }

    fn record_files(&self, count: u64) {
        self.files_found.fetch_add(count, Ordering::Relaxed);
    }

    fn record_bytes(&self, bytes: u64) {
        self.bytes_found.fetch_add(bytes, Ordering::Relaxed);
    }

    fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }
}

/// A worker thread that processes folder tasks
pub struct Worker {
    /// Worker ID
    id: usize,

    /// Thread handle
    handle: Option<JoinHandle<Vec<FolderRecord>>>,

    /// Worker statistics
    stats: Arc<WorkerStats>,
}

impl Worker {
    /// Spawn a new worker thread
    pub fn spawn<L: DirLister + 'static>(
        id: usize,
        lister: Arc<L>,
        queue_rx: WorkQueueReceiver,
        queue_tx: WorkQueueSender,
        stop: Receiver<()>,
    ) -> Result<Self, WorkerError> {
        let stats = Arc::new(WorkerStats::default());
        let stats_clone = Arc::clone(&stats);

        let name = format!("folder-scan-worker-{}", id);
        let handle = thread::Builder::new()
            .name(name.clone())
            .spawn(move || worker_loop(id, lister, queue_rx, queue_tx, stop, stats_clone))
            .map_err(|e| WorkerError::SpawnFailed {
                name,
                reason: e.to_string(),
            })?;

        Ok(Self {
            id,
            handle: Some(handle),
            stats,
        })
    }

    /// Get worker ID
    pub fn id(&self) -> usize {
        self.id
    }

    /// Get worker statistics
    pub fn stats(&self) -> &WorkerStats {
        &self.stats
    }

    /// Wait for the worker to finish and take its folder records
    pub fn join(mut self) -> Result<Vec<FolderRecord>, WorkerError> {
        match self.handle.take() {
            Some(handle) => handle.join().map_err(|_| WorkerError::Panicked {
                id: self.id,
                message: "Worker thread panicked".into(),
            }),
            None => Ok(Vec::new()),
        }
    }
}

/// Main worker loop
fn worker_loop<L: DirLister>(
    id: usize,
    lister: Arc<L>,
    queue_rx: WorkQueueReceiver,
    queue_tx: WorkQueueSender,
    stop: Receiver<()>,
    stats: Arc<WorkerStats>,
) -> Vec<FolderRecord> {
    debug!(worker = id, "Worker starting");
    let mut records = Vec::new();

    while let Some(task) = queue_rx.recv_or_stop(&stop) {
        let tracker = queue_rx.tracker();
        if tracker.is_cancelled() {
            trace!(worker = id, path = %task.path, "Cancelled, task left unscanned");
            queue_tx.requeue(task);
            break;
        }

        // Held until the record and every subtask enqueue are done
        let _guard = TaskGuard::new(tracker);

        let (record, outcome) = scan_folder(&task, lister.as_ref(), &queue_tx, &stats);
        records.push(record);

        match &outcome {
            ScanOutcome::Success {
                files, subfolders, ..
            } => {
                trace!(
                    worker = id,
                    path = %task.path,
                    depth = task.depth,
                    files = files,
                    subfolders = subfolders,
                    "Folder scanned"
                );
            }
            ScanOutcome::Skipped { path, error } => {
                warn!(worker = id, path = %path, error = %error, "Folder unreadable, treated as empty");
            }
        }
    }

    debug!(
        worker = id,
        dirs = stats.dirs_processed.load(Ordering::Relaxed),
        files = stats.files_found.load(Ordering::Relaxed),
        "Worker shutting down"
    );

    records
}

/// Scan a single folder: list it, record files, enqueue subfolders
///
/// A listing failure yields an empty record; a failure on one entry drops
/// only that entry. Neither stops the scan.
pub fn scan_folder<L: DirLister + ?Sized>(
    task: &DirTask,
    lister: &L,
    queue_tx: &WorkQueueSender,
    stats: &WorkerStats,
) -> (FolderRecord, ScanOutcome) {
    let mut record = FolderRecord::new(task.id);

    let entries = match lister.read_dir(&task.path) {
        Ok(entries) => entries,
        Err(error) => {
            stats.record_error();
            let outcome = ScanOutcome::Skipped {
                path: task.path.clone(),
                error,
            };
            return (record, outcome);
        }
    };

    stats.record_dir();
    let mut entry_errors = 0;

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                entry_errors += 1;
                stats.record_error();
                warn!(path = %e.path(), error = %e, "Entry skipped");
                continue;
            }
        };

        if entry.is_special() {
            continue;
        }

        let path = join_path(&task.path, &entry.name);
        match entry.kind {
            EntryKind::Directory => {
                let task_id = queue_tx.enqueue(path.clone(), task.depth + 1);
                record.subfolders.push(ChildFolder {
                    task_id,
                    data: FsData::new(entry.name, path, 0),
                });
            }
            EntryKind::File => {
                record.files_size += entry.size;
                record.files.push(FsData::new(entry.name, path, entry.size));
            }
        }
    }

    stats.record_files(record.files.len() as u64);
    stats.record_bytes(u64::try_from(record.files_size).unwrap_or(0));

    let outcome = ScanOutcome::Success {
        path: task.path.clone(),
        files: record.files.len(),
        subfolders: record.subfolders.len(),
        entry_errors,
    };
    (record, outcome)
}

/// Aggregate statistics from multiple workers
pub fn aggregate_stats(workers: &[Worker]) -> (u64, u64, u64, u64) {
    let mut dirs = 0u64;
    let mut files = 0u64;
    let mut bytes = 0u64;
    let mut errors = 0u64;

    for worker in workers {
        dirs += worker.stats.dirs_processed.load(Ordering::Relaxed);
        files += worker.stats.files_found.load(Ordering::Relaxed);
        bytes += worker.stats.bytes_found.load(Ordering::Relaxed);
        errors += worker.stats.errors.load(Ordering::Relaxed);
    }

    (dirs, files, bytes, errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ScanError, ScanResult};
    use crate::listing::ListedEntry;
    use crate::walker::queue::WorkQueue;
    use crate::walker::tracker::TaskTracker;

    struct FixedLister(ScanResult<Vec<ScanResult<ListedEntry>>>);

    impl DirLister for FixedLister {
        fn read_dir(&self, _path: &str) -> ScanResult<Vec<ScanResult<ListedEntry>>> {
            self.0.clone()
        }
    }

    fn queue() -> (WorkQueue, Arc<TaskTracker>) {
        let tracker = Arc::new(TaskTracker::new());
        (WorkQueue::new(8, Arc::clone(&tracker)), tracker)
    }

    #[test]
    fn test_worker_stats() {
        let stats = WorkerStats::default();

        stats.record_dir();
        stats.record_files(10);
        stats.record_bytes(1024);
        stats.record_error();

        assert_eq!(stats.dirs_processed.load(Ordering::Relaxed), 1);
        assert_eq!(stats.files_found.load(Ordering::Relaxed), 10);
        assert_eq!(stats.bytes_found.load(Ordering::Relaxed), 1024);
        assert_eq!(stats.errors.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_scan_folder_records_files_and_fans_out() {
        let (queue, tracker) = queue();
        let lister = FixedLister(Ok(vec![
            Ok(ListedEntry::file("a", 10)),
            Ok(ListedEntry::dir("sub")),
            Ok(ListedEntry::file("b", 20)),
            Ok(ListedEntry::dir(".")),
        ]));
        let stats = WorkerStats::default();
        let task = DirTask::new(7, "/r".into(), 2);

        let (record, outcome) = scan_folder(&task, &lister, &queue.sender(), &stats);

        assert!(outcome.is_success());
        assert_eq!(record.task_id, 7);
        assert_eq!(record.files_size, 30);
        assert_eq!(record.files.len(), 2);
        assert_eq!(record.files[1].path, "/r/b");
        assert_eq!(record.subfolders.len(), 1);
        assert_eq!(record.subfolders[0].data.path, "/r/sub");

        // The subfolder became a queued task at depth + 1
        assert_eq!(tracker.queued(), 1);
        let (stop_tx, stop_rx) = crossbeam_channel::bounded::<()>(0);
        let dispatcher = queue.spawn_dispatcher(stop_rx.clone()).unwrap();
        let sub = queue.receiver().recv_or_stop(&stop_rx).unwrap();
        assert_eq!(sub.id, record.subfolders[0].task_id);
        assert_eq!(sub.depth, 3);
        drop(stop_tx);
        dispatcher.join().unwrap();
    }

    #[test]
    fn test_scan_folder_unreadable_is_empty() {
        let (queue, tracker) = queue();
        let lister = FixedLister(Err(ScanError::PermissionDenied {
            path: "/locked".into(),
        }));
        let stats = WorkerStats::default();
        let task = DirTask::new(3, "/locked".into(), 1);

        let (record, outcome) = scan_folder(&task, &lister, &queue.sender(), &stats);

        assert!(!outcome.is_success());
        assert!(record.files.is_empty());
        assert!(record.subfolders.is_empty());
        assert_eq!(tracker.queued(), 0);
        assert_eq!(stats.errors.load(Ordering::Relaxed), 1);
        assert_eq!(stats.dirs_processed.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_scan_folder_skips_bad_entries() {
        let (queue, _tracker) = queue();
        let lister = FixedLister(Ok(vec![
            Ok(ListedEntry::file("ok", 5)),
            Err(ScanError::StatFailed {
                path: "/r/bad".into(),
                reason: "io".into(),
            }),
        ]));
        let stats = WorkerStats::default();
        let task = DirTask::root("/r".into());

        let (record, outcome) = scan_folder(&task, &lister, &queue.sender(), &stats);

        match outcome {
            ScanOutcome::Success { entry_errors, .. } => assert_eq!(entry_errors, 1),
            other => panic!("unexpected outcome {:?}", other),
        }
        assert_eq!(record.files_size, 5);
        assert_eq!(stats.errors.load(Ordering::Relaxed), 1);
    }
}
