//! Scan coordinator - orchestrates the parallel folder scan
//!
//! The coordinator is responsible for:
//! - Setting up the work queue, dispatcher and workers
//! - Waiting for quiescence (or cancellation)
//! - Broadcasting stop and joining every thread
//! - Assembling worker records into a snapshot and aggregating sizes

use crate::config::ScanConfig;
use crate::error::Result;
use crate::listing::{root_name, DirLister, LocalLister};
use crate::snapshot::{FolderId, Snapshot};
use crate::walker::queue::{TaskId, WorkQueue, ROOT_TASK};
use crate::walker::tracker::{CancelHandle, TaskTracker, WaitStatus};
use crate::walker::worker::{aggregate_stats, FolderRecord, Worker};
use crossbeam_channel::{bounded, Receiver, Sender};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// How often the waiting coordinator wakes up to report progress
const PROGRESS_INTERVAL: Duration = Duration::from_millis(100);

/// Counters for a finished scan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Folders listed
    pub dirs: u64,

    /// Files found
    pub files: u64,

    /// Total bytes (sum of file sizes)
    pub bytes: u64,

    /// Folders or entries that could not be read
    pub errors: u64,

    /// Folders discovered but never scanned (cancelled scans only)
    pub unscanned: u64,
}

/// Result of a completed scan
#[derive(Debug)]
pub struct ScanReport {
    /// The aggregated snapshot
    pub snapshot: Snapshot,

    /// Scan counters
    pub stats: ScanStats,

    /// Time taken for the scan
    pub duration: Duration,

    /// Whether the scan reached quiescence (vs was cancelled)
    pub completed: bool,
}

/// Progress information for display
#[derive(Debug, Clone)]
pub struct ScanProgress {
    /// Folders processed
    pub dirs: u64,

    /// Files found
    pub files: u64,

    /// Bytes found
    pub bytes: u64,

    /// Tasks waiting for a worker
    pub queued: usize,

    /// Workers currently scanning
    pub active_workers: usize,

    /// Total workers
    pub total_workers: usize,

    /// Errors encountered
    pub errors: u64,

    /// Elapsed time
    pub elapsed: Duration,
}

impl ScanProgress {
    /// Calculate files per second rate
    pub fn files_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.files as f64 / secs
        } else {
            0.0
        }
    }

    /// Calculate dirs per second rate
    pub fn dirs_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.dirs as f64 / secs
        } else {
            0.0
        }
    }
}

/// Coordinates the parallel folder scan
pub struct ScanCoordinator<L: DirLister + 'static = LocalLister> {
    /// Configuration
    config: Arc<ScanConfig>,

    /// Directory listing backend, shared by all workers
    lister: Arc<L>,

    /// Queued / in-flight task accounting
    tracker: Arc<TaskTracker>,

    /// Work queue for folder tasks
    queue: WorkQueue,

    /// Worker threads
    workers: Vec<Worker>,

    /// Dropped to broadcast stop
    stop_tx: Option<Sender<()>>,
    stop_rx: Receiver<()>,
}

impl ScanCoordinator<LocalLister> {
    /// Create a coordinator scanning the local filesystem
    pub fn new(config: ScanConfig) -> Result<Self> {
        Self::with_lister(config, LocalLister::new())
    }
}

impl<L: DirLister + 'static> ScanCoordinator<L> {
    /// Create a coordinator using a custom directory lister
    pub fn with_lister(config: ScanConfig, lister: L) -> Result<Self> {
        config.validate()?;
        let config = Arc::new(config);

        let tracker = Arc::new(TaskTracker::new());
        let queue = WorkQueue::new(config.channel_capacity, Arc::clone(&tracker));
        let (stop_tx, stop_rx) = bounded(0);

        Ok(Self {
            config,
            lister: Arc::new(lister),
            tracker,
            queue,
            workers: Vec::new(),
            stop_tx: Some(stop_tx),
            stop_rx,
        })
    }

    /// Get a handle that cancels this scan (for signal handlers)
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle::new(Arc::clone(&self.tracker))
    }

    /// Run the scan to completion
    pub fn run(self) -> Result<ScanReport> {
        self.run_with_progress(|_| {})
    }

    /// Run the scan, calling `on_progress` periodically while it is in flight
    pub fn run_with_progress<F>(mut self, mut on_progress: F) -> Result<ScanReport>
    where
        F: FnMut(&ScanProgress),
    {
        let start = Instant::now();
        let root_path = self.config.root_path();

        info!(
            root = %root_path,
            workers = self.config.worker_count,
            "Starting folder scan"
        );

        // Seed before anything can observe an idle tracker
        self.queue.seed(root_path.clone());

        let dispatcher = self.queue.spawn_dispatcher(self.stop_rx.clone())?;
        self.spawn_workers()?;

        let completed = self.wait_for_completion(start, &mut on_progress);

        // Broadcast stop to the dispatcher and all workers
        self.stop_tx.take();

        let dispatched = dispatcher.join()?;
        let (dirs, files, bytes, errors) = aggregate_stats(&self.workers);
        let records = self.join_workers()?;
        let unscanned = self.tracker.queued() as u64;

        if !completed {
            warn!(unscanned = unscanned, "Scan cancelled, unscanned folders are left empty");
        }
        debug!(dispatched = dispatched, records = records.len(), "Assembling snapshot");

        let mut snapshot = assemble_snapshot(&root_path, records);
        snapshot.aggregate();

        let duration = start.elapsed();
        info!(
            dirs = dirs,
            files = files,
            bytes = snapshot.total_size(),
            errors = errors,
            duration_ms = duration.as_millis() as u64,
            "Scan completed"
        );

        Ok(ScanReport {
            snapshot,
            stats: ScanStats {
                dirs,
                files,
                bytes,
                errors,
                unscanned,
            },
            duration,
            completed,
        })
    }

    /// Spawn worker threads
    fn spawn_workers(&mut self) -> Result<()> {
        for id in 0..self.config.worker_count {
            let worker = Worker::spawn(
                id,
                Arc::clone(&self.lister),
                self.queue.receiver(),
                self.queue.sender(),
                self.stop_rx.clone(),
            )?;

            self.workers.push(worker);
        }

        debug!(count = self.workers.len(), "Workers spawned");
        Ok(())
    }

    /// Block until the scan is idle or cancelled
    ///
    /// Completion comes from the tracker's condition variable; the timeout
    /// only exists to refresh progress output.
    fn wait_for_completion<F>(&self, start: Instant, on_progress: &mut F) -> bool
    where
        F: FnMut(&ScanProgress),
    {
        loop {
            match self.tracker.wait_timeout(PROGRESS_INTERVAL) {
                WaitStatus::Idle => return true,
                WaitStatus::Cancelled => {
                    info!("Cancellation requested");
                    return false;
                }
                WaitStatus::Pending => on_progress(&self.progress(start.elapsed())),
            }
        }
    }

    /// Snapshot of the counters for display
    fn progress(&self, elapsed: Duration) -> ScanProgress {
        let (dirs, files, bytes, errors) = aggregate_stats(&self.workers);
        ScanProgress {
            dirs,
            files,
            bytes,
            queued: self.tracker.queued(),
            active_workers: self.tracker.in_flight(),
            total_workers: self.workers.len(),
            errors,
            elapsed,
        }
    }

    /// Join all worker threads and collect their folder records
    fn join_workers(&mut self) -> Result<Vec<FolderRecord>> {
        let mut records = Vec::new();
        for worker in std::mem::take(&mut self.workers) {
            records.extend(worker.join()?);
        }
        Ok(records)
    }
}

/// Build the snapshot arena from the records produced by the workers
///
/// Starts at the root record and follows each record's child folders. A
/// folder whose task never ran (cancelled scan) has no record and stays an
/// empty folder.
pub fn assemble_snapshot(root_path: &str, records: Vec<FolderRecord>) -> Snapshot {
    let mut by_task: HashMap<TaskId, FolderRecord> = records
        .into_iter()
        .map(|record| (record.task_id, record))
        .collect();

    let mut snapshot = Snapshot::new(root_name(root_path), root_path);
    let mut stack: Vec<(TaskId, FolderId)> = vec![(ROOT_TASK, snapshot.root_id())];

    while let Some((task_id, folder_id)) = stack.pop() {
        let Some(record) = by_task.remove(&task_id) else {
            continue;
        };

        for file in record.files {
            snapshot.add_file_at(folder_id, file.name, file.path, file.size);
        }
        for child in record.subfolders {
            let child_id = snapshot.add_folder_at(folder_id, child.data.name, child.data.path);
            stack.push((child.task_id, child_id));
        }
    }

    snapshot
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ScanError, ScanResult};
    use crate::listing::ListedEntry;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::OnceLock;

    /// In-memory tree: path -> listing
    struct MemoryLister {
        dirs: HashMap<String, Vec<ListedEntry>>,
        unreadable: Vec<String>,
    }

    impl MemoryLister {
        fn new() -> Self {
            Self {
                dirs: HashMap::new(),
                unreadable: Vec::new(),
            }
        }

        fn dir(mut self, path: &str, entries: Vec<ListedEntry>) -> Self {
            self.dirs.insert(path.to_string(), entries);
            self
        }
    }

    impl DirLister for MemoryLister {
        fn read_dir(&self, path: &str) -> ScanResult<Vec<ScanResult<ListedEntry>>> {
            if self.unreadable.iter().any(|p| p == path) {
                return Err(ScanError::PermissionDenied { path: path.into() });
            }
            Ok(self
                .dirs
                .get(path)
                .cloned()
                .unwrap_or_default()
                .into_iter()
                .map(Ok)
                .collect())
        }
    }

    fn sample_lister() -> MemoryLister {
        MemoryLister::new()
            .dir(
                "/r",
                vec![
                    ListedEntry::file("a", 10),
                    ListedEntry::dir("x"),
                    ListedEntry::dir("y"),
                ],
            )
            .dir("/r/x", vec![ListedEntry::file("b", 20), ListedEntry::dir("deep")])
            .dir("/r/x/deep", vec![ListedEntry::file("c", 30)])
            .dir("/r/y", vec![ListedEntry::file("d", 40)])
    }

    fn config(workers: usize) -> ScanConfig {
        ScanConfig::new("/r").with_workers(workers)
    }

    #[test]
    fn test_scan_memory_tree() {
        let report = ScanCoordinator::with_lister(config(4), sample_lister())
            .unwrap()
            .run()
            .unwrap();

        assert!(report.completed);
        let snap = &report.snapshot;
        assert_eq!(snap.root().name(), "r");
        assert_eq!(snap.total_size(), 100);
        assert_eq!(snap.folder_count(), 4);
        assert_eq!(snap.file_count(), 4);

        let x = snap.find("/r/x").unwrap();
        assert_eq!(snap.folder(x).size(), 50);
        assert_eq!(snap.folder(x).files_size, 20);
        assert_eq!(snap.folder(x).subfolders_size, 30);

        assert_eq!(report.stats.dirs, 4);
        assert_eq!(report.stats.files, 4);
        assert_eq!(report.stats.bytes, 100);
        assert_eq!(report.stats.unscanned, 0);
    }

    #[test]
    fn test_worker_count_does_not_change_result() {
        let single = ScanCoordinator::with_lister(config(1), sample_lister())
            .unwrap()
            .run()
            .unwrap();
        let many = ScanCoordinator::with_lister(config(16), sample_lister())
            .unwrap()
            .run()
            .unwrap();

        // Listing order is preserved per folder, so the trees match exactly
        assert_eq!(single.snapshot.to_stored(), many.snapshot.to_stored());
    }

    #[test]
    fn test_unreadable_folder_is_empty() {
        let mut lister = sample_lister();
        lister.unreadable.push("/r/x".into());

        let report = ScanCoordinator::with_lister(config(2), lister)
            .unwrap()
            .run()
            .unwrap();

        assert!(report.completed);
        let x = report.snapshot.find("/r/x").unwrap();
        assert_eq!(report.snapshot.folder(x).size(), 0);
        assert!(report.snapshot.folder(x).subfolders.is_empty());
        assert_eq!(report.snapshot.total_size(), 50);
        assert_eq!(report.stats.errors, 1);
    }

    #[test]
    fn test_unreadable_root_completes() {
        let mut lister = sample_lister();
        lister.unreadable.push("/r".into());

        let report = ScanCoordinator::with_lister(config(3), lister)
            .unwrap()
            .run()
            .unwrap();

        assert!(report.completed);
        assert_eq!(report.snapshot.folder_count(), 1);
        assert_eq!(report.snapshot.total_size(), 0);
    }

    /// Endless chain of folders; cancels the scan after `limit` listings
    struct EndlessLister {
        calls: AtomicUsize,
        limit: usize,
        cancel: OnceLock<CancelHandle>,
    }

    impl DirLister for EndlessLister {
        fn read_dir(&self, _path: &str) -> ScanResult<Vec<ScanResult<ListedEntry>>> {
            if self.calls.fetch_add(1, Ordering::SeqCst) + 1 == self.limit {
                if let Some(handle) = self.cancel.get() {
                    handle.cancel();
                }
            }
            Ok(vec![Ok(ListedEntry::dir("d")), Ok(ListedEntry::file("f", 1))])
        }
    }

    #[test]
    fn test_cancel_keeps_partial_tree() {
        let lister = Arc::new(EndlessLister {
            calls: AtomicUsize::new(0),
            limit: 50,
            cancel: OnceLock::new(),
        });
        let coordinator =
            ScanCoordinator::with_lister(config(2), Arc::clone(&lister)).unwrap();
        let _ = lister.cancel.set(coordinator.cancel_handle());

        let report = coordinator.run().unwrap();

        assert!(!report.completed);
        assert!(report.stats.unscanned >= 1);
        let snap = &report.snapshot;
        let scanned = lister.calls.load(Ordering::SeqCst) as i64;
        assert_eq!(snap.total_size(), scanned);
        for (_, folder) in snap.iter() {
            assert_eq!(folder.size(), folder.files_size + folder.subfolders_size);
        }
    }

    #[test]
    fn test_progress_callback_rates() {
        let progress = ScanProgress {
            dirs: 1000,
            files: 10000,
            bytes: 1024 * 1024 * 100,
            queued: 500,
            active_workers: 4,
            total_workers: 8,
            errors: 5,
            elapsed: Duration::from_secs(10),
        };

        assert!((progress.files_per_second() - 1000.0).abs() < 0.1);
        assert!((progress.dirs_per_second() - 100.0).abs() < 0.1);
    }

    #[test]
    fn test_assemble_without_child_record() {
        let root = FolderRecord {
            task_id: ROOT_TASK,
            subfolders: vec![crate::walker::worker::ChildFolder {
                task_id: 9,
                data: crate::snapshot::FsData::new("lost", "/r/lost", 0),
            }],
            files: vec![crate::snapshot::FsData::new("f", "/r/f", 3)],
            files_size: 3,
        };

        let mut snap = assemble_snapshot("/r", vec![root]);
        snap.aggregate();

        let lost = snap.find("/r/lost").unwrap();
        assert_eq!(snap.folder(lost).size(), 0);
        assert_eq!(snap.folder(lost).data.parent, Some(FolderId::ROOT));
        assert_eq!(snap.total_size(), 3);
    }
}
