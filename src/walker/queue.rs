//! Work queue for folder tasks
//!
//! Workers are also producers: every subfolder they find becomes a new task.
//! If they pushed straight into a bounded channel, a pool in which every
//! worker is blocked pushing into a full channel would have nobody left to
//! drain it. So tasks go into an unbounded buffer first, and a single
//! dispatcher thread moves them into the bounded channel the workers read:
//!
//! ```text
//!  Worker ──enqueue (never blocks)──► buffer (unbounded)
//!                                        │
//!                                 dispatcher thread
//!                                        │  blocks only itself when full
//!                                        ▼
//!                              dispatch channel (bounded) ──► Workers
//! ```
//!
//! Stopping is a broadcast: the coordinator drops the sender of a zero-sized
//! stop channel, which every blocked `select!` observes at once.

use crate::error::WorkerError;
use crate::walker::tracker::TaskTracker;
use crossbeam_channel::{bounded, select, unbounded, Receiver, Select, Sender};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, trace};

/// Identifier of a folder task, unique within one scan
pub type TaskId = u64;

/// Task id of the scan root
pub const ROOT_TASK: TaskId = 0;

/// A task to scan one folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirTask {
    /// Unique id, links the scan result back to the folder that found it
    pub id: TaskId,

    /// Full path to the folder
    pub path: String,

    /// Depth from root (0 = root)
    pub depth: u32,
}

impl DirTask {
    /// Create a new folder task
    pub fn new(id: TaskId, path: String, depth: u32) -> Self {
        Self { id, path, depth }
    }

    /// Create the root task
    pub fn root(path: String) -> Self {
        Self {
            id: ROOT_TASK,
            path,
            depth: 0,
        }
    }
}

/// Statistics for the work queue
#[derive(Debug, Default)]
pub struct QueueStats {
    /// Total tasks enqueued
    pub enqueued: AtomicU64,

    /// Total tasks moved into the dispatch channel
    pub dispatched: AtomicU64,

    /// Total tasks taken by workers
    pub dequeued: AtomicU64,
}

impl QueueStats {
    /// Get queue throughput (dequeued tasks)
    pub fn throughput(&self) -> u64 {
        self.dequeued.load(Ordering::Relaxed)
    }
}

/// Unbounded task buffer feeding a bounded dispatch channel
pub struct WorkQueue {
    buffer_tx: Sender<DirTask>,
    buffer_rx: Receiver<DirTask>,

    dispatch_tx: Sender<DirTask>,
    dispatch_rx: Receiver<DirTask>,

    /// Next task id to hand out
    next_id: Arc<AtomicU64>,

    tracker: Arc<TaskTracker>,
    stats: Arc<QueueStats>,
}

impl WorkQueue {
    /// Create a new work queue whose dispatch channel holds `capacity` tasks
    pub fn new(capacity: usize, tracker: Arc<TaskTracker>) -> Self {
        let (buffer_tx, buffer_rx) = unbounded();
        let (dispatch_tx, dispatch_rx) = bounded(capacity);

        Self {
            buffer_tx,
            buffer_rx,
            dispatch_tx,
            dispatch_rx,
            next_id: Arc::new(AtomicU64::new(ROOT_TASK + 1)),
            tracker,
            stats: Arc::new(QueueStats::default()),
        }
    }

    /// Get a sender for this queue (clone for each worker)
    pub fn sender(&self) -> WorkQueueSender {
        WorkQueueSender {
            sender: self.buffer_tx.clone(),
            next_id: Arc::clone(&self.next_id),
            tracker: Arc::clone(&self.tracker),
            stats: Arc::clone(&self.stats),
        }
    }

    /// Get a receiver for this queue (clone for each worker)
    pub fn receiver(&self) -> WorkQueueReceiver {
        WorkQueueReceiver {
            receiver: self.dispatch_rx.clone(),
            tracker: Arc::clone(&self.tracker),
            stats: Arc::clone(&self.stats),
        }
    }

    /// Get queue statistics
    pub fn stats(&self) -> Arc<QueueStats> {
        Arc::clone(&self.stats)
    }

    /// Tasks waiting in the buffer
    pub fn buffered(&self) -> usize {
        self.buffer_rx.len()
    }

    /// Tasks waiting in the dispatch channel
    pub fn dispatch_len(&self) -> usize {
        self.dispatch_rx.len()
    }

    /// Seed the queue with the root folder
    pub fn seed(&self, root_path: String) -> DirTask {
        let task = DirTask::root(root_path);
        self.sender().push(task.clone());
        task
    }

    /// Start the dispatcher thread; it runs until `stop` is disconnected
    pub fn spawn_dispatcher(&self, stop: Receiver<()>) -> Result<Dispatcher, WorkerError> {
        let buffer_rx = self.buffer_rx.clone();
        let buffer_tx = self.buffer_tx.clone();
        let dispatch_tx = self.dispatch_tx.clone();
        let stats = Arc::clone(&self.stats);

        let name = "folder-scan-dispatch".to_string();
        let handle = thread::Builder::new()
            .name(name.clone())
            .spawn(move || dispatch_loop(buffer_rx, buffer_tx, dispatch_tx, stop, stats))
            .map_err(|e| WorkerError::SpawnFailed {
                name,
                reason: e.to_string(),
            })?;

        Ok(Dispatcher {
            handle: Some(handle),
        })
    }
}

/// Handle for sending tasks to the queue
#[derive(Clone)]
pub struct WorkQueueSender {
    sender: Sender<DirTask>,
    next_id: Arc<AtomicU64>,
    tracker: Arc<TaskTracker>,
    stats: Arc<QueueStats>,
}

impl WorkQueueSender {
    /// Allocate an id and enqueue a task for the folder at `path`
    ///
    /// Never blocks. The task is counted as queued before it becomes visible
    /// to the dispatcher.
    pub fn enqueue(&self, path: String, depth: u32) -> TaskId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.push(DirTask::new(id, path, depth));
        id
    }

    fn push(&self, task: DirTask) {
        self.tracker.submitted();
        self.stats.enqueued.fetch_add(1, Ordering::Relaxed);
        // The queue keeps a receiver alive for its whole lifetime, so an
        // unbounded send cannot fail while a sender exists.
        let _ = self.sender.send(task);
    }

    /// Put back a task that was received but never started
    ///
    /// The task is still counted as queued, so the tracker is not touched.
    pub fn requeue(&self, task: DirTask) {
        let _ = self.sender.send(task);
    }
}

/// Handle for receiving tasks from the dispatch channel
#[derive(Clone)]
pub struct WorkQueueReceiver {
    receiver: Receiver<DirTask>,
    tracker: Arc<TaskTracker>,
    stats: Arc<QueueStats>,
}

impl WorkQueueReceiver {
    /// Wait for the next task, or `None` once `stop` is disconnected
    pub fn recv_or_stop(&self, stop: &Receiver<()>) -> Option<DirTask> {
        let task = select! {
            recv(stop) -> _ => return None,
            recv(self.receiver) -> msg => msg.ok()?,
        };
        self.stats.dequeued.fetch_add(1, Ordering::Relaxed);
        Some(task)
    }

    /// The tracker shared with the senders
    pub fn tracker(&self) -> &TaskTracker {
        &self.tracker
    }
}

/// The running dispatcher thread
pub struct Dispatcher {
    handle: Option<JoinHandle<u64>>,
}

impl Dispatcher {
    /// Wait for the dispatcher to exit; returns the number of tasks it forwarded
    pub fn join(mut self) -> Result<u64, WorkerError> {
        match self.handle.take() {
            Some(handle) => handle.join().map_err(|_| WorkerError::DispatcherPanicked),
            None => Ok(0),
        }
    }
}

/// Move tasks from the buffer into the dispatch channel until stopped
fn dispatch_loop(
    buffer_rx: Receiver<DirTask>,
    buffer_tx: Sender<DirTask>,
    dispatch_tx: Sender<DirTask>,
    stop: Receiver<()>,
    stats: Arc<QueueStats>,
) -> u64 {
    debug!("Dispatcher starting");
    let mut forwarded = 0u64;

    loop {
        let task = select! {
            recv(stop) -> _ => break,
            recv(buffer_rx) -> msg => match msg {
                Ok(task) => task,
                Err(_) => break,
            },
        };

        // Block on the full channel, but stay responsive to stop
        let mut sel = Select::new();
        let send_op = sel.send(&dispatch_tx);
        sel.recv(&stop);
        let oper = sel.select();

        if oper.index() == send_op {
            if oper.send(&dispatch_tx, task).is_err() {
                break;
            }
            forwarded += 1;
            stats.dispatched.fetch_add(1, Ordering::Relaxed);
        } else {
            let _ = oper.recv(&stop);
            trace!(path = %task.path, "Dispatcher stopped holding a task, returned to buffer");
            let _ = buffer_tx.send(task);
            break;
        }
    }

    debug!(forwarded = forwarded, "Dispatcher shutting down");
    forwarded
}
