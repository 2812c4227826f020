//! Task accounting and quiescence detection
//!
//! The tracker counts every folder task from the moment it is enqueued until
//! the worker that took it has finished, including enqueuing whatever
//! subfolders it discovered. A scan is complete exactly when both counts are
//! zero at the same time:
//!
//! ```text
//!  enqueue ──► queued ──begin()──► in_flight ──finish()──► done
//!                ▲                     │
//!                └──── subfolders ─────┘  (submitted before finish)
//! ```
//!
//! Because a worker submits its subtasks before calling `finish()`, the pair
//! can never read `(0, 0)` while more work is about to appear. Waiters are
//! woken through a condition variable, not by sampling.

use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
struct TrackerState {
    /// Tasks submitted but not yet taken by a worker
    queued: usize,

    /// Tasks a worker is currently scanning
    in_flight: usize,

    /// External cancellation requested
    cancelled: bool,
}

impl TrackerState {
    fn is_idle(&self) -> bool {
        self.queued == 0 && self.in_flight == 0
    }

    fn settled(&self) -> Option<WaitStatus> {
        if self.is_idle() {
            Some(WaitStatus::Idle)
        } else if self.cancelled {
            Some(WaitStatus::Cancelled)
        } else {
            None
        }
    }
}

/// Result of waiting on a [`TaskTracker`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitStatus {
    /// No task queued and none in flight
    Idle,
    /// Cancellation requested before the scan went idle
    Cancelled,
    /// Timed out with work still outstanding
    Pending,
}

/// Counts queued and in-flight folder tasks
#[derive(Debug, Default)]
pub struct TaskTracker {
    state: Mutex<TrackerState>,
    settled: Condvar,
}

impl TaskTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// A task was put on the queue
    pub fn submitted(&self) {
        self.state.lock().queued += 1;
    }

    /// A worker took a task off the queue
    pub fn begin(&self) {
        let mut state = self.state.lock();
        debug_assert!(state.queued > 0, "begin() without a queued task");
        state.queued = state.queued.saturating_sub(1);
        state.in_flight += 1;
    }

    /// A worker finished a task and all of its enqueues
    pub fn finish(&self) {
        let mut state = self.state.lock();
        debug_assert!(state.in_flight > 0, "finish() without a task in flight");
        state.in_flight = state.in_flight.saturating_sub(1);
        if state.is_idle() {
            self.settled.notify_all();
        }
    }

    /// Request cancellation and wake every waiter
    pub fn cancel(&self) {
        self.state.lock().cancelled = true;
        self.settled.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.lock().cancelled
    }

    pub fn is_idle(&self) -> bool {
        self.state.lock().is_idle()
    }

    /// Tasks waiting in the buffer or dispatch channel
    pub fn queued(&self) -> usize {
        self.state.lock().queued
    }

    /// Workers currently scanning a folder
    pub fn in_flight(&self) -> usize {
        self.state.lock().in_flight
    }

    /// Block until the scan is idle or cancelled
    pub fn wait(&self) -> WaitStatus {
        let mut state = self.state.lock();
        loop {
            if let Some(status) = state.settled() {
                return status;
            }
            self.settled.wait(&mut state);
        }
    }

    /// Like [`wait`](Self::wait), but gives up after `timeout`
    pub fn wait_timeout(&self, timeout: Duration) -> WaitStatus {
        let deadline = Instant::now() + timeout;
        let mut state = self.state.lock();
        loop {
            if let Some(status) = state.settled() {
                return status;
            }
            if self.settled.wait_until(&mut state, deadline).timed_out() {
                return state.settled().unwrap_or(WaitStatus::Pending);
            }
        }
    }
}

/// RAII guard for a task in flight
///
/// Created right after a task is received; calls `finish()` on drop, so the
/// count is released even if scanning unwinds.
pub struct TaskGuard<'a> {
    tracker: &'a TaskTracker,
}

impl<'a> TaskGuard<'a> {
    pub fn new(tracker: &'a TaskTracker) -> Self {
        tracker.begin();
        Self { tracker }
    }
}

impl<'a> Drop for TaskGuard<'a> {
    fn drop(&mut self) {
        self.tracker.finish();
    }
}

/// Cloneable handle for cancelling a running scan (e.g. from a signal handler)
#[derive(Clone)]
pub struct CancelHandle {
    tracker: Arc<TaskTracker>,
}

impl CancelHandle {
    pub(crate) fn new(tracker: Arc<TaskTracker>) -> Self {
        Self { tracker }
    }

    /// Stop handing out new folders; folders being scanned run to completion
    pub fn cancel(&self) {
        self.tracker.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.tracker.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_idle_only_when_both_counts_zero() {
        let tracker = TaskTracker::new();
        assert!(tracker.is_idle());

        tracker.submitted();
        assert!(!tracker.is_idle());

        let guard = TaskGuard::new(&tracker);
        assert_eq!(tracker.queued(), 0);
        assert_eq!(tracker.in_flight(), 1);
        assert!(!tracker.is_idle());

        // Subtask submitted before the parent finishes
        tracker.submitted();
        drop(guard);
        assert!(!tracker.is_idle());

        let guard = TaskGuard::new(&tracker);
        drop(guard);
        assert!(tracker.is_idle());
    }

    #[test]
    fn test_wait_wakes_on_idle() {
        let tracker = Arc::new(TaskTracker::new());
        tracker.submitted();
        tracker.begin();

        let waiter = {
            let tracker = Arc::clone(&tracker);
            thread::spawn(move || tracker.wait())
        };

        thread::sleep(Duration::from_millis(20));
        tracker.finish();

        assert_eq!(waiter.join().unwrap(), WaitStatus::Idle);
    }

    #[test]
    fn test_wait_wakes_on_cancel() {
        let tracker = Arc::new(TaskTracker::new());
        tracker.submitted();
        let handle = CancelHandle::new(Arc::clone(&tracker));

        let waiter = {
            let tracker = Arc::clone(&tracker);
            thread::spawn(move || tracker.wait())
        };

        thread::sleep(Duration::from_millis(20));
        handle.cancel();

        assert_eq!(waiter.join().unwrap(), WaitStatus::Cancelled);
        assert!(handle.is_cancelled());
    }

    #[test]
    fn test_wait_timeout_pending() {
        let tracker = TaskTracker::new();
        tracker.submitted();
        assert_eq!(
            tracker.wait_timeout(Duration::from_millis(10)),
            WaitStatus::Pending
        );
    }

    #[test]
    fn test_idle_wins_over_cancel() {
        let tracker = TaskTracker::new();
        tracker.cancel();
        assert_eq!(tracker.wait(), WaitStatus::Idle);
    }
}
