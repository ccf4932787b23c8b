//! # Deterministic virtual-time scheduler.
//!
//! [`VirtualScheduler`] keeps its own clock, starting at zero, that only moves
//! when told to. Timers are ordered by due instant, then by scheduling order:
//!
//! ```text
//! advance_to(target):
//!   while earliest live timer is due <= target:
//!     now = timer.due
//!     run timer callback        (may schedule more timers inside the window)
//!   now = target
//! ```
//!
//! Callbacks run on the caller's thread with the internal lock released, so
//! they may call back into the scheduler.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicU32, Ordering};
//! use std::time::Duration;
//! use backoff_repeat::{Scheduler, VirtualScheduler};
//!
//! let scheduler = VirtualScheduler::new();
//! let fired = Arc::new(AtomicU32::new(0));
//! let counter = Arc::clone(&fired);
//! let _timer = scheduler
//!     .schedule_after(Duration::from_secs(2), Box::new(move || {
//!         counter.fetch_add(1, Ordering::SeqCst);
//!     }))
//!     .unwrap();
//!
//! scheduler.advance_by(Duration::from_millis(1999));
//! assert_eq!(fired.load(Ordering::SeqCst), 0);
//! scheduler.advance_by(Duration::from_millis(1));
//! assert_eq!(fired.load(Ordering::SeqCst), 1);
//! assert_eq!(scheduler.now(), Duration::from_secs(2));
//! ```

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::SchedulerError;
use crate::scheduler::scheduler::{Callback, Scheduler, TimerHandle};

/// One armed timer.
struct Entry {
    due: Duration,
    id: u64,
    token: CancellationToken,
    callback: Callback,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.id == other.id
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.due, self.id).cmp(&(other.due, other.id))
    }
}

#[derive(Default)]
struct Inner {
    now: Duration,
    next_id: u64,
    queue: BinaryHeap<Reverse<Entry>>,
}

impl Inner {
    /// Drops cancelled entries sitting at the head of the queue.
    fn prune(&mut self) {
        while let Some(Reverse(head)) = self.queue.peek() {
            if !head.token.is_cancelled() {
                break;
            }
            self.queue.pop();
        }
    }
}

/// Scheduler with a manually advanced clock.
///
/// Cheap to clone; clones share the clock and the timer queue.
#[derive(Clone, Default)]
pub struct VirtualScheduler {
    inner: Arc<Mutex<Inner>>,
}

impl VirtualScheduler {
    /// Creates a scheduler whose clock reads zero.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current virtual time, measured from creation.
    pub fn now(&self) -> Duration {
        self.lock().now
    }

    /// Number of timers that are armed and not cancelled.
    pub fn pending(&self) -> usize {
        self.lock()
            .queue
            .iter()
            .filter(|Reverse(e)| !e.token.is_cancelled())
            .count()
    }

    /// Due instant of the earliest live timer.
    pub fn next_due(&self) -> Option<Duration> {
        let mut inner = self.lock();
        inner.prune();
        inner.queue.peek().map(|Reverse(e)| e.due)
    }

    /// Fires the earliest live timer if it is due at or before `until`.
    ///
    /// Moves the clock to the timer's due instant (never backwards) and runs
    /// its callback. Returns `false` when nothing is due.
    pub fn run_next(&self, until: Duration) -> bool {
        let entry = {
            let mut inner = self.lock();
            inner.prune();
            match inner.queue.peek() {
                Some(Reverse(head)) if head.due <= until => {}
                _ => return false,
            }
            let Some(Reverse(entry)) = inner.queue.pop() else {
                return false;
            };
            inner.now = inner.now.max(entry.due);
            entry
        };

        if !entry.token.is_cancelled() {
            (entry.callback)();
        }
        true
    }

    /// Fires every timer due at or before `target`, then sets the clock to
    /// `target`. A target in the past leaves the clock unchanged.
    pub fn advance_to(&self, target: Duration) {
        while self.run_next(target) {}
        let mut inner = self.lock();
        inner.now = inner.now.max(target);
    }

    /// Advances the clock by `by`, firing every timer due in the window.
    pub fn advance_by(&self, by: Duration) {
        let target = self.now().saturating_add(by);
        self.advance_to(target);
    }

    /// Fires timers until none is left.
    ///
    /// Never returns if callbacks keep re-arming timers forever.
    pub fn advance_until_empty(&self) {
        while let Some(due) = self.next_due() {
            self.run_next(due);
        }
    }
}

impl Scheduler for VirtualScheduler {
    fn schedule_after(
        &self,
        delay: Duration,
        callback: Callback,
    ) -> Result<TimerHandle, SchedulerError> {
        let mut inner = self.lock();
        let due = inner
            .now
            .checked_add(delay)
            .ok_or(SchedulerError::ClockOverflow {
                delay_ms: u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            })?;
        let id = inner.next_id;
        inner.next_id += 1;

        let token = CancellationToken::new();
        inner.queue.push(Reverse(Entry {
            due,
            id,
            token: token.clone(),
            callback,
        }));
        Ok(TimerHandle::new(token))
    }
}

impl std::fmt::Debug for VirtualScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        f.debug_struct("VirtualScheduler")
            .field("now", &inner.now)
            .field("queued", &inner.queue.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    fn recorder() -> (Arc<StdMutex<Vec<&'static str>>>, impl Fn(&'static str) -> Callback) {
        let log = Arc::new(StdMutex::new(Vec::new()));
        let log_for_cb = Arc::clone(&log);
        let make = move |label: &'static str| -> Callback {
            let log = Arc::clone(&log_for_cb);
            Box::new(move || log.lock().unwrap().push(label))
        };
        (log, make)
    }

    #[test]
    fn test_fires_in_due_then_fifo_order() {
        let scheduler = VirtualScheduler::new();
        let (log, cb) = recorder();

        let _c = scheduler.schedule_after(Duration::from_secs(3), cb("c")).unwrap();
        let _a = scheduler.schedule_after(Duration::from_secs(1), cb("a1")).unwrap();
        let _b = scheduler.schedule_after(Duration::from_secs(1), cb("a2")).unwrap();

        scheduler.advance_until_empty();
        assert_eq!(*log.lock().unwrap(), vec!["a1", "a2", "c"]);
        assert_eq!(scheduler.now(), Duration::from_secs(3));
    }

    #[test]
    fn test_boundary_is_inclusive() {
        let scheduler = VirtualScheduler::new();
        let (log, cb) = recorder();
        let _t = scheduler.schedule_after(Duration::from_secs(1), cb("t")).unwrap();

        scheduler.advance_by(Duration::from_millis(999));
        assert!(log.lock().unwrap().is_empty());
        assert_eq!(scheduler.pending(), 1);

        scheduler.advance_by(Duration::from_millis(1));
        assert_eq!(*log.lock().unwrap(), vec!["t"]);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_cancelled_timer_never_fires() {
        let scheduler = VirtualScheduler::new();
        let (log, cb) = recorder();
        let handle = scheduler.schedule_after(Duration::from_secs(1), cb("t")).unwrap();
        handle.cancel();

        assert_eq!(scheduler.pending(), 0);
        scheduler.advance_by(Duration::from_secs(10));
        assert!(log.lock().unwrap().is_empty());
        assert_eq!(scheduler.next_due(), None);
    }

    #[test]
    fn test_dropped_handle_cancels() {
        let scheduler = VirtualScheduler::new();
        let (log, cb) = recorder();
        drop(scheduler.schedule_after(Duration::ZERO, cb("t")).unwrap());

        scheduler.advance_by(Duration::ZERO);
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_nested_scheduling_inside_window() {
        let scheduler = VirtualScheduler::new();
        let count = Arc::new(AtomicCount::default());

        fn arm(s: VirtualScheduler, count: Arc<AtomicCount>) {
            let s2 = s.clone();
            let handle = s
                .schedule_after(
                    Duration::from_secs(10),
                    Box::new(move || {
                        count.bump();
                        arm(s2, count);
                    }),
                )
                .unwrap();
            std::mem::forget(handle);
        }
        arm(scheduler.clone(), Arc::clone(&count));

        scheduler.advance_by(Duration::from_secs(35));
        assert_eq!(count.get(), 3);
        assert_eq!(scheduler.now(), Duration::from_secs(35));
        assert_eq!(scheduler.next_due(), Some(Duration::from_secs(40)));
    }

    #[test]
    fn test_advance_to_past_keeps_clock() {
        let scheduler = VirtualScheduler::new();
        scheduler.advance_by(Duration::from_secs(5));
        scheduler.advance_to(Duration::from_secs(1));
        assert_eq!(scheduler.now(), Duration::from_secs(5));
    }

    #[derive(Default)]
    struct AtomicCount(std::sync::atomic::AtomicU32);

    impl AtomicCount {
        fn bump(&self) {
            self.0.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        }
        fn get(&self) -> u32 {
            self.0.load(std::sync::atomic::Ordering::SeqCst)
        }
    }
}
