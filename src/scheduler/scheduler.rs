//! # Scheduler contract and timer handles.
//!
//! A [`Scheduler`] runs a callback once a delay has elapsed on its clock and
//! hands back a [`TimerHandle`] that can prevent the callback from running.
//! Whether the clock is wall time or virtual time is opaque to callers.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::SchedulerError;

/// Callback fired by a scheduler when a timer is due.
pub type Callback = Box<dyn FnOnce() + Send + 'static>;

/// Shared handle to a scheduler.
pub type SchedulerRef = Arc<dyn Scheduler>;

/// Abstract time source.
///
/// # Contract
/// - `callback` runs at most once, no earlier than `delay` after the call
///   on the scheduler's clock.
/// - After [`TimerHandle::cancel`] returns, a callback that has not started
///   yet never runs.
/// - Timers that become due at the same instant fire in scheduling order.
pub trait Scheduler: Send + Sync + 'static {
    /// Arms a timer that runs `callback` after `delay`.
    fn schedule_after(&self, delay: Duration, callback: Callback)
    -> Result<TimerHandle, SchedulerError>;
}

/// Cancellation handle for a pending timer.
///
/// The timer is cancelled by [`cancel`](Self::cancel) or when the handle is
/// dropped. Cancelling a timer that already fired is a no-op.
#[derive(Debug)]
pub struct TimerHandle {
    token: CancellationToken,
}

impl TimerHandle {
    /// Wraps the token a scheduler watches for this timer.
    pub fn new(token: CancellationToken) -> Self {
        Self { token }
    }

    /// Prevents the callback from running if it has not fired yet. Idempotent.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Returns `true` once the timer has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
