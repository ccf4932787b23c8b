//! # Real-time scheduler on the tokio timer.
//!
//! Each timer is a spawned task that races `tokio::time::sleep(delay)`
//! against the timer's [`CancellationToken`]:
//!
//! ```text
//! schedule_after(delay, cb)
//!   └─► spawn:
//!         select! {
//!           token.cancelled() → exit (cb dropped)
//!           sleep(delay)      → cb()
//!         }
//! ```
//!
//! Under `tokio::time::pause()` the timer follows tokio's virtual clock.

use std::time::Duration;

use tokio::{runtime::Handle, select, time};
use tokio_util::sync::CancellationToken;

use crate::error::SchedulerError;
use crate::scheduler::scheduler::{Callback, Scheduler, TimerHandle};

/// Scheduler backed by the tokio timer.
///
/// Without an explicit runtime handle the runtime current at
/// `schedule_after` time is used; outside a runtime arming a timer fails
/// with [`SchedulerError::NoRuntime`].
#[derive(Clone, Debug, Default)]
pub struct TokioScheduler {
    handle: Option<Handle>,
}

impl TokioScheduler {
    /// Scheduler that uses the runtime current at scheduling time.
    pub fn new() -> Self {
        Self { handle: None }
    }

    /// Scheduler pinned to a specific runtime.
    pub fn with_handle(handle: Handle) -> Self {
        Self {
            handle: Some(handle),
        }
    }

    fn runtime(&self) -> Result<Handle, SchedulerError> {
        match &self.handle {
            Some(h) => Ok(h.clone()),
            None => Handle::try_current().map_err(|e| SchedulerError::NoRuntime {
                reason: e.to_string(),
            }),
        }
    }
}

impl Scheduler for TokioScheduler {
    fn schedule_after(
        &self,
        delay: Duration,
        callback: Callback,
    ) -> Result<TimerHandle, SchedulerError> {
        let runtime = self.runtime()?;
        let deadline = time::Instant::now()
            .checked_add(delay)
            .ok_or(SchedulerError::ClockOverflow {
                delay_ms: u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            })?;

        let token = CancellationToken::new();
        let timer_token = token.clone();
        runtime.spawn(async move {
            select! {
                biased;
                _ = timer_token.cancelled() => {}
                _ = time::sleep_until(deadline) => {
                    if !timer_token.is_cancelled() {
                        callback();
                    }
                }
            }
        });
        Ok(TimerHandle::new(token))
    }
}
