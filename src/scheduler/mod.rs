//! Time sources.
//!
//! The repeater never sleeps: it asks a [`Scheduler`] to run a callback
//! after the backoff delay and keeps the returned [`TimerHandle`] until the
//! callback fires or the subscription ends.
//!
//! ## Contents
//! - [`Scheduler`], [`TimerHandle`] the contract (`schedule_after` + cancel)
//! - [`TokioScheduler`] wall-clock timers on the tokio runtime (default)
//! - [`VirtualScheduler`] manually advanced clock for deterministic tests

mod realtime;
#[allow(clippy::module_inception)]
mod scheduler;
mod virtual_time;

pub use realtime::TokioScheduler;
pub use scheduler::{Callback, Scheduler, SchedulerRef, TimerHandle};
pub use virtual_time::VirtualScheduler;
