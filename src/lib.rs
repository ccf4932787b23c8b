//! # backoff-repeat
//!
//! **backoff-repeat** re-subscribes to an asynchronous stream source each
//! time it completes, waiting an increasing delay in between, until a repeat
//! limit is reached or the subscription is cancelled.
//!
//! It is a single combinator with a pluggable time source, so the exact
//! timing of every attempt can be checked deterministically in tests.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐
//!     │    Source    │  fresh stream per open()
//!     └──────┬───────┘
//!            ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  BackoffRepeater (itself a Source)                                │
//! │  - RepeatBudget  (Bounded(n) / Unbounded)                         │
//! │  - DelayStrategy (BackoffPolicy, StrategyFn, SecondsFn)           │
//! │  - Scheduler     (TokioScheduler, VirtualScheduler)               │
//! │  - Bus, CancellationToken (optional)                              │
//! └──────┬──────────────────┬─────────────────────────────────────────┘
//!        ▼ open()           ▼ open()
//!     ┌──────────────────┐   ┌──────────────────┐
//!     │ RepeatWithBackoff│   │ RepeatWithBackoff│   independent counters
//!     └┬─────────────────┘   └┬─────────────────┘
//!      │ Publishes            │
//!      │ - AttemptStarting    │
//!      │ - BackoffScheduled   │
//!      │ - RepeatExhausted    │
//!      ▼                      ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                        Bus (broadcast channel)                    │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   ▼
//!                         SubscriberSet::listen()
//!                                  ┌─────────┼─────────┐
//!                                  ▼         ▼         ▼
//!                             sub1.on   sub2.on   subN.on
//!                              _event()  _event()  _event()
//! ```
//!
//! ### Lifecycle
//! ```text
//! open() ──► RepeatWithBackoff::poll_next()
//!
//! loop {
//!   ├─► budget spent?  ─► RepeatExhausted, None
//!   ├─► attempt += 1, publish AttemptStarting, source.open()
//!   ├─► forward every Ok(value)
//!   │       │
//!   │       ├─ Err  ──► AttemptFailed, yield Err(Upstream), end
//!   │       └─ None ──► AttemptCompleted
//!   │                   ├─ budget spent ─► RepeatExhausted, None
//!   │                   ├─ delay = strategy(attempt)   (invalid ─► Err(Validation), end)
//!   │                   ├─ scheduler.schedule_after(delay, wake)
//!   │                   ├─ publish BackoffScheduled{ delay, attempt }
//!   │                   └─ Pending until the timer fires
//!   │
//!   └─ exit conditions:
//!        - budget spent
//!        - error (upstream, validation, scheduler)
//!        - cancel(), drop, or the attached CancellationToken
//! }
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types / traits                                  |
//! |-------------------|--------------------------------------------------------------|-----------------------------------------------------|
//! | **Repeater**      | Repeat a source on completion with backoff.                  | [`BackoffRepeater`], [`RepeatWithBackoff`]          |
//! | **Policies**      | How many attempts and how long to wait between them.         | [`RepeatBudget`], [`DelayStrategy`], [`BackoffPolicy`] |
//! | **Time**          | Real or virtual clock behind the delays.                     | [`Scheduler`], [`TokioScheduler`], [`VirtualScheduler`] |
//! | **Sources**       | Stream factories, closures included.                         | [`Source`], [`SourceFn`]                            |
//! | **Subscriber API**| Hook into attempt lifecycle events.                          | [`Subscribe`], [`SubscriberSet`], [`Bus`]           |
//! | **Errors**        | Typed terminal errors.                                       | [`RepeatError`], [`ValidationError`], [`SchedulerError`] |
//! | **Testing**       | Record emissions against a virtual clock.                    | [`TestSubscriber`]                                  |
//! | **Configuration** | Defaults for count, strategy and scheduler.                  | [`RepeatConfig`]                                    |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use futures::{StreamExt, stream};
//! use backoff_repeat::{BackoffRepeater, SourceFn};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let poll = SourceFn::new("poll", || {
//!         stream::iter([Ok::<_, std::io::Error>("fresh data")])
//!     });
//!
//!     // Three attempts, 10ms apart.
//!     let repeater = BackoffRepeater::builder(poll)
//!         .with_repeat_count(3)
//!         .with_strategy_fn(|_| Duration::from_millis(10))
//!         .build()?;
//!
//!     let mut updates = repeater.open();
//!     while let Some(item) = updates.next().await {
//!         println!("{}", item?);
//!     }
//!     Ok(())
//! }
//! ```
mod core;
mod error;
mod events;
mod policies;
mod scheduler;
mod sources;
mod subscribers;
mod testing;

// ---- Public re-exports ----

pub use crate::core::{
    BackoffRepeater, BackoffRepeaterBuilder, RepeatConfig, RepeatState, RepeatWithBackoff,
    repeat_with_backoff,
};
pub use error::{RepeatError, SchedulerError, ValidationError};
pub use events::{Bus, Event, EventKind};
pub use policies::{BackoffPolicy, DelayStrategy, RepeatBudget, SecondsFn, StrategyFn, StrategyRef};
pub use scheduler::{Callback, Scheduler, SchedulerRef, TimerHandle, TokioScheduler, VirtualScheduler};
pub use sources::{Source, SourceFn, SourceRef};
pub use subscribers::{Subscribe, SubscriberSet};
pub use testing::{Notification, Recorded, TestSubscriber};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
