//! # BackoffRepeater: a source that repeats another source.
//!
//! [`BackoffRepeater`] wraps a [`Source`] and is itself a [`Source`]. Every
//! [`open`](BackoffRepeater::open) starts an independent subscription
//! ([`RepeatWithBackoff`]) with its own attempt counter.
//!
//! ```text
//! BackoffRepeater ──► open() ──► RepeatWithBackoff #1  (attempts: 0, 1, 2, ...)
//!        │
//!        └──────────► open() ──► RepeatWithBackoff #2  (attempts: 0, 1, ...)
//! ```
//!
//! The repeater holds no per-subscription state, so clones and concurrent
//! subscriptions never interfere.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::core::builder::BackoffRepeaterBuilder;
use crate::core::config::RepeatConfig;
use crate::core::stream::RepeatWithBackoff;
use crate::error::ValidationError;
use crate::events::Bus;
use crate::policies::{RepeatBudget, StrategyRef};
use crate::scheduler::SchedulerRef;
use crate::sources::Source;

/// Immutable state shared by a repeater and all of its subscriptions.
pub(crate) struct Shared<S> {
    pub(crate) source: S,
    pub(crate) name: Arc<str>,
    pub(crate) budget: RepeatBudget,
    pub(crate) strategy: StrategyRef,
    pub(crate) scheduler: SchedulerRef,
    pub(crate) bus: Option<Bus>,
    pub(crate) token: Option<CancellationToken>,
}

/// Source that re-opens the wrapped source after each completion, waiting
/// a strategy-defined delay in between.
///
/// Values and the terminal error of each attempt are forwarded unchanged;
/// an error ends the subscription (repeat, never retry).
///
/// # Example
/// ```rust
/// use std::time::Duration;
/// use futures::stream;
/// use backoff_repeat::{BackoffRepeater, SourceFn, StrategyFn, TestSubscriber, VirtualScheduler};
///
/// let scheduler = VirtualScheduler::new();
/// let repeater = BackoffRepeater::builder(SourceFn::new("ping", || {
///         stream::iter([Ok::<_, std::io::Error>("pong")])
///     }))
///     .with_repeat_count(3)
///     .with_strategy_fn(|n| Duration::from_secs(u64::from(n)))
///     .with_scheduler(scheduler.clone())
///     .build()
///     .unwrap();
///
/// let mut sub = TestSubscriber::subscribe(&scheduler, &repeater);
/// sub.advance_until_empty();
/// assert_eq!(sub.values(), vec![&"pong", &"pong", &"pong"]);
/// assert!(sub.is_completed());
/// assert_eq!(scheduler.now(), Duration::from_secs(3));
/// ```
pub struct BackoffRepeater<S> {
    shared: Arc<Shared<S>>,
}

impl<S: Source> BackoffRepeater<S> {
    /// Starts building a repeater around `source`.
    pub fn builder(source: S) -> BackoffRepeaterBuilder<S> {
        BackoffRepeaterBuilder::new(source)
    }

    pub(crate) fn from_shared(shared: Shared<S>) -> Self {
        Self {
            shared: Arc::new(shared),
        }
    }

    /// Starts a new subscription.
    ///
    /// Nothing happens until the returned stream is polled; the first
    /// attempt then opens the wrapped source without delay.
    pub fn open(&self) -> RepeatWithBackoff<S> {
        RepeatWithBackoff::new(Arc::clone(&self.shared))
    }

    /// Name used in published events.
    pub fn name(&self) -> &str {
        &self.shared.name
    }

    /// Repeat budget of every subscription.
    pub fn budget(&self) -> RepeatBudget {
        self.shared.budget
    }

    /// Wrapped source.
    pub fn inner(&self) -> &S {
        &self.shared.source
    }
}

impl<S> Clone for BackoffRepeater<S> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<S: Source> Source for BackoffRepeater<S> {
    type Stream = RepeatWithBackoff<S>;

    fn name(&self) -> &str {
        BackoffRepeater::name(self)
    }

    fn open(&self) -> Self::Stream {
        BackoffRepeater::open(self)
    }
}

/// Wraps `source` according to `config`.
///
/// Equivalent to `BackoffRepeater::builder(source).with_config(config).build()`.
pub fn repeat_with_backoff<S: Source>(
    source: S,
    config: RepeatConfig,
) -> Result<BackoffRepeater<S>, ValidationError> {
    BackoffRepeater::builder(source).with_config(config).build()
}
