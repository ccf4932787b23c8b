//! # Repeater configuration.
//!
//! Provides [`RepeatConfig`] the three knobs of a repeating source.
//!
//! Config is used in two ways:
//! 1. **Free function**: `repeat_with_backoff(source, config)`
//! 2. **Builder seed**: `BackoffRepeater::builder(source).with_config(config)`
//!
//! ## Sentinel values
//! - `repeat_count = None` → unbounded (repeat until cancelled)
//! - `repeat_count = Some(0)` → completes immediately, the source is never opened

use std::fmt;
use std::sync::Arc;

use crate::policies::{BackoffPolicy, RepeatBudget, StrategyRef};
use crate::scheduler::{SchedulerRef, TokioScheduler};

/// Configuration of a repeating source.
///
/// ## Field semantics
/// - `repeat_count`: total attempts including the first (`None` = unbounded)
/// - `strategy`: delay before the next attempt, indexed by attempts completed
/// - `scheduler`: time source used to wait between attempts
///
/// All fields are public; each one can be overridden independently.
#[derive(Clone)]
pub struct RepeatConfig {
    /// Maximum number of attempts (`None` = unbounded).
    pub repeat_count: Option<u32>,

    /// Delay strategy.
    ///
    /// Evaluated once per completed attempt that is followed by another one.
    pub strategy: StrategyRef,

    /// Time source for the delays between attempts.
    pub scheduler: SchedulerRef,
}

impl RepeatConfig {
    /// Returns the repeat budget described by `repeat_count`.
    #[inline]
    pub fn budget(&self) -> RepeatBudget {
        RepeatBudget::from_count(self.repeat_count)
    }
}

impl Default for RepeatConfig {
    /// Default configuration:
    ///
    /// - `repeat_count = None` (unbounded)
    /// - `strategy = BackoffPolicy::default()` (`n ↦ min(2^n s, 180 s)`)
    /// - `scheduler = TokioScheduler::new()` (runtime current at scheduling time)
    fn default() -> Self {
        Self {
            repeat_count: None,
            strategy: Arc::new(BackoffPolicy::default()),
            scheduler: Arc::new(TokioScheduler::new()),
        }
    }
}

impl fmt::Debug for RepeatConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RepeatConfig")
            .field("repeat_count", &self.repeat_count)
            .finish_non_exhaustive()
    }
}
