//! Repeat policies.
//!
//! This module groups the knobs that control **how many** attempts a
//! subscription may start and **how long** to wait between them.
//!
//! ## Contents
//! - [`RepeatBudget`]   how many attempts (bounded / unbounded)
//! - [`DelayStrategy`]  attempt index → delay
//! - [`BackoffPolicy`]  capped exponential strategy (first / factor / max)
//! - [`StrategyFn`], [`SecondsFn`] closure-backed strategies
//!
//! ## Quick wiring
//! ```text
//! RepeatConfig { repeat_count: Option<u32>, strategy: StrategyRef, scheduler: SchedulerRef }
//!      └─► core::stream::RepeatWithBackoff uses:
//!           - budget.allows(started) to decide continue/complete
//!           - strategy.delay(completed) to arm the next timer
//! ```
//!
//! ## Defaults
//! - `RepeatBudget::Unbounded`.
//! - `BackoffPolicy::default()` → first=1s, factor=2.0, max=180s.

mod backoff;
mod budget;
mod strategy;

pub use backoff::BackoffPolicy;
pub use budget::RepeatBudget;
pub use strategy::{DelayStrategy, SecondsFn, StrategyFn, StrategyRef};
