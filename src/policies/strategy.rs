//! # Delay strategies.
//!
//! A [`DelayStrategy`] maps an attempt index to the delay that precedes the
//! next attempt. The index counts attempts already completed, so the second
//! attempt of a subscription is delayed by `delay(1)`, the third by
//! `delay(2)`, and so on. The first attempt is never delayed.
//!
//! Implementations:
//! - [`BackoffPolicy`](crate::BackoffPolicy) capped exponential growth (the default);
//! - [`StrategyFn`] any `Fn(u32) -> Duration`;
//! - [`SecondsFn`] any `Fn(u32) -> f64` in seconds, rejecting negative or non-finite values.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use backoff_repeat::{DelayStrategy, StrategyFn, SecondsFn};
//!
//! let linear = StrategyFn::new(|n| Duration::from_secs(u64::from(n)));
//! assert_eq!(linear.delay(3).unwrap(), Duration::from_secs(3));
//!
//! let broken = SecondsFn::new(|n| 1.0 - f64::from(n));
//! assert!(broken.delay(2).is_err());
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::error::ValidationError;

/// Shared handle to a delay strategy.
pub type StrategyRef = Arc<dyn DelayStrategy>;

/// Pure mapping from attempt index to delay.
///
/// Implementations must be deterministic and free of side effects: the
/// repeater evaluates them synchronously when the previous attempt completes.
pub trait DelayStrategy: Send + Sync + 'static {
    /// Returns the delay that precedes the attempt following `attempt`
    /// completed attempts.
    fn delay(&self, attempt: u32) -> Result<Duration, ValidationError>;

    /// Checks the strategy's own parameters before any subscription starts.
    ///
    /// Default implementation accepts everything.
    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

/// Strategy backed by a `Fn(u32) -> Duration` closure.
///
/// `Duration` cannot be negative, so evaluation never fails.
pub struct StrategyFn<F> {
    f: F,
}

impl<F> StrategyFn<F>
where
    F: Fn(u32) -> Duration + Send + Sync + 'static,
{
    /// Wraps the closure.
    pub fn new(f: F) -> Self {
        Self { f }
    }

    /// Wraps the closure and returns it as a shared handle.
    pub fn arc(f: F) -> StrategyRef {
        Arc::new(Self::new(f))
    }
}

impl<F> DelayStrategy for StrategyFn<F>
where
    F: Fn(u32) -> Duration + Send + Sync + 'static,
{
    fn delay(&self, attempt: u32) -> Result<Duration, ValidationError> {
        Ok((self.f)(attempt))
    }
}

impl<F> fmt::Debug for StrategyFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrategyFn").finish_non_exhaustive()
    }
}

/// Strategy backed by a closure returning seconds as `f64`.
///
/// Negative and non-finite values fail with a [`ValidationError`] at the
/// first offending evaluation; they are never clamped.
pub struct SecondsFn<F> {
    f: F,
}

impl<F> SecondsFn<F>
where
    F: Fn(u32) -> f64 + Send + Sync + 'static,
{
    /// Wraps the closure.
    pub fn new(f: F) -> Self {
        Self { f }
    }

    /// Wraps the closure and returns it as a shared handle.
    pub fn arc(f: F) -> StrategyRef {
        Arc::new(Self::new(f))
    }
}

impl<F> DelayStrategy for SecondsFn<F>
where
    F: Fn(u32) -> f64 + Send + Sync + 'static,
{
    fn delay(&self, attempt: u32) -> Result<Duration, ValidationError> {
        let secs = (self.f)(attempt);
        if !secs.is_finite() {
            return Err(ValidationError::NonFiniteDelay { attempt });
        }
        if secs < 0.0 {
            return Err(ValidationError::NegativeDelay { attempt, secs });
        }
        Duration::try_from_secs_f64(secs).map_err(|_| ValidationError::NonFiniteDelay { attempt })
    }
}

impl<F> fmt::Debug for SecondsFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecondsFn").finish_non_exhaustive()
    }
}
