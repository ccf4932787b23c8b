//! # Exponential backoff policy.
//!
//! [`BackoffPolicy`] controls how the delay between repetitions grows.
//! It is parameterized by:
//! - [`BackoffPolicy::factor`] the multiplicative growth factor;
//! - [`BackoffPolicy::first`] the delay for attempt index `0`;
//! - [`BackoffPolicy::max`] the maximum delay cap.
//!
//! The delay for attempt index `n` is `first × factor^n`, clamped to `max`.
//! No randomization is applied: the same index always yields the same delay.
//!
//! The default policy is `n ↦ min(2^n s, 180 s)`.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use backoff_repeat::BackoffPolicy;
//!
//! let backoff = BackoffPolicy::default();
//!
//! assert_eq!(backoff.next(0), Duration::from_secs(1));
//! assert_eq!(backoff.next(1), Duration::from_secs(2));
//! assert_eq!(backoff.next(7), Duration::from_secs(128));
//!
//! // 2^8 = 256s → capped at max=180s
//! assert_eq!(backoff.next(8), Duration::from_secs(180));
//! ```

use std::time::Duration;

use crate::error::ValidationError;
use crate::policies::strategy::DelayStrategy;

/// Exponential backoff policy.
///
/// Encapsulates parameters that determine how repeat delays grow:
/// - [`BackoffPolicy::factor`]: multiplicative growth factor;
/// - [`BackoffPolicy::first`]: delay at attempt index `0`;
/// - [`BackoffPolicy::max`]: the maximum delay cap.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BackoffPolicy {
    /// Delay at attempt index `0`.
    pub first: Duration,
    /// Maximum delay cap.
    pub max: Duration,
    /// Multiplicative growth factor (finite, `>= 0.0`).
    pub factor: f64,
}

impl Default for BackoffPolicy {
    /// Returns a policy with:
    /// - `first = 1s`;
    /// - `factor = 2.0` (doubles each time);
    /// - `max = 180s` (three minutes).
    fn default() -> Self {
        Self {
            first: Duration::from_secs(1),
            max: Duration::from_secs(180),
            factor: 2.0,
        }
    }
}

impl BackoffPolicy {
    /// Constant delay: every attempt waits `delay`.
    pub fn constant(delay: Duration) -> Self {
        Self {
            first: delay,
            max: delay,
            factor: 1.0,
        }
    }

    /// Checks that the policy can only ever produce valid delays.
    ///
    /// Rejects a negative or non-finite `factor`.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.factor.is_finite() {
            return Err(ValidationError::InvalidPolicy {
                reason: format!("factor must be finite, got {}", self.factor),
            });
        }
        if self.factor < 0.0 {
            return Err(ValidationError::InvalidPolicy {
                reason: format!("factor must be >= 0, got {}", self.factor),
            });
        }
        Ok(())
    }

    /// Computes the delay for the given attempt index.
    ///
    /// The delay is `first × factor^attempt`, clamped to [`BackoffPolicy::max`].
    /// Overflow to infinity clamps to `max`; a negative or `NaN` intermediate
    /// (possible only with a policy that fails [`validate`](Self::validate))
    /// is reported instead of clamped.
    pub fn try_next(&self, attempt: u32) -> Result<Duration, ValidationError> {
        // 0 × ∞ is NaN once `factor^attempt` overflows.
        if self.first.is_zero() {
            return Ok(Duration::ZERO);
        }
        let clamped_exp = attempt.min(i32::MAX as u32) as i32;
        let secs = self.first.as_secs_f64() * self.factor.powi(clamped_exp);

        if secs.is_nan() {
            return Err(ValidationError::NonFiniteDelay { attempt });
        }
        if secs < 0.0 {
            return Err(ValidationError::NegativeDelay { attempt, secs });
        }
        if secs.is_infinite() || secs > self.max.as_secs_f64() {
            return Ok(self.max);
        }
        Ok(Duration::from_secs_f64(secs))
    }

    /// Computes the delay for the given attempt index, falling back to
    /// [`BackoffPolicy::max`] when the policy is invalid.
    ///
    /// # Notes
    /// - If `factor` is less than 1.0, delays decrease with higher attempts (not typical).
    /// - If `factor` equals 1.0, delay remains constant at `first` (up to `max`).
    /// - If `factor` is greater than 1.0, delays grow exponentially up to `max`.
    pub fn next(&self, attempt: u32) -> Duration {
        self.try_next(attempt).unwrap_or(self.max)
    }
}

impl DelayStrategy for BackoffPolicy {
    fn delay(&self, attempt: u32) -> Result<Duration, ValidationError> {
        self.try_next(attempt)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        BackoffPolicy::validate(self)
    }
}
