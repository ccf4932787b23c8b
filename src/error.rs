//! Error types used by the repeater, its strategies and schedulers.
//!
//! This module defines three enums:
//!
//! - [`ValidationError`]: invalid configuration or strategy output.
//! - [`SchedulerError`]: the scheduler refused to arm a timer.
//! - [`RepeatError`]: item error type of a repeating stream; wraps the
//!   upstream error or one of the above.
//!
//! All types provide `as_label` (stable snake_case label for logs) and
//! `as_message` helpers.

use thiserror::Error;

/// # Invalid configuration or strategy output.
///
/// Configuration problems are reported by
/// [`BackoffRepeaterBuilder::build`](crate::BackoffRepeaterBuilder::build);
/// strategy output problems are reported in-stream at the first offending
/// evaluation. Values are never clamped into range.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A backoff policy parameter is out of range.
    #[error("invalid backoff policy: {reason}")]
    InvalidPolicy {
        /// What is wrong with the policy.
        reason: String,
    },

    /// The strategy produced a negative delay.
    #[error("strategy produced a negative delay ({secs}s) for attempt {attempt}")]
    NegativeDelay {
        /// Attempt index passed to the strategy.
        attempt: u32,
        /// The offending value in seconds.
        secs: f64,
    },

    /// The strategy produced `NaN` or an infinite delay.
    #[error("strategy produced a non-finite delay for attempt {attempt}")]
    NonFiniteDelay {
        /// Attempt index passed to the strategy.
        attempt: u32,
    },
}

impl ValidationError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use backoff_repeat::ValidationError;
    ///
    /// let err = ValidationError::NonFiniteDelay { attempt: 3 };
    /// assert_eq!(err.as_label(), "validation_non_finite_delay");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ValidationError::InvalidPolicy { .. } => "validation_invalid_policy",
            ValidationError::NegativeDelay { .. } => "validation_negative_delay",
            ValidationError::NonFiniteDelay { .. } => "validation_non_finite_delay",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            ValidationError::InvalidPolicy { reason } => format!("policy: {reason}"),
            ValidationError::NegativeDelay { attempt, secs } => {
                format!("negative delay {secs}s at attempt={attempt}")
            }
            ValidationError::NonFiniteDelay { attempt } => {
                format!("non-finite delay at attempt={attempt}")
            }
        }
    }
}

/// # Errors produced by a [`Scheduler`](crate::Scheduler).
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    /// No tokio runtime is available to drive the timer.
    #[error("no tokio runtime available: {reason}")]
    NoRuntime {
        /// Details reported by tokio.
        reason: String,
    },

    /// The due instant does not fit the scheduler's clock.
    #[error("delay {delay_ms}ms overflows the scheduler clock")]
    ClockOverflow {
        /// Requested delay in milliseconds (saturated).
        delay_ms: u64,
    },
}

impl SchedulerError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            SchedulerError::NoRuntime { .. } => "scheduler_no_runtime",
            SchedulerError::ClockOverflow { .. } => "scheduler_clock_overflow",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            SchedulerError::NoRuntime { reason } => format!("no runtime: {reason}"),
            SchedulerError::ClockOverflow { delay_ms } => format!("clock overflow: {delay_ms}ms"),
        }
    }
}

/// # Terminal error of a repeating stream.
///
/// Every variant ends the subscription: no further attempt is scheduled once
/// an error has been yielded.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RepeatError<E> {
    /// The wrapped source failed; the error is forwarded as-is.
    #[error(transparent)]
    Upstream(E),

    /// The delay strategy produced an invalid value.
    #[error("invalid delay: {0}")]
    Validation(#[from] ValidationError),

    /// The scheduler could not arm the timer for the next attempt.
    #[error("scheduler failure: {0}")]
    Scheduler(#[from] SchedulerError),
}

impl<E> RepeatError<E> {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use backoff_repeat::RepeatError;
    ///
    /// let err: RepeatError<std::io::Error> = RepeatError::Upstream(std::io::Error::other("boom"));
    /// assert_eq!(err.as_label(), "repeat_upstream");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RepeatError::Upstream(_) => "repeat_upstream",
            RepeatError::Validation(_) => "repeat_validation",
            RepeatError::Scheduler(_) => "repeat_scheduler",
        }
    }

    /// Returns the upstream error, if this is one.
    pub fn upstream(&self) -> Option<&E> {
        match self {
            RepeatError::Upstream(e) => Some(e),
            _ => None,
        }
    }

    /// Consumes `self`, returning the upstream error if this is one.
    pub fn into_upstream(self) -> Option<E> {
        match self {
            RepeatError::Upstream(e) => Some(e),
            _ => None,
        }
    }

    /// Indicates whether the error originated in the wrapped source.
    pub fn is_upstream(&self) -> bool {
        matches!(self, RepeatError::Upstream(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_is_transparent() {
        let err: RepeatError<std::io::Error> = RepeatError::Upstream(std::io::Error::other("boom"));
        assert_eq!(err.to_string(), "boom");
        assert!(err.is_upstream());
        assert_eq!(err.into_upstream().map(|e| e.to_string()).as_deref(), Some("boom"));
    }

    #[test]
    fn test_validation_converts() {
        let err: RepeatError<std::io::Error> =
            ValidationError::NegativeDelay { attempt: 2, secs: -1.0 }.into();
        assert_eq!(err.as_label(), "repeat_validation");
        assert!(err.upstream().is_none());
        assert_eq!(
            err.to_string(),
            "invalid delay: strategy produced a negative delay (-1s) for attempt 2"
        );
    }

    #[test]
    fn test_scheduler_labels() {
        let err = SchedulerError::ClockOverflow { delay_ms: 5 };
        assert_eq!(err.as_label(), "scheduler_clock_overflow");
        assert_eq!(err.as_message(), "clock overflow: 5ms");
    }
}
