//! # Repeat budget.
//!
//! [`RepeatBudget`] determines how many attempts a subscription may start.
//!
//! - [`RepeatBudget::Bounded`] at most `n` attempts in total (the first one included).
//! - [`RepeatBudget::Unbounded`] repeat until cancelled.
//!
//! ```text
//! Bounded(0)  → completes immediately, the source is never opened
//! Bounded(1)  → one attempt, no delay ever scheduled
//! Bounded(n)  → n attempts, n-1 delays
//! Unbounded   → attempt, delay, attempt, delay, ...
//! ```

/// Upper bound on the total number of attempts of one subscription.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum RepeatBudget {
    /// At most this many attempts.
    Bounded(u32),
    /// No limit.
    #[default]
    Unbounded,
}

impl RepeatBudget {
    /// Builds a budget from an optional repeat count (`None` → unbounded).
    pub fn from_count(count: Option<u32>) -> Self {
        match count {
            Some(n) => RepeatBudget::Bounded(n),
            None => RepeatBudget::Unbounded,
        }
    }

    /// Returns `true` if another attempt may start after `started` attempts.
    #[inline]
    pub fn allows(&self, started: u64) -> bool {
        match self {
            RepeatBudget::Bounded(n) => started < u64::from(*n),
            RepeatBudget::Unbounded => true,
        }
    }

    /// Returns the attempt limit, if any.
    pub fn limit(&self) -> Option<u32> {
        match self {
            RepeatBudget::Bounded(n) => Some(*n),
            RepeatBudget::Unbounded => None,
        }
    }
}
