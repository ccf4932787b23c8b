//! # Events emitted by repeating streams.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Attempt events**: one attempt's flow (starting, completed, failed)
//! - **Scheduling events**: delays armed between attempts
//! - **Terminal events**: subscription final states (exhausted, cancelled, invalid, no timer)
//!
//! The [`Event`] struct carries additional metadata such as timestamps,
//! source name, attempt number, reasons and backoff delays.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Use `seq` to restore the exact order when events are
//! delivered out of order.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use backoff_repeat::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::BackoffScheduled)
//!     .with_source("heartbeat")
//!     .with_attempt(3)
//!     .with_delay(Duration::from_secs(8));
//!
//! assert_eq!(ev.kind, EventKind::BackoffScheduled);
//! assert_eq!(ev.source.as_deref(), Some("heartbeat"));
//! assert_eq!(ev.delay_ms, Some(8_000));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `source`: subscriber name
    /// - `reason`: panic info/message
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `source`: subscriber name
    /// - `reason`: reason string (e.g., "full", "closed")
    SubscriberOverflow,

    // === Attempt lifecycle ===
    /// A new attempt opened the source.
    ///
    /// Sets:
    /// - `source`: source name
    /// - `attempt`: attempt number (1-based, per subscription)
    AttemptStarting,

    /// The attempt reached its natural end of stream.
    ///
    /// Sets:
    /// - `source`: source name
    /// - `attempt`: attempt number
    AttemptCompleted,

    /// The attempt yielded an error; the subscription ends.
    ///
    /// Sets:
    /// - `source`: source name
    /// - `attempt`: attempt number
    /// - `reason`: error message
    AttemptFailed,

    /// Next attempt armed on the scheduler.
    ///
    /// Sets:
    /// - `source`: source name
    /// - `attempt`: number of the attempt that just completed
    /// - `delay_ms`: delay before the next attempt (ms)
    BackoffScheduled,

    // === Subscription terminal states ===
    /// Repeat budget used up; the subscription completed.
    ///
    /// Sets:
    /// - `source`: source name
    /// - `attempt`: attempts started
    RepeatExhausted,

    /// Subscription cancelled before it finished.
    ///
    /// Sets:
    /// - `source`: source name
    /// - `attempt`: attempts started
    RepeatCancelled,

    /// Strategy produced an invalid delay; the subscription ends.
    ///
    /// Sets:
    /// - `source`: source name
    /// - `attempt`: number of the attempt that just completed
    /// - `reason`: validation message
    ValidationFailed,

    /// Scheduler refused to arm the next timer; the subscription ends.
    ///
    /// Sets:
    /// - `source`: source name
    /// - `attempt`: number of the attempt that just completed
    /// - `reason`: scheduler message
    SchedulerFailed,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Name of the source (or subscriber), if applicable.
    pub source: Option<Arc<str>>,
    /// Attempt number (starting from 1).
    pub attempt: Option<u64>,
    /// Backoff delay before next attempt in milliseconds (compact).
    pub delay_ms: Option<u64>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            source: None,
            attempt: None,
            delay_ms: None,
            reason: None,
        }
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a source name.
    #[inline]
    pub fn with_source(mut self, source: impl Into<Arc<str>>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Attaches a backoff delay (stored as milliseconds).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        self.delay_ms = Some(u64::try_from(d.as_millis()).unwrap_or(u64::MAX));
        self
    }

    /// Attaches an attempt number.
    #[inline]
    pub fn with_attempt(mut self, n: u64) -> Self {
        self.attempt = Some(n);
        self
    }

    /// Returns the delay as a `Duration`, if set.
    #[inline]
    pub fn delay(&self) -> Option<Duration> {
        self.delay_ms.map(Duration::from_millis)
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_source(subscriber)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_source(subscriber)
            .with_reason(info)
    }

    /// True for attempt-level events.
    #[inline]
    pub fn is_attempt(&self) -> bool {
        matches!(
            self.kind,
            EventKind::AttemptStarting | EventKind::AttemptCompleted | EventKind::AttemptFailed
        )
    }

    /// True for events that end a subscription.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.kind,
            EventKind::AttemptFailed
                | EventKind::RepeatExhausted
                | EventKind::RepeatCancelled
                | EventKind::ValidationFailed
                | EventKind::SchedulerFailed
        )
    }
}
