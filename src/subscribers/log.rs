//! # LogWriter - simple event printer
//!
//! A minimal subscriber that prints incoming [`Event`]s to stdout.
//! Use it for tests or demos.
//!
//! ## Example output
//! ```text
//! [starting] source="heartbeat" attempt=1
//! [completed] source="heartbeat" attempt=1
//! [backoff] source="heartbeat" delay_ms=2000 after_attempt=1
//! [failed] source="heartbeat" attempt=2 err="connection reset"
//! [exhausted] source="heartbeat" attempts=5
//! [cancelled] source="heartbeat" attempts=3
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Renders one event as a log line.
    pub fn format(e: &Event) -> String {
        let source = e.source.as_deref().unwrap_or("unknown");
        let reason = e.reason.as_deref().unwrap_or("");
        let attempt = e.attempt.unwrap_or(0);
        match e.kind {
            EventKind::AttemptStarting => {
                format!("[starting] source={source:?} attempt={attempt}")
            }
            EventKind::AttemptCompleted => {
                format!("[completed] source={source:?} attempt={attempt}")
            }
            EventKind::AttemptFailed => {
                format!("[failed] source={source:?} attempt={attempt} err={reason:?}")
            }
            EventKind::BackoffScheduled => format!(
                "[backoff] source={source:?} delay_ms={} after_attempt={attempt}",
                e.delay_ms.unwrap_or(0)
            ),
            EventKind::RepeatExhausted => {
                format!("[exhausted] source={source:?} attempts={attempt}")
            }
            EventKind::RepeatCancelled => {
                format!("[cancelled] source={source:?} attempts={attempt}")
            }
            EventKind::ValidationFailed => {
                format!("[invalid] source={source:?} after_attempt={attempt} err={reason:?}")
            }
            EventKind::SchedulerFailed => {
                format!("[no-timer] source={source:?} after_attempt={attempt} err={reason:?}")
            }
            EventKind::SubscriberOverflow => {
                format!("[subscriber-overflow] subscriber={source:?} reason={reason:?}")
            }
            EventKind::SubscriberPanicked => {
                format!("[subscriber-panicked] subscriber={source} info={reason}")
            }
        }
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        println!("{}", Self::format(e));
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
