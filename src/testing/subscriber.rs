//! # TestSubscriber: drive a stream against a virtual clock.
//!
//! Owns one stream and a [`VirtualScheduler`]. Between timer firings the
//! stream is polled until it stops making progress, and everything it yields
//! is recorded with the virtual instant it was observed at.
//!
//! ```text
//! advance_to(target):
//!   drain()
//!   while a timer is due <= target:
//!     fire it            (clock jumps to its due instant)
//!     drain()            (poll while the stream keeps waking itself)
//!   clock = target
//!   drain()
//! ```
//!
//! Polling uses a flag waker: the stream is re-polled only after something
//! woke it, the way an executor would.

use std::fmt;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::task::{Context, Poll};
use std::time::Duration;

use futures::TryStream;
use futures::task::{ArcWake, waker};

use crate::scheduler::VirtualScheduler;
use crate::sources::Source;

/// What a stream yielded.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification<T, E> {
    /// A value.
    Next(T),
    /// The terminal error.
    Error(E),
    /// Natural end of the stream.
    Completed,
}

/// A [`Notification`] stamped with the virtual time it was observed at.
#[derive(Debug, Clone, PartialEq)]
pub struct Recorded<T, E> {
    /// Virtual time since the scheduler was created.
    pub at: Duration,
    /// What was observed.
    pub notification: Notification<T, E>,
}

struct Flag(AtomicBool);

impl ArcWake for Flag {
    fn wake_by_ref(arc_self: &Arc<Self>) {
        arc_self.0.store(true, Ordering::SeqCst);
    }
}

/// Records everything one stream yields under virtual time.
pub struct TestSubscriber<St: TryStream> {
    scheduler: VirtualScheduler,
    stream: Option<Pin<Box<St>>>,
    woken: Arc<Flag>,
    records: Vec<Recorded<St::Ok, St::Error>>,
}

impl<St: TryStream> TestSubscriber<St> {
    /// Takes ownership of `stream` and polls it right away.
    pub fn new(scheduler: &VirtualScheduler, stream: St) -> Self {
        let mut sub = Self {
            scheduler: scheduler.clone(),
            stream: Some(Box::pin(stream)),
            woken: Arc::new(Flag(AtomicBool::new(true))),
            records: Vec::new(),
        };
        sub.drain();
        sub
    }

    /// Opens `source` and subscribes to the resulting stream.
    pub fn subscribe<S>(scheduler: &VirtualScheduler, source: &S) -> Self
    where
        S: Source<Stream = St>,
    {
        Self::new(scheduler, source.open())
    }

    /// Advances virtual time by `by`, firing due timers in order.
    pub fn advance_by(&mut self, by: Duration) {
        let target = self.scheduler.now().saturating_add(by);
        self.advance_to(target);
    }

    /// Advances virtual time to `target`, firing due timers in order.
    pub fn advance_to(&mut self, target: Duration) {
        self.drain();
        while self.scheduler.run_next(target) {
            self.drain();
        }
        self.scheduler.advance_to(target);
        self.drain();
    }

    /// Fires timers until none is left.
    ///
    /// Never returns for a stream that keeps arming timers forever.
    pub fn advance_until_empty(&mut self) {
        self.drain();
        while let Some(due) = self.scheduler.next_due() {
            self.scheduler.run_next(due);
            self.drain();
        }
    }

    /// Drops the stream without polling it again.
    pub fn unsubscribe(&mut self) {
        self.stream = None;
    }

    /// True while the stream is held (neither ended nor unsubscribed).
    pub fn is_subscribed(&self) -> bool {
        self.stream.is_some()
    }

    /// Everything observed so far.
    pub fn records(&self) -> &[Recorded<St::Ok, St::Error>] {
        &self.records
    }

    /// Values observed so far, in order.
    pub fn values(&self) -> Vec<&St::Ok> {
        self.records
            .iter()
            .filter_map(|r| match &r.notification {
                Notification::Next(v) => Some(v),
                _ => None,
            })
            .collect()
    }

    /// The terminal error, if one was observed.
    pub fn error(&self) -> Option<&St::Error> {
        self.records.iter().find_map(|r| match &r.notification {
            Notification::Error(e) => Some(e),
            _ => None,
        })
    }

    /// Virtual instant of completion, if the stream completed.
    pub fn completed_at(&self) -> Option<Duration> {
        self.records
            .iter()
            .find(|r| matches!(r.notification, Notification::Completed))
            .map(|r| r.at)
    }

    /// True if the stream completed normally.
    pub fn is_completed(&self) -> bool {
        self.completed_at().is_some()
    }

    /// Polls the stream for as long as it keeps being woken.
    fn drain(&mut self) {
        let waker = waker(Arc::clone(&self.woken));
        let mut cx = Context::from_waker(&waker);

        while self.woken.0.swap(false, Ordering::SeqCst) {
            loop {
                let Some(stream) = self.stream.as_mut() else {
                    return;
                };
                let notification = match stream.as_mut().try_poll_next(&mut cx) {
                    Poll::Pending => break,
                    Poll::Ready(Some(Ok(v))) => Notification::Next(v),
                    Poll::Ready(Some(Err(e))) => Notification::Error(e),
                    Poll::Ready(None) => Notification::Completed,
                };
                let terminal = !matches!(notification, Notification::Next(_));
                self.records.push(Recorded {
                    at: self.scheduler.now(),
                    notification,
                });
                if terminal {
                    self.stream = None;
                    return;
                }
            }
        }
    }
}

impl<St: TryStream> fmt::Debug for TestSubscriber<St> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestSubscriber")
            .field("now", &self.scheduler.now())
            .field("records", &self.records.len())
            .field("subscribed", &self.stream.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::Scheduler;
    use futures::channel::mpsc;
    use futures::stream;

    #[test]
    fn test_records_values_and_completion() {
        let scheduler = VirtualScheduler::new();
        let sub = TestSubscriber::new(
            &scheduler,
            stream::iter(vec![Ok::<_, std::io::Error>(1), Ok(2)]),
        );

        assert_eq!(sub.values(), vec![&1, &2]);
        assert_eq!(sub.completed_at(), Some(Duration::ZERO));
        assert!(!sub.is_subscribed());
    }

    #[test]
    fn test_stops_after_error() {
        let scheduler = VirtualScheduler::new();
        let sub = TestSubscriber::new(
            &scheduler,
            stream::iter(vec![Ok(1), Err("bad"), Ok(3)]),
        );

        assert_eq!(sub.values(), vec![&1]);
        assert_eq!(sub.error(), Some(&"bad"));
        assert!(!sub.is_completed());
    }

    #[test]
    fn test_timer_callback_wakes_stream() {
        let scheduler = VirtualScheduler::new();
        let (tx, rx) = mpsc::unbounded::<Result<u32, ()>>();
        let mut sub = TestSubscriber::new(&scheduler, rx);
        assert!(sub.records().is_empty());

        let _timer = scheduler
            .schedule_after(
                Duration::from_secs(5),
                Box::new(move || {
                    let _ = tx.unbounded_send(Ok(7));
                }),
            )
            .unwrap();
        sub.advance_by(Duration::from_secs(4));
        assert!(sub.values().is_empty());

        sub.advance_by(Duration::from_secs(1));
        assert_eq!(
            sub.records(),
            &[
                Recorded {
                    at: Duration::from_secs(5),
                    notification: Notification::Next(7),
                },
                Recorded {
                    at: Duration::from_secs(5),
                    notification: Notification::Completed,
                },
            ]
        );
    }
}
