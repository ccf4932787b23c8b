//! # RepeatWithBackoff: one subscription to a repeating source.
//!
//! A poll-driven state machine. It spawns nothing and never sleeps: the
//! delay between attempts is a timer armed on the configured scheduler,
//! whose callback flips a timer-fired flag and wakes the consumer.
//!
//! ## States
//! ```text
//!            poll                 None (budget left)          timer fired
//!   Idle ───────────► Attempting(k) ─────────────► Waiting(k) ────────────► Attempting(k+1) ─► ...
//!    │                   │   │                         │
//!    │ budget = 0        │   └─ None (budget spent) ───┼──────────────────► Completed
//!    └───────────────────┼─────────────────────────────┼──────────────────► Completed
//!                        └─ Err / bad delay / no timer ┴──────────────────► Errored
//!
//!   any non-terminal state ── cancel() / drop / token ──────────────────────► Cancelled
//! ```
//!
//! ## Event flow
//! ```text
//! AttemptStarting → [values] → AttemptCompleted → BackoffScheduled → [timer] → AttemptStarting ...
//!                            → AttemptFailed (terminal)
//!                                               → RepeatExhausted (terminal)
//!                                               → ValidationFailed (terminal)
//!                                               → SchedulerFailed (terminal)
//! cancel → RepeatCancelled (terminal)
//! ```
//!
//! ## Rules
//! - At most **one attempt** in flight
//! - Attempt counter **increments once per attempt start** and never resets
//! - The delay before attempt `k + 1` is `strategy(k)`
//! - No delay is armed after the final attempt of a bounded budget
//! - After cancellation the stream only yields `None`

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::{Stream, TryStream};
use tokio_util::sync::WaitForCancellationFutureOwned;

use crate::core::repeater::Shared;
use crate::core::signal::TimerSignal;
use crate::error::RepeatError;
use crate::events::{Event, EventKind};
use crate::scheduler::TimerHandle;
use crate::sources::Source;

/// Observable state of a [`RepeatWithBackoff`] subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeatState {
    /// Not polled yet.
    Idle,
    /// Attempt `k` (1-based) is in flight.
    Attempting(u64),
    /// Attempt `k` completed; the timer for the next one is armed.
    Waiting(u64),
    /// Budget spent; the stream ended normally.
    Completed,
    /// An error was yielded; the stream ended.
    Errored,
    /// Cancelled before it finished.
    Cancelled,
}

impl RepeatState {
    /// True for states that yield only `None` from now on.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RepeatState::Completed | RepeatState::Errored | RepeatState::Cancelled
        )
    }
}

enum Phase<St> {
    Idle,
    Attempting(Pin<Box<St>>),
    Waiting {
        // Held only so that dropping the phase cancels the timer.
        _timer: TimerHandle,
        signal: Arc<TimerSignal>,
    },
    Completed,
    Errored,
    Cancelled,
}

/// What the state machine does after inspecting the current phase.
enum Step<E> {
    Start,
    Finished,
    Failed(E),
}

type SourceOk<S> = <<S as Source>::Stream as TryStream>::Ok;
type SourceErr<S> = <<S as Source>::Stream as TryStream>::Error;

/// Stream of one subscription to a [`BackoffRepeater`](crate::BackoffRepeater).
///
/// Yields `Ok(value)` for every value of every attempt and at most one
/// `Err`, after which it ends. Dropping the stream cancels it.
#[must_use = "streams do nothing unless polled"]
pub struct RepeatWithBackoff<S: Source> {
    shared: Arc<Shared<S>>,
    attempts: u64,
    phase: Phase<S::Stream>,
    cancellation: Option<Pin<Box<WaitForCancellationFutureOwned>>>,
}

impl<S: Source> Unpin for RepeatWithBackoff<S> {}

impl<S: Source> RepeatWithBackoff<S> {
    pub(crate) fn new(shared: Arc<Shared<S>>) -> Self {
        let cancellation = shared
            .token
            .as_ref()
            .map(|t| Box::pin(t.clone().cancelled_owned()));
        Self {
            shared,
            attempts: 0,
            phase: Phase::Idle,
            cancellation,
        }
    }

    /// Number of attempts started so far.
    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    /// Current state.
    pub fn state(&self) -> RepeatState {
        match &self.phase {
            Phase::Idle => RepeatState::Idle,
            Phase::Attempting(_) => RepeatState::Attempting(self.attempts),
            Phase::Waiting { .. } => RepeatState::Waiting(self.attempts),
            Phase::Completed => RepeatState::Completed,
            Phase::Errored => RepeatState::Errored,
            Phase::Cancelled => RepeatState::Cancelled,
        }
    }

    /// Cancels the subscription.
    ///
    /// Drops the attempt in flight and cancels a pending timer; no further
    /// attempt starts. Idempotent, and a no-op once the stream has ended.
    pub fn cancel(&mut self) {
        if self.state().is_terminal() {
            return;
        }
        self.phase = Phase::Cancelled;
        self.cancellation = None;
        self.publish(EventKind::RepeatCancelled, |ev| ev);
    }

    fn publish(&self, kind: EventKind, with: impl FnOnce(Event) -> Event) {
        if let Some(bus) = &self.shared.bus {
            let ev = Event::new(kind)
                .with_source(Arc::clone(&self.shared.name))
                .with_attempt(self.attempts);
            bus.publish(with(ev));
        }
    }

    /// Opens the source for the next attempt, or completes if the budget is spent.
    fn start_attempt(&mut self) -> bool {
        if !self.shared.budget.allows(self.attempts) {
            self.phase = Phase::Completed;
            self.publish(EventKind::RepeatExhausted, |ev| ev);
            return false;
        }
        self.attempts += 1;
        self.publish(EventKind::AttemptStarting, |ev| ev);
        self.phase = Phase::Attempting(Box::pin(self.shared.source.open()));
        true
    }

    /// Arms the timer for the next attempt.
    fn arm_next(&mut self) -> Result<(), RepeatError<SourceErr<S>>> {
        let index = u32::try_from(self.attempts).unwrap_or(u32::MAX);
        let delay = match self.shared.strategy.delay(index) {
            Ok(d) => d,
            Err(e) => {
                self.fail(EventKind::ValidationFailed, e.as_message());
                return Err(e.into());
            }
        };

        let signal = Arc::new(TimerSignal::default());
        let fire = Arc::clone(&signal);
        let timer = match self
            .shared
            .scheduler
            .schedule_after(delay, Box::new(move || fire.fire()))
        {
            Ok(t) => t,
            Err(e) => {
                self.fail(EventKind::SchedulerFailed, e.as_message());
                return Err(e.into());
            }
        };

        self.phase = Phase::Waiting {
            _timer: timer,
            signal,
        };
        self.publish(EventKind::BackoffScheduled, |ev| ev.with_delay(delay));
        Ok(())
    }

    fn fail(&mut self, kind: EventKind, reason: String) {
        self.phase = Phase::Errored;
        self.publish(kind, |ev| ev.with_reason(reason));
    }

    fn poll_cancelled(&mut self, cx: &mut Context<'_>) -> bool {
        match self.cancellation.as_mut() {
            Some(fut) => fut.as_mut().poll(cx).is_ready(),
            None => false,
        }
    }
}

impl<S: Source> Stream for RepeatWithBackoff<S> {
    type Item = Result<SourceOk<S>, RepeatError<SourceErr<S>>>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        if this.state().is_terminal() {
            return Poll::Ready(None);
        }
        if this.poll_cancelled(cx) {
            this.cancel();
            return Poll::Ready(None);
        }

        loop {
            let step = match &mut this.phase {
                Phase::Idle => Step::Start,
                Phase::Attempting(stream) => match stream.as_mut().try_poll_next(cx) {
                    Poll::Pending => return Poll::Pending,
                    Poll::Ready(Some(Ok(v))) => return Poll::Ready(Some(Ok(v))),
                    Poll::Ready(Some(Err(e))) => Step::Failed(e),
                    Poll::Ready(None) => Step::Finished,
                },
                Phase::Waiting { signal, .. } => match signal.poll_fired(cx) {
                    Poll::Pending => return Poll::Pending,
                    Poll::Ready(()) => Step::Start,
                },
                Phase::Completed | Phase::Errored | Phase::Cancelled => {
                    return Poll::Ready(None);
                }
            };

            match step {
                Step::Start => {
                    if !this.start_attempt() {
                        return Poll::Ready(None);
                    }
                }
                Step::Finished => {
                    this.publish(EventKind::AttemptCompleted, |ev| ev);
                    if !this.shared.budget.allows(this.attempts) {
                        this.phase = Phase::Completed;
                        this.publish(EventKind::RepeatExhausted, |ev| ev);
                        return Poll::Ready(None);
                    }
                    if let Err(e) = this.arm_next() {
                        return Poll::Ready(Some(Err(e)));
                    }
                }
                Step::Failed(e) => {
                    this.phase = Phase::Errored;
                    this.publish(EventKind::AttemptFailed, |ev| {
                        ev.with_reason(format!("upstream {}", std::any::type_name::<SourceErr<S>>()))
                    });
                    return Poll::Ready(Some(Err(RepeatError::Upstream(e))));
                }
            }
        }
    }
}

impl<S: Source> Drop for RepeatWithBackoff<S> {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::repeater::BackoffRepeater;
    use crate::events::Bus;
    use crate::policies::{BackoffPolicy, SecondsFn};
    use crate::scheduler::{TokioScheduler, VirtualScheduler};
    use crate::sources::SourceFn;
    use crate::testing::{Notification, TestSubscriber};
    use futures::channel::mpsc;
    use futures::{StreamExt, stream};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;

    type Items = stream::Iter<std::vec::IntoIter<Result<u32, std::io::Error>>>;

    /// Source whose every attempt yields one value (its 1-based call number) and completes.
    fn ticks(calls: &Arc<AtomicU32>) -> SourceFn<impl Fn() -> Items + Send + Sync + 'static> {
        let calls = Arc::clone(calls);
        SourceFn::new("ticks", move || {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            stream::iter(vec![Ok(n)])
        })
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    #[test]
    fn test_one_day_of_default_backoff_is_486_attempts() {
        let scheduler = VirtualScheduler::new();
        let calls = Arc::new(AtomicU32::new(0));
        let repeater = BackoffRepeater::builder(ticks(&calls))
            .with_scheduler(scheduler.clone())
            .build()
            .unwrap();

        let mut sub = TestSubscriber::subscribe(&scheduler, &repeater);
        sub.advance_by(secs(24 * 60 * 60));

        assert_eq!(calls.load(Ordering::SeqCst), 486);
        assert_eq!(sub.values().len(), 486);
        assert!(!sub.is_completed());
    }

    #[test]
    fn test_repeat_count_bounds_attempts() {
        for count in [0u32, 1, 5, 42] {
            let scheduler = VirtualScheduler::new();
            let calls = Arc::new(AtomicU32::new(0));
            let repeater = BackoffRepeater::builder(ticks(&calls))
                .with_repeat_count(count)
                .with_scheduler(scheduler.clone())
                .build()
                .unwrap();

            let mut sub = TestSubscriber::subscribe(&scheduler, &repeater);
            sub.advance_until_empty();

            assert_eq!(calls.load(Ordering::SeqCst), count, "count={count}");
            assert_eq!(sub.values().len(), count as usize);
            assert!(sub.is_completed());
            assert_eq!(scheduler.pending(), 0);
        }
    }

    #[test]
    fn test_zero_repeat_count_completes_at_once() {
        let scheduler = VirtualScheduler::new();
        let calls = Arc::new(AtomicU32::new(0));
        let repeater = BackoffRepeater::builder(ticks(&calls))
            .with_repeat_count(0)
            .with_scheduler(scheduler.clone())
            .build()
            .unwrap();

        let sub = TestSubscriber::subscribe(&scheduler, &repeater);

        assert_eq!(sub.completed_at(), Some(Duration::ZERO));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_no_delay_after_final_attempt() {
        let scheduler = VirtualScheduler::new();
        let calls = Arc::new(AtomicU32::new(0));
        let repeater = BackoffRepeater::builder(ticks(&calls))
            .with_repeat_count(3)
            .with_scheduler(scheduler.clone())
            .build()
            .unwrap();

        let mut sub = TestSubscriber::subscribe(&scheduler, &repeater);
        sub.advance_until_empty();

        // 2s + 4s, and nothing armed after the third attempt.
        assert_eq!(sub.completed_at(), Some(secs(6)));
        assert_eq!(scheduler.now(), secs(6));
    }

    #[test]
    fn test_default_strategy_boundaries() {
        let scheduler = VirtualScheduler::new();
        let calls = Arc::new(AtomicU32::new(0));
        let repeater = BackoffRepeater::builder(ticks(&calls))
            .with_scheduler(scheduler.clone())
            .build()
            .unwrap();

        let mut sub = TestSubscriber::subscribe(&scheduler, &repeater);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let mut expected = 1;
        for exp in 1..=7u32 {
            sub.advance_by(secs(1 << exp) - ms(1));
            assert_eq!(calls.load(Ordering::SeqCst), expected, "before 2^{exp}s");
            sub.advance_by(ms(1));
            expected += 1;
            assert_eq!(calls.load(Ordering::SeqCst), expected, "at 2^{exp}s");
        }
        for round in 0..5 {
            sub.advance_by(secs(180) - ms(1));
            assert_eq!(calls.load(Ordering::SeqCst), expected, "before cap #{round}");
            sub.advance_by(ms(1));
            expected += 1;
            assert_eq!(calls.load(Ordering::SeqCst), expected, "at cap #{round}");
        }
    }

    #[test]
    fn test_custom_strategy_boundaries() {
        let scheduler = VirtualScheduler::new();
        let calls = Arc::new(AtomicU32::new(0));
        let repeater = BackoffRepeater::builder(ticks(&calls))
            .with_strategy_fn(|n| secs(u64::from(n)))
            .with_scheduler(scheduler.clone())
            .build()
            .unwrap();

        let mut sub = TestSubscriber::subscribe(&scheduler, &repeater);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        for (step, before) in [(1u32, 999u64), (2, 1999), (3, 2999)] {
            sub.advance_by(ms(before));
            assert_eq!(calls.load(Ordering::SeqCst), step);
            sub.advance_by(ms(1));
            assert_eq!(calls.load(Ordering::SeqCst), step + 1);
        }

        let times: Vec<_> = sub.records().iter().map(|r| r.at).collect();
        assert_eq!(times, vec![secs(0), secs(1), secs(3), secs(6)]);
    }

    #[test]
    fn test_values_forwarded_in_order() {
        let scheduler = VirtualScheduler::new();
        let repeater = BackoffRepeater::builder(SourceFn::new("abc", || {
            stream::iter(vec![Ok::<_, std::io::Error>('a'), Ok('b'), Ok('c')])
        }))
        .with_repeat_count(2)
        .with_scheduler(scheduler.clone())
        .build()
        .unwrap();

        let mut sub = TestSubscriber::subscribe(&scheduler, &repeater);
        sub.advance_until_empty();

        assert_eq!(sub.values(), vec![&'a', &'b', &'c', &'a', &'b', &'c']);
    }

    #[test]
    fn test_cancel_mid_delay() {
        let scheduler = VirtualScheduler::new();
        let calls = Arc::new(AtomicU32::new(0));
        let repeater = BackoffRepeater::builder(ticks(&calls))
            .with_scheduler(scheduler.clone())
            .build()
            .unwrap();

        let mut sub = TestSubscriber::subscribe(&scheduler, &repeater);
        assert_eq!(scheduler.pending(), 1);

        sub.advance_by(ms(1500));
        sub.unsubscribe();
        assert_eq!(scheduler.pending(), 0);

        sub.advance_by(secs(60));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(sub.values().len(), 1);
        assert!(!sub.is_completed());
    }

    #[test]
    fn test_cancel_mid_attempt() {
        let scheduler = VirtualScheduler::new();
        let calls = Arc::new(AtomicU32::new(0));
        let senders = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&senders);
        let counter = Arc::clone(&calls);
        let repeater = BackoffRepeater::builder(SourceFn::new("open-ended", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            let (tx, rx) = mpsc::unbounded::<Result<u32, std::io::Error>>();
            sink.lock().unwrap().push(tx);
            rx
        }))
        .with_scheduler(scheduler.clone())
        .build()
        .unwrap();

        let mut stream = repeater.open();
        assert_eq!(stream.state(), RepeatState::Idle);
        let waker = futures::task::noop_waker();
        let mut cx = Context::from_waker(&waker);
        assert!(Pin::new(&mut stream).poll_next(&mut cx).is_pending());
        assert_eq!(stream.state(), RepeatState::Attempting(1));

        stream.cancel();
        stream.cancel();
        assert_eq!(stream.state(), RepeatState::Cancelled);
        assert!(senders.lock().unwrap()[0].is_closed());
        assert!(matches!(
            Pin::new(&mut stream).poll_next(&mut cx),
            Poll::Ready(None)
        ));
        assert_eq!(scheduler.pending(), 0);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_upstream_error_is_terminal() {
        let scheduler = VirtualScheduler::new();
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        let repeater = BackoffRepeater::builder(SourceFn::new("flaky", move || {
            let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
            let item = if n == 2 {
                Err(std::io::Error::other("boom"))
            } else {
                Ok(n)
            };
            stream::iter(vec![item])
        }))
        .with_repeat_count(10)
        .with_scheduler(scheduler.clone())
        .build()
        .unwrap();

        let mut sub = TestSubscriber::subscribe(&scheduler, &repeater);
        sub.advance_until_empty();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(sub.values(), vec![&1]);
        let errors: Vec<_> = sub
            .records()
            .iter()
            .filter(|r| matches!(r.notification, Notification::Error(_)))
            .collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].at, secs(2));
        assert_eq!(sub.error().map(|e| e.to_string()).as_deref(), Some("boom"));
        assert!(!sub.is_completed());
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_negative_delay_fails_fast() {
        let scheduler = VirtualScheduler::new();
        let calls = Arc::new(AtomicU32::new(0));
        let repeater = BackoffRepeater::builder(ticks(&calls))
            .with_strategy(SecondsFn::new(|n| 1.0 - f64::from(n)))
            .with_scheduler(scheduler.clone())
            .build()
            .unwrap();

        let mut sub = TestSubscriber::subscribe(&scheduler, &repeater);
        sub.advance_until_empty();

        // strategy(1) = 0s is fine, strategy(2) = -1s is not.
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        let err = sub.error().unwrap();
        assert_eq!(err.as_label(), "repeat_validation");
        assert!(matches!(
            err,
            RepeatError::Validation(crate::error::ValidationError::NegativeDelay { attempt: 2, .. })
        ));
    }

    #[test]
    fn test_external_token_cancels() {
        let scheduler = VirtualScheduler::new();
        let calls = Arc::new(AtomicU32::new(0));
        let token = CancellationToken::new();
        let repeater = BackoffRepeater::builder(ticks(&calls))
            .with_scheduler(scheduler.clone())
            .with_cancellation(token.clone())
            .build()
            .unwrap();

        let mut sub = TestSubscriber::subscribe(&scheduler, &repeater);
        sub.advance_by(secs(2));
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        token.cancel();
        sub.advance_by(secs(3600));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(scheduler.pending(), 0);

        // New subscriptions observe the cancelled token too.
        let late = TestSubscriber::subscribe(&scheduler, &repeater);
        assert!(late.values().is_empty());
        assert!(late.is_completed());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_events_published() {
        let scheduler = VirtualScheduler::new();
        let calls = Arc::new(AtomicU32::new(0));
        let bus = Bus::default();
        let mut rx = bus.subscribe();
        let repeater = BackoffRepeater::builder(ticks(&calls))
            .with_repeat_count(2)
            .with_scheduler(scheduler.clone())
            .with_bus(bus.clone())
            .build()
            .unwrap();

        let mut sub = TestSubscriber::subscribe(&scheduler, &repeater);
        sub.advance_until_empty();

        let mut kinds = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            assert_eq!(ev.source.as_deref(), Some("ticks"));
            if ev.kind == EventKind::BackoffScheduled {
                assert_eq!(ev.attempt, Some(1));
                assert_eq!(ev.delay(), Some(secs(2)));
            }
            kinds.push(ev.kind);
        }
        assert_eq!(
            kinds,
            vec![
                EventKind::AttemptStarting,
                EventKind::AttemptCompleted,
                EventKind::BackoffScheduled,
                EventKind::AttemptStarting,
                EventKind::AttemptCompleted,
                EventKind::RepeatExhausted,
            ]
        );
    }

    #[test]
    fn test_drop_publishes_cancelled() {
        let scheduler = VirtualScheduler::new();
        let calls = Arc::new(AtomicU32::new(0));
        let bus = Bus::default();
        let mut rx = bus.subscribe();
        let repeater = BackoffRepeater::builder(ticks(&calls))
            .with_scheduler(scheduler.clone())
            .with_bus(bus)
            .build()
            .unwrap();

        let sub = TestSubscriber::subscribe(&scheduler, &repeater);
        drop(sub);

        let mut last = None;
        while let Ok(ev) = rx.try_recv() {
            last = Some(ev);
        }
        let last = last.unwrap();
        assert_eq!(last.kind, EventKind::RepeatCancelled);
        assert_eq!(last.attempt, Some(1));
        assert_eq!(scheduler.pending(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokio_scheduler_waits_between_attempts() {
        let calls = Arc::new(AtomicU32::new(0));
        let repeater = BackoffRepeater::builder(ticks(&calls))
            .with_repeat_count(3)
            .with_scheduler(TokioScheduler::new())
            .build()
            .unwrap();

        let started = tokio::time::Instant::now();
        let items: Vec<_> = repeater.open().collect().await;

        assert_eq!(items.len(), 3);
        assert!(items.iter().all(|r| r.is_ok()));
        let elapsed = started.elapsed();
        assert!(elapsed >= secs(6), "elapsed {elapsed:?}");
        assert!(elapsed < secs(6) + ms(50), "elapsed {elapsed:?}");
    }

    #[test]
    fn test_tokio_scheduler_without_runtime_errors() {
        let calls = Arc::new(AtomicU32::new(0));
        let repeater = BackoffRepeater::builder(ticks(&calls))
            .with_repeat_count(2)
            .build()
            .unwrap();

        let items: Vec<_> = futures::executor::block_on(repeater.open().collect());

        assert_eq!(items.len(), 2);
        assert!(items[0].is_ok());
        assert!(matches!(items[1], Err(RepeatError::Scheduler(_))));
    }

    #[test]
    fn test_scheduler_refusal_publishes_scheduler_failed() {
        let calls = Arc::new(AtomicU32::new(0));
        let bus = Bus::default();
        let mut rx = bus.subscribe();
        let repeater = BackoffRepeater::builder(ticks(&calls))
            .with_repeat_count(2)
            .with_bus(bus.clone())
            .build()
            .unwrap();

        let items: Vec<_> = futures::executor::block_on(repeater.open().collect());
        assert_eq!(items[1].as_ref().err().map(|e| e.as_label()), Some("repeat_scheduler"));

        let mut last = None;
        while let Ok(ev) = rx.try_recv() {
            assert_ne!(ev.kind, EventKind::ValidationFailed);
            last = Some(ev);
        }
        let last = last.unwrap();
        assert_eq!(last.kind, EventKind::SchedulerFailed);
        assert!(last.reason.as_deref().unwrap().starts_with("no runtime"));
        assert!(last.is_terminal());
    }

    #[test]
    fn test_zero_first_delay_survives_exponent_overflow() {
        let scheduler = VirtualScheduler::new();
        let calls = Arc::new(AtomicU32::new(0));
        let repeater = BackoffRepeater::builder(ticks(&calls))
            .with_repeat_count(2000)
            .with_strategy(BackoffPolicy {
                first: Duration::ZERO,
                max: secs(1),
                factor: 2.0,
            })
            .with_scheduler(scheduler.clone())
            .build()
            .unwrap();

        let mut sub = TestSubscriber::subscribe(&scheduler, &repeater);
        sub.advance_until_empty();

        assert!(sub.error().is_none());
        assert_eq!(sub.values().len(), 2000);
        assert!(sub.is_completed());
        assert_eq!(scheduler.now(), Duration::ZERO);
    }

    #[test]
    fn test_cancel_before_first_poll() {
        let scheduler = VirtualScheduler::new();
        let calls = Arc::new(AtomicU32::new(0));
        let repeater = BackoffRepeater::builder(ticks(&calls))
            .with_scheduler(scheduler.clone())
            .build()
            .unwrap();

        let mut stream = repeater.open();
        assert_eq!(stream.state(), RepeatState::Idle);
        stream.cancel();
        assert_eq!(stream.state(), RepeatState::Cancelled);

        let waker = futures::task::noop_waker();
        let mut cx = Context::from_waker(&waker);
        assert!(matches!(
            Pin::new(&mut stream).poll_next(&mut cx),
            Poll::Ready(None)
        ));
        assert_eq!(stream.attempts(), 0);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(scheduler.pending(), 0);
    }
}
