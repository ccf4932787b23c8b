//! One-shot "timer fired" flag with waker registration.
//!
//! The scheduler callback calls [`TimerSignal::fire`]; the subscription
//! polls [`TimerSignal::poll_fired`] while waiting.

use std::sync::atomic::{AtomicBool, Ordering};
use std::task::{Context, Poll};

use futures::task::AtomicWaker;

#[derive(Default)]
pub(crate) struct TimerSignal {
    fired: AtomicBool,
    waker: AtomicWaker,
}

impl TimerSignal {
    pub(crate) fn fire(&self) {
        self.fired.store(true, Ordering::Release);
        self.waker.wake();
    }

    pub(crate) fn poll_fired(&self, cx: &mut Context<'_>) -> Poll<()> {
        if self.fired.load(Ordering::Acquire) {
            return Poll::Ready(());
        }
        self.waker.register(cx.waker());
        // Re-check: `fire` may have run between the load and the register.
        if self.fired.load(Ordering::Acquire) {
            Poll::Ready(())
        } else {
            Poll::Pending
        }
    }
}
