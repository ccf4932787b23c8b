//! Repeater core: configuration, builder and the per-subscription state machine.
//!
//! The public API from this module is [`BackoffRepeater`] (the composed
//! source), [`RepeatWithBackoff`] (one subscription) and their configuration.
//!
//! Internal modules:
//! - [`config`]: defaults for repeat count, strategy and scheduler;
//! - [`builder`]: fluent construction and validation;
//! - [`repeater`]: the composed source, shared by all subscriptions;
//! - [`stream`]: attempt counting, delay evaluation, timers, cancellation;
//! - [`signal`]: timer-fired flag bridging scheduler callbacks to wakers.

mod builder;
mod config;
mod repeater;
mod signal;
mod stream;

pub use builder::BackoffRepeaterBuilder;
pub use config::RepeatConfig;
pub use repeater::{BackoffRepeater, repeat_with_backoff};
pub use stream::{RepeatState, RepeatWithBackoff};
