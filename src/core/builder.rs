use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::{
    core::{config::RepeatConfig, repeater::BackoffRepeater, repeater::Shared},
    error::ValidationError,
    events::Bus,
    policies::{DelayStrategy, StrategyFn, StrategyRef},
    scheduler::{Scheduler, SchedulerRef},
    sources::Source,
};

/// Builder for constructing a [`BackoffRepeater`] with optional features.
///
/// Starts from [`RepeatConfig::default()`]; every setter overrides one knob.
pub struct BackoffRepeaterBuilder<S> {
    source: S,
    cfg: RepeatConfig,
    name: Option<Cow<'static, str>>,
    bus: Option<Bus>,
    token: Option<CancellationToken>,
}

impl<S: Source> BackoffRepeaterBuilder<S> {
    /// Creates a new builder around `source` with the default configuration.
    pub fn new(source: S) -> Self {
        Self {
            source,
            cfg: RepeatConfig::default(),
            name: None,
            bus: None,
            token: None,
        }
    }

    /// Replaces the whole configuration.
    pub fn with_config(mut self, cfg: RepeatConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Caps the total number of attempts (the first one included).
    ///
    /// `0` completes every subscription immediately without opening the source.
    pub fn with_repeat_count(mut self, count: u32) -> Self {
        self.cfg.repeat_count = Some(count);
        self
    }

    /// Repeats until cancelled (the default).
    pub fn unbounded(mut self) -> Self {
        self.cfg.repeat_count = None;
        self
    }

    /// Sets the delay strategy.
    pub fn with_strategy(mut self, strategy: impl DelayStrategy) -> Self {
        self.cfg.strategy = Arc::new(strategy);
        self
    }

    /// Sets an already shared delay strategy.
    pub fn with_strategy_ref(mut self, strategy: StrategyRef) -> Self {
        self.cfg.strategy = strategy;
        self
    }

    /// Sets the delay strategy from a closure.
    pub fn with_strategy_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(u32) -> Duration + Send + Sync + 'static,
    {
        self.cfg.strategy = StrategyFn::arc(f);
        self
    }

    /// Sets the time source.
    pub fn with_scheduler(mut self, scheduler: impl Scheduler) -> Self {
        self.cfg.scheduler = Arc::new(scheduler);
        self
    }

    /// Sets an already shared time source.
    pub fn with_scheduler_ref(mut self, scheduler: SchedulerRef) -> Self {
        self.cfg.scheduler = scheduler;
        self
    }

    /// Overrides the name used in events (defaults to the source's name).
    pub fn with_name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Publishes lifecycle events of every subscription to `bus`.
    pub fn with_bus(mut self, bus: Bus) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Cancels every subscription once `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.token = Some(token);
        self
    }

    /// Validates the strategy and builds the repeater.
    ///
    /// # Errors
    /// [`ValidationError::InvalidPolicy`] when the strategy's parameters can
    /// never produce a valid delay.
    pub fn build(self) -> Result<BackoffRepeater<S>, ValidationError> {
        self.cfg.strategy.validate()?;

        let name: Arc<str> = match self.name {
            Some(n) => Arc::from(n.as_ref()),
            None => Arc::from(self.source.name()),
        };
        Ok(BackoffRepeater::from_shared(Shared {
            budget: self.cfg.budget(),
            strategy: self.cfg.strategy,
            scheduler: self.cfg.scheduler,
            source: self.source,
            name,
            bus: self.bus,
            token: self.token,
        }))
    }
}
