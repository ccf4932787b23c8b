//! # Event subscribers.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`]
//! fan-out and (with the `logging` feature) the [`LogWriter`] printer.
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   RepeatWithBackoff ── publish(Event) ──► Bus ──► SubscriberSet::listen()
//!                                                          │
//!                                                     emit(&Event)
//!                                                ┌─────────┼─────────┐
//!                                                ▼         ▼         ▼
//!                                            LogWriter  Metrics   Custom ...
//! ```
//!
//! ## Wiring
//! ```rust
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//! use backoff_repeat::{Bus, Subscribe, SubscriberSet};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let bus = Bus::default();
//! let subs: Vec<Arc<dyn Subscribe>> = Vec::new();
//! let set = Arc::new(SubscriberSet::new(subs, bus.clone()));
//! let token = CancellationToken::new();
//! let listener = Arc::clone(&set).listen(token.clone());
//!
//! // build repeaters with `.with_bus(bus.clone())` ...
//!
//! token.cancel();
//! listener.await.unwrap();
//! # }
//! ```

#[cfg(feature = "logging")]
mod log;
mod set;
mod subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
