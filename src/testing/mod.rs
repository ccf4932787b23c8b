//! Virtual-time test harness.
//!
//! Pair a [`VirtualScheduler`](crate::VirtualScheduler) with a
//! [`TestSubscriber`] to check exactly when a repeating source emits:
//!
//! ```rust
//! use std::time::Duration;
//! use futures::stream;
//! use backoff_repeat::{BackoffRepeater, SourceFn, TestSubscriber, VirtualScheduler};
//!
//! let scheduler = VirtualScheduler::new();
//! let repeater = BackoffRepeater::builder(SourceFn::new("tick", || {
//!         stream::iter([Ok::<_, std::io::Error>(())])
//!     }))
//!     .with_scheduler(scheduler.clone())
//!     .build()
//!     .unwrap();
//!
//! let mut sub = TestSubscriber::subscribe(&scheduler, &repeater);
//! sub.advance_by(Duration::from_millis(1999));
//! assert_eq!(sub.values().len(), 1);
//! sub.advance_by(Duration::from_millis(1));
//! assert_eq!(sub.values().len(), 2);
//! ```

mod subscriber;

pub use subscriber::{Notification, Recorded, TestSubscriber};
