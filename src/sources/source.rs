//! # Source abstraction.
//!
//! A [`Source`] is a factory of event streams: every call to
//! [`open`](Source::open) yields a **fresh** stream that has not been polled
//! yet. The repeater opens one stream per attempt and never reuses one.
//!
//! Streams use the `futures::TryStream` vocabulary:
//! - `Some(Ok(value))`: a value;
//! - `Some(Err(error))`: a failure, terminal for the repeater;
//! - `None`: natural end of the attempt.

use futures::TryStream;

/// Producer of fresh event streams.
///
/// # Example
/// ```
/// use futures::stream::{self, Iter};
/// use std::vec::IntoIter;
/// use backoff_repeat::Source;
///
/// struct Ticks;
///
/// impl Source for Ticks {
///     type Stream = Iter<IntoIter<Result<u32, std::io::Error>>>;
///
///     fn name(&self) -> &str { "ticks" }
///
///     fn open(&self) -> Self::Stream {
///         stream::iter(vec![Ok(1), Ok(2)])
///     }
/// }
/// ```
pub trait Source: Send + Sync + 'static {
    /// Stream produced for one attempt.
    type Stream: TryStream;

    /// Returns a stable, human-readable source name (used in events).
    fn name(&self) -> &str;

    /// Creates a new stream instance.
    ///
    /// Implementations must not hand out shared state between instances;
    /// use `Arc<...>` explicitly inside the factory if sharing is intended.
    fn open(&self) -> Self::Stream;
}
