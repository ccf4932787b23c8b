//! # Function-backed source (`SourceFn`)
//!
//! [`SourceFn`] wraps a closure `F: Fn() -> St`, producing a fresh stream per
//! [`open`](crate::Source::open). Nothing is cached between calls.
//!
//! ## Concurrency semantics
//! - Each call to `open` creates a **new** stream that owns its state.
//! - No hidden mutation between attempts; if shared state is needed, use
//!   `Arc<...>` explicitly inside the closure.
//!
//! ## Example
//! ```rust
//! use futures::stream;
//! use backoff_repeat::{Source, SourceFn};
//!
//! let s = SourceFn::new("numbers", || stream::iter([Ok::<_, std::io::Error>(1), Ok(2)]));
//! assert_eq!(s.name(), "numbers");
//! ```

use std::borrow::Cow;
use std::sync::Arc;

use futures::TryStream;

use crate::sources::source::Source;

/// Shared handle to a source.
pub type SourceRef<St> = Arc<dyn Source<Stream = St>>;

/// Function-backed source implementation.
///
/// Wraps a closure that *creates* a new stream per attempt.
#[derive(Debug)]
pub struct SourceFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> SourceFn<F> {
    /// Creates a new function-backed source.
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the source and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

impl<F, St> Source for SourceFn<F>
where
    F: Fn() -> St + Send + Sync + 'static, // Fn, not FnMut
    St: TryStream,
{
    type Stream = St;

    fn name(&self) -> &str {
        &self.name
    }

    fn open(&self) -> St {
        (self.f)()
    }
}

impl<S: Source + ?Sized> Source for Arc<S> {
    type Stream = S::Stream;

    fn name(&self) -> &str {
        (**self).name()
    }

    fn open(&self) -> Self::Stream {
        (**self).open()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::{StreamExt, executor::block_on, stream};
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_open_creates_fresh_stream_each_time() {
        let opened = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&opened);
        let source = SourceFn::new("fresh", move || {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            stream::iter(vec![Ok::<_, std::io::Error>(n)])
        });

        let first: Vec<_> = block_on(source.open().collect());
        let second: Vec<_> = block_on(source.open().collect());

        assert_eq!(first.len(), 1);
        assert_eq!(first[0].as_ref().ok(), Some(&0));
        assert_eq!(second[0].as_ref().ok(), Some(&1));
        assert_eq!(opened.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_arc_forwards() {
        let source = SourceFn::arc("shared", || stream::empty::<Result<(), std::io::Error>>());
        assert_eq!(Source::name(&source), "shared");
    }
}
