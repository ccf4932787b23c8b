//! # Source abstractions.
//!
//! This module provides the source-related types:
//! - [`Source`] - trait for stream factories
//! - [`SourceFn`] - closure-backed source
//! - [`SourceRef`] - shared reference to a source (`Arc<dyn Source>`)

mod source;
mod source_fn;

pub use source::Source;
pub use source_fn::{SourceFn, SourceRef};
