//! Caching subsystem.
//!
//! - [`response::ResponseCache`]: bounded FIFO memo of generated summaries,
//!   keyed on [`CacheKey`]. Owned by the [`Summarizer`](crate::Summarizer)
//!   it serves. See the [`response`] module docs for eviction and
//!   concurrency semantics.

pub mod response;

pub use response::{CacheConfig, CacheKey, ResponseCache};
