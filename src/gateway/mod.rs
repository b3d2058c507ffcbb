//! Summarizer and its builder

mod builder;
mod summarizer;

pub use builder::{Termsum, TermsumBuilder};
pub use summarizer::{DEFAULT_MODEL, Summarizer, SummarizerConfig};
