//! Termsum - plain-language summaries of legal documents
//!
//! Terms of service, privacy policies and contracts go in; a short
//! Portuguese (PT-PT) summary in one of several styles comes out. The text
//! is sent to a chat-completion API (Perplexity by default) through a
//! retrying transport, and answers are kept in a bounded FIFO cache so a
//! repeated request costs nothing.
//!
//! # Example
//!
//! ```rust,no_run
//! use termsum::{SummarizeRequest, Termsum};
//!
//! #[tokio::main]
//! async fn main() -> termsum::Result<()> {
//!     let summarizer = Termsum::builder()
//!         .api_key("pplx-your-key")
//!         .build()?;
//!
//!     let request = SummarizeRequest::new("We may sell your data to third parties without notice.")
//!         .style("riscos");
//!     let summary = summarizer.summarize_request(&request).await?;
//!
//!     println!("{summary}");
//!     Ok(())
//! }
//! ```
//!
//! The `server` feature (on by default) adds the `termsumd` HTTP daemon
//! and its [`server`] module.

pub mod cache;
pub mod error;
pub mod gateway;
pub mod input;
pub mod prompt;
pub mod providers;
#[cfg(feature = "server")]
pub mod server;
pub mod styles;
pub mod telemetry;
pub mod types;
pub mod version;

// Re-export main types at crate root
pub use cache::{CacheConfig, CacheKey, ResponseCache};
pub use error::{Result, TermsumError};
pub use gateway::{DEFAULT_MODEL, Summarizer, SummarizerConfig, Termsum, TermsumBuilder};
pub use input::InputLimits;
pub use prompt::{PromptLimits, Prompts, build_prompts};
pub use providers::{ChatTransport, ResilientTransport, RetryPolicy, TransportConfig, TransportResponse};
pub use styles::{DEFAULT_STYLE, StyleCatalog, StyleEntry};
pub use types::{CompletionRequest, Message, Role, SummarizeRequest};
pub use version::{BuildInfo, PKG_VERSION, version_string};
