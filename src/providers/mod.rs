//! Upstream transport: the chat-completion client and its retry policy.

pub mod perplexity;
pub mod retry;
pub mod traits;

pub use perplexity::{ResilientTransport, TransportConfig};
pub use retry::{AttemptOutcome, FailureKind, RetryBudget, RetryPolicy, with_retry};
pub use traits::{ChatTransport, TransportResponse};
