//! Transport trait for the chat-completion upstream.
//!
//! The [`Summarizer`](crate::Summarizer) talks to the upstream API only
//! through [`ChatTransport`]. Production uses
//! [`ResilientTransport`](super::ResilientTransport), which retries
//! transient failures internally; tests substitute counting or failing
//! mocks.
//!
//! # Error contract
//!
//! - An upstream reply of any status is `Ok(TransportResponse)`. Status
//!   interpretation belongs to the caller.
//! - A timed-out attempt is `Err(TermsumError::Timeout)`.
//! - Any other failure to obtain a reply is
//!   `Err(TermsumError::Remote { status: None, .. })`.
//!
//! Callers treat the transport as already resilient and never retry on
//! top of it.

use async_trait::async_trait;

use crate::Result;
use crate::types::CompletionRequest;

/// Raw upstream reply: status code and body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Delivers chat-completion requests to the upstream API.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Transport name for logging/debugging.
    fn name(&self) -> &str;

    /// POST `request` with bearer-token auth.
    async fn post_completion(
        &self,
        api_key: &str,
        request: &CompletionRequest,
    ) -> Result<TransportResponse>;
}
