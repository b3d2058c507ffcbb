//! HTTP transport for the Perplexity chat-completion API.
//!
//! [`ResilientTransport`] issues the POST through reqwest and retries
//! transient failures according to a [`RetryPolicy`]. See:
//! <https://docs.perplexity.ai/api-reference/chat-completions-post>

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{CONNECTION, CONTENT_TYPE, HeaderMap, RETRY_AFTER, USER_AGENT};
use reqwest::{Client, Method};

use super::retry::{AttemptOutcome, FailureKind, RetryPolicy, with_retry};
use super::traits::{ChatTransport, TransportResponse};
use crate::error::TIMEOUT_MESSAGE;
use crate::types::CompletionRequest;
use crate::{Result, TermsumError};

/// Default chat-completion endpoint.
pub const DEFAULT_URL: &str = "https://api.perplexity.ai/chat/completions";

/// Default per-attempt timeout. Reasoning-capable models routinely take
/// far longer than typical HTTP defaults.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Default `User-Agent` header.
pub const DEFAULT_USER_AGENT: &str = "TermosClarosBot/1.0";

/// Connection settings for [`ResilientTransport`].
///
/// ```rust
/// # use termsum::TransportConfig;
/// # use std::time::Duration;
/// let config = TransportConfig::new()
///     .url("http://localhost:8080/chat/completions")
///     .timeout(Duration::from_secs(30))
///     .connection_close(false);
/// ```
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Chat-completion endpoint.
    pub url: String,
    /// Per-attempt timeout. Default: 120s.
    pub timeout: Duration,
    /// Send `Connection: close` so every attempt opens a fresh socket.
    /// Works around resets on reused connections. Default: true.
    pub connection_close: bool,
    /// `User-Agent` header value.
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            connection_close: true,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl TransportConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn connection_close(mut self, enabled: bool) -> Self {
        self.connection_close = enabled;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// reqwest-backed [`ChatTransport`] with bounded automatic retry.
///
/// Connection failures, read failures and responses with a retryable
/// status are retried with exponential backoff. 4xx responses and
/// timeouts are returned after a single attempt.
#[derive(Clone)]
pub struct ResilientTransport {
    http: Client,
    config: TransportConfig,
    policy: RetryPolicy,
}

impl ResilientTransport {
    /// Create a transport for the given endpoint settings and policy.
    pub fn new(config: TransportConfig, policy: RetryPolicy) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                TermsumError::Configuration(format!("failed to build HTTP client: {e}"))
            })?;
        Ok(Self {
            http,
            config,
            policy,
        })
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// One POST, classified for the retry loop.
    async fn attempt(
        &self,
        api_key: &str,
        request: &CompletionRequest,
    ) -> AttemptOutcome<TransportResponse> {
        let mut builder = self
            .http
            .post(&self.config.url)
            .bearer_auth(api_key)
            .header(CONTENT_TYPE, "application/json")
            .header(USER_AGENT, &self.config.user_agent)
            .json(request);
        if self.config.connection_close {
            builder = builder.header(CONNECTION, "close");
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => return classify_error(e),
        };

        let status = response.status().as_u16();
        let retry_after = parse_retry_after(response.headers());
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return classify_error(e),
        };

        let reply = TransportResponse { status, body };
        if self.policy.is_retryable_status(status) {
            AttemptOutcome::Transient {
                kind: FailureKind::Status(status),
                retry_after,
                fallback: Ok(reply),
            }
        } else {
            AttemptOutcome::Complete(Ok(reply))
        }
    }
}

#[async_trait]
impl ChatTransport for ResilientTransport {
    fn name(&self) -> &str {
        "perplexity"
    }

    async fn post_completion(
        &self,
        api_key: &str,
        request: &CompletionRequest,
    ) -> Result<TransportResponse> {
        with_retry(&self.policy, &Method::POST, || self.attempt(api_key, request)).await
    }
}

/// Map a reqwest failure onto the retry taxonomy.
///
/// Timeouts are terminal. Connect failures and mid-request failures are
/// transient and draw on their own sub-budgets.
fn classify_error(e: reqwest::Error) -> AttemptOutcome<TransportResponse> {
    if e.is_timeout() {
        return AttemptOutcome::Complete(Err(TermsumError::Timeout(TIMEOUT_MESSAGE.to_string())));
    }
    if e.is_builder() {
        return AttemptOutcome::Complete(Err(TermsumError::Configuration(format!(
            "invalid upstream request: {e}"
        ))));
    }
    let kind = if e.is_connect() {
        FailureKind::Connect
    } else {
        FailureKind::Read
    };
    AttemptOutcome::Transient {
        kind,
        retry_after: None,
        fallback: Err(TermsumError::transport(error_chain(&e))),
    }
}

/// reqwest's top-level message omits the cause ("error sending request");
/// append the source chain so logs show the reset/refusal.
fn error_chain(e: &reqwest::Error) -> String {
    let mut message = e.to_string();
    let mut source = std::error::Error::source(e);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// `Retry-After` in delta-seconds form. HTTP-date values are ignored.
fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}
