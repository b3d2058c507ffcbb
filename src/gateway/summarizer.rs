//! Summarizer - resolves one request into a summary

use std::sync::Arc;
use std::time::Instant;

use tracing::{error, info};

use crate::cache::ResponseCache;
use crate::input::validate_text;
use crate::prompt::{PromptLimits, build_prompts};
use crate::providers::{ChatTransport, TransportResponse};
use crate::styles::StyleCatalog;
use crate::telemetry;
use crate::types::{CompletionRequest, CompletionResponse, ErrorEnvelope, Message, SummarizeRequest};
use crate::{Result, TermsumError};

/// Default upstream model.
pub const DEFAULT_MODEL: &str = "sonar-pro";

/// Longest upstream error body echoed into an error message.
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Fixed request parameters sent with every completion.
#[derive(Debug, Clone, PartialEq)]
pub struct SummarizerConfig {
    pub model: String,
    pub temperature: f32,
    pub frequency_penalty: f32,
    pub prompt_limits: PromptLimits,
    /// Requests shorter than this (after trimming) are rejected by
    /// [`Summarizer::summarize_request`].
    pub min_text_chars: usize,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.1,
            frequency_penalty: 0.5,
            prompt_limits: PromptLimits::default(),
            min_text_chars: crate::input::DEFAULT_MIN_TEXT_CHARS,
        }
    }
}

/// Orchestrates style lookup, caching, prompt construction and the
/// upstream call.
///
/// The cache and transport are injected; the transport is expected to
/// handle retries itself, so a failed call is reported once.
pub struct Summarizer {
    api_key: Option<String>,
    catalog: Arc<StyleCatalog>,
    cache: Arc<ResponseCache>,
    transport: Arc<dyn ChatTransport>,
    config: SummarizerConfig,
}

impl Summarizer {
    pub(crate) fn new(
        api_key: Option<String>,
        catalog: Arc<StyleCatalog>,
        cache: Arc<ResponseCache>,
        transport: Arc<dyn ChatTransport>,
        config: SummarizerConfig,
    ) -> Self {
        Self {
            api_key,
            catalog,
            cache,
            transport,
            config,
        }
    }

    pub fn catalog(&self) -> &StyleCatalog {
        &self.catalog
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    pub fn config(&self) -> &SummarizerConfig {
        &self.config
    }

    /// Validate a caller request, then summarize it.
    ///
    /// Too-short text is rejected before the cache or the network is
    /// touched.
    pub async fn summarize_request(&self, request: &SummarizeRequest) -> Result<String> {
        validate_text(&request.text, self.config.min_text_chars)?;
        self.summarize(
            &request.text,
            request.style_id(),
            request.custom_instruction_str(),
        )
        .await
    }

    /// Produce a summary of `text` in the given style.
    ///
    /// Fails with `Configuration` before anything else when no credential
    /// is set. A cache hit returns without any network call.
    pub async fn summarize(
        &self,
        text: &str,
        style_id: &str,
        custom_instruction: &str,
    ) -> Result<String> {
        let Some(api_key) = self.api_key.as_deref() else {
            error!(critical = true, "API key not configured");
            return Err(TermsumError::Configuration(
                "API key not configured".to_string(),
            ));
        };

        let style = self.catalog.lookup(style_id);
        let key = self.cache.key_for(text, style_id, custom_instruction);

        if let Some(summary) = self.cache.get(&key) {
            info!(%key, style = %style.id, "cache hit");
            record_request(&style.id, "cached");
            return Ok(summary);
        }

        let prompts = build_prompts(text, style, custom_instruction, self.config.prompt_limits);
        let request = CompletionRequest {
            model: self.config.model.clone(),
            messages: vec![Message::system(prompts.system), Message::user(prompts.user)],
            temperature: self.config.temperature,
            frequency_penalty: self.config.frequency_penalty,
            max_tokens: style.max_output_tokens,
        };

        info!(
            transport = self.transport.name(),
            model = %self.config.model,
            style = %style.id,
            "calling upstream"
        );
        let start = Instant::now();
        let outcome = self
            .transport
            .post_completion(api_key, &request)
            .await
            .and_then(parse_reply);
        metrics::histogram!(telemetry::REQUEST_DURATION_SECONDS, "style" => style.id.clone())
            .record(start.elapsed().as_secs_f64());

        match outcome {
            Ok(summary) => {
                self.cache.put(key, summary.clone());
                record_request(&style.id, "ok");
                Ok(summary)
            }
            Err(e) => {
                match &e {
                    TermsumError::Timeout(_) => error!(style = %style.id, "upstream timed out"),
                    _ => error!(style = %style.id, error = %e, "upstream call failed"),
                }
                record_request(&style.id, e.kind());
                Err(e)
            }
        }
    }
}

fn record_request(style: &str, status: &'static str) {
    metrics::counter!(
        telemetry::REQUESTS_TOTAL,
        "style" => style.to_owned(),
        "status" => status,
    )
    .increment(1);
}

/// Turn an upstream reply into the summary text.
fn parse_reply(reply: TransportResponse) -> Result<String> {
    if !reply.is_success() {
        return Err(TermsumError::remote(reply.status, error_message(&reply.body)));
    }
    let body: CompletionResponse = serde_json::from_str(&reply.body)?;
    body.into_first_content()
        .ok_or_else(|| TermsumError::transport("upstream returned no completion"))
}

/// Upstream error text: the `error.message` field when the body is the
/// usual JSON envelope, otherwise the (truncated) raw body.
fn error_message(body: &str) -> String {
    if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body)
        && !envelope.error.message.is_empty()
    {
        return envelope.error.message;
    }
    crate::prompt::truncate_chars(body.trim(), MAX_ERROR_BODY_CHARS).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_reply_takes_first_choice() {
        let body = r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":"first"}},{"index":1,"message":{"role":"assistant","content":"second"}}]}"#;
        let summary = parse_reply(TransportResponse::new(200, body)).unwrap();
        assert_eq!(summary, "first");
    }

    #[test]
    fn parse_reply_without_choices_is_remote_error() {
        let err = parse_reply(TransportResponse::new(200, r#"{"choices":[]}"#)).unwrap_err();
        assert!(matches!(err, TermsumError::Remote { status: None, .. }));
    }

    #[test]
    fn parse_reply_malformed_body_is_remote_error() {
        let err = parse_reply(TransportResponse::new(200, "<html>")).unwrap_err();
        assert!(matches!(err, TermsumError::Remote { .. }));
    }

    #[test]
    fn error_status_uses_envelope_message() {
        let body = r#"{"error":{"message":"Invalid model","type":"invalid_request_error"}}"#;
        let err = parse_reply(TransportResponse::new(400, body)).unwrap_err();
        match err {
            TermsumError::Remote { status, message } => {
                assert_eq!(status, Some(400));
                assert_eq!(message, "Invalid model");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn error_status_falls_back_to_raw_body() {
        let err = parse_reply(TransportResponse::new(502, "  Bad Gateway \n")).unwrap_err();
        match err {
            TermsumError::Remote { status, message } => {
                assert_eq!(status, Some(502));
                assert_eq!(message, "Bad Gateway");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
