//! Builder for configuring summarizer instances

use std::sync::Arc;

use super::Summarizer;
use super::summarizer::SummarizerConfig;
use crate::Result;
use crate::cache::{CacheConfig, ResponseCache};
use crate::providers::{ChatTransport, ResilientTransport, RetryPolicy, TransportConfig};
use crate::styles::StyleCatalog;

/// Main entry point for creating summarizer instances.
pub struct Termsum;

impl Termsum {
    /// Create a new builder for configuring the summarizer.
    pub fn builder() -> TermsumBuilder {
        TermsumBuilder::new()
    }
}

/// Builder for configuring summarizer instances.
///
/// Without an explicit [`transport`](Self::transport), `build()` creates a
/// [`ResilientTransport`] from the upstream and retry settings. Without an
/// explicit [`cache`](Self::cache), a fresh [`ResponseCache`] is allocated.
pub struct TermsumBuilder {
    api_key: Option<String>,
    catalog: Option<StyleCatalog>,
    cache: Option<Arc<ResponseCache>>,
    cache_config: CacheConfig,
    transport: Option<Arc<dyn ChatTransport>>,
    upstream: TransportConfig,
    retry: RetryPolicy,
    config: SummarizerConfig,
}

impl TermsumBuilder {
    pub fn new() -> Self {
        Self {
            api_key: None,
            catalog: None,
            cache: None,
            cache_config: CacheConfig::default(),
            transport: None,
            upstream: TransportConfig::default(),
            retry: RetryPolicy::default(),
            config: SummarizerConfig::default(),
        }
    }

    /// Upstream API credential.
    ///
    /// Leaving it unset is not a build error; every summarize call then
    /// fails with a configuration error instead.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the credential from an `Option`, as loaded from secrets.
    pub fn api_key_opt(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    /// Replace the built-in style catalog.
    pub fn catalog(mut self, catalog: StyleCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Use an existing cache instance.
    pub fn cache(mut self, cache: Arc<ResponseCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Configure the cache allocated by `build()`.
    pub fn cache_config(mut self, config: CacheConfig) -> Self {
        self.cache_config = config;
        self
    }

    /// Use a custom transport instead of the default HTTP one.
    pub fn transport(mut self, transport: Arc<dyn ChatTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Endpoint settings for the default HTTP transport.
    pub fn upstream(mut self, config: TransportConfig) -> Self {
        self.upstream = config;
        self
    }

    /// Retry policy for the default HTTP transport.
    pub fn retry(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    /// Upstream model identifier.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.config.temperature = temperature;
        self
    }

    pub fn frequency_penalty(mut self, penalty: f32) -> Self {
        self.config.frequency_penalty = penalty;
        self
    }

    /// Maximum document characters embedded in the prompt.
    pub fn max_text_chars(mut self, chars: usize) -> Self {
        self.config.prompt_limits.max_text_chars = chars;
        self
    }

    /// Minimum trimmed length accepted by `summarize_request`.
    pub fn min_text_chars(mut self, chars: usize) -> Self {
        self.config.min_text_chars = chars;
        self
    }

    /// Build the summarizer.
    pub fn build(self) -> Result<Summarizer> {
        let transport: Arc<dyn ChatTransport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ResilientTransport::new(self.upstream, self.retry)?),
        };
        let cache = self
            .cache
            .unwrap_or_else(|| Arc::new(ResponseCache::new(&self.cache_config)));
        let catalog = Arc::new(self.catalog.unwrap_or_default());

        Ok(Summarizer::new(
            self.api_key,
            catalog,
            cache,
            transport,
            self.config,
        ))
    }
}

impl Default for TermsumBuilder {
    fn default() -> Self {
        Self::new()
    }
}
