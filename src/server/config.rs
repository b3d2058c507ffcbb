//! Configuration loading for termsumd.
//!
//! Configuration is loaded from TOML files with the following resolution order:
//! 1. `--config <path>` (CLI flag; must exist)
//! 2. `~/.termsum/config.toml` (user)
//! 3. `/etc/termsum/config.toml` (system)
//! 4. Built-in defaults
//!
//! Secrets are loaded separately with mandatory permission checks:
//! 1. `~/.termsum/secrets.toml` (user, must be 0600)
//! 2. `/etc/termsum/secrets.toml` (system, must be 0600)
//! 3. `PERPLEXITY_API_KEY` environment variable

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cache::CacheConfig;
use crate::input::{DEFAULT_MAX_PDF_PAGES, DEFAULT_MIN_TEXT_CHARS, InputLimits};
use crate::prompt::DEFAULT_MAX_TEXT_CHARS;
use crate::providers::perplexity::{DEFAULT_URL, DEFAULT_USER_AGENT};
use crate::providers::{RetryPolicy, TransportConfig};
use crate::{Result, TermsumBuilder, TermsumError};

/// Environment variable consulted when no secrets file provides a key.
pub const API_KEY_ENV_VAR: &str = "PERPLEXITY_API_KEY";

/// Server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub cache: CacheSection,
    #[serde(default)]
    pub limits: LimitsConfig,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address to bind to (default: 127.0.0.1:5000).
    #[serde(default = "default_address")]
    pub address: String,
    /// Largest accepted request body, uploads included (default: 20 MiB).
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
    /// Answer cross-origin requests from any origin (default: true).
    #[serde(default = "default_true")]
    pub cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            max_upload_bytes: default_max_upload_bytes(),
            cors: true,
        }
    }
}

fn default_address() -> String {
    "127.0.0.1:5000".to_string()
}

fn default_max_upload_bytes() -> usize {
    20 * 1024 * 1024
}

fn default_true() -> bool {
    true
}

/// Chat-completion endpoint and fixed request parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    #[serde(default = "default_url")]
    pub url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_frequency_penalty")]
    pub frequency_penalty: f32,
    /// Per-attempt timeout in seconds (default: 120).
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Send `Connection: close` on every attempt (default: true).
    #[serde(default = "default_true")]
    pub connection_close: bool,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            model: default_model(),
            temperature: default_temperature(),
            frequency_penalty: default_frequency_penalty(),
            request_timeout_secs: default_request_timeout(),
            connection_close: true,
            user_agent: default_user_agent(),
        }
    }
}

fn default_url() -> String {
    DEFAULT_URL.to_string()
}

fn default_model() -> String {
    crate::DEFAULT_MODEL.to_string()
}

fn default_temperature() -> f32 {
    0.1
}

fn default_frequency_penalty() -> f32 {
    0.5
}

fn default_request_timeout() -> u64 {
    120
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

/// Retry budgets and backoff for the upstream transport.
#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retries")]
    pub connect_retries: u32,
    #[serde(default = "default_retries")]
    pub read_retries: u32,
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,
    #[serde(default = "default_max_backoff_secs")]
    pub max_backoff_secs: u64,
    #[serde(default = "default_retry_statuses")]
    pub retry_statuses: Vec<u16>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_retries(),
            connect_retries: default_retries(),
            read_retries: default_retries(),
            backoff_base_ms: default_backoff_base_ms(),
            max_backoff_secs: default_max_backoff_secs(),
            retry_statuses: default_retry_statuses(),
        }
    }
}

fn default_retries() -> u32 {
    3
}

fn default_backoff_base_ms() -> u64 {
    1_000
}

fn default_max_backoff_secs() -> u64 {
    30
}

fn default_retry_statuses() -> Vec<u16> {
    vec![500, 502, 503, 504]
}

/// Response cache bounds.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheSection {
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,
    #[serde(default = "default_key_prefix_chars")]
    pub key_prefix_chars: usize,
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            capacity: default_cache_capacity(),
            key_prefix_chars: default_key_prefix_chars(),
        }
    }
}

fn default_cache_capacity() -> usize {
    50
}

fn default_key_prefix_chars() -> usize {
    5_000
}

/// Input size limits.
#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    #[serde(default = "default_max_text_chars")]
    pub max_text_chars: usize,
    #[serde(default = "default_min_text_chars")]
    pub min_text_chars: usize,
    #[serde(default = "default_max_pdf_pages")]
    pub max_pdf_pages: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_text_chars: default_max_text_chars(),
            min_text_chars: default_min_text_chars(),
            max_pdf_pages: default_max_pdf_pages(),
        }
    }
}

fn default_max_text_chars() -> usize {
    DEFAULT_MAX_TEXT_CHARS
}

fn default_min_text_chars() -> usize {
    DEFAULT_MIN_TEXT_CHARS
}

fn default_max_pdf_pages() -> usize {
    DEFAULT_MAX_PDF_PAGES
}

/// Secrets configuration (API keys).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Secrets {
    #[serde(default)]
    pub perplexity: Option<ApiKeySecret>,
}

/// A single API key secret.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiKeySecret {
    pub api_key: String,
}

impl Config {
    /// Load configuration from the standard locations.
    ///
    /// An explicit path that does not exist is an error; when no file is
    /// found in the standard locations the built-in defaults apply.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        match Self::resolve_config_path(explicit_path)? {
            Some(path) => Self::load_from_file(&path),
            None => Ok(Self::default()),
        }
    }

    /// Parse a specific config file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            TermsumError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            TermsumError::Configuration(format!("Failed to parse config file {path:?}: {e}"))
        })
    }

    /// Resolve the config file path.
    fn resolve_config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(Some(path.to_path_buf()));
            }
            return Err(TermsumError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".termsum").join("config.toml");
            if user_config.exists() {
                return Ok(Some(user_config));
            }
        }

        let system_config = PathBuf::from("/etc/termsum/config.toml");
        if system_config.exists() {
            return Ok(Some(system_config));
        }

        Ok(None)
    }

    pub fn transport_config(&self) -> TransportConfig {
        TransportConfig::new()
            .url(&self.upstream.url)
            .timeout(Duration::from_secs(self.upstream.request_timeout_secs))
            .connection_close(self.upstream.connection_close)
            .user_agent(&self.upstream.user_agent)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new()
            .max_retries(self.retry.max_retries)
            .connect_retries(self.retry.connect_retries)
            .read_retries(self.retry.read_retries)
            .backoff_base(Duration::from_millis(self.retry.backoff_base_ms))
            .max_backoff(Duration::from_secs(self.retry.max_backoff_secs))
            .retry_statuses(self.retry.retry_statuses.clone())
    }

    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig::new()
            .capacity(self.cache.capacity)
            .key_prefix_chars(self.cache.key_prefix_chars)
    }

    pub fn input_limits(&self) -> InputLimits {
        InputLimits {
            max_pdf_pages: self.limits.max_pdf_pages,
        }
    }

    /// A summarizer builder carrying every setting from this config.
    ///
    /// The API key is set separately from [`Secrets`].
    pub fn builder(&self) -> TermsumBuilder {
        crate::Termsum::builder()
            .upstream(self.transport_config())
            .retry(self.retry_policy())
            .cache_config(self.cache_config())
            .model(&self.upstream.model)
            .temperature(self.upstream.temperature)
            .frequency_penalty(self.upstream.frequency_penalty)
            .max_text_chars(self.limits.max_text_chars)
            .min_text_chars(self.limits.min_text_chars)
    }
}

impl Secrets {
    /// Load secrets from the standard locations with permission checks.
    ///
    /// Resolution order:
    /// 1. `~/.termsum/secrets.toml` (if exists, must be 0600)
    /// 2. `/etc/termsum/secrets.toml` (if exists, must be 0600)
    ///
    /// Returns empty secrets if no file exists (the key may come from the
    /// environment).
    pub fn load() -> Result<Self> {
        if let Some(home) = dirs::home_dir() {
            let user_secrets = home.join(".termsum").join("secrets.toml");
            if user_secrets.exists() {
                return Self::load_from_file(&user_secrets);
            }
        }

        let system_secrets = PathBuf::from("/etc/termsum/secrets.toml");
        if system_secrets.exists() {
            return Self::load_from_file(&system_secrets);
        }

        Ok(Secrets::default())
    }

    /// Parse a secrets file after checking its permissions.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        Self::check_permissions(path)?;
        let content = fs::read_to_string(path).map_err(|e| {
            TermsumError::Configuration(format!("Failed to read secrets file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            TermsumError::Configuration(format!("Failed to parse secrets file {path:?}: {e}"))
        })
    }

    /// Check that the secrets file has secure permissions (0600 or 0400).
    #[cfg(unix)]
    fn check_permissions(path: &Path) -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let metadata = fs::metadata(path).map_err(|e| {
            TermsumError::Configuration(format!("Failed to stat secrets file {path:?}: {e}"))
        })?;

        let mode = metadata.permissions().mode();
        // Reject if group or other bits are set
        if mode & 0o077 != 0 {
            return Err(TermsumError::Configuration(format!(
                "Secrets file {path:?} has insecure permissions {:o}. Must be 0600 or 0400.",
                mode & 0o777
            )));
        }

        Ok(())
    }

    #[cfg(not(unix))]
    fn check_permissions(_path: &Path) -> Result<()> {
        Ok(())
    }

    /// The Perplexity API key, falling back to [`API_KEY_ENV_VAR`].
    ///
    /// Empty values count as absent.
    pub fn api_key(&self) -> Option<String> {
        self.resolve_api_key(std::env::var(API_KEY_ENV_VAR).ok())
    }

    fn resolve_api_key(&self, env: Option<String>) -> Option<String> {
        let non_empty = |key: &String| !key.trim().is_empty();
        self.perplexity
            .as_ref()
            .map(|s| s.api_key.clone())
            .filter(non_empty)
            .or_else(|| env.filter(non_empty))
    }
}
