//! Termsum error types

/// Caller-facing text for configuration failures. The specific cause is
/// logged, never returned.
pub const CONFIGURATION_MESSAGE: &str = "Erro de configuração no servidor.";

/// Caller-facing text for an upstream call that ran out of time.
pub const TIMEOUT_MESSAGE: &str = "A IA demorou demasiado. O documento é muito extenso.";

/// Termsum error types.
///
/// The set is closed: every failure of the summarize pipeline is one of
/// these four kinds, so callers can branch on the variant instead of
/// parsing messages.
#[derive(Debug, thiserror::Error)]
pub enum TermsumError {
    /// Rejected input: empty or too-short text, unreadable PDF.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Missing credential or otherwise unusable configuration.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The upstream call exceeded its time budget.
    #[error("timeout: {0}")]
    Timeout(String),

    /// Upstream answered with a failure status, or the transport failed.
    ///
    /// `status` is `None` for connection-level failures where no response
    /// was received.
    #[error("{}", remote_display(.status, .message))]
    Remote {
        status: Option<u16>,
        message: String,
    },
}

fn remote_display(status: &Option<u16>, message: &str) -> String {
    match status {
        Some(status) => format!("remote error ({status}): {message}"),
        None => format!("remote error: {message}"),
    }
}

impl From<serde_json::Error> for TermsumError {
    fn from(err: serde_json::Error) -> Self {
        TermsumError::Remote {
            status: None,
            message: format!("malformed response body: {err}"),
        }
    }
}

impl TermsumError {
    /// Build a `Remote` error carrying an upstream status.
    pub fn remote(status: u16, message: impl Into<String>) -> Self {
        TermsumError::Remote {
            status: Some(status),
            message: message.into(),
        }
    }

    /// Build a `Remote` error for a failure with no upstream response.
    pub fn transport(message: impl Into<String>) -> Self {
        TermsumError::Remote {
            status: None,
            message: message.into(),
        }
    }

    /// Stable label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            TermsumError::InvalidInput(_) => "invalid_input",
            TermsumError::Configuration(_) => "configuration",
            TermsumError::Timeout(_) => "timeout",
            TermsumError::Remote { .. } => "remote",
        }
    }

    /// Message safe to show to the end user.
    ///
    /// Configuration detail is replaced by a generic message; input,
    /// timeout and remote failures carry their own wording.
    pub fn user_message(&self) -> String {
        match self {
            TermsumError::InvalidInput(msg) => msg.clone(),
            TermsumError::Configuration(_) => CONFIGURATION_MESSAGE.to_string(),
            TermsumError::Timeout(msg) => msg.clone(),
            TermsumError::Remote { status, message } => match status {
                Some(status) => format!("Erro ao processar: {status} {message}"),
                None => format!("Erro ao processar: {message}"),
            },
        }
    }
}

/// Result type alias for Termsum operations
pub type Result<T> = std::result::Result<T, TermsumError>;
