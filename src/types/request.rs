//! Inbound summary request

use serde::{Deserialize, Serialize};

use crate::styles::DEFAULT_STYLE;

/// One summary request as received from a caller.
///
/// `style` falls back to [`DEFAULT_STYLE`] when absent or empty; the
/// catalog further falls back for unknown identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummarizeRequest {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_instruction: Option<String>,
}

impl SummarizeRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }

    pub fn custom_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.custom_instruction = Some(instruction.into());
        self
    }

    /// Requested style identifier, with empty treated as absent.
    pub fn style_id(&self) -> &str {
        match self.style.as_deref() {
            Some(s) if !s.is_empty() => s,
            _ => DEFAULT_STYLE,
        }
    }

    /// Custom instruction, or `""` when none was given.
    pub fn custom_instruction_str(&self) -> &str {
        self.custom_instruction.as_deref().unwrap_or_default()
    }
}
