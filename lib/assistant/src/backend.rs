//! Language-model backends behind the assistant gateway.
//!
//! A backend turns one [`SupportPrompt`] into one [`ModelOutput`]. Hosted
//! APIs, local models and fixed FAQ tables all fit behind [`ModelBackend`].

use crate::error::BackendError;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value as JsonValue;

/// What the gateway asks a backend for.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupportPrompt {
    /// The customer's trimmed message.
    pub customer_text: String,
    /// Standing instructions for the model.
    pub instructions: String,
    /// JSON schema the reply should follow, for backends that support it.
    pub reply_schema: Option<JsonValue>,
    /// Sampling temperature.
    pub temperature: f32,
    /// Upper bound on generated tokens.
    pub max_tokens: u32,
}

/// What a backend produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelOutput {
    /// Raw generated text.
    pub text: String,
    /// Schema-conforming output, when the backend honored `reply_schema`.
    pub structured: Option<JsonValue>,
    /// Model that answered.
    pub model: String,
    /// Tokens consumed, if the backend reports them.
    pub tokens_used: Option<u32>,
}

impl ModelOutput {
    /// Output consisting of prose only.
    #[must_use]
    pub fn prose(text: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            structured: None,
            model: model.into(),
            tokens_used: None,
        }
    }

    /// Output carrying a structured reply.
    #[must_use]
    pub fn structured(value: JsonValue, model: impl Into<String>) -> Self {
        Self {
            text: value.to_string(),
            structured: Some(value),
            model: model.into(),
            tokens_used: None,
        }
    }
}

/// A model that can answer support prompts.
#[async_trait]
pub trait ModelBackend: Send + Sync {
    /// Generates output for one prompt.
    ///
    /// # Errors
    ///
    /// Returns an error if the model could not be reached or refused.
    async fn complete(&self, prompt: &SupportPrompt) -> Result<ModelOutput, BackendError>;

    /// Name of the model, for logs.
    fn model(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structured_output_keeps_text_copy() {
        let output = ModelOutput::structured(serde_json::json!({"reply": "ok"}), "m");
        assert_eq!(output.text, r#"{"reply":"ok"}"#);
        assert!(output.structured.is_some());
    }

    #[test]
    fn prose_output_has_no_structure() {
        let output = ModelOutput::prose("hello", "m");
        assert_eq!(output.structured, None);
        assert_eq!(output.tokens_used, None);
    }
}
