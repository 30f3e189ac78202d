//! An assistant gateway backed by a language model.
//!
//! The model is asked for a JSON object `{"reply": ..., "needs_human": ...}`.
//! Models do not always comply, so decoding is lenient: fenced JSON is
//! unwrapped, the common field spellings are accepted, and plain prose is
//! taken as the reply with the escalation flag inferred from handover
//! phrases.

use crate::backend::{ModelBackend, SupportPrompt};
use crate::error::GatewayError;
use crate::gateway::{AssistantGateway, AssistantReply};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use tracing::debug;

const INSTRUCTIONS: &str = "You are the customer-support assistant of an online store. \
Answer the customer briefly and politely. Respond with a JSON object \
{\"reply\": string, \"needs_human\": boolean}. Set needs_human to true when \
you cannot resolve the request yourself or the customer asks for a person.";

const HANDOVER_PHRASES: [&str; 8] = [
    "human",
    "real person",
    "representative",
    "live agent",
    "transfer you",
    "handover",
    "talk to an agent",
    "speak to an agent",
];

#[derive(Debug, Deserialize)]
struct WireReply {
    #[serde(alias = "text", alias = "answer", alias = "message")]
    reply: String,
    #[serde(default, alias = "needHuman", alias = "handover", alias = "escalate")]
    needs_human: bool,
}

/// `AssistantGateway` implementation on top of a [`ModelBackend`].
pub struct ModelGateway<B: ModelBackend> {
    backend: B,
    instructions: String,
    max_tokens: u32,
}

impl<B: ModelBackend> ModelGateway<B> {
    /// Creates a gateway with the default support instructions.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            instructions: INSTRUCTIONS.to_string(),
            max_tokens: 512,
        }
    }

    /// Replaces the standing instructions.
    #[must_use]
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    /// Sets the token budget for a single reply.
    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    fn reply_schema() -> JsonValue {
        serde_json::json!({
            "type": "object",
            "properties": {
                "reply": { "type": "string" },
                "needs_human": { "type": "boolean" }
            },
            "required": ["reply", "needs_human"]
        })
    }
}

#[async_trait]
impl<B: ModelBackend> AssistantGateway for ModelGateway<B> {
    async fn respond(&self, text: &str) -> Result<AssistantReply, GatewayError> {
        let prompt = SupportPrompt {
            customer_text: text.to_string(),
            instructions: self.instructions.clone(),
            reply_schema: Some(Self::reply_schema()),
            temperature: 0.2,
            max_tokens: self.max_tokens,
        };

        let output = self.backend.complete(&prompt).await?;
        debug!(
            model = %output.model,
            tokens = ?output.tokens_used,
            "assistant backend answered"
        );

        if let Some(structured) = output.structured {
            let wire: WireReply =
                serde_json::from_value(structured).map_err(|e| GatewayError::MalformedReply {
                    reason: e.to_string(),
                })?;
            return finish(wire);
        }

        decode_reply(&output.text)
    }
}

/// Decodes raw backend text into an [`AssistantReply`].
///
/// # Errors
///
/// Returns `EmptyReply` for blank output and `MalformedReply` for a JSON
/// object without a usable reply field.
pub fn decode_reply(raw: &str) -> Result<AssistantReply, GatewayError> {
    let body = strip_code_fence(raw.trim());
    if body.is_empty() {
        return Err(GatewayError::EmptyReply);
    }

    if body.starts_with('{') {
        let wire: WireReply =
            serde_json::from_str(body).map_err(|e| GatewayError::MalformedReply {
                reason: e.to_string(),
            })?;
        return finish(wire);
    }

    Ok(AssistantReply {
        reply: body.to_string(),
        needs_human: has_handover_intent(body),
    })
}

fn finish(wire: WireReply) -> Result<AssistantReply, GatewayError> {
    let reply = wire.reply.trim();
    if reply.is_empty() {
        return Err(GatewayError::EmptyReply);
    }
    Ok(AssistantReply {
        reply: reply.to_string(),
        needs_human: wire.needs_human,
    })
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

fn has_handover_intent(text: &str) -> bool {
    let lower = text.to_lowercase();
    HANDOVER_PHRASES.iter().any(|phrase| lower.contains(phrase))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::ModelOutput;
    use crate::error::BackendError;
    use std::sync::Mutex;

    struct CannedBackend {
        result: Result<ModelOutput, BackendError>,
        seen: Mutex<Vec<SupportPrompt>>,
    }

    impl CannedBackend {
        fn new(result: Result<ModelOutput, BackendError>) -> Self {
            Self {
                result,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ModelBackend for CannedBackend {
        async fn complete(&self, prompt: &SupportPrompt) -> Result<ModelOutput, BackendError> {
            self.seen.lock().unwrap().push(prompt.clone());
            self.result.clone()
        }

        fn model(&self) -> &str {
            "canned"
        }
    }

    #[test]
    fn decodes_json_reply() {
        let reply = decode_reply(r#"{"reply": "Your order ships tomorrow", "needs_human": false}"#)
            .expect("decode");
        assert_eq!(reply, AssistantReply::resolved("Your order ships tomorrow"));
    }

    #[test]
    fn decodes_fenced_json_with_camel_case_flag() {
        let raw = "```json\n{\"reply\": \"Let me find someone\", \"needHuman\": true}\n```";
        let reply = decode_reply(raw).expect("decode");
        assert!(reply.needs_human);
        assert_eq!(reply.reply, "Let me find someone");
    }

    #[test]
    fn plain_text_infers_handover() {
        let reply = decode_reply("I will transfer you to a live agent.").expect("decode");
        assert!(reply.needs_human);

        let reply = decode_reply("We are open until 9pm.").expect("decode");
        assert!(!reply.needs_human);
    }

    #[test]
    fn blank_output_is_empty_reply() {
        assert_eq!(decode_reply("   "), Err(GatewayError::EmptyReply));
        assert_eq!(
            decode_reply(r#"{"reply": "  "}"#),
            Err(GatewayError::EmptyReply)
        );
    }

    #[test]
    fn json_without_reply_is_malformed() {
        let err = decode_reply(r#"{"needs_human": true}"#).unwrap_err();
        assert!(matches!(err, GatewayError::MalformedReply { .. }));
    }

    #[tokio::test]
    async fn gateway_prefers_structured_output() {
        let output = ModelOutput::structured(
            serde_json::json!({ "reply": "A human will follow up", "needs_human": true }),
            "canned",
        );
        let gateway = ModelGateway::new(CannedBackend::new(Ok(output)));

        let reply = gateway.respond("refund please").await.expect("respond");
        assert_eq!(reply, AssistantReply::escalated("A human will follow up"));
    }

    #[tokio::test]
    async fn gateway_sends_customer_text_and_budget() {
        let backend = CannedBackend::new(Ok(ModelOutput::prose("ok", "canned")));
        let gateway = ModelGateway::new(backend)
            .with_instructions("be brief")
            .with_max_tokens(64);

        gateway
            .respond("where is my parcel")
            .await
            .expect("respond");

        let seen = gateway.backend.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].customer_text, "where is my parcel");
        assert_eq!(seen[0].instructions, "be brief");
        assert_eq!(seen[0].max_tokens, 64);
        assert!(seen[0].reply_schema.is_some());
    }

    #[tokio::test]
    async fn gateway_maps_backend_failure() {
        let gateway = ModelGateway::new(CannedBackend::new(Err(BackendError::Rejected {
            reason: "503".to_string(),
        })));

        let err = gateway.respond("hello").await.unwrap_err();
        assert!(matches!(err, GatewayError::Unavailable { .. }));
    }
}
