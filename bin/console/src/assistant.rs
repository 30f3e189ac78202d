//! Assistant wiring for the console.

use crate::config::{AssistantMode, AssistantSettings};
use async_trait::async_trait;
use std::sync::Arc;
use support_relay_assistant::{
    AssistantGateway, AssistantReply, BackendError, GatewayError, ModelBackend, ModelGateway,
    ModelOutput, SupportPrompt,
};

const FAQ: [(&[&str], &str); 3] = [
    (
        &["refund", "return", "cancel"],
        "Refunds are handled by our staff. I am transferring you to a human representative.",
    ),
    (
        &["track", "ship", "deliver", "order"],
        "Your order ships within two business days. You can follow it from the Orders page.",
    ),
    (
        &["pay", "vnpay", "card"],
        "We accept VNPay and bank cards at checkout.",
    ),
];

const UNKNOWN: &str =
    "I am not sure about that one. Let me connect you with a human representative.";

/// Backend answering from a fixed keyword table.
///
/// Answers are plain prose, so escalation is inferred by the gateway from
/// handover phrases.
pub struct FaqBackend;

#[async_trait]
impl ModelBackend for FaqBackend {
    async fn complete(&self, prompt: &SupportPrompt) -> Result<ModelOutput, BackendError> {
        let prompt = prompt.customer_text.to_lowercase();
        let answer = FAQ
            .iter()
            .find(|(keywords, _)| keywords.iter().any(|k| prompt.contains(k)))
            .map_or(UNKNOWN, |(_, answer)| *answer);
        Ok(ModelOutput::prose(answer, self.model()))
    }

    fn model(&self) -> &str {
        "faq"
    }
}

/// Gateway that is never reachable.
pub struct OfflineGateway;

#[async_trait]
impl AssistantGateway for OfflineGateway {
    async fn respond(&self, _text: &str) -> Result<AssistantReply, GatewayError> {
        Err(GatewayError::Unavailable {
            reason: "assistant is switched off".to_string(),
        })
    }
}

/// Builds the gateway selected by the settings.
pub fn build_gateway(settings: &AssistantSettings) -> Arc<dyn AssistantGateway> {
    match settings.mode {
        AssistantMode::Canned => {
            Arc::new(ModelGateway::new(FaqBackend).with_max_tokens(settings.max_tokens))
        }
        AssistantMode::Offline => Arc::new(OfflineGateway),
    }
}
