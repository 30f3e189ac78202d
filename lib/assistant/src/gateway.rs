//! The assistant gateway capability.

use crate::error::GatewayError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// An answer produced by the assistant.
///
/// Transient: the router transcribes it into a persisted message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistantReply {
    /// Text to send back to the customer.
    pub reply: String,
    /// Whether a human admin should take over the conversation.
    pub needs_human: bool,
}

impl AssistantReply {
    /// Creates a reply the assistant resolved on its own.
    #[must_use]
    pub fn resolved(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            needs_human: false,
        }
    }

    /// Creates a reply that hands the conversation to a human.
    #[must_use]
    pub fn escalated(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            needs_human: true,
        }
    }
}

/// Answers free-text customer questions.
///
/// Implementations own the answer-generation logic. The router bounds each
/// call with its own deadline, so implementations need not.
#[async_trait]
pub trait AssistantGateway: Send + Sync {
    /// Produces a reply for the given customer text.
    ///
    /// # Errors
    ///
    /// Returns an error if no reply could be produced.
    async fn respond(&self, text: &str) -> Result<AssistantReply, GatewayError>;
}
