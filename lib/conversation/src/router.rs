//! Message routing and the assistant sub-flow.
//!
//! `send` validates a message, resolves both ends, and persists it. That
//! record is the caller's result. When the receiver is the assistant, the
//! router then asks the gateway for a reply and stores either the reply or
//! the configured fallback apology. Nothing in that second half can fail the
//! call; what happened is reported as an [`AssistantOutcome`].

use crate::config::{RoutingConfig, Sentinels};
use crate::error::{DirectoryError, RoutingError, Side, StoreError};
use crate::message::{Message, NewMessage};
use crate::notify::RealtimeNotifier;
use crate::participant::ParticipantDirectory;
use crate::store::MessageStore;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use support_relay_assistant::{AssistantGateway, AssistantReply, GatewayError};
use support_relay_core::ParticipantId;
use tracing::{debug, error, info, instrument, warn};

/// Which realtime pushes succeeded for an assistant-authored message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Delivery {
    /// Pushed to the customer's inbox.
    pub customer: bool,
    /// Pushed to the admin inbox. Only attempted for escalated replies.
    pub admin: bool,
}

/// Why the router stored the fallback apology instead of a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    /// The gateway failed or timed out.
    Gateway(GatewayError),
    /// The gateway answered but the reply could not be stored.
    ReplyNotStored { reason: String },
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gateway(e) => write!(f, "{e}"),
            Self::ReplyNotStored { reason } => {
                write!(f, "assistant reply could not be stored: {reason}")
            }
        }
    }
}

/// What the assistant sub-flow did after the sender's message was stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssistantOutcome {
    /// The gateway answered and the reply was stored.
    Replied {
        reply: Message,
        escalated: bool,
        delivery: Delivery,
    },
    /// The fallback apology was stored in place of a reply.
    FellBack {
        reason: FallbackReason,
        fallback: Message,
        delivery: Delivery,
    },
    /// Neither a reply nor the fallback could be stored.
    Abandoned {
        reason: FallbackReason,
        error: StoreError,
    },
}

impl AssistantOutcome {
    /// Returns the assistant-authored message that was stored, if any.
    #[must_use]
    pub fn stored_message(&self) -> Option<&Message> {
        match self {
            Self::Replied { reply, .. } => Some(reply),
            Self::FellBack { fallback, .. } => Some(fallback),
            Self::Abandoned { .. } => None,
        }
    }
}

/// Result of a successful send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendReceipt {
    /// The sender's persisted message.
    pub message: Message,
    /// Present when the message was addressed to the assistant.
    pub assistant: Option<AssistantOutcome>,
}

/// Routes messages between participants and the assistant.
pub struct ConversationRouter {
    directory: Arc<dyn ParticipantDirectory>,
    store: Arc<dyn MessageStore>,
    gateway: Arc<dyn AssistantGateway>,
    notifier: Arc<dyn RealtimeNotifier>,
    sentinels: Sentinels,
    assistant_timeout: Duration,
    fallback_text: String,
}

impl ConversationRouter {
    /// Creates a router.
    ///
    /// The configuration is expected to have passed
    /// [`RoutingConfig::validate`].
    pub fn new(
        config: &RoutingConfig,
        directory: Arc<dyn ParticipantDirectory>,
        store: Arc<dyn MessageStore>,
        gateway: Arc<dyn AssistantGateway>,
        notifier: Arc<dyn RealtimeNotifier>,
    ) -> Self {
        Self {
            directory,
            store,
            gateway,
            notifier,
            sentinels: config.sentinels(),
            assistant_timeout: config.assistant_timeout(),
            fallback_text: config.fallback_text.clone(),
        }
    }

    /// Sends a message and returns the sender's stored record.
    ///
    /// # Errors
    ///
    /// Fails with `Validation` for blank or self-addressed text, `NotFound`
    /// for an unknown sender or receiver, `DirectoryUnavailable` when
    /// participants cannot be resolved, and `Persistence` when the message
    /// cannot be stored. Assistant failures never fail the call.
    pub async fn send(
        &self,
        sender: ParticipantId,
        receiver: ParticipantId,
        text: &str,
    ) -> support_relay_core::Result<Message, RoutingError> {
        Ok(self.send_with_outcome(sender, receiver, text).await?.message)
    }

    /// Like [`ConversationRouter::send`], but also reports what the
    /// assistant sub-flow did.
    ///
    /// # Errors
    ///
    /// Same as [`ConversationRouter::send`].
    #[instrument(skip(self, text))]
    pub async fn send_with_outcome(
        &self,
        sender: ParticipantId,
        receiver: ParticipantId,
        text: &str,
    ) -> support_relay_core::Result<SendReceipt, RoutingError> {
        let text = self.validate(sender, receiver, text)?;
        self.resolve(Side::Sender, sender).await?;
        self.resolve(Side::Receiver, receiver).await?;

        let message = self
            .store
            .append(NewMessage::from_participant(sender, receiver, text))
            .await
            .map_err(|e| {
                error!(error = %e, "failed to store message");
                RoutingError::Persistence {
                    reason: e.to_string(),
                }
            })?;
        debug!(message_id = %message.id, "message stored");

        let assistant = if receiver == self.sentinels.assistant {
            Some(self.run_assistant(sender, text).await)
        } else {
            None
        };

        Ok(SendReceipt { message, assistant })
    }

    fn validate<'a>(
        &self,
        sender: ParticipantId,
        receiver: ParticipantId,
        text: &'a str,
    ) -> Result<&'a str, RoutingError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(RoutingError::Validation {
                reason: "message text is empty".to_string(),
            });
        }
        if sender == receiver {
            return Err(RoutingError::Validation {
                reason: "sender and receiver are the same participant".to_string(),
            });
        }
        if sender == self.sentinels.assistant {
            return Err(RoutingError::Validation {
                reason: "assistant messages are produced by the router".to_string(),
            });
        }
        Ok(text)
    }

    async fn resolve(&self, side: Side, id: ParticipantId) -> Result<(), RoutingError> {
        match self.directory.resolve(id).await {
            Ok(_) => Ok(()),
            Err(DirectoryError::NotFound { id }) => Err(RoutingError::NotFound { side, id }),
            Err(DirectoryError::Unavailable { reason }) => {
                Err(RoutingError::DirectoryUnavailable { reason })
            }
        }
    }

    async fn run_assistant(&self, customer: ParticipantId, text: &str) -> AssistantOutcome {
        let reason = match self.ask(text).await {
            Ok(reply) => {
                let escalated = reply.needs_human;
                let draft = NewMessage::from_assistant(
                    self.sentinels.assistant,
                    customer,
                    reply.reply,
                    escalated,
                );
                match self.store.append(draft).await {
                    Ok(reply) => {
                        if escalated {
                            info!(
                                message_id = %reply.id,
                                customer = %customer,
                                "assistant escalated to admin"
                            );
                        }
                        let delivery = self.deliver(customer, &reply, escalated).await;
                        return AssistantOutcome::Replied {
                            reply,
                            escalated,
                            delivery,
                        };
                    }
                    Err(e) => {
                        warn!(error = %e, "failed to store assistant reply, falling back");
                        FallbackReason::ReplyNotStored {
                            reason: e.to_string(),
                        }
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "assistant call failed, falling back");
                FallbackReason::Gateway(e)
            }
        };

        let draft = NewMessage::from_assistant(
            self.sentinels.assistant,
            customer,
            self.fallback_text.as_str(),
            true,
        );
        match self.store.append(draft).await {
            Ok(fallback) => {
                // Escalated, but the admin inbox is not pushed on this path.
                // The escalation listing picks it up.
                let delivery = self.deliver(customer, &fallback, false).await;
                AssistantOutcome::FellBack {
                    reason,
                    fallback,
                    delivery,
                }
            }
            Err(error) => {
                warn!(error = %error, "failed to store fallback, customer gets no reply");
                AssistantOutcome::Abandoned { reason, error }
            }
        }
    }

    async fn ask(&self, text: &str) -> Result<AssistantReply, GatewayError> {
        let reply = tokio::time::timeout(self.assistant_timeout, self.gateway.respond(text))
            .await
            .map_err(|_| GatewayError::Timeout {
                after_secs: self.assistant_timeout.as_secs(),
            })??;
        if reply.reply.trim().is_empty() {
            return Err(GatewayError::EmptyReply);
        }
        Ok(reply)
    }

    async fn deliver(
        &self,
        customer: ParticipantId,
        message: &Message,
        escalate: bool,
    ) -> Delivery {
        let mut delivery = Delivery::default();
        match self.notifier.push_to_inbox(customer, message).await {
            Ok(()) => delivery.customer = true,
            Err(e) => warn!(error = %e, "failed to push assistant message to customer"),
        }
        if escalate {
            match self.notifier.push_to_admin_inbox(message).await {
                Ok(()) => delivery.admin = true,
                Err(e) => warn!(error = %e, "failed to push escalation to admin"),
            }
        }
        delivery
    }
}
