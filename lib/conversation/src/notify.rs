//! Realtime push contract.

use crate::error::NotifyError;
use crate::message::Message;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use support_relay_core::ParticipantId;

/// A realtime destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "participant", rename_all = "snake_case")]
pub enum Inbox {
    /// A participant's personal message queue.
    Participant(ParticipantId),
    /// The shared admin escalation queue.
    Admin,
}

impl Inbox {
    /// Returns the queue name used by STOMP-style transports.
    #[must_use]
    pub fn destination(&self) -> String {
        match self {
            Self::Participant(id) => format!("/user/{id}/queue/messages"),
            Self::Admin => "/queue/admin".to_string(),
        }
    }
}

impl fmt::Display for Inbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Participant(id) => write!(f, "inbox {id}"),
            Self::Admin => write!(f, "admin inbox"),
        }
    }
}

/// Pushes messages to connected participants.
///
/// Delivery is best-effort and at-most-once. An inbox with nobody
/// listening is not an error.
#[async_trait]
pub trait RealtimeNotifier: Send + Sync {
    /// Pushes a message to one participant's inbox.
    async fn push_to_inbox(
        &self,
        participant: ParticipantId,
        payload: &Message,
    ) -> Result<(), NotifyError>;

    /// Pushes a message to the admin escalation inbox.
    async fn push_to_admin_inbox(&self, payload: &Message) -> Result<(), NotifyError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn destinations() {
        assert_eq!(
            Inbox::Participant(ParticipantId::new(5)).destination(),
            "/user/5/queue/messages"
        );
        assert_eq!(Inbox::Admin.destination(), "/queue/admin");
    }
}
