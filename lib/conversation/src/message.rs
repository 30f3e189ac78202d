//! Message types.
//!
//! A [`NewMessage`] is what the router hands to the store; the store assigns
//! the id and the timestamp and returns a [`Message`]. Messages reference
//! participants by id only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use support_relay_core::{MessageId, ParticipantId};

/// A message not yet persisted.
///
/// Only the constructors below can build one, which keeps the
/// `from_assistant` and `forwarded_to_human` flags consistent with the
/// sender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    sender_id: ParticipantId,
    receiver_id: ParticipantId,
    text: String,
    from_assistant: bool,
    forwarded_to_human: bool,
}

impl NewMessage {
    /// A message written by a customer or the admin.
    #[must_use]
    pub fn from_participant(
        sender_id: ParticipantId,
        receiver_id: ParticipantId,
        text: impl Into<String>,
    ) -> Self {
        Self {
            sender_id,
            receiver_id,
            text: text.into(),
            from_assistant: false,
            forwarded_to_human: false,
        }
    }

    /// A message written by the assistant, optionally escalated to the admin.
    #[must_use]
    pub fn from_assistant(
        assistant_id: ParticipantId,
        receiver_id: ParticipantId,
        text: impl Into<String>,
        forwarded_to_human: bool,
    ) -> Self {
        Self {
            sender_id: assistant_id,
            receiver_id,
            text: text.into(),
            from_assistant: true,
            forwarded_to_human,
        }
    }

    /// Returns the sender id.
    #[must_use]
    pub fn sender_id(&self) -> ParticipantId {
        self.sender_id
    }

    /// Returns the receiver id.
    #[must_use]
    pub fn receiver_id(&self) -> ParticipantId {
        self.receiver_id
    }

    /// Returns the text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns true if the assistant wrote this message.
    #[must_use]
    pub fn is_from_assistant(&self) -> bool {
        self.from_assistant
    }

    /// Returns true if this message is escalated to the admin.
    #[must_use]
    pub fn is_forwarded_to_human(&self) -> bool {
        self.forwarded_to_human
    }

    /// Completes the message with the store-assigned id and timestamp.
    #[must_use]
    pub fn into_message(self, id: MessageId, sent_at: DateTime<Utc>) -> Message {
        Message {
            id,
            sender_id: self.sender_id,
            receiver_id: self.receiver_id,
            text: self.text,
            sent_at,
            from_assistant: self.from_assistant,
            forwarded_to_human: self.forwarded_to_human,
        }
    }
}

/// A persisted message.
///
/// This is also the payload pushed to realtime inboxes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Store-assigned id.
    pub id: MessageId,
    /// Author.
    pub sender_id: ParticipantId,
    /// Addressee.
    pub receiver_id: ParticipantId,
    /// Trimmed, non-empty text.
    #[serde(rename = "message")]
    pub text: String,
    /// Store-assigned timestamp.
    pub sent_at: DateTime<Utc>,
    /// Whether the assistant wrote this message.
    #[serde(rename = "fromAI")]
    pub from_assistant: bool,
    /// Whether this message is escalated to the admin.
    pub forwarded_to_human: bool,
}

impl Message {
    /// Returns true if the participant sent or received this message.
    #[must_use]
    pub fn involves(&self, participant: ParticipantId) -> bool {
        self.sender_id == participant || self.receiver_id == participant
    }

    /// Returns the other party from the given participant's point of view.
    ///
    /// Only meaningful when [`Message::involves`] holds.
    #[must_use]
    pub fn counterpart_of(&self, participant: ParticipantId) -> ParticipantId {
        if self.sender_id == participant {
            self.receiver_id
        } else {
            self.sender_id
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: i64) -> ParticipantId {
        ParticipantId::new(n)
    }

    #[test]
    fn participant_message_is_not_flagged() {
        let msg = NewMessage::from_participant(id(5), id(9), "hi");
        assert!(!msg.is_from_assistant());
        assert!(!msg.is_forwarded_to_human());
    }

    #[test]
    fn assistant_message_carries_escalation() {
        let msg = NewMessage::from_assistant(id(23), id(5), "hold on", true);
        assert!(msg.is_from_assistant());
        assert!(msg.is_forwarded_to_human());
        assert_eq!(msg.sender_id(), id(23));
    }

    #[test]
    fn counterpart_depends_on_direction() {
        let msg = NewMessage::from_participant(id(5), id(9), "hi")
            .into_message(MessageId::new(1), Utc::now());
        assert_eq!(msg.counterpart_of(id(5)), id(9));
        assert_eq!(msg.counterpart_of(id(9)), id(5));
        assert!(msg.involves(id(9)));
        assert!(!msg.involves(id(1)));
    }

    #[test]
    fn payload_uses_wire_names() {
        let msg = NewMessage::from_assistant(id(23), id(5), "ok", false)
            .into_message(MessageId::new(3), Utc::now());
        let json = serde_json::to_value(&msg).expect("serialize");
        assert_eq!(json["senderId"], 23);
        assert_eq!(json["message"], "ok");
        assert_eq!(json["fromAI"], true);
        assert_eq!(json["forwardedToHuman"], false);
    }
}
