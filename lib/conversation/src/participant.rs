//! Participants and the directory that resolves them.

use crate::error::DirectoryError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use support_relay_core::ParticipantId;

/// The part a participant plays in a conversation.
///
/// Derived from the configured sentinel ids, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantRole {
    /// A customer of the store.
    Customer,
    /// The automated assistant.
    Assistant,
    /// The human admin.
    Admin,
}

/// A participant as known to the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    /// Participant id.
    pub id: ParticipantId,
    /// Name shown in conversation pickers.
    pub display_name: String,
    /// Contact address, usually an email.
    pub contact: Option<String>,
}

impl Participant {
    /// Creates a participant without contact details.
    #[must_use]
    pub fn new(id: ParticipantId, display_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            contact: None,
        }
    }

    /// Sets the contact address.
    #[must_use]
    pub fn with_contact(mut self, contact: impl Into<String>) -> Self {
        self.contact = Some(contact.into());
        self
    }
}

/// Resolves participant ids.
#[async_trait]
pub trait ParticipantDirectory: Send + Sync {
    /// Looks up a participant.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for unknown ids and `Unavailable` when the
    /// directory cannot be queried.
    async fn resolve(&self, id: ParticipantId) -> Result<Participant, DirectoryError>;

    /// Returns whether the participant exists.
    ///
    /// # Errors
    ///
    /// Returns `Unavailable` when the directory cannot be queried.
    async fn exists(&self, id: ParticipantId) -> Result<bool, DirectoryError> {
        match self.resolve(id).await {
            Ok(_) => Ok(true),
            Err(DirectoryError::NotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }
}
