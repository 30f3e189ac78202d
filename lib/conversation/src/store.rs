//! Message persistence contract.

use crate::config::Sentinels;
use crate::error::StoreError;
use crate::message::{Message, NewMessage};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use support_relay_core::ParticipantId;

/// Which kind of counterpart a history query is restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleScope {
    /// Messages exchanged with the assistant.
    Assistant,
    /// Messages exchanged with the admin.
    Admin,
    /// Messages exchanged with anyone else.
    Customer,
}

impl RoleScope {
    /// All scopes, in the order history is assembled.
    pub const ALL: [RoleScope; 3] = [Self::Assistant, Self::Admin, Self::Customer];

    /// Returns true if a message with this counterpart belongs to the scope.
    #[must_use]
    pub fn admits(&self, sentinels: &Sentinels, counterpart: ParticipantId) -> bool {
        match self {
            Self::Assistant => counterpart == sentinels.assistant,
            Self::Admin => counterpart == sentinels.admin,
            Self::Customer => !sentinels.is_sentinel(counterpart),
        }
    }
}

impl fmt::Display for RoleScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Assistant => write!(f, "assistant"),
            Self::Admin => write!(f, "admin"),
            Self::Customer => write!(f, "customer"),
        }
    }
}

/// Append-only message storage.
///
/// Implementations assign ids and timestamps on append. Timestamps must be
/// strictly increasing in assignment order. Every query except
/// `escalated_newest_first` returns messages oldest first.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Persists a message and returns it with its id and timestamp.
    async fn append(&self, message: NewMessage) -> Result<Message, StoreError>;

    /// Messages touching `participant` whose other party falls in `scope`.
    async fn query_by_participant_and_role(
        &self,
        participant: ParticipantId,
        scope: RoleScope,
    ) -> Result<Vec<Message>, StoreError>;

    /// Distinct non-sentinel senders, in order of their first message.
    async fn distinct_customer_senders(&self) -> Result<Vec<ParticipantId>, StoreError>;

    /// Messages flagged for a human, newest first.
    async fn escalated_newest_first(&self) -> Result<Vec<Message>, StoreError>;

    /// Every message, oldest first.
    async fn all_ordered_by_sent_at(&self) -> Result<Vec<Message>, StoreError>;
}
