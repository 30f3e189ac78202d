//! Conversation routing for support-relay.
//!
//! This crate provides:
//!
//! - **Router**: validates and stores messages, and runs the assistant
//!   sub-flow with escalation and fallback for assistant-directed messages
//! - **History**: per-participant history split into assistant, admin and
//!   peer threads, the escalation queue, and the customer listing
//! - **Collaborator traits**: participant directory, message store and
//!   realtime notifier, with in-memory implementations in [`memory`]

pub mod config;
pub mod error;
pub mod history;
pub mod memory;
pub mod message;
pub mod notify;
pub mod participant;
pub mod router;
pub mod store;

pub use config::{DEFAULT_FALLBACK_TEXT, RoutingConfig, Sentinels};
pub use error::{
    ConfigError, DirectoryError, HistoryError, NotifyError, RoutingError, Side, StoreError,
};
pub use history::{CustomerSummary, HistoryAggregator, SeparatedHistory};
pub use memory::{InMemoryDirectory, InMemoryMessageStore, InMemoryNotifier};
pub use message::{Message, NewMessage};
pub use notify::{Inbox, RealtimeNotifier};
pub use participant::{Participant, ParticipantDirectory, ParticipantRole};
pub use router::{AssistantOutcome, ConversationRouter, Delivery, FallbackReason, SendReceipt};
pub use store::{MessageStore, RoleScope};
