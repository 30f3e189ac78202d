//! Error types for the conversation crate.
//!
//! Leaf collaborators return the plain enums (`DirectoryError`,
//! `StoreError`, `NotifyError`). The router and the history aggregator lift
//! their own enums into rootcause reports at the public boundary:
//! - `RoutingError`: failures a `send` caller must handle
//! - `HistoryError`: failures of the read paths
//! - `ConfigError`: invalid routing configuration

use crate::notify::Inbox;
use crate::store::RoleScope;
use std::fmt;
use support_relay_core::ParticipantId;

/// Errors from participant directory lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    /// No participant exists with this id.
    NotFound { id: ParticipantId },
    /// The directory could not be queried.
    Unavailable { reason: String },
}

impl fmt::Display for DirectoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { id } => write!(f, "participant not found: {id}"),
            Self::Unavailable { reason } => {
                write!(f, "participant directory unavailable: {reason}")
            }
        }
    }
}

impl std::error::Error for DirectoryError {}

/// Errors from message store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Appending a message failed.
    WriteFailed { reason: String },
    /// A read query failed.
    QueryFailed { reason: String },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WriteFailed { reason } => write!(f, "message write failed: {reason}"),
            Self::QueryFailed { reason } => write!(f, "message query failed: {reason}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// Errors from realtime pushes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyError {
    /// The transport rejected the push.
    DeliveryFailed { inbox: Inbox, reason: String },
}

impl fmt::Display for NotifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeliveryFailed { inbox, reason } => {
                write!(f, "push to {inbox} failed: {reason}")
            }
        }
    }
}

impl std::error::Error for NotifyError {}

/// Which end of a message a participant id was given for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// The author of the message.
    Sender,
    /// The addressee of the message.
    Receiver,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sender => write!(f, "sender"),
            Self::Receiver => write!(f, "receiver"),
        }
    }
}

/// Errors surfaced to callers of `ConversationRouter::send`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutingError {
    /// The request itself is invalid (empty text, self-addressed, ...).
    Validation { reason: String },
    /// The sender or receiver id does not resolve to a participant.
    NotFound { side: Side, id: ParticipantId },
    /// The participant directory could not be consulted.
    DirectoryUnavailable { reason: String },
    /// The sender's message could not be stored.
    Persistence { reason: String },
}

impl fmt::Display for RoutingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation { reason } => write!(f, "invalid message: {reason}"),
            Self::NotFound { side, id } => write!(f, "{side} not found: {id}"),
            Self::DirectoryUnavailable { reason } => {
                write!(f, "participant lookup failed: {reason}")
            }
            Self::Persistence { reason } => {
                write!(f, "failed to store message: {reason}")
            }
        }
    }
}

impl std::error::Error for RoutingError {}

/// Errors from the history read paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryError {
    /// A role-scoped history query failed.
    ScopeQueryFailed { scope: RoleScope, reason: String },
    /// Any other store query failed.
    QueryFailed { reason: String },
    /// The participant directory could not be consulted.
    DirectoryUnavailable { reason: String },
}

impl fmt::Display for HistoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ScopeQueryFailed { scope, reason } => {
                write!(f, "{scope} history query failed: {reason}")
            }
            Self::QueryFailed { reason } => write!(f, "history query failed: {reason}"),
            Self::DirectoryUnavailable { reason } => {
                write!(f, "participant lookup failed: {reason}")
            }
        }
    }
}

impl std::error::Error for HistoryError {}

/// Errors from routing configuration validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The assistant and admin sentinels share an id.
    SentinelsCollide { id: ParticipantId },
    /// The assistant timeout is zero.
    ZeroTimeout,
    /// The fallback apology is blank.
    EmptyFallbackText,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SentinelsCollide { id } => {
                write!(f, "assistant and admin sentinel ids must differ (both {id})")
            }
            Self::ZeroTimeout => write!(f, "assistant timeout must be greater than zero"),
            Self::EmptyFallbackText => write!(f, "fallback text must not be blank"),
        }
    }
}

impl std::error::Error for ConfigError {}
