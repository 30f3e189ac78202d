//! Routing configuration.
//!
//! The assistant and admin participants are ordinary directory entries whose
//! ids are reserved by configuration. They are loaded once at startup and
//! handed to the router and the history aggregator explicitly.

use crate::error::ConfigError;
use crate::participant::ParticipantRole;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use support_relay_core::ParticipantId;

/// Apology persisted when the assistant cannot answer.
pub const DEFAULT_FALLBACK_TEXT: &str = "Xin lỗi, AI Assistant tạm thời không khả dụng. \
Vui lòng thử lại sau hoặc liên hệ admin để được hỗ trợ.";

/// The reserved assistant and admin participant ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentinels {
    /// Id of the automated assistant participant.
    pub assistant: ParticipantId,
    /// Id of the human admin participant.
    pub admin: ParticipantId,
}

impl Sentinels {
    /// Creates a sentinel pair.
    #[must_use]
    pub const fn new(assistant: ParticipantId, admin: ParticipantId) -> Self {
        Self { assistant, admin }
    }

    /// Returns the role the given participant plays.
    #[must_use]
    pub fn role_of(&self, id: ParticipantId) -> ParticipantRole {
        if id == self.assistant {
            ParticipantRole::Assistant
        } else if id == self.admin {
            ParticipantRole::Admin
        } else {
            ParticipantRole::Customer
        }
    }

    /// Returns true if the id is one of the two reserved ids.
    #[must_use]
    pub fn is_sentinel(&self, id: ParticipantId) -> bool {
        id == self.assistant || id == self.admin
    }
}

/// Configuration consumed by the conversation router.
#[derive(Debug, Clone, Deserialize)]
pub struct RoutingConfig {
    /// Id of the automated assistant participant.
    pub assistant_id: ParticipantId,

    /// Id of the human admin participant.
    pub admin_id: ParticipantId,

    /// Upper bound on a single assistant call, in seconds.
    #[serde(default = "default_assistant_timeout_secs")]
    pub assistant_timeout_secs: u64,

    /// Apology stored when the assistant fails.
    #[serde(default = "default_fallback_text")]
    pub fallback_text: String,
}

fn default_assistant_timeout_secs() -> u64 {
    30
}

fn default_fallback_text() -> String {
    DEFAULT_FALLBACK_TEXT.to_string()
}

impl RoutingConfig {
    /// Creates a configuration with default timeout and fallback text.
    #[must_use]
    pub fn new(assistant_id: ParticipantId, admin_id: ParticipantId) -> Self {
        Self {
            assistant_id,
            admin_id,
            assistant_timeout_secs: default_assistant_timeout_secs(),
            fallback_text: default_fallback_text(),
        }
    }

    /// Returns the sentinel pair.
    #[must_use]
    pub fn sentinels(&self) -> Sentinels {
        Sentinels::new(self.assistant_id, self.admin_id)
    }

    /// Returns the assistant call deadline.
    #[must_use]
    pub fn assistant_timeout(&self) -> Duration {
        Duration::from_secs(self.assistant_timeout_secs)
    }

    /// Checks the configuration for values the router cannot work with.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.assistant_id == self.admin_id {
            return Err(ConfigError::SentinelsCollide {
                id: self.assistant_id,
            });
        }
        if self.assistant_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.fallback_text.trim().is_empty() {
            return Err(ConfigError::EmptyFallbackText);
        }
        Ok(())
    }
}
