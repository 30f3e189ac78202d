//! Console configuration.
//!
//! Loaded via the `config` crate from `RELAY__*` environment variables, e.g.
//! `RELAY__ROUTING__ASSISTANT_ID=23` or `RELAY__ASSISTANT__MODE=offline`.
//!
//! See [`RoutingConfig`] for the routing settings.

use serde::Deserialize;
use support_relay_conversation::RoutingConfig;
use support_relay_core::ParticipantId;

/// Console configuration composed from library configs.
#[derive(Debug, Deserialize)]
pub struct ConsoleConfig {
    /// Sentinel ids, assistant deadline and fallback text.
    #[serde(default = "default_routing")]
    pub routing: RoutingConfig,

    /// How the assistant answers.
    #[serde(default)]
    pub assistant: AssistantSettings,

    /// Directory name of the assistant participant.
    #[serde(default = "default_assistant_name")]
    pub assistant_name: String,

    /// Directory name of the admin participant.
    #[serde(default = "default_admin_name")]
    pub admin_name: String,
}

/// Which assistant the console wires in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssistantMode {
    /// Answers from a small built-in FAQ table.
    #[default]
    Canned,
    /// Every call fails, so every assistant message takes the fallback path.
    Offline,
}

/// Assistant settings.
#[derive(Debug, Clone, Deserialize)]
pub struct AssistantSettings {
    #[serde(default)]
    pub mode: AssistantMode,

    /// Token budget per reply.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_routing() -> RoutingConfig {
    RoutingConfig::new(ParticipantId::new(23), ParticipantId::new(1))
}

fn default_assistant_name() -> String {
    "AI Assistant".to_string()
}

fn default_admin_name() -> String {
    "Admin".to_string()
}

fn default_max_tokens() -> u32 {
    512
}

impl Default for AssistantSettings {
    fn default() -> Self {
        Self {
            mode: AssistantMode::default(),
            max_tokens: default_max_tokens(),
        }
    }
}

impl ConsoleConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is present but malformed.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(
                config::Environment::with_prefix("RELAY")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}
