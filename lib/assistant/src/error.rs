//! Error types for the assistant crate.
//!
//! - `BackendError`: failures of the model behind a gateway
//! - `GatewayError`: failures of an assistant gateway call, as seen by the
//!   router. Every variant sends the router down the fallback path.

use std::fmt;

/// Errors from a model backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The model could not be reached.
    Unreachable { model: String, reason: String },
    /// The model refused the prompt.
    Rejected { reason: String },
    /// The model is throttling requests.
    RateLimited { retry_after_secs: Option<u64> },
    /// The model answered with something that is not a reply.
    UnusableOutput { reason: String },
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unreachable { model, reason } => {
                write!(f, "model '{model}' unreachable: {reason}")
            }
            Self::Rejected { reason } => write!(f, "model rejected the prompt: {reason}"),
            Self::RateLimited {
                retry_after_secs: Some(secs),
            } => write!(f, "model rate limited, retry after {secs}s"),
            Self::RateLimited {
                retry_after_secs: None,
            } => write!(f, "model rate limited"),
            Self::UnusableOutput { reason } => write!(f, "unusable model output: {reason}"),
        }
    }
}

impl std::error::Error for BackendError {}

/// Errors from an assistant gateway call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The assistant service could not be reached or refused the request.
    Unavailable { reason: String },
    /// The call did not finish within the configured deadline.
    Timeout { after_secs: u64 },
    /// The assistant answered with nothing usable.
    EmptyReply,
    /// The assistant answer could not be decoded.
    MalformedReply { reason: String },
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable { reason } => write!(f, "assistant unavailable: {reason}"),
            Self::Timeout { after_secs } => {
                write!(f, "assistant did not answer within {after_secs}s")
            }
            Self::EmptyReply => write!(f, "assistant returned an empty reply"),
            Self::MalformedReply { reason } => {
                write!(f, "malformed assistant reply: {reason}")
            }
        }
    }
}

impl std::error::Error for GatewayError {}

impl From<BackendError> for GatewayError {
    fn from(e: BackendError) -> Self {
        match e {
            BackendError::UnusableOutput { reason } => Self::MalformedReply { reason },
            other => Self::Unavailable {
                reason: other.to_string(),
            },
        }
    }
}
