//! Error types for payment signing.

use std::fmt;

/// Errors from signing or verifying gateway requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SigningError {
    /// The shared secret is empty.
    MissingSecret,
    /// The MAC could not be keyed with the shared secret.
    InvalidKey { reason: String },
}

impl fmt::Display for SigningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSecret => write!(f, "payment hash secret is not configured"),
            Self::InvalidKey { reason } => write!(f, "invalid payment hash secret: {reason}"),
        }
    }
}

impl std::error::Error for SigningError {}
