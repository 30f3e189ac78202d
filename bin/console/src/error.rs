//! Error types for the console binary.

use std::fmt;

/// Errors that stop the console.
#[derive(Debug)]
pub enum ConsoleError {
    /// Configuration could not be loaded.
    Config { details: String },
    /// Configuration loaded but is unusable.
    InvalidConfig { details: String },
    /// Reading commands or writing responses failed.
    Io { details: String },
}

impl fmt::Display for ConsoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config { details } => write!(f, "failed to load configuration: {details}"),
            Self::InvalidConfig { details } => write!(f, "invalid configuration: {details}"),
            Self::Io { details } => write!(f, "console i/o failed: {details}"),
        }
    }
}

impl std::error::Error for ConsoleError {}
