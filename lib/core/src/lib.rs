//! Core domain types shared by the support-relay crates.
//!
//! Provides the integer identifier newtypes for participants and messages
//! and the rootcause-based `Result` alias.

pub mod error;
pub mod id;

pub use error::Result;
pub use id::{MessageId, ParseIdError, ParticipantId};
