//! Assistant primitives for support-relay.
//!
//! This crate provides:
//!
//! - **Gateway**: the `AssistantGateway` capability the router calls for
//!   assistant-directed messages, returning a reply and a "needs human" flag
//! - **Backend**: the `ModelBackend` trait for whatever model answers
//! - **Model gateway**: an `AssistantGateway` built on any `ModelBackend`,
//!   which decodes the model output into an `AssistantReply`

pub mod backend;
pub mod error;
pub mod gateway;
pub mod model_gateway;

pub use backend::{ModelBackend, ModelOutput, SupportPrompt};
pub use error::{BackendError, GatewayError};
pub use gateway::{AssistantGateway, AssistantReply};
pub use model_gateway::{ModelGateway, decode_reply};
