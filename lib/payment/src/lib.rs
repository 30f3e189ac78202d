//! Payment gateway request signing for support-relay.
//!
//! Requests to the payment gateway carry an HMAC-SHA512 signature over a
//! canonical `name=value&...` string. This crate builds that string, signs
//! it, verifies callback signatures, and loads merchant configuration.

pub mod config;
pub mod error;
pub mod signing;

pub use config::PaymentConfig;
pub use error::SigningError;
pub use signing::{
    SECURE_HASH_FIELD, SECURE_HASH_TYPE_FIELD, SIGNATURE_FIELDS, canonical_string, sign, verify,
};
