//! Payment gateway configuration.
//!
//! Loaded from `PAYMENT__*` environment variables. There are no built-in
//! merchant credentials.

use crate::error::SigningError;
use crate::signing;
use serde::Deserialize;
use std::fmt;

/// Merchant settings for the payment gateway.
#[derive(Clone, Deserialize)]
pub struct PaymentConfig {
    /// Merchant terminal code.
    pub tmn_code: String,

    /// Shared secret used to sign requests.
    pub hash_secret: String,

    /// Gateway payment page.
    #[serde(default = "default_pay_url")]
    pub pay_url: String,

    /// Path the gateway redirects back to after payment.
    #[serde(default = "default_return_path")]
    pub return_path: String,
}

fn default_pay_url() -> String {
    "https://sandbox.vnpayment.vn/paymentv2/vpcpay.html".to_string()
}

fn default_return_path() -> String {
    "/vnpay-payment-return".to_string()
}

impl fmt::Debug for PaymentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaymentConfig")
            .field("tmn_code", &self.tmn_code)
            .field("hash_secret", &"[redacted]")
            .field("pay_url", &self.pay_url)
            .field("return_path", &self.return_path)
            .finish()
    }
}

impl PaymentConfig {
    /// Loads configuration from `PAYMENT__*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required configuration is missing or invalid.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(
                config::Environment::with_prefix("PAYMENT")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Signs request fields with this merchant's secret.
    ///
    /// # Errors
    ///
    /// Returns `MissingSecret` if the configured secret is empty.
    pub fn sign<I, K, V>(&self, fields: I) -> support_relay_core::Result<String, SigningError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        signing::sign(&self.hash_secret, fields)
    }

    /// Verifies a gateway callback signature with this merchant's secret.
    ///
    /// # Errors
    ///
    /// Returns `MissingSecret` if the configured secret is empty.
    pub fn verify<I, K, V>(
        &self,
        fields: I,
        signature: &str,
    ) -> support_relay_core::Result<bool, SigningError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        signing::verify(&self.hash_secret, fields, signature)
    }
}
