//! Canonical request signing for the payment gateway.
//!
//! Fields with empty values are dropped, the rest are sorted by name in byte
//! order and joined as `name=value` pairs with `&`. The signature is the
//! lowercase hex HMAC-SHA512 of that string under the shared secret.

use crate::error::SigningError;
use hmac::{Hmac, Mac};
use sha2::Sha512;
use tracing::debug;

type HmacSha512 = Hmac<Sha512>;

/// Field carrying the signature in gateway callbacks.
pub const SECURE_HASH_FIELD: &str = "vnp_SecureHash";

/// Field naming the hash algorithm in gateway callbacks.
pub const SECURE_HASH_TYPE_FIELD: &str = "vnp_SecureHashType";

/// Fields that are never part of the signed string.
pub const SIGNATURE_FIELDS: [&str; 2] = [SECURE_HASH_FIELD, SECURE_HASH_TYPE_FIELD];

/// Builds the string that gets signed.
///
/// The result does not depend on the iteration order of `fields`.
pub fn canonical_string<I, K, V>(fields: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut pairs: Vec<(K, V)> = fields
        .into_iter()
        .filter(|(_, value)| {
            let value: &str = value.as_ref();
            !value.is_empty()
        })
        .collect();
    pairs.sort_by(|a, b| a.0.as_ref().cmp(b.0.as_ref()));

    pairs
        .iter()
        .map(|(name, value)| format!("{}={}", name.as_ref(), value.as_ref()))
        .collect::<Vec<_>>()
        .join("&")
}

/// Signs the given fields with the shared secret.
///
/// # Errors
///
/// Returns `MissingSecret` if `secret` is empty.
pub fn sign<I, K, V>(secret: &str, fields: I) -> support_relay_core::Result<String, SigningError>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut mac = keyed_mac(secret)?;
    mac.update(canonical_string(fields).as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Checks a signature received from the gateway.
///
/// The signature fields themselves are ignored, so a callback's full
/// parameter set can be passed as received. Hex case does not matter and
/// the comparison is constant-time.
///
/// # Errors
///
/// Returns `MissingSecret` if `secret` is empty.
pub fn verify<I, K, V>(
    secret: &str,
    fields: I,
    signature: &str,
) -> support_relay_core::Result<bool, SigningError>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut mac = keyed_mac(secret)?;
    let Ok(expected) = hex::decode(signature.trim()) else {
        debug!("signature is not valid hex");
        return Ok(false);
    };

    let signed = fields.into_iter().filter(|(name, _)| {
        let name: &str = name.as_ref();
        !SIGNATURE_FIELDS.contains(&name)
    });
    mac.update(canonical_string(signed).as_bytes());
    Ok(mac.verify_slice(&expected).is_ok())
}

fn keyed_mac(secret: &str) -> Result<HmacSha512, SigningError> {
    if secret.is_empty() {
        return Err(SigningError::MissingSecret);
    }
    HmacSha512::new_from_slice(secret.as_bytes()).map_err(|e| SigningError::InvalidKey {
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{BTreeMap, HashMap};

    const ORDER_DIGEST: &str =
        "8b253c53017c31f3990ee9f9ff3ceb73660575e015e0c8f497fa8d279f654060729888a1d8c08a9da227953d9c065a63e8076f8a43f8d5fc75341c5b66d78234";

    fn order_fields() -> Vec<(&'static str, &'static str)> {
        vec![("amount", "10000"), ("command", "pay"), ("ref", "66487383")]
    }

    #[test]
    fn canonical_string_sorts_and_joins() {
        assert_eq!(
            canonical_string([("ref", "66487383"), ("amount", "10000"), ("command", "pay")]),
            "amount=10000&command=pay&ref=66487383"
        );
    }

    #[test]
    fn canonical_string_drops_empty_values() {
        assert_eq!(
            canonical_string([("b", ""), ("a", "1"), ("c", "3")]),
            "a=1&c=3"
        );
        assert_eq!(canonical_string(Vec::<(String, String)>::new()), "");
    }

    #[test]
    fn canonical_string_sorts_by_bytes() {
        // Uppercase sorts before lowercase.
        assert_eq!(
            canonical_string([("b", "1"), ("B", "2"), ("a", "3")]),
            "B=2&a=3&b=1"
        );
    }

    #[test]
    fn signs_reference_order() {
        assert_eq!(sign("S3CR3T", order_fields()).unwrap(), ORDER_DIGEST);
    }

    #[test]
    fn signature_ignores_insertion_order() {
        let mut reversed = order_fields();
        reversed.reverse();
        let hashed: HashMap<_, _> = order_fields().into_iter().collect();
        let sorted: BTreeMap<_, _> = order_fields().into_iter().collect();

        assert_eq!(sign("S3CR3T", reversed).unwrap(), ORDER_DIGEST);
        assert_eq!(sign("S3CR3T", &hashed).unwrap(), ORDER_DIGEST);
        assert_eq!(sign("S3CR3T", &sorted).unwrap(), ORDER_DIGEST);
    }

    #[test]
    fn changing_any_value_changes_signature() {
        let base = order_fields();
        for i in 0..base.len() {
            let mut changed: Vec<(&str, String)> =
                base.iter().map(|(k, v)| (*k, v.to_string())).collect();
            changed[i].1.push('0');
            assert_ne!(
                sign("S3CR3T", changed).unwrap(),
                ORDER_DIGEST,
                "field {}",
                base[i].0
            );
        }

        let bumped = [("amount", "10001"), ("command", "pay"), ("ref", "66487383")];
        assert_eq!(
            sign("S3CR3T", bumped).unwrap(),
            "afcfb99bc8cb6b6289622020f4fb144303d424acea57caa2e306ef874638aaff7ef10b6ded9a2c7432e8414580b4a072e1b055ca0e84163217288966281988ea"
        );
    }

    #[test]
    fn signs_gateway_payment_request() {
        let fields = [
            ("vnp_Amount", "10000"),
            ("vnp_Command", "pay"),
            ("vnp_CreateDate", "20251107020708"),
            ("vnp_CurrCode", "VND"),
            ("vnp_ExpireDate", "20251107023708"),
            ("vnp_IpAddr", "172.18.0.3"),
            ("vnp_Locale", "vn"),
            ("vnp_OrderInfo", "Skibidi"),
            ("vnp_OrderType", "order-type"),
            ("vnp_ReturnUrl", "http://localhost:3000/payment-result?"),
            ("vnp_TmnCode", "L6HT7TRL"),
            ("vnp_TxnRef", "66487383"),
            ("vnp_Version", "2.1.0"),
        ];
        assert_eq!(
            sign("OF6M0J6RIX8RN9ANH5Z0PKLY3YK6TKGT", fields).unwrap(),
            "f7aaef9b872180671dac9399663a99d81121c4224c40e83e6a7fd2434f7816a00da7bbe266331be442e99c20a742eb930035630248f8efe7131d7809b2a752ff"
        );
    }

    #[test]
    fn empty_secret_is_an_error() {
        let err = sign("", order_fields()).unwrap_err();
        assert!(err.to_string().contains("not configured"), "{err}");
        assert!(verify("", order_fields(), ORDER_DIGEST).is_err());
    }

    #[test]
    fn verify_accepts_callback_parameters() {
        let mut callback: BTreeMap<&str, &str> = order_fields().into_iter().collect();
        callback.insert(SECURE_HASH_FIELD, ORDER_DIGEST);
        callback.insert(SECURE_HASH_TYPE_FIELD, "HmacSHA512");

        assert!(verify("S3CR3T", &callback, ORDER_DIGEST).unwrap());
        assert!(
            verify("S3CR3T", &callback, &ORDER_DIGEST.to_uppercase()).unwrap()
        );
    }

    #[test]
    fn verify_rejects_tampering() {
        let tampered = [("amount", "99999"), ("command", "pay"), ("ref", "66487383")];
        assert!(!verify("S3CR3T", tampered, ORDER_DIGEST).unwrap());
        assert!(!verify("other", order_fields(), ORDER_DIGEST).unwrap());
        assert!(!verify("S3CR3T", order_fields(), "not-hex").unwrap());
        assert!(!verify("S3CR3T", order_fields(), "").unwrap());
    }
}
