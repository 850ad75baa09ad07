//! Webhook signature verification using HMAC-SHA256.
//!
//! GitHub signs webhook payloads with a shared secret and puts the signature
//! in the `X-Hub-Signature-256` header as `sha256=<hex>`. Verification is the
//! first step of webhook processing; invalid signatures are rejected before
//! the payload is parsed.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Parses a signature header (e.g. "sha256=abc123...") into raw bytes.
///
/// Returns `None` for malformed headers (missing prefix, invalid hex).
pub fn parse_signature_header(header: &str) -> Option<Vec<u8>> {
    let hex_sig = header.strip_prefix("sha256=")?;
    hex::decode(hex_sig).ok()
}

/// Computes the HMAC-SHA256 signature of a payload under the given secret.
///
/// Used by tests to build valid deliveries.
pub fn compute_signature(payload: &[u8], secret: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC can take key of any size");
    mac.update(payload);
    mac.finalize().into_bytes().to_vec()
}

/// Formats a signature as a header value, `sha256=<hex>`.
pub fn format_signature_header(signature: &[u8]) -> String {
    format!("sha256={}", hex::encode(signature))
}

/// Verifies a webhook signature against the payload and secret.
///
/// Uses the HMAC library's constant-time comparison.
pub fn verify_signature(payload: &[u8], signature_header: &str, secret: &[u8]) -> bool {
    let expected = match parse_signature_header(signature_header) {
        Some(sig) => sig,
        None => return false,
    };

    let mut mac = match HmacSha256::new_from_slice(secret) {
        Ok(mac) => mac,
        Err(_) => return false,
    };
    mac.update(payload);
    mac.verify_slice(&expected).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parse_header_accepts_valid_hex() {
        let sig = parse_signature_header("sha256=deadbeef").unwrap();
        assert_eq!(sig, vec![0xde, 0xad, 0xbe, 0xef]);
    }

    #[test]
    fn parse_header_rejects_missing_prefix() {
        assert!(parse_signature_header("deadbeef").is_none());
        assert!(parse_signature_header("sha1=deadbeef").is_none());
    }

    #[test]
    fn parse_header_rejects_bad_hex() {
        assert!(parse_signature_header("sha256=xyz").is_none());
        assert!(parse_signature_header("sha256=abc").is_none());
    }

    #[test]
    fn verify_rejects_tampered_payload() {
        let secret = b"secret";
        let sig = compute_signature(b"original", secret);
        let header = format_signature_header(&sig);
        assert!(verify_signature(b"original", &header, secret));
        assert!(!verify_signature(b"tampered", &header, secret));
    }

    proptest! {
        /// Signatures computed under a secret always verify under it.
        #[test]
        fn prop_roundtrip_verifies(
            payload in proptest::collection::vec(any::<u8>(), 0..256),
            secret in proptest::collection::vec(any::<u8>(), 1..64),
        ) {
            let sig = compute_signature(&payload, &secret);
            let header = format_signature_header(&sig);
            prop_assert!(verify_signature(&payload, &header, &secret));
        }

        /// A signature never verifies under a different secret.
        #[test]
        fn prop_wrong_secret_fails(
            payload in proptest::collection::vec(any::<u8>(), 0..256),
            secret in proptest::collection::vec(any::<u8>(), 1..64),
            other in proptest::collection::vec(any::<u8>(), 1..64),
        ) {
            prop_assume!(secret != other);
            let sig = compute_signature(&payload, &secret);
            let header = format_signature_header(&sig);
            prop_assert!(!verify_signature(&payload, &header, &other));
        }
    }
}
