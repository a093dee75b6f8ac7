//! Webhook signature verification
//!
//! GitHub signs each delivery with HMAC-SHA256 over the raw body and sends
//! the hex digest in `X-Hub-Signature-256` as `sha256=<digest>`. The
//! comparison goes through `Mac::verify_slice`, which is constant-time.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Verify a webhook delivery against the shared secret.
///
/// Returns false for any malformed header rather than erroring: a bad
/// signature and a missing one are rejected the same way.
pub fn verify_signature(signature: &str, secret: &str, body: &[u8]) -> bool {
    let Some(hex_digest) = signature.strip_prefix("sha256=") else {
        return false;
    };

    let Ok(expected) = hex::decode(hex_digest) else {
        return false;
    };

    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };

    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}

/// Compute the `sha256=<hex>` signature header value for a body.
///
/// The inverse of [`verify_signature`]; used by tests and local delivery
/// tooling.
pub fn sign_body(secret: &str, body: &[u8]) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(body);
    format!("sha256={}", hex::encode(mac.finalize().into_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_signature_verifies() {
        let secret = "test-secret";
        let body = br#"{"zen":"Keep it logically awesome."}"#;

        let signature = sign_body(secret, body);
        assert!(verify_signature(&signature, secret, body));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let body = b"payload";
        let signature = sign_body("secret-a", body);
        assert!(!verify_signature(&signature, "secret-b", body));
    }

    #[test]
    fn test_tampered_body_rejected() {
        let signature = sign_body("secret", b"original");
        assert!(!verify_signature(&signature, "secret", b"tampered"));
    }

    #[test]
    fn test_missing_prefix_rejected() {
        let signature = sign_body("secret", b"body");
        let bare = signature.strip_prefix("sha256=").unwrap();
        assert!(!verify_signature(bare, "secret", b"body"));
    }

    #[test]
    fn test_non_hex_digest_rejected() {
        assert!(!verify_signature("sha256=not-hex!", "secret", b"body"));
    }
}
