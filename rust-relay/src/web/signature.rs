//! Shopify webhook signature verification.
//!
//! Shopify signs each webhook with HMAC-SHA256 over the raw request body, keyed by
//! the app secret, and sends the base64 digest in `X-Shopify-Hmac-Sha256`.
//! Reference: https://shopify.dev/docs/apps/build/webhooks/subscribe/https#step-5-verify-the-webhook

use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;
use tracing::warn;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the base64 HMAC of the body.
pub const SHOPIFY_HMAC_HEADER: &str = "X-Shopify-Hmac-Sha256";

/// Why a webhook failed authentication.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("signature header is missing")]
    MissingSignature,

    #[error("signature does not match the request body")]
    SignatureMismatch,
}

/// Compute the base64-encoded HMAC-SHA256 of `body` keyed by `secret`.
pub fn compute_signature_base64(secret: &str, body: &[u8]) -> String {
    // HMAC accepts keys of any length
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(body);
    STANDARD.encode(mac.finalize().into_bytes())
}

/// Verify a Shopify webhook signature.
///
/// `body` must be the bytes exactly as received; hashing a re-serialized payload
/// will not match.
///
/// # Arguments
///
/// * `secret` - The Shopify app secret
/// * `body` - Raw request body
/// * `signature` - Value of the `X-Shopify-Hmac-Sha256` header, if present
pub fn verify_shopify_hmac(
    secret: &str,
    body: &[u8],
    signature: Option<&str>,
) -> Result<(), AuthError> {
    let signature = match signature {
        Some(s) => s,
        None => {
            warn!(body_length = body.len(), "shopify_signature_missing");
            return Err(AuthError::MissingSignature);
        }
    };

    let expected_signature = compute_signature_base64(secret, body);

    // Constant-time comparison to prevent timing attacks
    if !constant_time_compare(&expected_signature, signature) {
        warn!(
            expected_length = expected_signature.len(),
            actual_length = signature.len(),
            body_length = body.len(),
            "shopify_signature_mismatch"
        );
        return Err(AuthError::SignatureMismatch);
    }

    Ok(())
}

/// Constant-time string comparison to prevent timing attacks.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}
