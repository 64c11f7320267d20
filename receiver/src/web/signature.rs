//! GitHub webhook signature verification.
//!
//! GitHub signs the raw request body with HMAC using the shared webhook
//! secret and sends `<algorithm>=<hex-mac>` in `X-Hub-Signature-256`
//! (SHA-256) and, for older hooks, `X-Hub-Signature` (SHA-1).
//! Reference: https://docs.github.com/webhooks/using-webhooks/validating-webhook-deliveries

use axum::http::HeaderMap;
use hmac::digest::KeyInit;
use hmac::{Hmac, Mac};
use sha1::Sha1;
use sha2::{Sha256, Sha512};
use tracing::warn;

use crate::error::WebhookError;

pub const SIGNATURE_256_HEADER: &str = "X-Hub-Signature-256";
pub const SIGNATURE_HEADER: &str = "X-Hub-Signature";

/// Pick the signature header value, preferring the SHA-256 header.
pub fn signature_header(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(SIGNATURE_256_HEADER)
        .or_else(|| headers.get(SIGNATURE_HEADER))
        .and_then(|v| v.to_str().ok())
}

/// Verify `signature` (`<algorithm>=<hex-mac>`) against `body`.
///
/// The MAC comparison is constant-time. Every failure mode (missing header,
/// unknown algorithm, bad hex, mismatch) is a [`WebhookError::Signature`].
pub fn verify_signature(
    secret: &[u8],
    signature: Option<&str>,
    body: &[u8],
) -> Result<(), WebhookError> {
    let signature = signature.ok_or_else(|| {
        warn!("signature_missing");
        WebhookError::Signature("missing signature header".into())
    })?;

    let (algorithm, mac_hex) = signature.trim().split_once('=').ok_or_else(|| {
        warn!("signature_malformed");
        WebhookError::Signature("signature is not <algorithm>=<hex>".into())
    })?;

    let expected = hex::decode(mac_hex).map_err(|e| {
        warn!(error = %e, "signature_invalid_hex");
        WebhookError::Signature(format!("invalid hex in signature: {e}"))
    })?;

    let valid = match algorithm {
        "sha1" => verify_mac::<Hmac<Sha1>>(secret, body, &expected),
        "sha256" => verify_mac::<Hmac<Sha256>>(secret, body, &expected),
        "sha512" => verify_mac::<Hmac<Sha512>>(secret, body, &expected),
        other => {
            warn!(algorithm = %other, "signature_unknown_algorithm");
            return Err(WebhookError::Signature(format!(
                "unsupported signature algorithm {other:?}"
            )));
        }
    };

    if !valid {
        warn!(
            algorithm = %algorithm,
            body_length = body.len(),
            "signature_mismatch"
        );
        return Err(WebhookError::Signature("HMAC signature mismatch".into()));
    }

    Ok(())
}

fn verify_mac<M: Mac + KeyInit>(secret: &[u8], body: &[u8], expected: &[u8]) -> bool {
    let mut mac = match <M as Mac>::new_from_slice(secret) {
        Ok(mac) => mac,
        Err(_) => return false,
    };
    Mac::update(&mut mac, body);
    mac.verify_slice(expected).is_ok()
}

#[cfg(test)]
pub(crate) fn sign_sha256(secret: &[u8], body: &[u8]) -> String {
    let mut mac = <Hmac<Sha256> as Mac>::new_from_slice(secret).unwrap();
    Mac::update(&mut mac, body);
    format!("sha256={}", hex::encode(mac.finalize().into_bytes()))
}
