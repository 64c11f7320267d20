//! Content-type-aware payload extraction.
//!
//! GitHub delivers either a raw JSON body or a form-encoded body whose
//! `payload` field holds the JSON. The signature always covers the raw
//! request bytes, never the decoded field.

use axum::http::{header, HeaderMap};
use tracing::{debug, warn};

use super::signature::{signature_header, verify_signature};
use crate::error::WebhookError;

/// Header carrying the event-type tag.
pub const EVENT_HEADER: &str = "X-GitHub-Event";

/// Header carrying the unique delivery id.
pub const DELIVERY_HEADER: &str = "X-GitHub-Delivery";

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const JSON_CONTENT_TYPE: &str = "application/json";

/// Event bytes ready for schema decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPayload {
    pub event_type: String,
    pub body: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct PayloadExtractor {
    secret: Vec<u8>,
}

impl PayloadExtractor {
    /// An empty `secret` disables signature verification.
    pub fn new(secret: &str) -> Self {
        Self {
            secret: secret.as_bytes().to_vec(),
        }
    }

    fn verify(&self, headers: &HeaderMap, body: &[u8]) -> Result<(), WebhookError> {
        if self.secret.is_empty() {
            return Ok(());
        }
        verify_signature(&self.secret, signature_header(headers), body)
    }

    /// Select, verify and unwrap the event bytes of a request.
    pub fn extract(&self, headers: &HeaderMap, body: &[u8]) -> Result<DecodedPayload, WebhookError> {
        let content_type = headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();

        let payload = match media_type(content_type).as_str() {
            FORM_CONTENT_TYPE => {
                self.verify(headers, body)?;
                form_payload(body)
            }
            JSON_CONTENT_TYPE => {
                self.verify(headers, body)?;
                body.to_vec()
            }
            other => {
                warn!(content_type = %other, "content_type_unsupported");
                return Err(WebhookError::UnsupportedContentType(other.to_string()));
            }
        };

        let event_type = headers
            .get(EVENT_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .trim()
            .to_string();

        debug!(
            event_type = %event_type,
            payload_length = payload.len(),
            "payload_extracted"
        );

        Ok(DecodedPayload {
            event_type,
            body: payload,
        })
    }
}

/// Lowercased media type with any parameters stripped.
fn media_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Value of the `payload` form field, or empty if absent.
fn form_payload(body: &[u8]) -> Vec<u8> {
    url::form_urlencoded::parse(body)
        .find(|(key, _)| key == "payload")
        .map(|(_, value)| value.into_owned().into_bytes())
        .unwrap_or_default()
}
