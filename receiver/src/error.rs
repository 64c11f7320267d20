//! Error kinds surfaced by the webhook receiver.
//!
//! Every failure in the synchronous request path maps to exactly one HTTP
//! status. The response body carries only the status reason phrase; the
//! detail string stays in the logs.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Errors raised while validating, extracting or routing a webhook.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// A statically configured CIDR range is malformed.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The metadata document could not be fetched or parsed.
    #[error("upstream error: {0}")]
    Upstream(String),

    /// A forwarded-for hop or the socket address is outside every trusted range.
    #[error("untrusted address: {0}")]
    UntrustedAddress(String),

    /// The signature header is missing, malformed or does not match the body.
    #[error("signature error: {0}")]
    Signature(String),

    #[error("unsupported content type: {0}")]
    UnsupportedContentType(String),

    /// Unknown event-type tag or a body that does not match its schema.
    #[error("decode error: {0}")]
    Decode(String),

    #[error("method not allowed: {0}")]
    MethodNotAllowed(String),

    /// The background dispatch worker is no longer accepting events.
    #[error("dispatcher closed")]
    DispatcherClosed,
}

impl WebhookError {
    /// HTTP status returned to the forge for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebhookError::Configuration(_)
            | WebhookError::Upstream(_)
            | WebhookError::DispatcherClosed => StatusCode::INTERNAL_SERVER_ERROR,
            WebhookError::UntrustedAddress(_) => StatusCode::FORBIDDEN,
            WebhookError::Signature(_)
            | WebhookError::UnsupportedContentType(_)
            | WebhookError::Decode(_) => StatusCode::BAD_REQUEST,
            WebhookError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
        }
    }
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let reason = status.canonical_reason().unwrap_or("Error");
        (status, reason).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            WebhookError::Configuration("bad cidr".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            WebhookError::Upstream("timeout".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            WebhookError::UntrustedAddress("9.9.9.9".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            WebhookError::Signature("mismatch".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            WebhookError::UnsupportedContentType("text/plain".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            WebhookError::Decode("unknown".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            WebhookError::MethodNotAllowed("GET".into()).status_code(),
            StatusCode::METHOD_NOT_ALLOWED
        );
    }

    #[test]
    fn test_response_hides_detail() {
        let response = WebhookError::Signature("expected abc got def".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
