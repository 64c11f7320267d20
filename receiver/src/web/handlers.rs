//! Webhook endpoint handler.
//!
//! The handler is designed to answer fast. It only:
//! 1. Checks the source address (when restriction is enabled)
//! 2. Extracts and verifies the payload
//! 3. Decodes the event and queues it for its handler
//! 4. Returns immediately
//!
//! Handler execution happens in the background dispatcher and never affects
//! the response.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Bytes,
    extract::{ConnectInfo, DefaultBodyLimit, State},
    http::{HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use tracing::{info, warn};

use super::address::{AddressValidator, FORWARDED_FOR_HEADER};
use super::payload::{PayloadExtractor, DELIVERY_HEADER};
use crate::config::TrustConfiguration;
use crate::dispatch::{EventDispatcher, HandlerTable};
use crate::error::WebhookError;
use crate::events::EventKind;
use crate::trust::{MetadataSource, TrustStore};

/// Largest delivery body accepted; GitHub caps payloads at 25 MB.
pub const MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

/// One inbound HTTP call, owned by the request flow.
#[derive(Debug, Clone)]
pub struct InboundRequest {
    pub method: Method,
    pub headers: HeaderMap,
    pub remote_addr: Option<SocketAddr>,
    pub body: Bytes,
}

/// Shared receiver state: trust settings, range store and dispatcher.
#[derive(Clone)]
pub struct Receiver {
    inner: Arc<ReceiverInner>,
}

struct ReceiverInner {
    config: TrustConfiguration,
    trust: TrustStore,
    validator: AddressValidator,
    extractor: PayloadExtractor,
    dispatcher: EventDispatcher,
}

impl Receiver {
    /// Build a receiver and start its dispatcher on the current runtime.
    pub fn new(
        config: TrustConfiguration,
        source: Arc<dyn MetadataSource>,
        handlers: HandlerTable,
    ) -> Self {
        let trust = TrustStore::new(config.static_trusted_ranges().to_vec(), source);
        let extractor = PayloadExtractor::new(config.secret());
        let dispatcher = EventDispatcher::start(handlers);

        Self {
            inner: Arc::new(ReceiverInner {
                config,
                trust,
                validator: AddressValidator::new(),
                extractor,
                dispatcher,
            }),
        }
    }

    /// Router answering every path with [`receive_webhook`].
    pub fn router(&self) -> Router {
        Router::new()
            .fallback(receive_webhook)
            .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
            .with_state(self.clone())
    }

    pub fn trust_store(&self) -> &TrustStore {
        &self.inner.trust
    }

    /// Wait for every accepted event to reach its handler, then refuse new
    /// deliveries with 500.
    pub async fn shutdown(&self) {
        self.inner.dispatcher.shutdown().await;
    }

    /// Run a request through address check, extraction and dispatch.
    ///
    /// Returns the accepted event kind; the handler itself runs later.
    pub async fn handle(&self, request: InboundRequest) -> Result<EventKind, WebhookError> {
        let inner = &self.inner;

        if inner.config.restrict_address() {
            inner.trust.ensure_fresh(Instant::now()).await?;
            let trusted = inner.trust.trusted().await;

            let forwarded_for = forwarded_chain(&request.headers)?;

            inner
                .validator
                .validate(&trusted, request.remote_addr, forwarded_for.as_deref())?;
        }

        if request.method != Method::POST {
            return Err(WebhookError::MethodNotAllowed(request.method.to_string()));
        }

        let payload = inner.extractor.extract(&request.headers, &request.body)?;

        let delivery_id = request
            .headers
            .get(DELIVERY_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        inner
            .dispatcher
            .dispatch(&payload.event_type, &payload.body, delivery_id)
    }
}

/// Join every forwarded-for header line into one comma-separated chain.
///
/// `None` when the header is absent. A line that is not visible ASCII makes
/// the whole chain untrusted.
fn forwarded_chain(headers: &HeaderMap) -> Result<Option<String>, WebhookError> {
    let lines = headers
        .get_all(FORWARDED_FOR_HEADER)
        .iter()
        .map(|value| {
            value.to_str().map_err(|_| {
                warn!("forwarded_for_not_ascii");
                WebhookError::UntrustedAddress("non-ASCII forwarded-for header".into())
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    if lines.is_empty() {
        return Ok(None);
    }
    Ok(Some(lines.join(",")))
}

/// Webhook endpoint.
pub async fn receive_webhook(
    State(receiver): State<Receiver>,
    method: Method,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let delivery_id = headers
        .get(DELIVERY_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let request = InboundRequest {
        method,
        headers,
        remote_addr: connect_info.map(|ConnectInfo(addr)| addr),
        body,
    };
    let remote_addr = request.remote_addr;
    let body_length = request.body.len();

    match receiver.handle(request).await {
        Ok(kind) => {
            info!(
                event_type = %kind,
                delivery_id = %delivery_id,
                body_length = body_length,
                "webhook_accepted"
            );
            StatusCode::OK.into_response()
        }
        Err(e) => {
            warn!(
                error = %e,
                status = e.status_code().as_u16(),
                delivery_id = %delivery_id,
                remote_addr = ?remote_addr,
                "webhook_rejected"
            );
            e.into_response()
        }
    }
}
