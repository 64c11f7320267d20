//! ghwebhook - Inbound GitHub webhook receiver.
//!
//! The library validates and routes webhook deliveries:
//! - `trust`: trusted source ranges, refreshed from the forge's `/meta` document
//! - `web`: address validation, payload extraction and the axum handler
//! - `events`: the closed set of supported event payloads
//! - `dispatch`: the handler table and background dispatcher
//!
//! ## Request Flow
//!
//! ```text
//! Request → AddressValidator → PayloadExtractor → EventDispatcher → 200 OK
//!                                                       ↓
//!                                               handler (background)
//! ```

pub mod config;
pub mod dispatch;
pub mod error;
pub mod events;
pub mod trust;
pub mod web;

// Re-export commonly used types
pub use config::{Config, TrustConfiguration};
pub use dispatch::{EventDispatcher, HandlerTable};
pub use error::WebhookError;
pub use events::{EventKind, EventPayload, WebhookEvent};
pub use trust::{GithubMeta, MetadataSource, TrustStore};
pub use web::Receiver;
