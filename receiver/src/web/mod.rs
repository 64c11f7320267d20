//! Web server module for handling inbound GitHub webhooks.
//!
//! This module provides the request path of the receiver:
//! - Source-address validation against the trusted ranges
//! - Content-type-aware payload extraction and signature verification
//! - The axum handler that ties them to the dispatcher
//!
//! Handler execution happens in the background dispatcher.

pub mod address;
pub mod handlers;
pub mod payload;
pub mod signature;

pub use address::{AddressValidator, FORWARDED_FOR_HEADER};
pub use handlers::{receive_webhook, InboundRequest, Receiver};
pub use payload::{DecodedPayload, PayloadExtractor, DELIVERY_HEADER, EVENT_HEADER};
pub use signature::{signature_header, verify_signature, SIGNATURE_256_HEADER, SIGNATURE_HEADER};
