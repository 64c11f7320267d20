//! Source-address validation against the trusted range set.

use std::net::{IpAddr, SocketAddr};

use tracing::warn;

use crate::error::WebhookError;
use crate::trust::TrustedSet;

/// Header listing the client addresses appended by intermediate proxies.
pub const FORWARDED_FOR_HEADER: &str = "X-Forwarded-For";

/// Decides whether a request's claimed origin is trusted.
///
/// Every hop in the forwarded-for chain must be inside a trusted range, not
/// only the nearest one, and the socket peer must be trusted as well.
#[derive(Debug, Clone, Copy, Default)]
pub struct AddressValidator;

impl AddressValidator {
    pub fn new() -> Self {
        Self
    }

    /// Validate the forwarded-for chain (if the header is present) and the
    /// socket-level remote address.
    pub fn validate(
        &self,
        trusted: &TrustedSet,
        remote_addr: Option<SocketAddr>,
        forwarded_for: Option<&str>,
    ) -> Result<(), WebhookError> {
        if let Some(forwarded_for) = forwarded_for {
            for hop in forwarded_for.split(',') {
                let hop = hop.trim();
                let ip: IpAddr = hop.parse().map_err(|_| {
                    warn!(hop = %hop, "forwarded_for_unparseable");
                    WebhookError::UntrustedAddress(format!("unparseable forwarded-for hop {hop:?}"))
                })?;
                check(trusted, ip, "forwarded_for")?;
            }
        }

        let remote_addr = remote_addr.ok_or_else(|| {
            warn!("remote_addr_missing");
            WebhookError::UntrustedAddress("remote address unknown".into())
        })?;
        check(trusted, remote_addr.ip(), "remote_addr")
    }
}

fn check(trusted: &TrustedSet, ip: IpAddr, source: &'static str) -> Result<(), WebhookError> {
    if trusted.contains(&ip) {
        return Ok(());
    }

    warn!(ip = %ip, source = source, "address_untrusted");
    Err(WebhookError::UntrustedAddress(ip.to_string()))
}
