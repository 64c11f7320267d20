//! Configuration module for environment variable parsing.
//!
//! The process-level [`Config`] is read once at startup. The receiver only
//! ever sees the immutable [`TrustConfiguration`] derived from it.

use std::env;
use std::time::Duration;
use tracing::warn;

/// Default forge metadata endpoint listing the hook source ranges.
pub const DEFAULT_META_URL: &str = "https://api.github.com/meta";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the web server to listen on
    pub port: u16,

    /// Shared webhook secret. `None` or blank disables signature verification.
    pub webhook_secret: Option<String>,

    /// Reject requests whose source addresses are not in a trusted range
    pub restrict_address: bool,

    /// Extra trusted CIDR ranges (e.g. reverse proxies in front of the receiver)
    pub trusted_addrs: Vec<String>,

    /// URL of the metadata document advertising hook source ranges
    pub meta_url: String,

    /// Timeout for the metadata request in milliseconds
    pub meta_timeout_ms: u64,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Config {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),

            webhook_secret: env::var("GITHUB_WEBHOOK_SECRET").ok(),

            restrict_address: parse_bool("RESTRICT_ADDRESS", false),

            trusted_addrs: parse_csv("TRUSTED_ADDRS").unwrap_or_default(),

            meta_url: env::var("GITHUB_META_URL").unwrap_or_else(|_| DEFAULT_META_URL.to_string()),

            meta_timeout_ms: env::var("META_REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10_000),
        }
    }

    pub fn meta_timeout(&self) -> Duration {
        Duration::from_millis(self.meta_timeout_ms)
    }

    /// Build the immutable trust settings handed to the receiver.
    pub fn trust_configuration(&self) -> TrustConfiguration {
        TrustConfiguration::new(
            self.webhook_secret.clone().unwrap_or_default(),
            self.restrict_address,
            self.trusted_addrs.clone(),
        )
    }
}

/// Trust settings owned by the receiver. Immutable after construction.
#[derive(Debug, Clone, Default)]
pub struct TrustConfiguration {
    secret: String,
    restrict_address: bool,
    static_trusted_ranges: Vec<String>,
}

impl TrustConfiguration {
    /// A blank `secret` means signature verification is disabled.
    pub fn new(
        secret: impl Into<String>,
        restrict_address: bool,
        static_trusted_ranges: Vec<String>,
    ) -> Self {
        let (secret, blanked) = normalize_secret(secret.into());
        if blanked {
            warn!("Webhook secret is set but blank, signature verification disabled");
        }

        Self {
            secret,
            restrict_address,
            static_trusted_ranges,
        }
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    pub fn signature_verification_enabled(&self) -> bool {
        !self.secret.is_empty()
    }

    pub fn restrict_address(&self) -> bool {
        self.restrict_address
    }

    pub fn static_trusted_ranges(&self) -> &[String] {
        &self.static_trusted_ranges
    }
}

/// Collapse a whitespace-only secret to empty. The flag is set when a
/// non-empty value was dropped.
fn normalize_secret(secret: String) -> (String, bool) {
    if !secret.trim().is_empty() {
        (secret, false)
    } else {
        let blanked = !secret.is_empty();
        (String::new(), blanked)
    }
}

/// Parse a boolean flag such as "true", "1", "yes" or "on".
fn parse_bool(name: &str, default: bool) -> bool {
    let raw = match env::var(name) {
        Ok(v) => v,
        Err(_) => return default,
    };

    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" | "" => false,
        _ => {
            warn!(env_var = name, value = %raw, "Invalid boolean value, using default");
            default
        }
    }
}

/// Parse a comma-separated list of strings.
fn parse_csv(name: &str) -> Option<Vec<String>> {
    env::var(name).ok().map(|raw| {
        raw.split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    })
}
