//! Remote metadata source for hook source ranges.
//!
//! The forge publishes a `/meta` document whose `hooks` array lists the CIDR
//! ranges webhook deliveries originate from.

use std::time::Duration;

use futures::future::BoxFuture;
use reqwest::Client;
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::WebhookError;

/// Something that can report the forge's current hook source ranges.
///
/// Implementations own their own timeout and error handling; any failure is
/// reported as [`WebhookError::Upstream`].
pub trait MetadataSource: Send + Sync {
    fn hook_ranges(&self) -> BoxFuture<'_, Result<Vec<String>, WebhookError>>;
}

/// Subset of the `/meta` document the receiver cares about.
#[derive(Debug, Deserialize)]
pub struct MetaDocument {
    #[serde(default)]
    pub hooks: Vec<String>,
}

/// HTTP client for the forge's metadata endpoint.
#[derive(Clone)]
pub struct GithubMeta {
    client: Client,
    url: String,
}

impl GithubMeta {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, WebhookError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("ghwebhook-receiver/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| WebhookError::Upstream(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    async fn fetch(&self) -> Result<Vec<String>, WebhookError> {
        info!(url = %self.url, "meta_fetch_start");

        let response = self
            .client
            .get(&self.url)
            .header("Accept", "application/vnd.github+json")
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "meta_fetch_failed");
                WebhookError::Upstream(format!("metadata request failed: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "meta_fetch_bad_status");
            return Err(WebhookError::Upstream(format!(
                "metadata endpoint returned {status}"
            )));
        }

        let document: MetaDocument = response.json().await.map_err(|e| {
            warn!(error = %e, "meta_parse_failed");
            WebhookError::Upstream(format!("invalid metadata document: {e}"))
        })?;

        info!(hook_ranges = document.hooks.len(), "meta_fetch_complete");

        Ok(document.hooks)
    }
}

impl MetadataSource for GithubMeta {
    fn hook_ranges(&self) -> BoxFuture<'_, Result<Vec<String>, WebhookError>> {
        Box::pin(self.fetch())
    }
}
