//! Process-wide store of trusted source ranges.
//!
//! The range set is refreshed lazily from a [`MetadataSource`] and then kept
//! for [`REFRESH_INTERVAL`]. Readers share a read lock on the current
//! snapshot. Refreshers are serialized on a separate mutex, so the network
//! call never blocks readers; the write lock is only taken for the swap.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use super::meta::MetadataSource;
use super::range::{parse_ranges, TrustedSet};
use crate::error::WebhookError;

/// How long a successfully fetched range set stays fresh.
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone, Default)]
struct Snapshot {
    ranges: TrustedSet,
    expires_at: Option<Instant>,
}

impl Snapshot {
    fn is_fresh(&self, now: Instant) -> bool {
        !self.ranges.is_empty() && self.expires_at.is_some_and(|expires_at| now < expires_at)
    }
}

pub struct TrustStore {
    static_ranges: Vec<String>,
    source: Arc<dyn MetadataSource>,
    snapshot: RwLock<Snapshot>,
    refresh: Mutex<()>,
}

impl TrustStore {
    /// Create an empty store. Nothing is fetched until [`ensure_fresh`] runs.
    ///
    /// [`ensure_fresh`]: TrustStore::ensure_fresh
    pub fn new(static_ranges: Vec<String>, source: Arc<dyn MetadataSource>) -> Self {
        Self {
            static_ranges,
            source,
            snapshot: RwLock::new(Snapshot::default()),
            refresh: Mutex::new(()),
        }
    }

    /// Make sure the store holds a non-expired range set, refreshing it if
    /// needed.
    ///
    /// On failure the previous set is left in place, stale or not.
    pub async fn ensure_fresh(&self, now: Instant) -> Result<(), WebhookError> {
        if self.snapshot.read().await.is_fresh(now) {
            return Ok(());
        }

        let _refresh = self.refresh.lock().await;

        // Another caller may have refreshed while we waited.
        if self.snapshot.read().await.is_fresh(now) {
            debug!("trust_store_refreshed_concurrently");
            return Ok(());
        }

        let mut candidate = parse_ranges(&self.static_ranges).map_err(|e| {
            warn!(error = %e, "trust_store_static_ranges_invalid");
            e
        })?;
        let static_count = candidate.len();

        let hooks = self.source.hook_ranges().await?;
        let hook_ranges = parse_ranges(&hooks).map_err(|e| {
            warn!(error = %e, "trust_store_meta_ranges_invalid");
            WebhookError::Upstream(e.to_string())
        })?;
        candidate.extend(hook_ranges);

        let ranges = TrustedSet::new(candidate);
        let total = ranges.len();

        *self.snapshot.write().await = Snapshot {
            ranges,
            expires_at: Some(now + REFRESH_INTERVAL),
        };

        info!(
            static_ranges = static_count,
            hook_ranges = total - static_count,
            total_ranges = total,
            "trust_store_refreshed"
        );

        Ok(())
    }

    /// The current range set, possibly stale or empty.
    pub async fn trusted(&self) -> TrustedSet {
        self.snapshot.read().await.ranges.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future::BoxFuture;
    use std::net::IpAddr;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// In-memory metadata source that counts fetches.
    struct FakeMeta {
        hooks: std::sync::Mutex<Vec<String>>,
        calls: AtomicUsize,
        fail: AtomicBool,
        delay: Duration,
    }

    impl FakeMeta {
        fn new(hooks: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                hooks: std::sync::Mutex::new(hooks.iter().map(|s| s.to_string()).collect()),
                calls: AtomicUsize::new(0),
                fail: AtomicBool::new(false),
                delay: Duration::from_millis(20),
            })
        }

        fn set_hooks(&self, hooks: &[&str]) {
            *self.hooks.lock().unwrap() = hooks.iter().map(|s| s.to_string()).collect();
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl MetadataSource for FakeMeta {
        fn hook_ranges(&self) -> BoxFuture<'_, Result<Vec<String>, WebhookError>> {
            Box::pin(async move {
                self.calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(self.delay).await;
                if self.fail.load(Ordering::SeqCst) {
                    return Err(WebhookError::Upstream("meta unavailable".into()));
                }
                Ok(self.hooks.lock().unwrap().clone())
            })
        }
    }

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn test_first_call_populates_store() {
        let meta = FakeMeta::new(&["192.30.252.0/22"]);
        let store = TrustStore::new(vec!["10.0.0.0/8".into()], meta.clone());

        assert!(store.trusted().await.is_empty());
        store.ensure_fresh(Instant::now()).await.unwrap();

        let trusted = store.trusted().await;
        assert_eq!(trusted.len(), 2);
        assert!(trusted.contains(&ip("10.1.2.3")));
        assert!(trusted.contains(&ip("192.30.253.1")));
        assert_eq!(meta.calls(), 1);
    }

    #[tokio::test]
    async fn test_fresh_store_skips_fetch() {
        let meta = FakeMeta::new(&["192.30.252.0/22"]);
        let store = TrustStore::new(vec![], meta.clone());
        let now = Instant::now();

        store.ensure_fresh(now).await.unwrap();
        store.ensure_fresh(now + Duration::from_secs(60)).await.unwrap();
        assert_eq!(meta.calls(), 1);

        store.ensure_fresh(now + REFRESH_INTERVAL).await.unwrap();
        assert_eq!(meta.calls(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_callers_fetch_once() {
        let meta = FakeMeta::new(&["192.30.252.0/22"]);
        let store = Arc::new(TrustStore::new(vec![], meta.clone()));
        let now = Instant::now();

        let tasks: Vec<_> = (0..16)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.ensure_fresh(now).await })
            })
            .collect();

        for result in futures::future::join_all(tasks).await {
            result.unwrap().unwrap();
        }

        assert_eq!(meta.calls(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_callers_at_expiry_fetch_once() {
        let meta = FakeMeta::new(&["192.30.252.0/22"]);
        let store = Arc::new(TrustStore::new(vec![], meta.clone()));
        let now = Instant::now();
        store.ensure_fresh(now).await.unwrap();

        let expired = now + REFRESH_INTERVAL + Duration::from_secs(1);
        let tasks: Vec<_> = (0..16)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.ensure_fresh(expired).await })
            })
            .collect();

        for result in futures::future::join_all(tasks).await {
            result.unwrap().unwrap();
        }

        assert_eq!(meta.calls(), 2);
    }

    #[tokio::test]
    async fn test_malformed_static_range_is_configuration_error() {
        let meta = FakeMeta::new(&["192.30.252.0/22"]);
        let store = TrustStore::new(vec!["not-a-cidr".into()], meta.clone());

        let result = store.ensure_fresh(Instant::now()).await;
        assert!(matches!(result, Err(WebhookError::Configuration(_))));
        assert_eq!(meta.calls(), 0);
        assert!(store.trusted().await.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_meta_range_is_upstream_error() {
        let meta = FakeMeta::new(&["192.30.252.0/22", "garbage"]);
        let store = TrustStore::new(vec![], meta);

        let result = store.ensure_fresh(Instant::now()).await;
        assert!(matches!(result, Err(WebhookError::Upstream(_))));
        assert!(store.trusted().await.is_empty());
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_stale_set() {
        let meta = FakeMeta::new(&["192.30.252.0/22"]);
        let store = TrustStore::new(vec![], meta.clone());
        let now = Instant::now();
        store.ensure_fresh(now).await.unwrap();

        meta.fail.store(true, Ordering::SeqCst);
        let expired = now + REFRESH_INTERVAL;
        let result = store.ensure_fresh(expired).await;
        assert!(matches!(result, Err(WebhookError::Upstream(_))));

        let trusted = store.trusted().await;
        assert_eq!(trusted.len(), 1);
        assert!(trusted.contains(&ip("192.30.252.10")));

        // Still expired, so the next call retries.
        meta.fail.store(false, Ordering::SeqCst);
        store.ensure_fresh(expired).await.unwrap();
        assert_eq!(meta.calls(), 3);
    }

    #[tokio::test]
    async fn test_malformed_refresh_keeps_previous_set_whole() {
        let meta = FakeMeta::new(&["192.30.252.0/22", "185.199.108.0/22"]);
        let store = TrustStore::new(vec!["10.0.0.0/8".into()], meta.clone());
        let now = Instant::now();
        store.ensure_fresh(now).await.unwrap();

        // A valid entry ahead of the malformed one must not leak in.
        meta.set_hooks(&["140.82.112.0/20", "garbage"]);
        let expired = now + REFRESH_INTERVAL;
        let result = store.ensure_fresh(expired).await;
        assert!(matches!(result, Err(WebhookError::Upstream(_))));

        let trusted = store.trusted().await;
        assert_eq!(trusted.len(), 3);
        assert!(trusted.contains(&ip("10.1.1.1")));
        assert!(trusted.contains(&ip("192.30.252.10")));
        assert!(trusted.contains(&ip("185.199.108.1")));
        assert!(!trusted.contains(&ip("140.82.112.5")));

        meta.set_hooks(&["140.82.112.0/20"]);
        store.ensure_fresh(expired).await.unwrap();
        let trusted = store.trusted().await;
        assert_eq!(trusted.len(), 2);
        assert!(trusted.contains(&ip("140.82.112.5")));
        assert!(!trusted.contains(&ip("192.30.252.10")));
    }

    #[tokio::test]
    async fn test_empty_result_is_never_fresh() {
        let meta = FakeMeta::new(&[]);
        let store = TrustStore::new(vec![], meta.clone());
        let now = Instant::now();

        store.ensure_fresh(now).await.unwrap();
        store.ensure_fresh(now).await.unwrap();
        assert_eq!(meta.calls(), 2);
    }
}
