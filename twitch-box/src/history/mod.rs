//! Recently played channels, per user and per platform.
//!
//! [`HistoryStore`] is what the navigator talks to. It owns the list key
//! format, the expiry window and the operation timeout, and it never fails:
//! backend errors are logged and read as "no history".

pub mod backend;
pub mod memory;
pub mod sqlite;

pub use backend::HistoryBackend;
pub use memory::MemoryHistoryBackend;
pub use sqlite::SqliteHistoryBackend;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use stream_platforms::Platform;
use tracing::{debug, warn};

use crate::{Error, Result};

/// Default expiry window of a history list.
pub const DEFAULT_HISTORY_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Longest accepted expiry window.
pub const MAX_HISTORY_TTL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Default upper bound for a single backend call.
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_millis(500);

/// Tuning for a [`HistoryStore`].
#[derive(Debug, Clone)]
pub struct HistoryConfig {
    /// Reset on every push. Rounded down to whole seconds, at least one.
    pub ttl: Duration,
    pub operation_timeout: Duration,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_HISTORY_TTL,
            operation_timeout: DEFAULT_OPERATION_TIMEOUT,
        }
    }
}

/// One platform's view of the shared history backend.
#[derive(Clone)]
pub struct HistoryStore {
    backend: Arc<dyn HistoryBackend>,
    platform: Platform,
    ttl: Duration,
    operation_timeout: Duration,
}

impl HistoryStore {
    pub fn new(backend: Arc<dyn HistoryBackend>, platform: Platform, config: HistoryConfig) -> Self {
        let ttl = Duration::from_secs(config.ttl.as_secs().max(1));
        Self {
            backend,
            platform,
            ttl,
            operation_timeout: config.operation_timeout,
        }
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Storage key of `user_id`'s list on this platform.
    pub fn list_key(&self, user_id: &str) -> String {
        format!("{}_recent_streams:{}", self.platform.as_str(), user_id)
    }

    /// Makes `channel_id` the head of the user's list and restarts the expiry.
    pub async fn push(&self, user_id: &str, channel_id: &str) {
        let key = self.list_key(user_id);
        let ttl = self.ttl;
        if self
            .guarded("push", &key, self.backend.push_front_unique(&key, channel_id, ttl))
            .await
            .is_some()
        {
            debug!(key = %key, channel_id = %channel_id, "Pushed history head");
        }
    }

    /// The channel currently considered playing.
    pub async fn peek_head(&self, user_id: &str) -> Option<String> {
        let key = self.list_key(user_id);
        self.guarded("peek_head", &key, self.backend.head(&key))
            .await
            .flatten()
    }

    /// Drops the head for good and returns the entry it exposes.
    pub async fn pop_head(&self, user_id: &str) -> Option<String> {
        let key = self.list_key(user_id);
        let popped = self
            .guarded("pop_head", &key, self.backend.pop_front(&key))
            .await
            .flatten()?;
        debug!(key = %key, channel_id = %popped, "Popped history head");

        self.guarded("peek_head", &key, self.backend.head(&key))
            .await
            .flatten()
    }

    /// Removes `channel_id` from anywhere in the list.
    pub async fn remove(&self, user_id: &str, channel_id: &str) {
        let key = self.list_key(user_id);
        if let Some(removed) = self
            .guarded("remove", &key, self.backend.remove(&key, channel_id))
            .await
        {
            debug!(key = %key, channel_id = %channel_id, removed, "Pruned history entry");
        }
    }

    /// The full list, most recent first.
    pub async fn list(&self, user_id: &str) -> Vec<String> {
        let key = self.list_key(user_id);
        self.guarded("list", &key, self.backend.range(&key))
            .await
            .unwrap_or_default()
    }

    /// Runs a backend call under the operation timeout. Failures are logged
    /// and come back as `None`.
    async fn guarded<T>(
        &self,
        op: &'static str,
        key: &str,
        fut: impl Future<Output = Result<T>>,
    ) -> Option<T> {
        let result = match tokio::time::timeout(self.operation_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout(self.operation_timeout)),
        };

        match result {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(op, key = %key, error = %e, "History store unavailable, treating as empty");
                None
            }
        }
    }
}

impl std::fmt::Debug for HistoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryStore")
            .field("platform", &self.platform)
            .field("ttl", &self.ttl)
            .field("operation_timeout", &self.operation_timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    fn memory_store(platform: Platform) -> (Arc<MemoryHistoryBackend>, HistoryStore) {
        let backend = Arc::new(MemoryHistoryBackend::new());
        let store = HistoryStore::new(backend.clone(), platform, HistoryConfig::default());
        (backend, store)
    }

    /// Backend that fails every call.
    struct BrokenBackend;

    #[async_trait]
    impl HistoryBackend for BrokenBackend {
        async fn push_front_unique(&self, _: &str, _: &str, _: Duration) -> Result<()> {
            Err(Error::Other("connection refused".into()))
        }
        async fn range(&self, _: &str) -> Result<Vec<String>> {
            Err(Error::Other("connection refused".into()))
        }
        async fn head(&self, _: &str) -> Result<Option<String>> {
            Err(Error::Other("connection refused".into()))
        }
        async fn pop_front(&self, _: &str) -> Result<Option<String>> {
            Err(Error::Other("connection refused".into()))
        }
        async fn remove(&self, _: &str, _: &str) -> Result<u64> {
            Err(Error::Other("connection refused".into()))
        }
        async fn ttl(&self, _: &str) -> Result<Option<Duration>> {
            Err(Error::Other("connection refused".into()))
        }
        async fn purge_expired(&self) -> Result<u64> {
            Err(Error::Other("connection refused".into()))
        }
    }

    /// Backend whose reads never finish.
    struct StalledBackend;

    #[async_trait]
    impl HistoryBackend for StalledBackend {
        async fn push_front_unique(&self, _: &str, _: &str, _: Duration) -> Result<()> {
            std::future::pending().await
        }
        async fn range(&self, _: &str) -> Result<Vec<String>> {
            std::future::pending().await
        }
        async fn head(&self, _: &str) -> Result<Option<String>> {
            std::future::pending().await
        }
        async fn pop_front(&self, _: &str) -> Result<Option<String>> {
            std::future::pending().await
        }
        async fn remove(&self, _: &str, _: &str) -> Result<u64> {
            std::future::pending().await
        }
        async fn ttl(&self, _: &str) -> Result<Option<Duration>> {
            std::future::pending().await
        }
        async fn purge_expired(&self) -> Result<u64> {
            std::future::pending().await
        }
    }

    #[test]
    fn test_list_key_format() {
        let (_, twitch) = memory_store(Platform::Twitch);
        let (_, mixer) = memory_store(Platform::Mixer);

        assert_eq!(twitch.list_key("42"), "twitch_recent_streams:42");
        assert_eq!(mixer.list_key("42"), "mixer_recent_streams:42");
    }

    #[test]
    fn test_ttl_is_whole_seconds() {
        let store = HistoryStore::new(
            Arc::new(MemoryHistoryBackend::new()),
            Platform::Twitch,
            HistoryConfig {
                ttl: Duration::from_millis(90_500),
                ..Default::default()
            },
        );
        assert_eq!(store.ttl(), Duration::from_secs(90));
    }

    #[tokio::test]
    async fn test_push_order_and_dedup() {
        let (_, store) = memory_store(Platform::Twitch);

        store.push("u", "A").await;
        store.push("u", "B").await;
        store.push("u", "C").await;
        assert_eq!(store.list("u").await, vec!["C", "B", "A"]);

        store.push("u", "A").await;
        store.push("u", "A").await;
        assert_eq!(store.list("u").await, vec!["A", "C", "B"]);
        assert_eq!(store.peek_head("u").await.as_deref(), Some("A"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_push_refreshes_full_window() {
        let (backend, store) = memory_store(Platform::Twitch);
        let key = store.list_key("u");

        store.push("u", "A").await;
        tokio::time::advance(Duration::from_secs(5 * 60 * 60)).await;
        assert_eq!(
            backend.ttl(&key).await.unwrap(),
            Some(DEFAULT_HISTORY_TTL - Duration::from_secs(5 * 60 * 60))
        );

        store.push("u", "B").await;
        assert_eq!(backend.ttl(&key).await.unwrap(), Some(DEFAULT_HISTORY_TTL));

        store.remove("u", "A").await;
        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(
            backend.ttl(&key).await.unwrap(),
            Some(DEFAULT_HISTORY_TTL - Duration::from_secs(1))
        );
    }

    #[tokio::test]
    async fn test_pop_head_returns_exposed_entry() {
        let (_, store) = memory_store(Platform::Twitch);
        store.push("u", "A").await;
        store.push("u", "B").await;

        assert_eq!(store.pop_head("u").await.as_deref(), Some("A"));
        assert_eq!(store.list("u").await, vec!["A"]);
        assert_eq!(store.pop_head("u").await, None);
        assert!(store.list("u").await.is_empty());
        assert_eq!(store.pop_head("u").await, None);
    }

    #[tokio::test]
    async fn test_platforms_do_not_share_lists() {
        let backend = Arc::new(MemoryHistoryBackend::new());
        let twitch = HistoryStore::new(backend.clone(), Platform::Twitch, HistoryConfig::default());
        let mixer = HistoryStore::new(backend, Platform::Mixer, HistoryConfig::default());

        twitch.push("u", "A").await;
        assert!(mixer.list("u").await.is_empty());
        assert_eq!(twitch.list("u").await, vec!["A"]);
    }

    #[tokio::test]
    async fn test_backend_errors_degrade_to_empty() {
        let store = HistoryStore::new(Arc::new(BrokenBackend), Platform::Twitch, HistoryConfig::default());

        store.push("u", "A").await;
        store.remove("u", "A").await;
        assert_eq!(store.peek_head("u").await, None);
        assert_eq!(store.pop_head("u").await, None);
        assert!(store.list("u").await.is_empty());
    }

    #[tokio::test]
    async fn test_oversized_ttl_degrades_instead_of_panicking() {
        let store = HistoryStore::new(
            Arc::new(MemoryHistoryBackend::new()),
            Platform::Twitch,
            HistoryConfig {
                ttl: Duration::from_secs(u64::MAX),
                ..Default::default()
            },
        );

        store.push("u", "A").await;
        assert!(store.list("u").await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_backend_times_out() {
        let store = HistoryStore::new(Arc::new(StalledBackend), Platform::Twitch, HistoryConfig::default());

        assert_eq!(store.peek_head("u").await, None);
        assert!(store.list("u").await.is_empty());
    }
}
