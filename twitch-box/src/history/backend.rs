//! Storage contract for recently played lists.

use async_trait::async_trait;
use std::time::Duration;

use crate::Result;

/// A key-value store holding one ordered list of channel ids per key.
///
/// Lists are most-recent first. Every list carries an expiry; an expired
/// list behaves exactly like a missing one.
#[async_trait]
pub trait HistoryBackend: Send + Sync {
    /// Removes any occurrence of `channel_id`, pushes it to the front and
    /// resets the list's expiry to `ttl`, as one atomic step.
    async fn push_front_unique(&self, key: &str, channel_id: &str, ttl: Duration) -> Result<()>;

    /// The whole list, most recent first.
    async fn range(&self, key: &str) -> Result<Vec<String>>;

    /// The front entry, if any.
    async fn head(&self, key: &str) -> Result<Option<String>>;

    /// Removes and returns the front entry.
    async fn pop_front(&self, key: &str) -> Result<Option<String>>;

    /// Removes `channel_id` wherever it sits. Does not touch the expiry.
    /// Returns the number of entries removed.
    async fn remove(&self, key: &str, channel_id: &str) -> Result<u64>;

    /// Time left before the list expires; `None` when missing or empty.
    async fn ttl(&self, key: &str) -> Result<Option<Duration>>;

    /// Drops every expired list. Returns the number of lists dropped.
    async fn purge_expired(&self) -> Result<u64>;
}
