//! In-process history backend.
//!
//! Used when no database is configured and by tests. State is lost on
//! restart.

use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::Instant;

use super::backend::HistoryBackend;
use crate::{Error, Result};

#[derive(Debug)]
struct Entry {
    ids: VecDeque<String>,
    expires_at: Instant,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at > now && !self.ids.is_empty()
    }
}

/// History lists kept in a concurrent map.
#[derive(Debug, Default)]
pub struct MemoryHistoryBackend {
    lists: DashMap<String, Entry>,
}

impl MemoryHistoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops `key` once it has expired or emptied.
    fn evict_if_expired(&self, key: &str, now: Instant) {
        self.lists.remove_if(key, |_, entry| !entry.is_live(now));
    }
}

#[async_trait]
impl HistoryBackend for MemoryHistoryBackend {
    async fn push_front_unique(&self, key: &str, channel_id: &str, ttl: Duration) -> Result<()> {
        let now = Instant::now();
        let expires_at = now
            .checked_add(ttl)
            .ok_or_else(|| Error::Other(format!("history ttl {ttl:?} is out of range")))?;
        self.evict_if_expired(key, now);

        let mut entry = self.lists.entry(key.to_string()).or_insert_with(|| Entry {
            ids: VecDeque::new(),
            expires_at: now,
        });
        entry.ids.retain(|id| id != channel_id);
        entry.ids.push_front(channel_id.to_string());
        entry.expires_at = expires_at;
        Ok(())
    }

    async fn range(&self, key: &str) -> Result<Vec<String>> {
        let now = Instant::now();
        Ok(self
            .lists
            .get(key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.ids.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn head(&self, key: &str) -> Result<Option<String>> {
        let now = Instant::now();
        Ok(self
            .lists
            .get(key)
            .filter(|entry| entry.is_live(now))
            .and_then(|entry| entry.ids.front().cloned()))
    }

    async fn pop_front(&self, key: &str) -> Result<Option<String>> {
        let now = Instant::now();
        self.evict_if_expired(key, now);

        let popped = self
            .lists
            .get_mut(key)
            .and_then(|mut entry| entry.ids.pop_front());
        self.lists.remove_if(key, |_, entry| entry.ids.is_empty());
        Ok(popped)
    }

    async fn remove(&self, key: &str, channel_id: &str) -> Result<u64> {
        let now = Instant::now();
        self.evict_if_expired(key, now);

        let removed = match self.lists.get_mut(key) {
            Some(mut entry) => {
                let before = entry.ids.len();
                entry.ids.retain(|id| id != channel_id);
                (before - entry.ids.len()) as u64
            }
            None => 0,
        };
        self.lists.remove_if(key, |_, entry| entry.ids.is_empty());
        Ok(removed)
    }

    async fn ttl(&self, key: &str) -> Result<Option<Duration>> {
        let now = Instant::now();
        Ok(self
            .lists
            .get(key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.expires_at - now))
    }

    async fn purge_expired(&self) -> Result<u64> {
        let now = Instant::now();
        let before = self.lists.len();
        self.lists.retain(|_, entry| entry.is_live(now));
        Ok(before.saturating_sub(self.lists.len()) as u64)
    }
}
