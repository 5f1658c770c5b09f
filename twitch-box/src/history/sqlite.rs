//! SQLite implementation of the history backend.

use async_trait::async_trait;
use sqlx::SqlitePool;
use std::time::Duration;

use super::backend::HistoryBackend;
use crate::Result;
use crate::database::time::{duration_to_ms, now_ms, remaining};

/// SQLx implementation of HistoryBackend.
pub struct SqliteHistoryBackend {
    pool: SqlitePool,
}

impl SqliteHistoryBackend {
    /// Create a new SqliteHistoryBackend with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HistoryBackend for SqliteHistoryBackend {
    async fn push_front_unique(&self, key: &str, channel_id: &str, ttl: Duration) -> Result<()> {
        let now = now_ms();
        let mut tx = self.pool.begin().await?;

        // An expired list starts over instead of resurrecting old entries.
        sqlx::query(
            r#"
            DELETE FROM recent_stream_entries
            WHERE list_key = ?
              AND list_key IN (SELECT list_key FROM recent_stream_lists WHERE expires_at <= ?)
            "#,
        )
        .bind(key)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO recent_stream_lists (list_key, expires_at) VALUES (?, ?)
            ON CONFLICT(list_key) DO UPDATE SET expires_at = excluded.expires_at
            "#,
        )
        .bind(key)
        .bind(now.saturating_add(duration_to_ms(ttl)))
        .execute(&mut *tx)
        .await?;

        let (next_seq,): (i64,) = sqlx::query_as(
            "SELECT COALESCE(MAX(seq), 0) + 1 FROM recent_stream_entries WHERE list_key = ?",
        )
        .bind(key)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO recent_stream_entries (list_key, channel_id, seq) VALUES (?, ?, ?)
            ON CONFLICT(list_key, channel_id) DO UPDATE SET seq = excluded.seq
            "#,
        )
        .bind(key)
        .bind(channel_id)
        .bind(next_seq)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn range(&self, key: &str) -> Result<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT e.channel_id FROM recent_stream_entries e
            JOIN recent_stream_lists l ON l.list_key = e.list_key
            WHERE e.list_key = ? AND l.expires_at > ?
            ORDER BY e.seq DESC
            "#,
        )
        .bind(key)
        .bind(now_ms())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|r| r.0).collect())
    }

    async fn head(&self, key: &str) -> Result<Option<String>> {
        let row: Option<(String,)> = sqlx::query_as(
            r#"
            SELECT e.channel_id FROM recent_stream_entries e
            JOIN recent_stream_lists l ON l.list_key = e.list_key
            WHERE e.list_key = ? AND l.expires_at > ?
            ORDER BY e.seq DESC
            LIMIT 1
            "#,
        )
        .bind(key)
        .bind(now_ms())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| r.0))
    }

    async fn pop_front(&self, key: &str) -> Result<Option<String>> {
        let mut tx = self.pool.begin().await?;

        let row: Option<(String,)> = sqlx::query_as(
            r#"
            SELECT e.channel_id FROM recent_stream_entries e
            JOIN recent_stream_lists l ON l.list_key = e.list_key
            WHERE e.list_key = ? AND l.expires_at > ?
            ORDER BY e.seq DESC
            LIMIT 1
            "#,
        )
        .bind(key)
        .bind(now_ms())
        .fetch_optional(&mut *tx)
        .await?;

        if let Some((channel_id,)) = &row {
            sqlx::query("DELETE FROM recent_stream_entries WHERE list_key = ? AND channel_id = ?")
                .bind(key)
                .bind(channel_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(row.map(|r| r.0))
    }

    async fn remove(&self, key: &str, channel_id: &str) -> Result<u64> {
        let result =
            sqlx::query("DELETE FROM recent_stream_entries WHERE list_key = ? AND channel_id = ?")
                .bind(key)
                .bind(channel_id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected())
    }

    async fn ttl(&self, key: &str) -> Result<Option<Duration>> {
        let row: Option<(i64,)> = sqlx::query_as(
            r#"
            SELECT l.expires_at FROM recent_stream_lists l
            WHERE l.list_key = ?
              AND EXISTS (SELECT 1 FROM recent_stream_entries e WHERE e.list_key = l.list_key)
            "#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.and_then(|(expires_at,)| remaining(expires_at)))
    }

    async fn purge_expired(&self) -> Result<u64> {
        let now = now_ms();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            DELETE FROM recent_stream_entries
            WHERE list_key IN (SELECT list_key FROM recent_stream_lists WHERE expires_at <= ?)
            "#,
        )
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let result = sqlx::query("DELETE FROM recent_stream_lists WHERE expires_at <= ?")
            .bind(now)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected())
    }
}
