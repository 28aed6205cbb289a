//! Key-value caches with per-key expiry used for visit deduplication.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio_rusqlite::params;

use crate::Error;
use crate::store::BlogDb;

/// Presence cache with per-key time-to-live.
///
/// `now` is passed in by the caller so expiry is deterministic under test.
/// There is no compare-and-set: a `contains` followed by `insert` is two
/// independent operations.
#[async_trait::async_trait]
pub trait VisitCache: Send + Sync {
    /// Whether `key` is present and not yet expired at `now`.
    async fn contains(&self, key: &str, now: DateTime<Utc>) -> Result<bool, Error>;

    /// Store `key` so that it expires `ttl` after `now`, replacing any previous expiry.
    async fn insert(&self, key: &str, ttl: Duration, now: DateTime<Utc>) -> Result<(), Error>;

    /// Drop every key expired at `now`. Returns the number removed.
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, Error>;
}

fn expiry_millis(ttl: Duration, now: DateTime<Utc>) -> i64 {
    let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
    now.timestamp_millis().saturating_add(ttl_ms)
}

/// Visit cache stored in the `visit_keys` table of the blog database.
///
/// Every process that opens the same database file sees the same keys, so
/// deduplication holds across server processes.
#[derive(Clone, Debug)]
pub struct SqliteVisitCache {
    db: BlogDb,
}

impl SqliteVisitCache {
    pub fn new(db: BlogDb) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl VisitCache for SqliteVisitCache {
    async fn contains(&self, key: &str, now: DateTime<Utc>) -> Result<bool, Error> {
        let key = key.to_string();
        let now = now.timestamp_millis();
        self.db
            .conn
            .call(move |conn| -> Result<bool, Error> {
                let fresh: bool = conn
                    .query_row(
                        "SELECT EXISTS(
                        SELECT 1 FROM visit_keys
                        WHERE key_hash = ?1
                        AND expires_at > ?2
                    )",
                        params![key, now],
                        |row| row.get(0),
                    )
                    .map_err(Error::from)?;

                Ok(fresh)
            })
            .await
            .map_err(Error::from)
    }

    async fn insert(&self, key: &str, ttl: Duration, now: DateTime<Utc>) -> Result<(), Error> {
        let key = key.to_string();
        let expires_at = expiry_millis(ttl, now);
        self.db
            .conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO visit_keys (key_hash, expires_at) VALUES (?1, ?2)
                    ON CONFLICT(key_hash) DO UPDATE SET expires_at = excluded.expires_at",
                    params![key, expires_at],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, Error> {
        let now = now.timestamp_millis();
        self.db
            .conn
            .call(move |conn| -> Result<u64, Error> {
                let count = conn.execute("DELETE FROM visit_keys WHERE expires_at <= ?1", params![now])?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}

/// In-process visit cache.
///
/// Keys live in this process only: several server processes each keep their
/// own copy and count the same visitor once per process.
#[derive(Debug, Default)]
pub struct MemoryVisitCache {
    entries: Mutex<HashMap<String, i64>>,
}

impl MemoryVisitCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, i64>>, Error> {
        self.entries
            .lock()
            .map_err(|_| Error::CacheUnavailable("memory visit cache lock poisoned".into()))
    }
}

#[async_trait::async_trait]
impl VisitCache for MemoryVisitCache {
    async fn contains(&self, key: &str, now: DateTime<Utc>) -> Result<bool, Error> {
        let entries = self.lock()?;
        Ok(entries.get(key).is_some_and(|&expires_at| expires_at > now.timestamp_millis()))
    }

    async fn insert(&self, key: &str, ttl: Duration, now: DateTime<Utc>) -> Result<(), Error> {
        self.lock()?.insert(key.to_string(), expiry_millis(ttl, now));
        Ok(())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, Error> {
        let now = now.timestamp_millis();
        let mut entries = self.lock()?;
        let before = entries.len();
        entries.retain(|_, expires_at| *expires_at > now);
        Ok((before - entries.len()) as u64)
    }
}
