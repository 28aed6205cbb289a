//! Atomic counter increments on posts.

use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;

use crate::Error;
use crate::store::BlogDb;

/// Amounts to add to a post's counters in one update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterDelta {
    pub pv: u32,
    pub uv: u32,
}

impl CounterDelta {
    pub fn is_empty(&self) -> bool {
        self.pv == 0 && self.uv == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncrementOutcome {
    Applied,
    /// No record with that id (e.g. deleted between render and increment).
    NotFound,
}

/// Store that can add to counter fields without a read step.
#[async_trait::async_trait]
pub trait CounterStore: Send + Sync {
    async fn increment_counters(&self, record_id: i64, delta: CounterDelta) -> Result<IncrementOutcome, Error>;
}

#[async_trait::async_trait]
impl CounterStore for BlogDb {
    /// Issues a single `UPDATE` touching only the counters named by `delta`.
    ///
    /// The addition happens inside SQLite, so concurrent callers never lose
    /// each other's increments.
    async fn increment_counters(&self, record_id: i64, delta: CounterDelta) -> Result<IncrementOutcome, Error> {
        if delta.is_empty() {
            return Ok(IncrementOutcome::Applied);
        }

        self.conn
            .call(move |conn| -> Result<IncrementOutcome, Error> {
                let changed = match (delta.pv, delta.uv) {
                    (pv, 0) => conn.execute("UPDATE posts SET pv = pv + ?1 WHERE id = ?2", params![pv, record_id])?,
                    (0, uv) => conn.execute("UPDATE posts SET uv = uv + ?1 WHERE id = ?2", params![uv, record_id])?,
                    (pv, uv) => conn.execute(
                        "UPDATE posts SET pv = pv + ?1, uv = uv + ?2 WHERE id = ?3",
                        params![pv, uv, record_id],
                    )?,
                };

                Ok(if changed == 0 { IncrementOutcome::NotFound } else { IncrementOutcome::Applied })
            })
            .await
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::posts::tests::{fixture, new_post};

    #[tokio::test]
    async fn test_increment_single_counter() {
        let fx = fixture().await;
        let post = fx.db.create_post(new_post(&fx, "Counted")).await.unwrap();

        let outcome = fx.db.increment_counters(post.id, CounterDelta { pv: 1, uv: 0 }).await.unwrap();
        assert_eq!(outcome, IncrementOutcome::Applied);

        let post = fx.db.get_post(post.id).await.unwrap().unwrap();
        assert_eq!((post.pv, post.uv), (2, 1));
    }

    #[tokio::test]
    async fn test_increment_both_counters() {
        let fx = fixture().await;
        let post = fx.db.create_post(new_post(&fx, "Counted")).await.unwrap();

        fx.db.increment_counters(post.id, CounterDelta { pv: 1, uv: 1 }).await.unwrap();
        fx.db.increment_counters(post.id, CounterDelta { pv: 0, uv: 1 }).await.unwrap();

        let post = fx.db.get_post(post.id).await.unwrap().unwrap();
        assert_eq!((post.pv, post.uv), (2, 3));
    }

    #[tokio::test]
    async fn test_increment_missing_record() {
        let fx = fixture().await;
        let outcome = fx.db.increment_counters(999, CounterDelta { pv: 1, uv: 1 }).await.unwrap();
        assert_eq!(outcome, IncrementOutcome::NotFound);
    }
}
