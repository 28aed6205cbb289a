//! Page-view and unique-view counting.
//!
//! A visit counts as a page view unless the same visitor hit the same path
//! within the page-view window, and as a unique view unless the same visitor
//! hit the same path earlier on the same UTC calendar day. Whatever counts is
//! applied to the post in a single increment.
//!
//! The presence check and the key write are separate cache calls, so two
//! concurrent first visits by one visitor can both count. Counters are
//! analytics, and that small over-count is accepted.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::cache::VisitCache;
use super::counters::{CounterDelta, CounterStore, IncrementOutcome};
use super::keys::{page_view_key, unique_view_key};

/// How to treat a visit whose dedup key could not be looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheFailurePolicy {
    /// Count the visit. An unreachable cache over-counts.
    #[default]
    FailOpen,
    /// Skip the counter. An unreachable cache under-counts.
    FailClosed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisitSettings {
    pub pv_ttl: Duration,
    pub uv_ttl: Duration,
    pub on_cache_error: CacheFailurePolicy,
}

impl Default for VisitSettings {
    fn default() -> Self {
        Self {
            pv_ttl: Duration::from_secs(60),
            uv_ttl: Duration::from_secs(24 * 60 * 60),
            on_cache_error: CacheFailurePolicy::FailOpen,
        }
    }
}

/// Which counters a visit incremented.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct VisitOutcome {
    pub pv_incremented: bool,
    pub uv_incremented: bool,
}

/// Records visits against posts.
///
/// Holds no state of its own beyond the injected cache and store handles.
#[derive(Clone)]
pub struct VisitTracker {
    cache: Arc<dyn VisitCache>,
    store: Arc<dyn CounterStore>,
    settings: VisitSettings,
}

impl VisitTracker {
    pub fn new(cache: Arc<dyn VisitCache>, store: Arc<dyn CounterStore>, settings: VisitSettings) -> Self {
        Self { cache, store, settings }
    }

    pub fn cache(&self) -> &Arc<dyn VisitCache> {
        &self.cache
    }

    /// Count a visit by `visitor_id` to `path`, which displays post `content_id`.
    ///
    /// Never fails: cache errors follow the configured [`CacheFailurePolicy`]
    /// and store errors are logged and dropped, so the page always renders.
    pub async fn record_visit(
        &self, visitor_id: &str, path: &str, content_id: i64, now: DateTime<Utc>,
    ) -> VisitOutcome {
        let pv_key = page_view_key(visitor_id, path);
        let uv_key = unique_view_key(visitor_id, now.date_naive(), path);

        let outcome = VisitOutcome {
            pv_incremented: self.claim(&pv_key, self.settings.pv_ttl, now, "pv").await,
            uv_incremented: self.claim(&uv_key, self.settings.uv_ttl, now, "uv").await,
        };

        let delta = CounterDelta { pv: outcome.pv_incremented as u32, uv: outcome.uv_incremented as u32 };
        if delta.is_empty() {
            return outcome;
        }

        match self.store.increment_counters(content_id, delta).await {
            Ok(IncrementOutcome::Applied) => {
                tracing::debug!(
                    content_id,
                    path,
                    pv = outcome.pv_incremented,
                    uv = outcome.uv_incremented,
                    "recorded visit"
                );
            }
            Ok(IncrementOutcome::NotFound) => {
                tracing::debug!(content_id, "visit dropped: record no longer exists");
            }
            Err(e) => {
                tracing::warn!(content_id, error = %e, "visit dropped: counter increment failed");
            }
        }

        outcome
    }

    /// Returns true if `key` was absent and has now been written.
    async fn claim(&self, key: &str, ttl: Duration, now: DateTime<Utc>, family: &'static str) -> bool {
        let seen = match self.cache.contains(key, now).await {
            Ok(seen) => seen,
            Err(e) => {
                let policy = self.settings.on_cache_error;
                tracing::warn!(family, ?policy, error = %e, "visit cache lookup failed");
                match policy {
                    CacheFailurePolicy::FailOpen => false,
                    CacheFailurePolicy::FailClosed => return false,
                }
            }
        };

        if seen {
            return false;
        }

        if let Err(e) = self.cache.insert(key, ttl, now).await {
            tracing::warn!(family, error = %e, "visit cache write failed");
        }
        true
    }
}
