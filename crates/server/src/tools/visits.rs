//! visit_cache_purge tool implementation.

use chrono::Utc;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use mysite_core::VisitTracker;

use super::json_result;

/// Output from the visit_cache_purge tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct VisitCachePurgeOutput {
    /// Number of expired dedup keys deleted.
    pub deleted: u64,
}

/// Implementation of the visit_cache_purge tool.
pub async fn purge_impl(tracker: &VisitTracker) -> Result<CallToolResult, McpError> {
    let deleted = tracker.cache().purge_expired(Utc::now()).await?;
    tracing::info!(deleted, "purged expired visit keys");
    json_result(&VisitCachePurgeOutput { deleted })
}
