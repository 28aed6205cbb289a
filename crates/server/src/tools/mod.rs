//! MCP tool implementations.
//!
//! Each tool plays the part of a page handler: it gathers the page body,
//! merges it with the shared context, and returns the result as JSON.

use mysite_core::Error;
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde::Serialize;

pub mod admin;
pub mod comments;
pub mod links;
pub mod posts;
pub mod visits;

pub use admin::{AdminSavePostParams, AdminSchemaParams};
pub use posts::{PostDetailParams, PostListParams};

/// Serialize a tool output as pretty JSON text content.
pub(crate) fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}
