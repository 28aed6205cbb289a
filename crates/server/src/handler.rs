//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.
use crate::tools::{
    AdminSavePostParams, AdminSchemaParams, PostDetailParams, PostListParams, admin, comments, links, posts, visits,
};

use mysite_core::query::ListingSettings;
use mysite_core::store::NewComment;
use mysite_core::{BlogDb, VisitTracker};
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

/// The main MCP server handler for mysite.
#[derive(Clone)]
pub struct BlogServer {
    db: BlogDb,
    tracker: VisitTracker,
    listing: ListingSettings,
    tool_router: ToolRouter<Self>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl BlogServer {
    /// Create a new server handler.
    pub fn new(db: BlogDb, tracker: VisitTracker, listing: ListingSettings) -> Self {
        Self { db, tracker, listing, tool_router: Self::tool_router() }
    }

    #[tool(description = "List published posts by category, tag, author or keyword. Returns one page with sidebars.")]
    async fn post_list(&self, params: Parameters<PostListParams>) -> Result<CallToolResult, McpError> {
        posts::list_impl(&self.db, &self.listing, params.0).await
    }

    /// Show a single post and count the visit.
    ///
    /// Page views are counted at most once per visitor and path inside the
    /// page-view window, unique views at most once per visitor, path and day.
    #[tool(description = "Show a published post with its comments and count the visit. Reuse the returned visitor_id.")]
    async fn post_detail(&self, params: Parameters<PostDetailParams>) -> Result<CallToolResult, McpError> {
        posts::detail_impl(&self.db, &self.tracker, &self.listing, params.0).await
    }

    #[tool(description = "List friend links, heaviest weight first, with the shared page context.")]
    async fn link_list(&self) -> Result<CallToolResult, McpError> {
        links::list_impl(&self.db, &self.listing).await
    }

    #[tool(description = "Leave a comment on a page, optionally as a reply to an existing comment on the same page.")]
    async fn comment_create(&self, params: Parameters<NewComment>) -> Result<CallToolResult, McpError> {
        comments::create_impl(&self.db, params.0).await
    }

    #[tool(description = "Describe admin change lists and forms. Returns every model, or one model when named.")]
    async fn admin_schema(&self, params: Parameters<AdminSchemaParams>) -> Result<CallToolResult, McpError> {
        admin::schema_impl(params.0).await
    }

    #[tool(description = "Create or update a post from an admin form. Authors may only edit their own posts.")]
    async fn admin_save_post(&self, params: Parameters<AdminSavePostParams>) -> Result<CallToolResult, McpError> {
        admin::save_post_impl(&self.db, params.0).await
    }

    #[tool(description = "Delete expired visit deduplication keys. Returns the number removed.")]
    async fn visit_cache_purge(&self) -> Result<CallToolResult, McpError> {
        visits::purge_impl(&self.tracker).await
    }
}

impl ServerHandler for BlogServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "mysite".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use mysite_core::visit::{MemoryVisitCache, VisitSettings};

    #[tokio::test]
    async fn test_registers_every_tool() {
        let db = BlogDb::open_in_memory().await.unwrap();
        let tracker =
            VisitTracker::new(Arc::new(MemoryVisitCache::new()), Arc::new(db.clone()), VisitSettings::default());
        let server = BlogServer::new(db, tracker, ListingSettings::default());

        let mut names: Vec<String> = server.tool_router.list_all().into_iter().map(|t| t.name.to_string()).collect();
        names.sort();
        assert_eq!(
            names,
            vec![
                "admin_save_post",
                "admin_schema",
                "comment_create",
                "link_list",
                "post_detail",
                "post_list",
                "visit_cache_purge"
            ]
        );
    }
}
