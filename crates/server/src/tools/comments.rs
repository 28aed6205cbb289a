//! comment_create tool implementation.

use rmcp::{ErrorData as McpError, model::CallToolResult};

use mysite_core::BlogDb;
use mysite_core::store::NewComment;

use super::json_result;

/// Implementation of the comment_create tool.
pub async fn create_impl(db: &BlogDb, params: NewComment) -> Result<CallToolResult, McpError> {
    let comment = db.create_comment(params).await?;
    tracing::info!(comment_id = comment.id, target = %comment.target, "comment created");
    json_result(&comment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::parse_output;
    use mysite_core::store::Comment;

    fn new_comment(parent_id: Option<i64>) -> NewComment {
        NewComment {
            target: "/links/".to_string(),
            parent_id,
            nickname: "reader".to_string(),
            website: "https://reader.example.com".to_string(),
            email: "reader@example.com".to_string(),
            content: "thanks for the list of links".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_comment() {
        let db = BlogDb::open_in_memory().await.unwrap();

        let result = create_impl(&db, new_comment(None)).await.unwrap();
        let output: Comment = parse_output(&result);
        assert_eq!(output.target, "/links/");
        assert_eq!(output.nickname, "reader");
        assert!(output.parent_id.is_none());
    }

    #[tokio::test]
    async fn test_reply_to_missing_parent() {
        let db = BlogDb::open_in_memory().await.unwrap();
        assert!(create_impl(&db, new_comment(Some(42))).await.is_err());
    }

    #[tokio::test]
    async fn test_short_comment_rejected() {
        let db = BlogDb::open_in_memory().await.unwrap();
        let mut params = new_comment(None);
        params.content = "short".to_string();

        let err = create_impl(&db, params).await.unwrap_err();
        assert_eq!(err.code.0, -32602);
    }
}
