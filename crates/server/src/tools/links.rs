//! link_list tool implementation.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use serde::Serialize;

use mysite_core::BlogDb;
use mysite_core::query::{ListingSettings, build_page_context};
use mysite_core::store::Link;

use super::json_result;

/// Body of the friend-links page.
#[derive(Debug, Clone, Serialize)]
pub struct LinkListBody {
    pub links: Vec<Link>,
}

/// Implementation of the link_list tool.
pub async fn list_impl(db: &BlogDb, settings: &ListingSettings) -> Result<CallToolResult, McpError> {
    let links = db.list_links().await?;
    let ctx = build_page_context(db, settings, LinkListBody { links }).await?;
    json_result(&ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::parse_output;
    use mysite_core::store::NewLink;
    use serde_json::Value;

    #[tokio::test]
    async fn test_links_heaviest_first() {
        let db = BlogDb::open_in_memory().await.unwrap();
        let author = db.create_author("devin").await.unwrap();
        for (title, weight) in [("light", 1), ("heavy", 5), ("mid", 3)] {
            db.create_link(NewLink {
                title: title.to_string(),
                href: format!("https://{title}.example.com"),
                weight,
                owner_id: author.id,
            })
            .await
            .unwrap();
        }

        let result = list_impl(&db, &ListingSettings::default()).await.unwrap();
        let output: Value = parse_output(&result);
        let titles: Vec<&str> =
            output["links"].as_array().unwrap().iter().map(|l| l["title"].as_str().unwrap()).collect();
        assert_eq!(titles, vec!["heavy", "mid", "light"]);
        assert!(output["sidebars"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_no_links() {
        let db = BlogDb::open_in_memory().await.unwrap();
        let output: Value = parse_output(&list_impl(&db, &ListingSettings::default()).await.unwrap());
        assert!(output["links"].as_array().unwrap().is_empty());
    }
}
