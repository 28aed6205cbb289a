//! admin_schema and admin_save_post tool implementations.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use mysite_core::admin::{POST_ADMIN, REGISTRY, model_admin};
use mysite_core::store::{NewPost, PostUpdate};
use mysite_core::{BlogDb, Error};

use super::json_result;

/// Parameters for the admin_schema tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct AdminSchemaParams {
    /// Model name ("post", "category", "tag", "link", "sidebar"). Omit for all models.
    #[serde(default)]
    pub model: Option<String>,
}

/// Parameters for the admin_save_post tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AdminSavePostParams {
    /// Author performing the save. New posts are owned by this author.
    pub owner_id: i64,

    /// Post to update. Omit to create a new post.
    #[serde(default)]
    pub post_id: Option<i64>,

    /// Form fields keyed by the post admin's field names.
    pub form: Map<String, Value>,
}

/// Implementation of the admin_schema tool.
pub async fn schema_impl(params: AdminSchemaParams) -> Result<CallToolResult, McpError> {
    match params.model.as_deref() {
        None => json_result(&REGISTRY),
        Some(name) => {
            let admin = model_admin(name).ok_or_else(|| Error::NotFound(format!("admin for model {name}")))?;
            json_result(admin)
        }
    }
}

/// Implementation of the admin_save_post tool.
///
/// Authors can only edit their own posts: another author's post is reported
/// as missing.
pub async fn save_post_impl(db: &BlogDb, params: AdminSavePostParams) -> Result<CallToolResult, McpError> {
    POST_ADMIN.validate(&params.form)?;
    let update: PostUpdate = serde_json::from_value(Value::Object(params.form))
        .map_err(|e| Error::InvalidInput(format!("post: {e}")))?;

    let post = match params.post_id {
        Some(id) => {
            let owned = db.get_post(id).await?.is_some_and(|p| p.owner_id == params.owner_id);
            if !owned {
                return Err(Error::NotFound(format!("post {id}")).into());
            }
            db.update_post(id, update).await?
        }
        None => {
            db.create_post(NewPost {
                title: update.title,
                summary: update.summary,
                content: update.content,
                is_md: update.is_md,
                status: update.status,
                category_id: update.category_id,
                owner_id: params.owner_id,
                tag_ids: update.tag_ids,
            })
            .await?
        }
    };

    tracing::info!(post_id = post.id, owner_id = params.owner_id, "saved post");
    json_result(&post)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::parse_output;
    use mysite_core::store::{Post, PostStatus};
    use serde_json::json;

    async fn setup() -> (BlogDb, i64, i64) {
        let db = BlogDb::open_in_memory().await.unwrap();
        let author = db.create_author("devin").await.unwrap();
        let category = db.create_category("Rust", true, author.id).await.unwrap();
        (db, author.id, category.id)
    }

    fn form(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_schema_all_models() {
        let output: Vec<Value> = parse_output(&schema_impl(AdminSchemaParams::default()).await.unwrap());
        let models: Vec<&str> = output.iter().map(|m| m["model"].as_str().unwrap()).collect();
        assert_eq!(models, vec!["post", "category", "tag", "link", "sidebar"]);
    }

    #[tokio::test]
    async fn test_schema_single_model() {
        let params = AdminSchemaParams { model: Some("post".into()) };
        let output: Value = parse_output(&schema_impl(params).await.unwrap());
        assert_eq!(output["fieldsets"][0]["title"], "Basics");
        assert_eq!(output["fields"][0]["widget"], "text_input");
    }

    #[tokio::test]
    async fn test_schema_unknown_model() {
        let params = AdminSchemaParams { model: Some("poll".into()) };
        assert!(schema_impl(params).await.is_err());
    }

    #[tokio::test]
    async fn test_create_post_sets_owner() {
        let (db, author_id, category_id) = setup().await;
        let params = AdminSavePostParams {
            owner_id: author_id,
            post_id: None,
            form: form(json!({"title": "Lifetimes", "category_id": category_id, "content": "*hi*"})),
        };

        let post: Post = parse_output(&save_post_impl(&db, params).await.unwrap());
        assert_eq!(post.owner_id, author_id);
        assert_eq!(post.content_html.trim(), "<p><em>hi</em></p>");
        assert_eq!((post.pv, post.uv), (1, 1));
    }

    #[tokio::test]
    async fn test_update_own_post() {
        let (db, author_id, category_id) = setup().await;
        let create = AdminSavePostParams {
            owner_id: author_id,
            post_id: None,
            form: form(json!({"title": "Draft", "category_id": category_id, "content": "body"})),
        };
        let created: Post = parse_output(&save_post_impl(&db, create).await.unwrap());

        let update = AdminSavePostParams {
            owner_id: author_id,
            post_id: Some(created.id),
            form: form(json!({
                "title": "Final",
                "category_id": category_id,
                "content": "body",
                "status": "draft"
            })),
        };
        let updated: Post = parse_output(&save_post_impl(&db, update).await.unwrap());
        assert_eq!(updated.title, "Final");
        assert_eq!(updated.status, PostStatus::Draft);
    }

    #[tokio::test]
    async fn test_cannot_edit_other_authors_post() {
        let (db, author_id, category_id) = setup().await;
        let other = db.create_author("mallory").await.unwrap();
        let create = AdminSavePostParams {
            owner_id: author_id,
            post_id: None,
            form: form(json!({"title": "Mine", "category_id": category_id, "content": "body"})),
        };
        let created: Post = parse_output(&save_post_impl(&db, create).await.unwrap());

        let update = AdminSavePostParams {
            owner_id: other.id,
            post_id: Some(created.id),
            form: form(json!({"title": "Theirs", "category_id": category_id, "content": "body"})),
        };
        let err = save_post_impl(&db, update).await.unwrap_err();
        assert_eq!(err.code.0, -32001);
        assert_eq!(db.get_post(created.id).await.unwrap().unwrap().title, "Mine");
    }

    #[tokio::test]
    async fn test_counters_rejected_in_form() {
        let (db, author_id, category_id) = setup().await;
        let params = AdminSavePostParams {
            owner_id: author_id,
            post_id: None,
            form: form(json!({"title": "Hi", "category_id": category_id, "content": "body", "pv": 9000})),
        };
        assert!(save_post_impl(&db, params).await.is_err());
    }
}
