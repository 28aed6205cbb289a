//! post_list and post_detail tool implementations.

use chrono::Utc;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use mysite_core::query::{ListingSettings, Page, PostSummary, build_page_context};
use mysite_core::store::{Author, Category, CommentNode, Post, PostStatus, Tag};
use mysite_core::{BlogDb, Error, VisitOutcome, VisitTracker};

use super::json_result;

/// Which listing to show.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ListKind {
    /// Newest posts.
    #[default]
    Index,
    /// Posts in category `id`.
    Category,
    /// Posts tagged `id`.
    Tag,
    /// Posts written by author `id`.
    Author,
    /// Posts matching `keyword` in title or summary.
    Search,
}

/// Input parameters for post_list tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PostListParams {
    /// Listing kind (default: "index").
    #[serde(default)]
    pub kind: ListKind,

    /// Category, tag or author id for the matching kinds.
    #[serde(default)]
    pub id: Option<i64>,

    /// Search keyword for kind "search". Blank lists every post.
    #[serde(default)]
    pub keyword: Option<String>,

    /// 1-based page number (default: 1).
    #[serde(default = "default_page")]
    pub page: usize,
}

fn default_page() -> usize {
    1
}

/// Body of a list page.
#[derive(Debug, Clone, Serialize)]
pub struct PostListBody {
    pub kind: ListKind,
    pub category: Option<Category>,
    pub tag: Option<Tag>,
    pub author: Option<Author>,
    pub keyword: Option<String>,
    pub posts: Page<PostSummary>,
}

/// Input parameters for post_detail tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PostDetailParams {
    /// The post to show.
    pub post_id: i64,

    /// Stable visitor id from a previous response. A new one is issued when absent.
    #[serde(default)]
    pub visitor_id: Option<String>,

    /// Page path, "/post/{post_id}.html". Any other path is rejected.
    #[serde(default)]
    pub path: Option<String>,
}

/// Body of a post page.
#[derive(Debug, Clone, Serialize)]
pub struct PostDetailBody {
    pub post: Post,
    pub path: String,
    pub comments: Vec<CommentNode>,
    /// Id the caller should send back on later requests.
    pub visitor_id: String,
    pub visit: VisitOutcome,
}

fn require_id(params: &PostListParams) -> Result<i64, Error> {
    params
        .id
        .ok_or_else(|| Error::InvalidInput(format!("id is required for {:?} listings", params.kind)))
}

/// Implementation of the post_list tool.
pub async fn list_impl(
    db: &BlogDb, settings: &ListingSettings, params: PostListParams,
) -> Result<CallToolResult, McpError> {
    let mut body = PostListBody {
        kind: params.kind,
        category: None,
        tag: None,
        author: None,
        keyword: None,
        posts: Page::paginate(Vec::new(), params.page, settings.page_size),
    };

    let posts = match params.kind {
        ListKind::Index => db.latest_posts(None).await?,
        ListKind::Category => {
            let (posts, category) = db.posts_by_category(require_id(&params)?).await?;
            body.category = category;
            posts
        }
        ListKind::Tag => {
            let (posts, tag) = db.posts_by_tag(require_id(&params)?).await?;
            body.tag = tag;
            posts
        }
        ListKind::Author => {
            let (posts, author) = db.posts_by_author(require_id(&params)?).await?;
            body.author = author;
            posts
        }
        ListKind::Search => {
            let keyword = params.keyword.clone().unwrap_or_default();
            let posts = db.search_posts(&keyword).await?;
            body.keyword = Some(keyword);
            posts
        }
    };
    body.posts = Page::paginate(posts, params.page, settings.page_size);

    let ctx = build_page_context(db, settings, body).await?;
    json_result(&ctx)
}

/// Implementation of the post_detail tool.
///
/// The visit is recorded after the page context is built and cannot fail the call.
pub async fn detail_impl(
    db: &BlogDb, tracker: &VisitTracker, settings: &ListingSettings, params: PostDetailParams,
) -> Result<CallToolResult, McpError> {
    let post = db
        .get_post(params.post_id)
        .await?
        .filter(|p| p.status == PostStatus::Normal)
        .ok_or_else(|| Error::NotFound(format!("post {}", params.post_id)))?;

    let path = format!("/post/{}.html", post.id);
    if params.path.as_deref().is_some_and(|p| p != path) {
        return Err(Error::InvalidInput(format!("path must be {path} for post {}", post.id)).into());
    }
    let visitor_id = match params.visitor_id.filter(|v| !v.trim().is_empty()) {
        Some(id) => id,
        None => {
            let id = uuid::Uuid::new_v4().to_string();
            tracing::debug!(visitor_id = %id, "issued visitor id");
            id
        }
    };
    let comments = db.comments_for_target(&path).await?;

    let body = PostDetailBody { post, path, comments, visitor_id, visit: VisitOutcome::default() };
    let mut ctx = build_page_context(db, settings, body).await?;

    ctx.body.visit = tracker
        .record_visit(&ctx.body.visitor_id, &ctx.body.path, ctx.body.post.id, Utc::now())
        .await;

    json_result(&ctx)
}
