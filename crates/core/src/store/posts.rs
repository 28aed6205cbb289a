//! Post CRUD operations.
//!
//! Every write path recomputes `content_html` from `content` and `is_md`, so
//! the rendered body is always consistent with the last save. The `pv` and
//! `uv` counters are never written here; see [`crate::visit::CounterStore`].

use super::connection::BlogDb;
use super::taxonomy::{TAG_COLUMNS, require_author, tag_from_row};
use super::{Tag, timestamp};
use crate::Error;
use crate::markdown::render_body;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite::{self, OptionalExtension, Row};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PostStatus {
    Deleted = 0,
    #[default]
    Normal = 1,
    Draft = 2,
}

/// A stored post with its tags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub summary: String,
    pub content: String,
    pub content_html: String,
    pub is_md: bool,
    pub status: PostStatus,
    pub category_id: i64,
    pub owner_id: i64,
    pub tags: Vec<Tag>,
    pub pv: i64,
    pub uv: i64,
    pub created_at: String,
}

/// Fields supplied when creating a post.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct NewPost {
    pub title: String,
    #[serde(default)]
    pub summary: String,
    pub content: String,
    #[serde(default = "default_true")]
    pub is_md: bool,
    #[serde(default)]
    pub status: PostStatus,
    pub category_id: i64,
    pub owner_id: i64,
    #[serde(default)]
    pub tag_ids: Vec<i64>,
}

/// Editable fields of an existing post.
///
/// Owner, counters and creation time are not editable.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct PostUpdate {
    pub title: String,
    #[serde(default)]
    pub summary: String,
    pub content: String,
    #[serde(default = "default_true")]
    pub is_md: bool,
    #[serde(default)]
    pub status: PostStatus,
    pub category_id: i64,
    #[serde(default)]
    pub tag_ids: Vec<i64>,
}

fn default_true() -> bool {
    true
}

pub(crate) const POST_COLUMNS: &str =
    "id, title, summary, content, content_html, is_md, status, category_id, owner_id, pv, uv, created_at";

fn post_from_row(row: &Row<'_>) -> rusqlite::Result<Post> {
    Ok(Post {
        id: row.get(0)?,
        title: row.get(1)?,
        summary: row.get(2)?,
        content: row.get(3)?,
        content_html: row.get(4)?,
        is_md: row.get::<_, i32>(5)? == 1,
        status: row.get(6)?,
        category_id: row.get(7)?,
        owner_id: row.get(8)?,
        tags: Vec::new(),
        pv: row.get(9)?,
        uv: row.get(10)?,
        created_at: row.get(11)?,
    })
}

fn validate_fields(title: &str, summary: &str, content: &str) -> Result<(), Error> {
    if title.trim().is_empty() {
        return Err(Error::InvalidInput("title cannot be empty".into()));
    }
    if title.chars().count() > 255 {
        return Err(Error::InvalidInput("title must be at most 255 characters".into()));
    }
    if summary.chars().count() > 1024 {
        return Err(Error::InvalidInput("summary must be at most 1024 characters".into()));
    }
    if content.trim().is_empty() {
        return Err(Error::InvalidInput("content cannot be empty".into()));
    }
    Ok(())
}

fn require_category(conn: &rusqlite::Connection, id: i64) -> Result<(), Error> {
    let exists: bool =
        conn.query_row("SELECT EXISTS(SELECT 1 FROM categories WHERE id = ?1)", params![id], |row| row.get(0))?;
    if !exists {
        return Err(Error::InvalidInput(format!("unknown category: {id}")));
    }
    Ok(())
}

fn replace_tags(tx: &rusqlite::Transaction<'_>, post_id: i64, tag_ids: &[i64]) -> Result<(), Error> {
    tx.execute("DELETE FROM post_tags WHERE post_id = ?1", params![post_id])?;
    for tag_id in tag_ids {
        let exists: bool =
            tx.query_row("SELECT EXISTS(SELECT 1 FROM tags WHERE id = ?1)", params![tag_id], |row| row.get(0))?;
        if !exists {
            return Err(Error::InvalidInput(format!("unknown tag: {tag_id}")));
        }
        tx.execute("INSERT OR IGNORE INTO post_tags (post_id, tag_id) VALUES (?1, ?2)", params![post_id, tag_id])?;
    }
    Ok(())
}

pub(crate) fn load_tags(conn: &rusqlite::Connection, post_id: i64) -> rusqlite::Result<Vec<Tag>> {
    let sql = format!(
        "SELECT {} FROM tags t JOIN post_tags pt ON pt.tag_id = t.id WHERE pt.post_id = ?1 ORDER BY t.id",
        TAG_COLUMNS.split(", ").map(|c| format!("t.{c}")).collect::<Vec<_>>().join(", ")
    );
    let mut stmt = conn.prepare(&sql)?;
    let tags = stmt.query_map(params![post_id], tag_from_row)?.collect::<Result<Vec<_>, _>>()?;
    Ok(tags)
}

fn fetch_post(conn: &rusqlite::Connection, id: i64) -> Result<Option<Post>, Error> {
    let sql = format!("SELECT {POST_COLUMNS} FROM posts WHERE id = ?1");
    let post = conn.query_row(&sql, params![id], post_from_row).optional()?;
    match post {
        Some(mut post) => {
            post.tags = load_tags(conn, post.id)?;
            Ok(Some(post))
        }
        None => Ok(None),
    }
}

impl BlogDb {
    /// Create a post, rendering its body and attaching its tags.
    pub async fn create_post(&self, new: NewPost) -> Result<Post, Error> {
        validate_fields(&new.title, &new.summary, &new.content)?;
        let content_html = render_body(&new.content, new.is_md);
        let created_at = timestamp();

        self.conn
            .call(move |conn| -> Result<Post, Error> {
                require_author(conn, new.owner_id)?;
                require_category(conn, new.category_id)?;

                let tx = conn.transaction()?;
                tx.execute(
                    "INSERT INTO posts (
                        title, summary, content, content_html, is_md, status,
                        category_id, owner_id, created_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                    params![
                        &new.title,
                        &new.summary,
                        &new.content,
                        &content_html,
                        new.is_md as i32,
                        new.status,
                        new.category_id,
                        new.owner_id,
                        &created_at,
                    ],
                )?;
                let id = tx.last_insert_rowid();
                replace_tags(&tx, id, &new.tag_ids)?;
                tx.commit()?;

                let post = fetch_post(conn, id)?.ok_or_else(|| Error::NotFound(format!("post {id}")))?;
                tracing::debug!(post_id = id, title = %post.title, "created post");
                Ok(post)
            })
            .await
            .map_err(Error::from)
    }

    /// Replace the editable fields of a post.
    ///
    /// The rendered body is recomputed. The row is updated column by column so
    /// that concurrent counter increments are never overwritten.
    pub async fn update_post(&self, id: i64, update: PostUpdate) -> Result<Post, Error> {
        validate_fields(&update.title, &update.summary, &update.content)?;
        let content_html = render_body(&update.content, update.is_md);

        self.conn
            .call(move |conn| -> Result<Post, Error> {
                require_category(conn, update.category_id)?;

                let tx = conn.transaction()?;
                let changed = tx.execute(
                    "UPDATE posts SET
                        title = ?1, summary = ?2, content = ?3, content_html = ?4,
                        is_md = ?5, status = ?6, category_id = ?7
                    WHERE id = ?8",
                    params![
                        &update.title,
                        &update.summary,
                        &update.content,
                        &content_html,
                        update.is_md as i32,
                        update.status,
                        update.category_id,
                        id,
                    ],
                )?;
                if changed == 0 {
                    return Err(Error::NotFound(format!("post {id}")));
                }
                replace_tags(&tx, id, &update.tag_ids)?;
                tx.commit()?;

                fetch_post(conn, id)?.ok_or_else(|| Error::NotFound(format!("post {id}")))
            })
            .await
            .map_err(Error::from)
    }

    /// Get a post by id, any status.
    ///
    /// Returns None if the post doesn't exist.
    pub async fn get_post(&self, id: i64) -> Result<Option<Post>, Error> {
        self.conn
            .call(move |conn| -> Result<Option<Post>, Error> { fetch_post(conn, id) })
            .await
            .map_err(Error::from)
    }

    /// Change a post's status without touching any other column.
    pub async fn set_post_status(&self, id: i64, status: PostStatus) -> Result<(), Error> {
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let changed = conn.execute("UPDATE posts SET status = ?1 WHERE id = ?2", params![status, id])?;
                if changed == 0 {
                    return Err(Error::NotFound(format!("post {id}")));
                }
                Ok(())
            })
            .await
            .map_err(Error::from)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) struct Fixture {
        pub db: BlogDb,
        pub author_id: i64,
        pub category_id: i64,
    }

    pub(crate) async fn fixture() -> Fixture {
        let db = BlogDb::open_in_memory().await.unwrap();
        let author = db.create_author("devin").await.unwrap();
        let category = db.create_category("Rust", true, author.id).await.unwrap();
        Fixture { db, author_id: author.id, category_id: category.id }
    }

    pub(crate) fn new_post(fx: &Fixture, title: &str) -> NewPost {
        NewPost {
            title: title.to_string(),
            summary: format!("{title} summary"),
            content: format!("# {title}"),
            is_md: true,
            status: PostStatus::Normal,
            category_id: fx.category_id,
            owner_id: fx.author_id,
            tag_ids: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_create_renders_markdown() {
        let fx = fixture().await;
        let post = fx.db.create_post(new_post(&fx, "Hello")).await.unwrap();

        assert_eq!(post.content_html.trim(), "<h1>Hello</h1>");
        assert_eq!(post.pv, 1);
        assert_eq!(post.uv, 1);
        assert_eq!(post.status, PostStatus::Normal);
    }

    #[tokio::test]
    async fn test_update_rerenders_body() {
        let fx = fixture().await;
        let post = fx.db.create_post(new_post(&fx, "Hello")).await.unwrap();

        let update = PostUpdate {
            title: "Hello".into(),
            summary: String::new(),
            content: "<p>raw</p>".into(),
            is_md: false,
            status: PostStatus::Normal,
            category_id: fx.category_id,
            tag_ids: Vec::new(),
        };
        let updated = fx.db.update_post(post.id, update).await.unwrap();
        assert_eq!(updated.content_html, "<p>raw</p>");
        assert!(!updated.is_md);
    }

    #[tokio::test]
    async fn test_update_leaves_counters_untouched() {
        let fx = fixture().await;
        let post = fx.db.create_post(new_post(&fx, "Counted")).await.unwrap();

        fx.db
            .conn
            .call(move |conn| conn.execute("UPDATE posts SET pv = 40, uv = 7 WHERE id = ?1", params![post.id]))
            .await
            .unwrap();

        let update = PostUpdate {
            title: "Counted v2".into(),
            summary: String::new(),
            content: "body".into(),
            is_md: true,
            status: PostStatus::Normal,
            category_id: fx.category_id,
            tag_ids: Vec::new(),
        };
        let updated = fx.db.update_post(post.id, update).await.unwrap();
        assert_eq!(updated.pv, 40);
        assert_eq!(updated.uv, 7);
        assert_eq!(updated.title, "Counted v2");
    }

    #[tokio::test]
    async fn test_tags_attached_and_replaced() {
        let fx = fixture().await;
        let a = fx.db.create_tag("a", fx.author_id).await.unwrap();
        let b = fx.db.create_tag("b", fx.author_id).await.unwrap();

        let mut new = new_post(&fx, "Tagged");
        new.tag_ids = vec![a.id, b.id];
        let post = fx.db.create_post(new).await.unwrap();
        let names: Vec<&str> = post.tags.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);

        let update = PostUpdate {
            title: post.title.clone(),
            summary: post.summary.clone(),
            content: post.content.clone(),
            is_md: true,
            status: PostStatus::Normal,
            category_id: fx.category_id,
            tag_ids: vec![b.id],
        };
        let updated = fx.db.update_post(post.id, update).await.unwrap();
        assert_eq!(updated.tags.len(), 1);
        assert_eq!(updated.tags[0].name, "b");
    }

    #[tokio::test]
    async fn test_unknown_tag_rolls_back() {
        let fx = fixture().await;
        let mut new = new_post(&fx, "Broken");
        new.tag_ids = vec![404];

        let result = fx.db.create_post(new).await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));

        let count: i64 = fx
            .db
            .conn
            .call(|conn| conn.query_row("SELECT COUNT(*) FROM posts", [], |row| row.get(0)))
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_empty_title_rejected() {
        let fx = fixture().await;
        let result = fx.db.create_post(new_post(&fx, "  ")).await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_update_missing_post() {
        let fx = fixture().await;
        let update = PostUpdate {
            title: "x".into(),
            summary: String::new(),
            content: "x".into(),
            is_md: true,
            status: PostStatus::Normal,
            category_id: fx.category_id,
            tag_ids: Vec::new(),
        };
        let result = fx.db.update_post(12345, update).await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_set_post_status() {
        let fx = fixture().await;
        let post = fx.db.create_post(new_post(&fx, "Draft me")).await.unwrap();
        fx.db.set_post_status(post.id, PostStatus::Draft).await.unwrap();

        let fetched = fx.db.get_post(post.id).await.unwrap().unwrap();
        assert_eq!(fetched.status, PostStatus::Draft);
    }
}
