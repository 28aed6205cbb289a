//! Read-only post listings.
//!
//! Every listing only returns posts with `PostStatus::Normal`. Relation
//! filters return an empty list together with `None` when the category, tag
//! or author does not exist.

use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite::types::ToSql;
use tokio_rusqlite::rusqlite::{self, OptionalExtension, Row};

use crate::Error;
use crate::store::taxonomy::{CATEGORY_COLUMNS, TAG_COLUMNS, category_from_row, tag_from_row};
use crate::store::{Author, BlogDb, Category, PostStatus, Status, Tag};

/// A post as shown in list pages, with its category and owner resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct PostSummary {
    pub id: i64,
    pub title: String,
    pub summary: String,
    pub category_id: i64,
    pub category_name: String,
    pub owner_id: i64,
    pub owner_name: String,
    pub pv: i64,
    pub uv: i64,
    pub created_at: String,
}

/// Id and title only, for compact sidebars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct PostRef {
    pub id: i64,
    pub title: String,
}

/// Normal categories split by their navigation flag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct Navs {
    pub navs: Vec<Category>,
    pub categories: Vec<Category>,
}

const SUMMARY_SELECT: &str = "SELECT p.id, p.title, p.summary, p.category_id, c.name, p.owner_id, a.username,
        p.pv, p.uv, p.created_at
    FROM posts p
    JOIN categories c ON c.id = p.category_id
    JOIN authors a ON a.id = p.owner_id";

fn summary_from_row(row: &Row<'_>) -> rusqlite::Result<PostSummary> {
    Ok(PostSummary {
        id: row.get(0)?,
        title: row.get(1)?,
        summary: row.get(2)?,
        category_id: row.get(3)?,
        category_name: row.get(4)?,
        owner_id: row.get(5)?,
        owner_name: row.get(6)?,
        pv: row.get(7)?,
        uv: row.get(8)?,
        created_at: row.get(9)?,
    })
}

/// Normal posts, newest id first, narrowed by `filter` (SQL over `p`, `pt`).
fn summaries(
    conn: &rusqlite::Connection, join: &str, filter: &str, args: &[&dyn ToSql], limit: Option<usize>,
) -> Result<Vec<PostSummary>, Error> {
    let limit = limit.map_or(-1, |l| l as i64);
    let sql = format!("{SUMMARY_SELECT} {join} WHERE p.status = ? {filter} ORDER BY p.id DESC LIMIT ?");

    let mut all: Vec<&dyn ToSql> = Vec::with_capacity(args.len() + 2);
    all.push(&PostStatus::Normal);
    all.extend_from_slice(args);
    all.push(&limit);

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(all.as_slice(), summary_from_row)?.collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Case-insensitive substring match on title or summary.
pub(crate) fn matches_keyword(post: &PostSummary, keyword: &str) -> bool {
    let needle = keyword.to_lowercase();
    post.title.to_lowercase().contains(&needle) || post.summary.to_lowercase().contains(&needle)
}

impl BlogDb {
    /// Normal posts, newest first. `None` lists every post.
    pub async fn latest_posts(&self, limit: Option<usize>) -> Result<Vec<PostSummary>, Error> {
        self.conn
            .call(move |conn| -> Result<Vec<PostSummary>, Error> { summaries(conn, "", "", &[], limit) })
            .await
            .map_err(Error::from)
    }

    /// Normal posts with the most page views first.
    ///
    /// Ties are broken by newest id so the order is stable.
    pub async fn hot_posts(&self, limit: usize) -> Result<Vec<PostRef>, Error> {
        let limit = limit as i64;
        self.conn
            .call(move |conn| -> Result<Vec<PostRef>, Error> {
                let mut stmt =
                    conn.prepare("SELECT id, title FROM posts WHERE status = ?1 ORDER BY pv DESC, id DESC LIMIT ?2")?;
                let rows = stmt
                    .query_map(params![PostStatus::Normal, limit], |row| {
                        Ok(PostRef { id: row.get(0)?, title: row.get(1)? })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await
            .map_err(Error::from)
    }

    /// Normal posts in a category, plus the category itself.
    pub async fn posts_by_category(&self, category_id: i64) -> Result<(Vec<PostSummary>, Option<Category>), Error> {
        self.conn
            .call(move |conn| -> Result<(Vec<PostSummary>, Option<Category>), Error> {
                let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = ?1");
                let Some(category) = conn.query_row(&sql, params![category_id], category_from_row).optional()? else {
                    return Ok((Vec::new(), None));
                };
                let posts = summaries(conn, "", "AND p.category_id = ?", &[&category_id as &dyn ToSql], None)?;
                Ok((posts, Some(category)))
            })
            .await
            .map_err(Error::from)
    }

    /// Normal posts carrying a tag, plus the tag itself.
    pub async fn posts_by_tag(&self, tag_id: i64) -> Result<(Vec<PostSummary>, Option<Tag>), Error> {
        self.conn
            .call(move |conn| -> Result<(Vec<PostSummary>, Option<Tag>), Error> {
                let sql = format!("SELECT {TAG_COLUMNS} FROM tags WHERE id = ?1");
                let Some(tag) = conn.query_row(&sql, params![tag_id], tag_from_row).optional()? else {
                    return Ok((Vec::new(), None));
                };
                let join = "JOIN post_tags pt ON pt.post_id = p.id";
                let posts = summaries(conn, join, "AND pt.tag_id = ?", &[&tag_id as &dyn ToSql], None)?;
                Ok((posts, Some(tag)))
            })
            .await
            .map_err(Error::from)
    }

    /// Normal posts by an author, plus the author.
    pub async fn posts_by_author(&self, author_id: i64) -> Result<(Vec<PostSummary>, Option<Author>), Error> {
        self.conn
            .call(move |conn| -> Result<(Vec<PostSummary>, Option<Author>), Error> {
                let author = conn
                    .query_row("SELECT id, username, created_at FROM authors WHERE id = ?1", params![author_id], |row| {
                        Ok(Author { id: row.get(0)?, username: row.get(1)?, created_at: row.get(2)? })
                    })
                    .optional()?;
                let Some(author) = author else {
                    return Ok((Vec::new(), None));
                };
                let posts = summaries(conn, "", "AND p.owner_id = ?", &[&author_id as &dyn ToSql], None)?;
                Ok((posts, Some(author)))
            })
            .await
            .map_err(Error::from)
    }

    /// Normal posts whose title or summary contains `keyword`, ignoring case.
    ///
    /// A blank keyword returns the same list as `latest_posts(None)`.
    pub async fn search_posts(&self, keyword: &str) -> Result<Vec<PostSummary>, Error> {
        let posts = self.latest_posts(None).await?;
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Ok(posts);
        }
        Ok(posts.into_iter().filter(|p| matches_keyword(p, keyword)).collect())
    }

    /// Normal categories partitioned into navigation and the rest, id order kept.
    pub async fn nav_categories(&self) -> Result<Navs, Error> {
        let categories = self
            .conn
            .call(|conn| -> Result<Vec<Category>, Error> {
                let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE status = ?1 ORDER BY id");
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt
                    .query_map(params![Status::Normal], category_from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await
            .map_err(Error::from)?;

        let (navs, categories) = categories.into_iter().partition(|c| c.is_nav);
        Ok(Navs { navs, categories })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::posts::tests::{fixture, new_post};
    use crate::visit::{CounterDelta, CounterStore};

    #[tokio::test]
    async fn test_latest_posts_newest_first_and_capped() {
        let fx = fixture().await;
        for title in ["one", "two", "three"] {
            fx.db.create_post(new_post(&fx, title)).await.unwrap();
        }

        let titles: Vec<_> = fx.db.latest_posts(Some(2)).await.unwrap().into_iter().map(|p| p.title).collect();
        assert_eq!(titles, vec!["three", "two"]);
        assert_eq!(fx.db.latest_posts(None).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_latest_excludes_drafts_and_deleted() {
        let fx = fixture().await;
        fx.db.create_post(new_post(&fx, "visible")).await.unwrap();
        let mut draft = new_post(&fx, "draft");
        draft.status = PostStatus::Draft;
        fx.db.create_post(draft).await.unwrap();
        let mut deleted = new_post(&fx, "deleted");
        deleted.status = PostStatus::Deleted;
        fx.db.create_post(deleted).await.unwrap();

        let posts = fx.db.latest_posts(None).await.unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].title, "visible");
        assert_eq!(posts[0].category_name, "Rust");
        assert_eq!(posts[0].owner_name, "devin");
    }

    #[tokio::test]
    async fn test_hot_posts_ordered_and_excludes_non_normal() {
        let fx = fixture().await;
        let mut ids = Vec::new();
        for (i, title) in ["a", "b", "c", "d", "e", "f", "g"].iter().enumerate() {
            let post = fx.db.create_post(new_post(&fx, title)).await.unwrap();
            fx.db.increment_counters(post.id, CounterDelta { pv: (i as u32 + 1) * 10, uv: 0 }).await.unwrap();
            ids.push(post.id);
        }
        // The most viewed post is deleted and must not appear.
        fx.db.set_post_status(*ids.last().unwrap(), PostStatus::Deleted).await.unwrap();

        let hot = fx.db.hot_posts(5).await.unwrap();
        let titles: Vec<_> = hot.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["f", "e", "d", "c", "b"]);
    }

    #[tokio::test]
    async fn test_posts_by_missing_category() {
        let fx = fixture().await;
        fx.db.create_post(new_post(&fx, "one")).await.unwrap();

        let (posts, category) = fx.db.posts_by_category(9999).await.unwrap();
        assert!(posts.is_empty());
        assert!(category.is_none());
    }

    #[tokio::test]
    async fn test_posts_by_category() {
        let fx = fixture().await;
        let other = fx.db.create_category("Go", false, fx.author_id).await.unwrap();
        fx.db.create_post(new_post(&fx, "rusty")).await.unwrap();
        let mut go = new_post(&fx, "gopher");
        go.category_id = other.id;
        fx.db.create_post(go).await.unwrap();

        let (posts, category) = fx.db.posts_by_category(other.id).await.unwrap();
        assert_eq!(category.unwrap().name, "Go");
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].title, "gopher");
    }

    #[tokio::test]
    async fn test_posts_by_tag() {
        let fx = fixture().await;
        let tag = fx.db.create_tag("async", fx.author_id).await.unwrap();
        let mut tagged = new_post(&fx, "tagged");
        tagged.tag_ids = vec![tag.id];
        fx.db.create_post(tagged).await.unwrap();
        fx.db.create_post(new_post(&fx, "plain")).await.unwrap();

        let (posts, found) = fx.db.posts_by_tag(tag.id).await.unwrap();
        assert_eq!(found.unwrap().id, tag.id);
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].title, "tagged");

        let (posts, found) = fx.db.posts_by_tag(tag.id + 100).await.unwrap();
        assert!(posts.is_empty() && found.is_none());
    }

    #[tokio::test]
    async fn test_posts_by_author() {
        let fx = fixture().await;
        let other = fx.db.create_author("guest").await.unwrap();
        fx.db.create_post(new_post(&fx, "mine")).await.unwrap();
        let mut theirs = new_post(&fx, "theirs");
        theirs.owner_id = other.id;
        fx.db.create_post(theirs).await.unwrap();

        let (posts, author) = fx.db.posts_by_author(other.id).await.unwrap();
        assert_eq!(author.unwrap().username, "guest");
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].title, "theirs");

        let (posts, author) = fx.db.posts_by_author(999).await.unwrap();
        assert!(posts.is_empty() && author.is_none());
    }

    #[tokio::test]
    async fn test_empty_search_equals_latest() {
        let fx = fixture().await;
        for title in ["one", "two"] {
            fx.db.create_post(new_post(&fx, title)).await.unwrap();
        }
        assert_eq!(fx.db.search_posts("").await.unwrap(), fx.db.latest_posts(None).await.unwrap());
        assert_eq!(fx.db.search_posts("   ").await.unwrap(), fx.db.latest_posts(None).await.unwrap());
    }

    #[tokio::test]
    async fn test_search_case_insensitive_title_or_summary() {
        let fx = fixture().await;
        fx.db.create_post(new_post(&fx, "Tokio Internals")).await.unwrap();
        let mut by_summary = new_post(&fx, "Scheduling");
        by_summary.summary = "how the TOKIO scheduler works".into();
        fx.db.create_post(by_summary).await.unwrap();
        fx.db.create_post(new_post(&fx, "Unrelated")).await.unwrap();

        let titles: Vec<_> = fx.db.search_posts("tokio").await.unwrap().into_iter().map(|p| p.title).collect();
        assert_eq!(titles, vec!["Scheduling", "Tokio Internals"]);
    }

    #[tokio::test]
    async fn test_nav_partition_skips_deleted() {
        let fx = fixture().await;
        let plain = fx.db.create_category("Notes", false, fx.author_id).await.unwrap();
        let hidden = fx.db.create_category("Old", true, fx.author_id).await.unwrap();
        fx.db.set_category_status(hidden.id, Status::Deleted).await.unwrap();
        let second_nav = fx.db.create_category("Talks", true, fx.author_id).await.unwrap();

        let navs = fx.db.nav_categories().await.unwrap();
        let nav_ids: Vec<_> = navs.navs.iter().map(|c| c.id).collect();
        assert_eq!(nav_ids, vec![fx.category_id, second_nav.id]);
        assert_eq!(navs.categories, vec![plain]);
    }
}
