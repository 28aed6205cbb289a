//! Comments attached to page paths.
//!
//! A comment targets a path (e.g. `/post/3.html`) rather than a post id, so
//! any page can carry a comment block. Replies reference a parent on the
//! same target and are returned as a tree.

use std::collections::HashMap;

use super::connection::BlogDb;
use super::{Status, timestamp};
use crate::Error;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite::{self, OptionalExtension, Row};

const MIN_CONTENT_CHARS: usize = 10;
const MAX_CONTENT_CHARS: usize = 2000;
const MAX_NICKNAME_CHARS: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct Comment {
    pub id: i64,
    pub target: String,
    pub parent_id: Option<i64>,
    pub nickname: String,
    pub website: String,
    pub email: String,
    pub content: String,
    pub status: Status,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct NewComment {
    pub target: String,
    #[serde(default)]
    pub parent_id: Option<i64>,
    pub nickname: String,
    #[serde(default)]
    pub website: String,
    pub email: String,
    pub content: String,
}

/// A comment with its replies, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct CommentNode {
    #[serde(flatten)]
    pub comment: Comment,
    pub replies: Vec<CommentNode>,
}

const COMMENT_COLUMNS: &str = "id, target, parent_id, nickname, website, email, content, status, created_at";

fn comment_from_row(row: &Row<'_>) -> rusqlite::Result<Comment> {
    Ok(Comment {
        id: row.get(0)?,
        target: row.get(1)?,
        parent_id: row.get(2)?,
        nickname: row.get(3)?,
        website: row.get(4)?,
        email: row.get(5)?,
        content: row.get(6)?,
        status: row.get(7)?,
        created_at: row.get(8)?,
    })
}

impl NewComment {
    fn validate(&self) -> Result<(), Error> {
        if self.target.trim().is_empty() {
            return Err(Error::InvalidInput("comment target cannot be empty".into()));
        }
        let nickname_len = self.nickname.trim().chars().count();
        if nickname_len == 0 || nickname_len > MAX_NICKNAME_CHARS {
            return Err(Error::InvalidInput(format!("nickname must be 1 to {MAX_NICKNAME_CHARS} characters")));
        }
        if !self.email.contains('@') {
            return Err(Error::InvalidInput("email is not valid".into()));
        }
        if !self.website.is_empty() && !(self.website.starts_with("http://") || self.website.starts_with("https://")) {
            return Err(Error::InvalidInput("website must be an http(s) URL".into()));
        }
        let content_len = self.content.trim().chars().count();
        if content_len < MIN_CONTENT_CHARS {
            return Err(Error::InvalidInput(format!("content must be at least {MIN_CONTENT_CHARS} characters")));
        }
        if content_len > MAX_CONTENT_CHARS {
            return Err(Error::InvalidInput(format!("content must be at most {MAX_CONTENT_CHARS} characters")));
        }
        Ok(())
    }
}

/// Arrange a flat, id-ordered list into reply trees.
///
/// Replies whose parent is missing from `comments` (e.g. deleted) are dropped
/// together with their own replies.
fn build_tree(comments: Vec<Comment>) -> Vec<CommentNode> {
    let mut children: HashMap<i64, Vec<Comment>> = HashMap::new();
    let mut roots = Vec::new();
    for comment in comments {
        match comment.parent_id {
            Some(parent) => children.entry(parent).or_default().push(comment),
            None => roots.push(comment),
        }
    }

    fn attach(comment: Comment, children: &mut HashMap<i64, Vec<Comment>>) -> CommentNode {
        let replies = children
            .remove(&comment.id)
            .unwrap_or_default()
            .into_iter()
            .map(|child| attach(child, children))
            .collect();
        CommentNode { comment, replies }
    }

    roots.into_iter().map(|root| attach(root, &mut children)).collect()
}

impl BlogDb {
    /// Validate and store a comment.
    ///
    /// A reply's parent must exist and belong to the same target.
    pub async fn create_comment(&self, new: NewComment) -> Result<Comment, Error> {
        new.validate()?;
        let created_at = timestamp();

        self.conn
            .call(move |conn| -> Result<Comment, Error> {
                if let Some(parent_id) = new.parent_id {
                    let parent_target: Option<String> = conn
                        .query_row("SELECT target FROM comments WHERE id = ?1", params![parent_id], |row| row.get(0))
                        .optional()?;
                    match parent_target {
                        None => return Err(Error::InvalidInput(format!("unknown parent comment: {parent_id}"))),
                        Some(t) if t != new.target => {
                            return Err(Error::InvalidInput("reply must target the same page as its parent".into()));
                        }
                        Some(_) => {}
                    }
                }

                conn.execute(
                    "INSERT INTO comments (target, parent_id, nickname, website, email, content, status, created_at)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                    params![
                        new.target,
                        new.parent_id,
                        new.nickname.trim(),
                        new.website,
                        new.email,
                        new.content,
                        Status::Normal,
                        created_at
                    ],
                )?;
                let id = conn.last_insert_rowid();
                tracing::debug!(comment_id = id, target = %new.target, "stored comment");

                Ok(Comment {
                    id,
                    target: new.target,
                    parent_id: new.parent_id,
                    nickname: new.nickname.trim().to_string(),
                    website: new.website,
                    email: new.email,
                    content: new.content,
                    status: Status::Normal,
                    created_at,
                })
            })
            .await
            .map_err(Error::from)
    }

    /// Normal comments on `target`, as reply trees ordered by id.
    pub async fn comments_for_target(&self, target: &str) -> Result<Vec<CommentNode>, Error> {
        let target = target.to_string();
        let comments = self
            .conn
            .call(move |conn| -> Result<Vec<Comment>, Error> {
                let sql = format!("SELECT {COMMENT_COLUMNS} FROM comments WHERE target = ?1 AND status = ?2 ORDER BY id");
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt
                    .query_map(params![target, Status::Normal], comment_from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await
            .map_err(Error::from)?;
        Ok(build_tree(comments))
    }

    /// Most recent normal comments across all targets, newest first.
    pub async fn recent_comments(&self, limit: usize) -> Result<Vec<Comment>, Error> {
        let limit = limit as i64;
        self.conn
            .call(move |conn| -> Result<Vec<Comment>, Error> {
                let sql = format!("SELECT {COMMENT_COLUMNS} FROM comments WHERE status = ?1 ORDER BY id DESC LIMIT ?2");
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt
                    .query_map(params![Status::Normal, limit], comment_from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await
            .map_err(Error::from)
    }

    /// Soft-delete a comment.
    pub async fn delete_comment(&self, id: i64) -> Result<(), Error> {
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let changed =
                    conn.execute("UPDATE comments SET status = ?1 WHERE id = ?2", params![Status::Deleted, id])?;
                if changed == 0 {
                    return Err(Error::NotFound(format!("comment {id}")));
                }
                Ok(())
            })
            .await
            .map_err(Error::from)
    }
}
