//! Authors, categories and tags.

use super::connection::BlogDb;
use super::{Status, timestamp};
use crate::Error;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite::{self, OptionalExtension, Row};

/// Post owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct Author {
    pub id: i64,
    pub username: String,
    pub created_at: String,
}

/// A post category. Navigation categories are shown in the site header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub status: Status,
    pub is_nav: bool,
    pub owner_id: i64,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    pub status: Status,
    pub owner_id: i64,
    pub created_at: String,
}

pub(crate) const CATEGORY_COLUMNS: &str = "id, name, status, is_nav, owner_id, created_at";
pub(crate) const TAG_COLUMNS: &str = "id, name, status, owner_id, created_at";

pub(crate) fn category_from_row(row: &Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
        status: row.get(2)?,
        is_nav: row.get::<_, i32>(3)? == 1,
        owner_id: row.get(4)?,
        created_at: row.get(5)?,
    })
}

pub(crate) fn tag_from_row(row: &Row<'_>) -> rusqlite::Result<Tag> {
    Ok(Tag { id: row.get(0)?, name: row.get(1)?, status: row.get(2)?, owner_id: row.get(3)?, created_at: row.get(4)? })
}

fn validate_name(field: &str, name: &str) -> Result<(), Error> {
    let len = name.trim().chars().count();
    if len == 0 {
        return Err(Error::InvalidInput(format!("{field} cannot be empty")));
    }
    if len > 50 {
        return Err(Error::InvalidInput(format!("{field} must be at most 50 characters")));
    }
    Ok(())
}

impl BlogDb {
    /// Create an author. Usernames are unique.
    pub async fn create_author(&self, username: &str) -> Result<Author, Error> {
        validate_name("username", username)?;
        let username = username.trim().to_string();
        let created_at = timestamp();
        self.conn
            .call(move |conn| -> Result<Author, Error> {
                let taken: bool =
                    conn.query_row("SELECT EXISTS(SELECT 1 FROM authors WHERE username = ?1)", params![username], |row| {
                        row.get(0)
                    })?;
                if taken {
                    return Err(Error::InvalidInput(format!("username already taken: {username}")));
                }
                conn.execute("INSERT INTO authors (username, created_at) VALUES (?1, ?2)", params![username, created_at])?;
                Ok(Author { id: conn.last_insert_rowid(), username, created_at })
            })
            .await
            .map_err(Error::from)
    }

    /// Get an author by id.
    pub async fn get_author(&self, id: i64) -> Result<Option<Author>, Error> {
        self.conn
            .call(move |conn| -> Result<Option<Author>, Error> {
                let author = conn
                    .query_row("SELECT id, username, created_at FROM authors WHERE id = ?1", params![id], |row| {
                        Ok(Author { id: row.get(0)?, username: row.get(1)?, created_at: row.get(2)? })
                    })
                    .optional()?;
                Ok(author)
            })
            .await
            .map_err(Error::from)
    }

    /// Create a category owned by `owner_id`.
    pub async fn create_category(&self, name: &str, is_nav: bool, owner_id: i64) -> Result<Category, Error> {
        validate_name("category name", name)?;
        let name = name.trim().to_string();
        let created_at = timestamp();
        self.conn
            .call(move |conn| -> Result<Category, Error> {
                require_author(conn, owner_id)?;
                conn.execute(
                    "INSERT INTO categories (name, status, is_nav, owner_id, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![name, Status::Normal, is_nav as i32, owner_id, created_at],
                )?;
                Ok(Category { id: conn.last_insert_rowid(), name, status: Status::Normal, is_nav, owner_id, created_at })
            })
            .await
            .map_err(Error::from)
    }

    /// Get a category by id regardless of its status.
    pub async fn get_category(&self, id: i64) -> Result<Option<Category>, Error> {
        self.conn
            .call(move |conn| -> Result<Option<Category>, Error> {
                let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = ?1");
                Ok(conn.query_row(&sql, params![id], category_from_row).optional()?)
            })
            .await
            .map_err(Error::from)
    }

    /// Change a category's status.
    ///
    /// Returns `Error::NotFound` if the category does not exist.
    pub async fn set_category_status(&self, id: i64, status: Status) -> Result<(), Error> {
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let changed = conn.execute("UPDATE categories SET status = ?1 WHERE id = ?2", params![status, id])?;
                if changed == 0 {
                    return Err(Error::NotFound(format!("category {id}")));
                }
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Create a tag owned by `owner_id`.
    pub async fn create_tag(&self, name: &str, owner_id: i64) -> Result<Tag, Error> {
        validate_name("tag name", name)?;
        let name = name.trim().to_string();
        let created_at = timestamp();
        self.conn
            .call(move |conn| -> Result<Tag, Error> {
                require_author(conn, owner_id)?;
                conn.execute(
                    "INSERT INTO tags (name, status, owner_id, created_at) VALUES (?1, ?2, ?3, ?4)",
                    params![name, Status::Normal, owner_id, created_at],
                )?;
                Ok(Tag { id: conn.last_insert_rowid(), name, status: Status::Normal, owner_id, created_at })
            })
            .await
            .map_err(Error::from)
    }

    /// Get a tag by id regardless of its status.
    pub async fn get_tag(&self, id: i64) -> Result<Option<Tag>, Error> {
        self.conn
            .call(move |conn| -> Result<Option<Tag>, Error> {
                let sql = format!("SELECT {TAG_COLUMNS} FROM tags WHERE id = ?1");
                Ok(conn.query_row(&sql, params![id], tag_from_row).optional()?)
            })
            .await
            .map_err(Error::from)
    }
}

pub(crate) fn require_author(conn: &rusqlite::Connection, id: i64) -> Result<(), Error> {
    let exists: bool = conn.query_row("SELECT EXISTS(SELECT 1 FROM authors WHERE id = ?1)", params![id], |row| row.get(0))?;
    if !exists {
        return Err(Error::InvalidInput(format!("unknown author: {id}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_get_category() {
        let db = BlogDb::open_in_memory().await.unwrap();
        let author = db.create_author("devin").await.unwrap();
        let category = db.create_category("Rust", true, author.id).await.unwrap();

        let fetched = db.get_category(category.id).await.unwrap().unwrap();
        assert_eq!(fetched, category);
        assert!(fetched.is_nav);
        assert_eq!(fetched.status, Status::Normal);
    }

    #[tokio::test]
    async fn test_get_missing_category() {
        let db = BlogDb::open_in_memory().await.unwrap();
        assert!(db.get_category(99).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let db = BlogDb::open_in_memory().await.unwrap();
        db.create_author("devin").await.unwrap();
        let result = db.create_author("devin").await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_category_requires_author() {
        let db = BlogDb::open_in_memory().await.unwrap();
        let result = db.create_category("Orphan", false, 7).await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_set_category_status() {
        let db = BlogDb::open_in_memory().await.unwrap();
        let author = db.create_author("devin").await.unwrap();
        let category = db.create_category("Go", false, author.id).await.unwrap();

        db.set_category_status(category.id, Status::Deleted).await.unwrap();
        let fetched = db.get_category(category.id).await.unwrap().unwrap();
        assert_eq!(fetched.status, Status::Deleted);

        let missing = db.set_category_status(999, Status::Deleted).await;
        assert!(matches!(missing, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_tag_name_validation() {
        let db = BlogDb::open_in_memory().await.unwrap();
        let author = db.create_author("devin").await.unwrap();
        assert!(matches!(db.create_tag("   ", author.id).await, Err(Error::InvalidInput(_))));

        let tag = db.create_tag(" async ", author.id).await.unwrap();
        assert_eq!(tag.name, "async");
        assert_eq!(db.get_tag(tag.id).await.unwrap().unwrap(), tag);
    }
}
