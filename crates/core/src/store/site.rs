//! Friend links and sidebar blocks.

use super::connection::BlogDb;
use super::taxonomy::require_author;
use super::{Status, timestamp};
use crate::Error;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;

/// An outbound link shown on the links page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct Link {
    pub id: i64,
    pub title: String,
    pub href: String,
    pub status: Status,
    /// 1..=5, higher sorts first.
    pub weight: i64,
    pub owner_id: i64,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct NewLink {
    pub title: String,
    pub href: String,
    #[serde(default = "default_weight")]
    pub weight: i64,
    pub owner_id: i64,
}

fn default_weight() -> i64 {
    1
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SidebarStatus {
    Hide = 0,
    Show = 1,
}

/// What a sidebar block displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SidebarKind {
    /// Literal HTML from `content`.
    Html = 1,
    Latest = 2,
    Hot = 3,
    RecentComments = 4,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct SideBar {
    pub id: i64,
    pub title: String,
    pub kind: SidebarKind,
    pub content: String,
    pub status: SidebarStatus,
    pub owner_id: i64,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct NewSidebar {
    pub title: String,
    pub kind: SidebarKind,
    #[serde(default)]
    pub content: String,
    pub owner_id: i64,
}

impl BlogDb {
    /// Create a link.
    ///
    /// The href must be an absolute http(s) URL and the weight within 1..=5.
    pub async fn create_link(&self, new: NewLink) -> Result<Link, Error> {
        if new.title.trim().is_empty() {
            return Err(Error::InvalidInput("link title cannot be empty".into()));
        }
        if !(new.href.starts_with("http://") || new.href.starts_with("https://")) {
            return Err(Error::InvalidInput(format!("link href must be an http(s) URL: {}", new.href)));
        }
        if !(1..=5).contains(&new.weight) {
            return Err(Error::InvalidInput("link weight must be between 1 and 5".into()));
        }
        let created_at = timestamp();

        self.conn
            .call(move |conn| -> Result<Link, Error> {
                require_author(conn, new.owner_id)?;
                conn.execute(
                    "INSERT INTO links (title, href, status, weight, owner_id, created_at)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![new.title, new.href, Status::Normal, new.weight, new.owner_id, created_at],
                )?;
                Ok(Link {
                    id: conn.last_insert_rowid(),
                    title: new.title,
                    href: new.href,
                    status: Status::Normal,
                    weight: new.weight,
                    owner_id: new.owner_id,
                    created_at,
                })
            })
            .await
            .map_err(Error::from)
    }

    /// Normal links, heaviest first.
    pub async fn list_links(&self) -> Result<Vec<Link>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<Link>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT id, title, href, status, weight, owner_id, created_at
                    FROM links WHERE status = ?1 ORDER BY weight DESC, id DESC",
                )?;
                let links = stmt
                    .query_map(params![Status::Normal], |row| {
                        Ok(Link {
                            id: row.get(0)?,
                            title: row.get(1)?,
                            href: row.get(2)?,
                            status: row.get(3)?,
                            weight: row.get(4)?,
                            owner_id: row.get(5)?,
                            created_at: row.get(6)?,
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(links)
            })
            .await
            .map_err(Error::from)
    }

    /// Create a visible sidebar block.
    pub async fn create_sidebar(&self, new: NewSidebar) -> Result<SideBar, Error> {
        if new.title.trim().is_empty() {
            return Err(Error::InvalidInput("sidebar title cannot be empty".into()));
        }
        if new.kind == SidebarKind::Html && new.content.trim().is_empty() {
            return Err(Error::InvalidInput("html sidebar requires content".into()));
        }
        let created_at = timestamp();

        self.conn
            .call(move |conn| -> Result<SideBar, Error> {
                require_author(conn, new.owner_id)?;
                conn.execute(
                    "INSERT INTO sidebars (title, display_type, content, status, owner_id, created_at)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![new.title, new.kind, new.content, SidebarStatus::Show, new.owner_id, created_at],
                )?;
                Ok(SideBar {
                    id: conn.last_insert_rowid(),
                    title: new.title,
                    kind: new.kind,
                    content: new.content,
                    status: SidebarStatus::Show,
                    owner_id: new.owner_id,
                    created_at,
                })
            })
            .await
            .map_err(Error::from)
    }

    /// Visible sidebar blocks in creation order.
    pub async fn list_sidebars(&self) -> Result<Vec<SideBar>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<SideBar>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT id, title, display_type, content, status, owner_id, created_at
                    FROM sidebars WHERE status = ?1 ORDER BY id",
                )?;
                let sidebars = stmt
                    .query_map(params![SidebarStatus::Show], |row| {
                        Ok(SideBar {
                            id: row.get(0)?,
                            title: row.get(1)?,
                            kind: row.get(2)?,
                            content: row.get(3)?,
                            status: row.get(4)?,
                            owner_id: row.get(5)?,
                            created_at: row.get(6)?,
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(sidebars)
            })
            .await
            .map_err(Error::from)
    }

    /// Hide or show a sidebar block.
    pub async fn set_sidebar_status(&self, id: i64, status: SidebarStatus) -> Result<(), Error> {
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let changed = conn.execute("UPDATE sidebars SET status = ?1 WHERE id = ?2", params![status, id])?;
                if changed == 0 {
                    return Err(Error::NotFound(format!("sidebar {id}")));
                }
                Ok(())
            })
            .await
            .map_err(Error::from)
    }
}
