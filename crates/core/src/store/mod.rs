//! SQLite-backed store for blog content.
//!
//! This module provides persistent storage for posts, taxonomy, site
//! configuration and comments using SQLite with async access via
//! tokio-rusqlite. It supports:
//!
//! - Automatic schema migrations
//! - WAL mode for concurrent access
//! - Targeted counter updates that never rewrite whole rows

pub mod comments;
pub mod connection;
pub mod migrations;
pub mod posts;
pub mod site;
pub mod taxonomy;

use serde::{Deserialize, Serialize};
use tokio_rusqlite::rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use tokio_rusqlite::rusqlite;

pub use crate::Error;

pub use comments::{Comment, CommentNode, NewComment};
pub use connection::BlogDb;
pub use posts::{NewPost, Post, PostStatus, PostUpdate};
pub use site::{Link, NewLink, NewSidebar, SideBar, SidebarKind, SidebarStatus};
pub use taxonomy::{Author, Category, Tag};

/// Lifecycle status shared by categories, tags, links and comments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Deleted = 0,
    Normal = 1,
}

/// Maps a status-like enum to and from its integer column.
macro_rules! int_column {
    ($ty:ty { $($value:literal => $variant:ident),+ $(,)? }) => {
        impl FromSql for $ty {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                match value.as_i64()? {
                    $($value => Ok(<$ty>::$variant),)+
                    other => Err(FromSqlError::OutOfRange(other)),
                }
            }
        }

        impl ToSql for $ty {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(*self as i64))
            }
        }
    };
}

int_column!(Status { 0 => Deleted, 1 => Normal });
int_column!(PostStatus { 0 => Deleted, 1 => Normal, 2 => Draft });
int_column!(SidebarStatus { 0 => Hide, 1 => Show });
int_column!(SidebarKind { 1 => Html, 2 => Latest, 3 => Hot, 4 => RecentComments });

/// Current time as stored in `created_at` columns.
pub(crate) fn timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}
