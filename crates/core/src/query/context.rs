//! Context shared by every page.
//!
//! Each page handler builds its own body and passes it through
//! [`build_page_context`], which adds the navigation categories and the
//! resolved sidebars.

use serde::{Deserialize, Serialize};

use super::ListingSettings;
use super::listing::{Navs, PostRef, PostSummary};
use crate::Error;
use crate::store::{BlogDb, Category, Comment, SideBar, SidebarKind};

/// What a sidebar displays, resolved from its kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum SidebarBody {
    Html(String),
    Latest(Vec<PostSummary>),
    Hot(Vec<PostRef>),
    RecentComments(Vec<Comment>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ResolvedSidebar {
    pub id: i64,
    pub title: String,
    pub body: SidebarBody,
}

/// A page body merged with the common context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct PageContext<T> {
    pub sidebars: Vec<ResolvedSidebar>,
    pub navs: Vec<Category>,
    pub categories: Vec<Category>,
    #[serde(flatten)]
    pub body: T,
}

async fn resolve_sidebar(db: &BlogDb, settings: &ListingSettings, sidebar: SideBar) -> Result<ResolvedSidebar, Error> {
    let body = match sidebar.kind {
        SidebarKind::Html => SidebarBody::Html(sidebar.content),
        SidebarKind::Latest => SidebarBody::Latest(db.latest_posts(Some(settings.latest_limit)).await?),
        SidebarKind::Hot => SidebarBody::Hot(db.hot_posts(settings.hot_limit).await?),
        SidebarKind::RecentComments => {
            SidebarBody::RecentComments(db.recent_comments(settings.recent_comments_limit).await?)
        }
    };
    Ok(ResolvedSidebar { id: sidebar.id, title: sidebar.title, body })
}

/// Merge `body` with the sidebars and navigation shared by all pages.
pub async fn build_page_context<T>(db: &BlogDb, settings: &ListingSettings, body: T) -> Result<PageContext<T>, Error> {
    let mut sidebars = Vec::new();
    for sidebar in db.list_sidebars().await? {
        sidebars.push(resolve_sidebar(db, settings, sidebar).await?);
    }
    let Navs { navs, categories } = db.nav_categories().await?;

    Ok(PageContext { sidebars, navs, categories, body })
}
