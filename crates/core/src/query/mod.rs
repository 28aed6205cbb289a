//! Content query layer.
//!
//! Read-only, filterable listings over the blog store, pagination, and the
//! context shared by every rendered page. Nothing here writes.

pub mod context;
pub mod listing;
pub mod pagination;

pub use context::{PageContext, ResolvedSidebar, SidebarBody, build_page_context};
pub use listing::{Navs, PostRef, PostSummary};
pub use pagination::Page;

/// Sizes used by listings and sidebars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingSettings {
    pub latest_limit: usize,
    pub hot_limit: usize,
    pub recent_comments_limit: usize,
    pub page_size: usize,
}

impl Default for ListingSettings {
    fn default() -> Self {
        Self { latest_limit: 5, hot_limit: 5, recent_comments_limit: 5, page_size: 20 }
    }
}
