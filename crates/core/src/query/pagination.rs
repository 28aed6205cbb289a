//! Fixed-size pages over an already filtered listing.

use serde::{Deserialize, Serialize};

/// One page of a listing. Pages are numbered from 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub per_page: usize,
    pub total: usize,
    pub num_pages: usize,
    pub has_previous: bool,
    pub has_next: bool,
}

impl<T> Page<T> {
    /// Cut page `page` out of `items`.
    ///
    /// Page 0 is read as page 1. A page past the end is empty but still
    /// reports the real totals.
    pub fn paginate(items: Vec<T>, page: usize, per_page: usize) -> Self {
        let per_page = per_page.max(1);
        let page = page.max(1);
        let total = items.len();
        let num_pages = total.div_ceil(per_page).max(1);
        let start = (page - 1).saturating_mul(per_page);

        let items: Vec<T> = items.into_iter().skip(start).take(per_page).collect();

        Self { items, page, per_page, total, num_pages, has_previous: page > 1, has_next: page < num_pages }
    }
}
