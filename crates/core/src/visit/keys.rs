//! Visit dedup cache key generation.
//!
//! Logical keys follow `pv:{visitor}:{path}` and
//! `uv:{visitor}:{date}:{path}`. They are hashed so that arbitrarily long
//! paths and visitor ids produce fixed-size cache keys.

use chrono::NaiveDate;
use sha2::{Digest, Sha256};

fn hash_parts(parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            hasher.update(b"\n");
        }
        hasher.update(part.as_bytes());
    }
    hex::encode(hasher.finalize())
}

/// Key for the short page-view window of `visitor_id` on `path`.
pub fn page_view_key(visitor_id: &str, path: &str) -> String {
    hash_parts(&["pv", visitor_id, path])
}

/// Key for the daily unique-view window of `visitor_id` on `path`.
pub fn unique_view_key(visitor_id: &str, date: NaiveDate, path: &str) -> String {
    let date = date.format("%Y-%m-%d").to_string();
    hash_parts(&["uv", visitor_id, &date, path])
}
