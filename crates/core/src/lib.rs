//! Core types and shared functionality for mysite.
//!
//! This crate provides:
//! - Blog store with SQLite backend
//! - Visit deduplication and page-view/unique-view counting
//! - Read-only listings and shared page context
//! - Admin form configuration
//! - Unified error types
//! - Configuration structures

pub mod admin;
pub mod config;
pub mod error;
pub mod markdown;
pub mod query;
pub mod store;
pub mod visit;

pub use config::AppConfig;
pub use error::Error;
pub use store::BlogDb;
pub use visit::{VisitOutcome, VisitTracker};
