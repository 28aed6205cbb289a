//! mysite server entry point.
//!
//! This is the main binary that boots the MCP server on stdio transport.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use mysite_core::config::CacheBackend;
use mysite_core::visit::{MemoryVisitCache, SqliteVisitCache, VisitCache, spawn_purge_task};
use mysite_core::{AppConfig, BlogDb, VisitTracker};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

mod handler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    tracing::info!(
        db_path = %config.db_path.display(),
        cache_backend = ?config.cache_backend,
        "Starting mysite server on stdio transport"
    );

    let db = BlogDb::open(&config.db_path).await?;
    let cache: Arc<dyn VisitCache> = match config.cache_backend {
        CacheBackend::Sqlite => Arc::new(SqliteVisitCache::new(db.clone())),
        CacheBackend::Memory => Arc::new(MemoryVisitCache::new()),
    };
    let sweeper = spawn_purge_task(cache.clone(), config.purge_interval());
    let tracker = VisitTracker::new(cache, Arc::new(db.clone()), config.visit_settings());

    let handler = handler::BlogServer::new(db, tracker, config.listing_settings());
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;
    sweeper.abort();

    Ok(())
}
