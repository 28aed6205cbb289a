//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (MYSITE_*)
//! 2. TOML config file (if MYSITE_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::query::ListingSettings;
use crate::visit::{CacheFailurePolicy, VisitSettings};

mod validation;

pub use validation::ConfigError;

/// Which cache holds visit deduplication keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheBackend {
    /// `visit_keys` table inside the blog database. Shared by every process
    /// that opens the same database file.
    Sqlite,
    /// In-process map. Deduplicates per process only.
    Memory,
}

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (MYSITE_*)
/// 2. TOML config file (if MYSITE_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the SQLite database.
    ///
    /// Set via MYSITE_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Page-view dedup window in seconds.
    ///
    /// Set via MYSITE_PV_TTL_SECS environment variable.
    #[serde(default = "default_pv_ttl_secs")]
    pub pv_ttl_secs: u64,

    /// Unique-view dedup window in seconds.
    ///
    /// Set via MYSITE_UV_TTL_SECS environment variable.
    #[serde(default = "default_uv_ttl_secs")]
    pub uv_ttl_secs: u64,

    /// Visit cache backend: "sqlite" (default) or "memory".
    ///
    /// Set via MYSITE_CACHE_BACKEND environment variable.
    #[serde(default = "default_cache_backend")]
    pub cache_backend: CacheBackend,

    /// What to do when the visit cache cannot be read:
    /// "fail_open" (count the visit) or "fail_closed" (skip it).
    ///
    /// Set via MYSITE_CACHE_FAILURE_POLICY environment variable.
    #[serde(default)]
    pub cache_failure_policy: CacheFailurePolicy,

    /// Seconds between sweeps of expired visit keys.
    ///
    /// Set via MYSITE_PURGE_INTERVAL_SECS environment variable.
    #[serde(default = "default_purge_interval_secs")]
    pub purge_interval_secs: u64,

    /// Number of posts in the "latest" sidebar.
    #[serde(default = "default_sidebar_limit")]
    pub latest_limit: usize,

    /// Number of posts in the "hot" sidebar.
    #[serde(default = "default_sidebar_limit")]
    pub hot_limit: usize,

    /// Number of comments in the "recent comments" sidebar.
    #[serde(default = "default_sidebar_limit")]
    pub recent_comments_limit: usize,

    /// Posts per list page.
    ///
    /// Set via MYSITE_PAGE_SIZE environment variable.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./mysite.sqlite")
}

fn default_pv_ttl_secs() -> u64 {
    60
}

fn default_uv_ttl_secs() -> u64 {
    24 * 60 * 60
}

fn default_purge_interval_secs() -> u64 {
    10 * 60
}

fn default_cache_backend() -> CacheBackend {
    CacheBackend::Sqlite
}

fn default_sidebar_limit() -> usize {
    5
}

fn default_page_size() -> usize {
    20
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            pv_ttl_secs: default_pv_ttl_secs(),
            uv_ttl_secs: default_uv_ttl_secs(),
            cache_backend: default_cache_backend(),
            cache_failure_policy: CacheFailurePolicy::default(),
            purge_interval_secs: default_purge_interval_secs(),
            latest_limit: default_sidebar_limit(),
            hot_limit: default_sidebar_limit(),
            recent_comments_limit: default_sidebar_limit(),
            page_size: default_page_size(),
        }
    }
}

impl AppConfig {
    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `MYSITE_`
    /// 2. TOML file from `MYSITE_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("MYSITE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("MYSITE_")
                .ignore(&["config_file"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    pub fn pv_ttl(&self) -> Duration {
        Duration::from_secs(self.pv_ttl_secs)
    }

    pub fn uv_ttl(&self) -> Duration {
        Duration::from_secs(self.uv_ttl_secs)
    }

    pub fn purge_interval(&self) -> Duration {
        Duration::from_secs(self.purge_interval_secs)
    }

    /// Settings handed to the visit tracker at startup.
    pub fn visit_settings(&self) -> VisitSettings {
        VisitSettings { pv_ttl: self.pv_ttl(), uv_ttl: self.uv_ttl(), on_cache_error: self.cache_failure_policy }
    }

    /// Settings used when building the shared page context.
    pub fn listing_settings(&self) -> ListingSettings {
        ListingSettings {
            latest_limit: self.latest_limit,
            hot_limit: self.hot_limit,
            recent_comments_limit: self.recent_comments_limit,
            page_size: self.page_size,
        }
    }
}
