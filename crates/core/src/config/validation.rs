//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - either dedup window is 0
    /// - `pv_ttl_secs` exceeds `uv_ttl_secs`
    /// - `purge_interval_secs` is 0
    /// - `page_size` is 0 or exceeds 100
    /// - a sidebar limit is 0
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pv_ttl_secs == 0 {
            return Err(ConfigError::Invalid { field: "pv_ttl_secs".into(), reason: "must be greater than 0".into() });
        }
        if self.uv_ttl_secs == 0 {
            return Err(ConfigError::Invalid { field: "uv_ttl_secs".into(), reason: "must be greater than 0".into() });
        }
        if self.pv_ttl_secs > self.uv_ttl_secs {
            return Err(ConfigError::Invalid {
                field: "pv_ttl_secs".into(),
                reason: "must not exceed uv_ttl_secs".into(),
            });
        }

        if self.purge_interval_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "purge_interval_secs".into(),
                reason: "must be greater than 0".into(),
            });
        }

        if self.page_size == 0 || self.page_size > 100 {
            return Err(ConfigError::Invalid { field: "page_size".into(), reason: "must be between 1 and 100".into() });
        }

        for (field, value) in [
            ("latest_limit", self.latest_limit),
            ("hot_limit", self.hot_limit),
            ("recent_comments_limit", self.recent_comments_limit),
        ] {
            if value == 0 {
                return Err(ConfigError::Invalid { field: field.into(), reason: "must be greater than 0".into() });
            }
        }

        if self.cache_backend == crate::config::CacheBackend::Memory {
            tracing::warn!(
                "visit cache backend is in-process memory; \
                 page views are deduplicated per process only"
            );
        }

        Ok(())
    }
}
