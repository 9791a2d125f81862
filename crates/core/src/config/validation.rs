//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` and
//! `AssetManifest` values after they have been loaded from environment,
//! files, or defaults.

use crate::config::{AppConfig, AssetManifest};
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
    /// - `max_bytes` is 0 or exceeds 50MB
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `user_agent` is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_bytes == 0 {
            return Err(ConfigError::Invalid { field: "max_bytes".into(), reason: "must be greater than 0".into() });
        }
        if self.max_bytes > 50 * 1024 * 1024 {
            return Err(ConfigError::Invalid { field: "max_bytes".into(), reason: "must not exceed 50MB".into() });
        }

        if self.timeout_ms < 100 {
            return Err(ConfigError::Invalid { field: "timeout_ms".into(), reason: "must be at least 100ms".into() });
        }
        if self.timeout_ms > 300_000 {
            return Err(ConfigError::Invalid {
                field: "timeout_ms".into(),
                reason: "must not exceed 5 minutes (300000ms)".into(),
            });
        }

        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }

        Ok(())
    }
}

impl AssetManifest {
    /// Validate manifest values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `cache_name` is empty
    /// - `origin` is not an absolute http(s) URL
    /// - `core_assets` is empty, or contains an absolute URL
    /// - an external asset is not an absolute http(s) URL
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_name.is_empty() {
            return Err(ConfigError::Invalid { field: "cache_name".into(), reason: "must not be empty".into() });
        }

        match url::Url::parse(&self.origin) {
            Ok(parsed) if parsed.scheme() == "http" || parsed.scheme() == "https" => {}
            Ok(parsed) => {
                return Err(ConfigError::Invalid {
                    field: "origin".into(),
                    reason: format!("unsupported scheme: {}", parsed.scheme()),
                });
            }
            Err(e) => {
                return Err(ConfigError::Invalid { field: "origin".into(), reason: e.to_string() });
            }
        }

        if self.core_assets.is_empty() {
            return Err(ConfigError::Invalid { field: "core_assets".into(), reason: "must not be empty".into() });
        }
        for asset in &self.core_assets {
            if asset.contains("://") {
                return Err(ConfigError::Invalid {
                    field: "core_assets".into(),
                    reason: format!("must be origin-relative paths, got {asset}"),
                });
            }
        }

        for asset in &self.external_assets {
            match url::Url::parse(asset) {
                Ok(parsed) if parsed.scheme() == "http" || parsed.scheme() == "https" => {}
                _ => {
                    return Err(ConfigError::Invalid {
                        field: "external_assets".into(),
                        reason: format!("must be absolute http(s) URLs, got {asset}"),
                    });
                }
            }
        }

        if !self.core_assets.contains(&self.navigation_fallback)
            || !self.core_assets.contains(&self.resource_fallback)
        {
            tracing::warn!(
                navigation_fallback = %self.navigation_fallback,
                resource_fallback = %self.resource_fallback,
                "fallback paths are not listed in core_assets; \
                 offline fallbacks will miss until those URLs are cached"
            );
        }

        Ok(())
    }
}
