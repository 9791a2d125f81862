//! Application configuration with layered loading.
//!
//! Two kinds of configuration live here:
//!
//! - [`AppConfig`]: ambient knobs (store path, user agent, fetch limits),
//!   loaded via figment from defaults, an optional TOML file, and
//!   `STRATUS_*` environment variables.
//! - [`AssetManifest`]: the worker's own inputs (cache name, origin, asset
//!   lists, fallbacks). An immutable value constructed once and passed into
//!   the worker at initialization; it never changes for the lifetime of a
//!   worker version.

use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Ambient configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (STRATUS_*)
/// 2. TOML config file (if STRATUS_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the SQLite cache store.
    ///
    /// Set via STRATUS_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Path to the asset manifest TOML file.
    ///
    /// Set via STRATUS_MANIFEST_PATH environment variable.
    #[serde(default = "default_manifest_path")]
    pub manifest_path: PathBuf,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via STRATUS_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum bytes to fetch per request.
    ///
    /// Set via STRATUS_MAX_BYTES environment variable.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via STRATUS_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum number of redirects to follow.
    ///
    /// Set via STRATUS_MAX_REDIRECTS environment variable.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./stratus-cache.sqlite")
}

fn default_manifest_path() -> PathBuf {
    PathBuf::from("./stratus.toml")
}

fn default_user_agent() -> String {
    "stratus/0.1".into()
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_max_redirects() -> usize {
    5
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            manifest_path: default_manifest_path(),
            user_agent: default_user_agent(),
            max_bytes: default_max_bytes(),
            timeout_ms: default_timeout_ms(),
            max_redirects: default_max_redirects(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `STRATUS_`
    /// 2. TOML file from `STRATUS_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a source cannot be read, a value cannot be
    /// parsed, or validation fails after loading.
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("STRATUS_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("STRATUS_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}

/// The worker's asset manifest.
///
/// Describes one version of the offline bundle: which namespace it lives
/// in, which origin the app is served from, which assets must be present
/// after install, and which documents answer when the network is gone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetManifest {
    /// Versioned namespace name, e.g. "appquiz-cache-v1".
    ///
    /// Changing this is how a new worker version ships: the old namespace
    /// is deleted wholesale on the next activation.
    pub cache_name: String,

    /// Origin the app is served from, e.g. "https://quiz.example.com".
    pub origin: String,

    /// Same-origin paths that must all be cached for install to succeed.
    pub core_assets: Vec<String>,

    /// Absolute cross-origin URLs cached opportunistically at install.
    #[serde(default)]
    pub external_assets: Vec<String>,

    /// Path served to offline navigation requests.
    #[serde(default = "default_navigation_fallback")]
    pub navigation_fallback: String,

    /// Path served to offline subresource requests.
    #[serde(default = "default_resource_fallback")]
    pub resource_fallback: String,
}

fn default_navigation_fallback() -> String {
    "./index.html".into()
}

fn default_resource_fallback() -> String {
    "./favicon.ico".into()
}

impl AssetManifest {
    /// Load a manifest from a TOML file and validate it.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let manifest: Self = Figment::from(Toml::file(path.as_ref()))
            .extract()
            .map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        manifest.validate()?;

        Ok(manifest)
    }

    /// Resolve a relative asset path against the manifest origin.
    pub fn resolve(&self, path: &str) -> Result<url::Url, crate::Error> {
        let base = url::Url::parse(&self.origin)
            .map_err(|e| crate::Error::InvalidUrl(format!("{}: {e}", self.origin)))?;
        let mut resolved = base
            .join(path)
            .map_err(|e| crate::Error::InvalidUrl(format!("{path}: {e}")))?;
        resolved.set_fragment(None);
        Ok(resolved)
    }
}
