//! stratus worker entry point.
//!
//! Boots the offline cache worker against the configured store and asset
//! manifest: installs the core bundle, purges stale cache versions, and
//! leaves the namespace primed for interception. Logging goes to stderr.

use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use stratus_client::{FetchClient, FetchConfig};
use stratus_core::{AppConfig, AssetManifest, CacheDb};
use stratus_worker::WorkerHost;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = AppConfig::load()?;
    let manifest = AssetManifest::from_toml_file(&config.manifest_path)?;

    tracing::info!(
        cache_name = %manifest.cache_name,
        store = %config.db_path.display(),
        "starting stratus worker"
    );

    let db = CacheDb::open(&config.db_path).await?;
    let network = Arc::new(FetchClient::new(FetchConfig::from(&config))?);

    let host = WorkerHost::new(db, network, manifest);
    let report = host.startup().await?;

    tracing::info!(
        core = report.install.core_cached,
        external = report.install.external_cached,
        skipped = report.install.external_skipped,
        removed = report.activate.removed.len(),
        entries = host.cached_entry_count().await?,
        "cache primed"
    );

    Ok(())
}
