//! Install phase: populate the cache namespace with the asset bundle.
//!
//! Core assets are all-or-nothing: every one must fetch with an ok status
//! and the whole set is stored in a single transaction, so a failed
//! install leaves no partial namespace behind. External assets are
//! best-effort; a miss is logged and forgotten.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use stratus_client::Network;
use stratus_core::{AssetManifest, CacheDb, Error, Request, ResponseSnapshot};

/// Concurrent install fetches, core and external alike.
const MAX_INSTALL_CONCURRENCY: usize = 4;

/// Summary of a completed install phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallReport {
    /// Core assets stored.
    pub core_cached: usize,
    /// External assets stored.
    pub external_cached: usize,
    /// External assets that failed to fetch or store and were skipped.
    pub external_skipped: usize,
}

/// Run the install phase against the manifest's namespace.
///
/// # Errors
///
/// Returns `Error::InstallFailed` if any core asset cannot be fetched or
/// comes back with a non-ok status; in that case nothing has been stored
/// and the caller retries the whole install on the next load.
pub async fn run_install(
    db: &CacheDb, network: &Arc<dyn Network>, manifest: &AssetManifest,
) -> Result<InstallReport, Error> {
    db.open_namespace(&manifest.cache_name).await?;

    let core = fetch_core_assets(network, manifest).await?;
    let core_cached = core.len();
    db.put_entries(&manifest.cache_name, &core).await?;

    let (external_cached, external_skipped) = cache_external_assets(db, network, manifest).await;

    tracing::info!(
        core = core_cached,
        external = external_cached,
        skipped = external_skipped,
        "install complete for {}",
        manifest.cache_name
    );

    Ok(InstallReport { core_cached, external_cached, external_skipped })
}

/// Fetch every core asset concurrently and join before storing.
///
/// The first failure aborts the batch; in-flight fetches are dropped with
/// the JoinSet.
async fn fetch_core_assets(
    network: &Arc<dyn Network>, manifest: &AssetManifest,
) -> Result<Vec<(Request, ResponseSnapshot)>, Error> {
    let semaphore = Arc::new(Semaphore::new(MAX_INSTALL_CONCURRENCY));
    let mut join_set = JoinSet::new();

    for (position, path) in manifest.core_assets.iter().enumerate() {
        let url = manifest.resolve(path)?;
        let request = Request::get(url.as_str());
        let network = Arc::clone(network);
        let permit = semaphore.clone().acquire_owned().await.unwrap();

        join_set.spawn(async move {
            // NOTE: Hold permit for task duration to enforce concurrency limit
            let _permit = permit;
            let result = network.fetch(&request).await;
            (position, request, result)
        });
    }

    let mut fetched: Vec<Option<(Request, ResponseSnapshot)>> = vec![None; manifest.core_assets.len()];

    while let Some(joined) = join_set.join_next().await {
        let (position, request, result) = joined.map_err(|e| Error::InstallFailed(e.to_string()))?;

        match result {
            Ok(snapshot) if snapshot.ok() => fetched[position] = Some((request, snapshot)),
            Ok(snapshot) => {
                return Err(Error::InstallFailed(format!(
                    "core asset {} returned status {}",
                    request.url, snapshot.status
                )));
            }
            Err(e) => return Err(Error::InstallFailed(format!("core asset {}: {e}", request.url))),
        }
    }

    Ok(fetched.into_iter().flatten().collect())
}

/// Cache the external assets, tolerating every individual failure.
async fn cache_external_assets(
    db: &CacheDb, network: &Arc<dyn Network>, manifest: &AssetManifest,
) -> (usize, usize) {
    let semaphore = Arc::new(Semaphore::new(MAX_INSTALL_CONCURRENCY));
    let mut join_set = JoinSet::new();

    for url in manifest.external_assets.clone() {
        let network = Arc::clone(network);
        let permit = semaphore.clone().acquire_owned().await.unwrap();

        join_set.spawn(async move {
            let _permit = permit;
            let request = Request::get(url);
            let result = network.fetch(&request).await;
            (request, result)
        });
    }

    let mut cached = 0;
    let mut skipped = 0;

    while let Some(joined) = join_set.join_next().await {
        let Ok((request, result)) = joined else {
            skipped += 1;
            continue;
        };

        let stored = match result {
            Ok(snapshot) => db.put_entry(&manifest.cache_name, &request, &snapshot).await,
            Err(e) => Err(e),
        };

        match stored {
            Ok(()) => cached += 1,
            Err(e) => {
                tracing::debug!("skipping external asset {}: {}", request.url, e);
                skipped += 1;
            }
        }
    }

    (cached, skipped)
}
