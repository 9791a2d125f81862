//! Fetch interception: cache-first with network fallback.
//!
//! Only GET requests are intercepted. A cache hit is served as-is, never
//! revalidated. On a miss the network answers and a copy of the response
//! is written back in the background, but only for same-origin URLs and
//! listed externals. When the network is unreachable, navigations get the
//! cached root document and subresources the cached fallback icon.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use stratus_client::{Network, canonicalize, same_origin, same_resource};
use stratus_core::{AssetManifest, CacheDb, Error, Method, Request, RequestMode, ResponseSnapshot};

/// Where a served response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServeSource {
    /// Answered from the cache namespace.
    Cache,
    /// Answered by the network.
    Network,
    /// Network unreachable; answered by a cached fallback entry.
    Fallback,
}

/// Outcome of intercepting one request.
#[derive(Debug)]
pub enum Decision {
    /// Not intercepted; the request proceeds as if no worker existed.
    PassThrough,
    /// Intercepted and answered.
    Served {
        source: ServeSource,
        response: ResponseSnapshot,
        /// Completion handle of the background cache write, when one was
        /// started. The serve path never awaits it; a dropped write is
        /// logged and forgotten.
        write_back: Option<tokio::task::JoinHandle<()>>,
    },
}

impl Decision {
    /// The served snapshot, if the request was intercepted.
    pub fn response(&self) -> Option<&ResponseSnapshot> {
        match self {
            Decision::Served { response, .. } => Some(response),
            Decision::PassThrough => None,
        }
    }
}

/// Intercept one request against the manifest's namespace.
///
/// # Errors
///
/// Returns `Error::Unreachable` when the network fails and no fallback
/// entry is cached; the caller surfaces that as a failed resource load.
pub async fn run_fetch(
    db: &CacheDb, network: &Arc<dyn Network>, manifest: &AssetManifest, request: &Request,
) -> Result<Decision, Error> {
    if request.method != Method::Get {
        return Ok(Decision::PassThrough);
    }

    let url = canonicalize(&request.url).map_err(|e| Error::InvalidUrl(e.to_string()))?;
    let request = Request { method: request.method, url: url.into(), mode: request.mode };

    if let Some(snapshot) = db.match_entry(&manifest.cache_name, &request).await? {
        tracing::debug!("cache hit for {}", request.url);
        return Ok(Decision::Served { source: ServeSource::Cache, response: snapshot, write_back: None });
    }

    match network.fetch(&request).await {
        Ok(snapshot) => {
            let write_back = should_store(manifest, &request.url).then(|| {
                let db = db.clone();
                let cache_name = manifest.cache_name.clone();
                let request = request.clone();
                let copy = snapshot.clone();
                tokio::spawn(async move {
                    if let Err(e) = db.put_entry(&cache_name, &request, &copy).await {
                        tracing::debug!("dropped cache write for {}: {}", request.url, e);
                    }
                })
            });

            Ok(Decision::Served { source: ServeSource::Network, response: snapshot, write_back })
        }
        Err(fetch_err) => serve_fallback(db, manifest, &request, fetch_err).await,
    }
}

/// Answer an unreachable-network miss from the cached fallback entries.
async fn serve_fallback(
    db: &CacheDb, manifest: &AssetManifest, request: &Request, fetch_err: Error,
) -> Result<Decision, Error> {
    let fallback_path = match request.mode {
        RequestMode::Navigation => &manifest.navigation_fallback,
        RequestMode::Resource => &manifest.resource_fallback,
    };
    let fallback_url = manifest.resolve(fallback_path)?;

    match db.match_url(&manifest.cache_name, Method::Get, fallback_url.as_str()).await? {
        Some(snapshot) => {
            tracing::debug!("serving {} for unreachable {}", fallback_url, request.url);
            Ok(Decision::Served { source: ServeSource::Fallback, response: snapshot, write_back: None })
        }
        None => Err(Error::Unreachable(format!("{}: {fetch_err}", request.url))),
    }
}

/// Write-back filter: only same-origin responses and listed externals are
/// persisted.
fn should_store(manifest: &AssetManifest, url: &str) -> bool {
    same_origin(url, &manifest.origin)
        || manifest.external_assets.iter().any(|listed| same_resource(listed, url))
}
