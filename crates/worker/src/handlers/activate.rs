//! Activate phase: purge every namespace except the current one.
//!
//! Runs after install and before any interception, so a new worker
//! version never serves from a predecessor's cache.

use serde::{Deserialize, Serialize};

use stratus_core::{CacheDb, Error};

/// Summary of a completed activate phase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivateReport {
    /// Names of the stale namespaces that were deleted.
    pub removed: Vec<String>,
}

/// Run the activate phase.
///
/// Enumerates all namespaces in the store and deletes each one whose name
/// differs from `cache_name`, entries included.
pub async fn run_activate(db: &CacheDb, cache_name: &str) -> Result<ActivateReport, Error> {
    let mut removed = Vec::new();

    for name in db.namespace_names().await? {
        if name == cache_name {
            continue;
        }
        if db.delete_namespace(&name).await? {
            tracing::info!("removed stale cache namespace {name}");
            removed.push(name);
        }
    }

    Ok(ActivateReport { removed })
}
