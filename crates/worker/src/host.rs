//! Worker host runtime.
//!
//! The host owns one worker's lifecycle: it registers the phase entry
//! points in the dispatch table, drives install and activate to
//! completion in order, claims the open clients, and from then on routes
//! requests from controlled clients through the fetch handler. Install
//! writes happen-before activate's cleanup happens-before any
//! interception.

use std::sync::Arc;
use std::sync::RwLock;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::clients::{ClientId, ClientRegistry};
use crate::events::{EventKind, FetchHandler, LifecycleTable, PhaseReport};
use crate::handlers::activate::{ActivateReport, run_activate};
use crate::handlers::fetch_event::{Decision, run_fetch};
use crate::handlers::install::{InstallReport, run_install};
use crate::lifecycle::{Lifecycle, WorkerState};
use stratus_client::Network;
use stratus_core::{AssetManifest, CacheDb, Error, Request};

/// Summary of a completed startup (install + activate).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartupReport {
    pub install: InstallReport,
    pub activate: ActivateReport,
}

/// Fetch entry point bound to one worker's store, network, and manifest.
struct WorkerFetchHandler {
    db: CacheDb,
    network: Arc<dyn Network>,
    manifest: AssetManifest,
}

#[async_trait]
impl FetchHandler for WorkerFetchHandler {
    async fn handle(&self, request: &Request) -> Result<Decision, Error> {
        run_fetch(&self.db, &self.network, &self.manifest, request).await
    }
}

/// The host runtime for one worker version.
pub struct WorkerHost {
    db: CacheDb,
    manifest: AssetManifest,
    lifecycle: RwLock<Lifecycle>,
    table: LifecycleTable,
    fetch_handler: Box<dyn FetchHandler>,
    clients: ClientRegistry,
}

impl WorkerHost {
    /// Build a host for the given store, network, and manifest.
    ///
    /// The manifest is taken as an immutable value: it is cloned into
    /// every entry point here and never consulted anywhere else again.
    pub fn new(db: CacheDb, network: Arc<dyn Network>, manifest: AssetManifest) -> Self {
        let mut table = LifecycleTable::new();

        {
            let (db, network, manifest) = (db.clone(), Arc::clone(&network), manifest.clone());
            table.register(
                EventKind::Install,
                Box::new(move || {
                    let (db, network, manifest) = (db.clone(), Arc::clone(&network), manifest.clone());
                    Box::pin(async move { run_install(&db, &network, &manifest).await.map(PhaseReport::Install) })
                }),
            );
        }

        {
            let (db, cache_name) = (db.clone(), manifest.cache_name.clone());
            table.register(
                EventKind::Activate,
                Box::new(move || {
                    let (db, cache_name) = (db.clone(), cache_name.clone());
                    Box::pin(async move { run_activate(&db, &cache_name).await.map(PhaseReport::Activate) })
                }),
            );
        }

        let fetch_handler = Box::new(WorkerFetchHandler {
            db: db.clone(),
            network,
            manifest: manifest.clone(),
        });

        Self {
            db,
            manifest,
            lifecycle: RwLock::new(Lifecycle::new()),
            table,
            fetch_handler,
            clients: ClientRegistry::new(),
        }
    }

    /// Run the worker up to the active state.
    ///
    /// Install runs to completion first; a failed install leaves the
    /// worker redundant and the error propagates so the embedder can
    /// retry on the next load. Skip-waiting then collapses the waiting
    /// period, activate purges stale namespaces, and the open clients
    /// are claimed before this returns.
    pub async fn startup(&self) -> Result<StartupReport, Error> {
        self.transition(WorkerState::Installing)?;

        let install = match self.table.dispatch(EventKind::Install).await {
            Ok(PhaseReport::Install(report)) => report,
            Ok(_) => InstallReport::default(),
            Err(e) => {
                let _ = self.transition(WorkerState::Redundant);
                return Err(e);
            }
        };

        self.transition(WorkerState::Installed)?;
        self.lifecycle.write().unwrap_or_else(|e| e.into_inner()).skip_waiting()?;

        let activate = match self.table.dispatch(EventKind::Activate).await {
            Ok(PhaseReport::Activate(report)) => report,
            Ok(_) => ActivateReport::default(),
            Err(e) => {
                let _ = self.transition(WorkerState::Redundant);
                return Err(e);
            }
        };

        self.transition(WorkerState::Activated)?;
        self.clients.claim();

        tracing::info!(
            cache_name = %self.manifest.cache_name,
            controlled = self.clients.controlled_count(),
            "worker activated"
        );

        Ok(StartupReport { install, activate })
    }

    /// Route one request from a client.
    ///
    /// Requests pass through untouched unless the worker is activated and
    /// the client is controlled.
    pub async fn handle_request(&self, client: ClientId, request: &Request) -> Result<Decision, Error> {
        if !self.state().can_intercept() || !self.clients.is_controlled(client) {
            return Ok(Decision::PassThrough);
        }

        self.fetch_handler.handle(request).await
    }

    /// Register an open client page with this worker.
    pub fn register_client(&self) -> ClientId {
        self.clients.register()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> WorkerState {
        self.lifecycle.read().unwrap_or_else(|e| e.into_inner()).state()
    }

    /// The manifest this worker serves.
    pub fn manifest(&self) -> &AssetManifest {
        &self.manifest
    }

    /// Entries currently cached in this worker's namespace.
    pub async fn cached_entry_count(&self) -> Result<u64, Error> {
        self.db.entry_count(&self.manifest.cache_name).await
    }

    fn transition(&self, to: WorkerState) -> Result<(), Error> {
        self.lifecycle.write().unwrap_or_else(|e| e.into_inner()).transition(to)
    }
}
