//! Event dispatch table.
//!
//! Lifecycle phases are explicit async entry points registered against a
//! table keyed by event kind. Dispatching an event returns the entry
//! point's deferred completion signal; the host awaits it before it
//! considers the phase finished, which is what keeps the worker alive
//! until the phase's work is done. Fetch has its own typed entry point
//! because it carries a request and must produce a decision.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use async_trait::async_trait;

use crate::handlers::activate::ActivateReport;
use crate::handlers::fetch_event::Decision;
use crate::handlers::install::InstallReport;
use stratus_core::{Error, Request};

/// Lifecycle event kinds the host dispatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Install,
    Activate,
    Fetch,
}

/// Summary produced by a completed phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhaseReport {
    Install(InstallReport),
    Activate(ActivateReport),
    /// No entry point registered for the event; trivially complete.
    Unhandled,
}

/// Deferred completion signal returned by a lifecycle entry point.
pub type Completion = Pin<Box<dyn Future<Output = Result<PhaseReport, Error>> + Send>>;

/// An entry point registered in the dispatch table.
pub type EntryPoint = Box<dyn Fn() -> Completion + Send + Sync>;

/// Dispatch table mapping event kinds to lifecycle entry points.
#[derive(Default)]
pub struct LifecycleTable {
    entries: HashMap<EventKind, EntryPoint>,
}

impl LifecycleTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self { entries: HashMap::new() }
    }

    /// Register an entry point for an event kind, replacing any prior one.
    pub fn register(&mut self, kind: EventKind, entry: EntryPoint) {
        self.entries.insert(kind, entry);
    }

    /// Check whether an entry point is registered.
    pub fn is_registered(&self, kind: EventKind) -> bool {
        self.entries.contains_key(&kind)
    }

    /// Dispatch an event and await its completion signal.
    ///
    /// An event with no registered entry point completes trivially; a
    /// worker that doesn't listen for a phase has nothing to wait for.
    pub async fn dispatch(&self, kind: EventKind) -> Result<PhaseReport, Error> {
        match self.entries.get(&kind) {
            Some(entry) => entry().await,
            None => Ok(PhaseReport::Unhandled),
        }
    }
}

/// Typed entry point for fetch interception.
#[async_trait]
pub trait FetchHandler: Send + Sync {
    /// Decide how one intercepted request is answered.
    async fn handle(&self, request: &Request) -> Result<Decision, Error>;
}
