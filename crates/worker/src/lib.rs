//! The offline cache worker.
//!
//! One worker version owns one cache namespace. Its life runs through
//! three phases: install populates the namespace with the core asset
//! bundle, activate deletes every other namespace and claims the open
//! clients, and from then on every GET from a controlled client is
//! answered cache-first with network fallback.

pub mod clients;
pub mod events;
pub mod handlers;
pub mod host;
pub mod lifecycle;

#[cfg(test)]
pub(crate) mod support;

pub use clients::{ClientId, ClientRegistry};
pub use events::{EventKind, FetchHandler, LifecycleTable, PhaseReport};
pub use handlers::activate::{ActivateReport, run_activate};
pub use handlers::fetch_event::{Decision, ServeSource, run_fetch};
pub use handlers::install::{InstallReport, run_install};
pub use host::{StartupReport, WorkerHost};
pub use lifecycle::{Lifecycle, WorkerState};
