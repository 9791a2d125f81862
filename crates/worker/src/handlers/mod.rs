//! Phase handler implementations.
//!
//! One module per lifecycle event the worker answers: install populates
//! the namespace, activate purges stale namespaces, fetch_event serves
//! intercepted requests.

pub mod activate;
pub mod fetch_event;
pub mod install;

pub use activate::{ActivateReport, run_activate};
pub use fetch_event::{Decision, ServeSource, run_fetch};
pub use install::{InstallReport, run_install};
