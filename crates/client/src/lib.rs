//! Network client for stratus.
//!
//! This crate provides the HTTP fetch pipeline the worker uses to populate
//! and refresh its cache, plus URL canonicalization and origin
//! classification shared by the install and interception paths.

pub mod fetch;

pub use fetch::origin::same_origin;
pub use fetch::url::{UrlError, canonicalize, same_resource};
pub use fetch::{FetchClient, FetchConfig, FetchResponse, Network};
