//! Core types and shared functionality for stratus.
//!
//! This crate provides:
//! - Versioned cache store with SQLite backend
//! - Request identity and response snapshot types
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod request;

pub use cache::CacheDb;
pub use config::{AppConfig, AssetManifest};
pub use error::Error;
pub use request::{Method, Request, RequestMode, ResponseSnapshot};
