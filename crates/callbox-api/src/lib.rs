//! # callbox-api
//!
//! HTTP receiver for the Callbox async-callback test harness.
//!
//! This crate exposes the endpoints a system-under-test posts agent replies
//! to, and the read endpoints a test run polls to observe what arrived:
//!
//! ```text
//! GET  /                        - Health and running total
//! GET  /api/v1/callbacks        - All received callbacks, in arrival order
//! GET  /api/v1/latest_callback  - Most recent callback (or null)
//! POST /api/v1/callback         - Strict ingestion (validated payload)
//! POST /api/v1/raw_callback     - Permissive ingestion (any JSON document)
//! ```
//!
//! ## Design Principles
//!
//! This crate is a **thin composition layer**: validation, storage, and
//! durable logging live in `callbox-core`. Handlers authenticate, validate,
//! append, then best-effort log, in that order, so nothing is persisted for
//! a rejected request.
//!
//! ## Example
//!
//! ```rust,ignore
//! use callbox_api::server::Server;
//!
//! let server = Server::builder()
//!     .port(8008)
//!     .app_key("shared-secret")
//!     .build();
//!
//! server.serve().await?;
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod error;
pub mod openapi;
pub mod routes;
pub mod server;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::{ApiError, ApiResult};
    pub use crate::server::Server;
}
