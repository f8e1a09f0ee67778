//! # callbox-core
//!
//! Core abstractions for the Callbox callback test harness.
//!
//! This crate provides the foundational types shared by the receiver and the
//! synthetic producer:
//!
//! - **Payload Model**: strict and permissive validation of inbound callback
//!   bodies behind one small strategy trait
//! - **Authenticator**: pure shared-secret check for the `X-API-Key` header
//! - **Callback Store**: in-process, append-only record store with gapless
//!   1-based sequence ids
//! - **Durable Log Sink**: newline-delimited JSON file mirror of the store
//! - **Error Types**: shared error definitions and result types
//!
//! ## Crate Boundary
//!
//! `callbox-core` knows nothing about HTTP. Routing, status-code mapping,
//! and configuration live in `callbox-api`; this crate only defines the
//! records, the validation rules, and the storage discipline.
//!
//! ## Example
//!
//! ```rust
//! use callbox_core::prelude::*;
//!
//! let store = CallbackStore::new();
//! let record = store.append(CallbackDraft {
//!     api_key_provided: false,
//!     payload: serde_json::json!({ "agent_answer": "hi" }),
//!     headers: None,
//! })?;
//! assert_eq!(record.sequence_id, 1);
//! # callbox_core::Result::Ok(())
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]

pub mod auth;
pub mod error;
pub mod model;
pub mod observability;
pub mod sink;
pub mod store;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust
/// use callbox_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::auth::{authenticate, AuthOutcome};
    pub use crate::error::{Error, Result};
    pub use crate::model::{
        CallbackDraft, CallbackPayload, CallbackRecord, HeaderSnapshot, PayloadModel,
        PermissiveModel, StrictModel,
    };
    pub use crate::sink::{JsonlSink, MemorySink, RecordSink};
    pub use crate::store::CallbackStore;
}

// Re-export key types at crate root for ergonomics
pub use auth::{authenticate, AuthOutcome};
pub use error::{Error, Result};
pub use model::{
    CallbackDraft, CallbackPayload, CallbackRecord, HeaderSnapshot, PayloadModel, PermissiveModel,
    StrictModel,
};
pub use observability::{init_logging, LogFormat};
pub use sink::{JsonlSink, MemorySink, RecordSink};
pub use store::CallbackStore;
