//! Shared-secret authentication for callback ingestion.
//!
//! The receiver accepts an optional `X-API-Key` header. When a shared secret
//! is configured, the supplied key must match it exactly; when no secret is
//! configured the receiver stays open (local-testing posture) and only
//! records whether a key was supplied.
//!
//! The check is a pure function of `(configured key, supplied key)` — no
//! state, safe to call concurrently.

use crate::error::{Error, Result};

/// Outcome of a successful authentication check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthOutcome {
    /// Whether the request supplied an API key (recorded on the callback
    /// record for audit, independent of whether a key was required).
    pub key_provided: bool,
}

/// Validates an optionally supplied API key against the configured secret.
///
/// Behavior:
/// - `configured` absent or empty: always succeeds; the outcome records
///   whether a key was supplied but never rejects.
/// - `configured` present: fails with [`Error::MissingApiKey`] when no key
///   was supplied, and with [`Error::InvalidApiKey`] when the supplied key
///   differs (exact, case-sensitive comparison).
///
/// Failure paths emit a warning. Key material is never logged.
///
/// # Errors
///
/// Returns [`Error::MissingApiKey`] or [`Error::InvalidApiKey`] as above.
pub fn authenticate(configured: Option<&str>, supplied: Option<&str>) -> Result<AuthOutcome> {
    let key_provided = supplied.is_some();

    // An empty configured secret behaves as unset.
    let Some(expected) = configured.filter(|key| !key.is_empty()) else {
        return Ok(AuthOutcome { key_provided });
    };

    match supplied {
        None => {
            tracing::warn!("Missing API key in request");
            Err(Error::MissingApiKey)
        }
        Some(key) if key != expected => {
            tracing::warn!("Invalid API key attempt");
            Err(Error::InvalidApiKey)
        }
        Some(_) => Ok(AuthOutcome { key_provided: true }),
    }
}
