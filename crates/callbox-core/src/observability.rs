//! Observability infrastructure for Callbox.
//!
//! Structured logging with consistent spans. This module provides the
//! initialization helper and span constructors shared by the receiver and
//! the synthetic producer.

use std::sync::Once;
use tracing::Span;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

/// Log output format.
#[derive(Debug, Clone, Copy, Default)]
pub enum LogFormat {
    /// JSON structured logs (for captured runs).
    Json,
    /// Pretty-printed logs (for local development).
    #[default]
    Pretty,
}

/// Initializes the logging subsystem.
///
/// Call once at application startup. Safe to call multiple times;
/// subsequent calls are no-ops.
///
/// # Environment Variables
///
/// - `RUST_LOG`: Controls log levels (e.g., `info`, `callbox_api=debug`)
///
/// # Example
///
/// ```rust
/// use callbox_core::observability::{init_logging, LogFormat};
///
/// init_logging(LogFormat::Pretty);
/// ```
pub fn init_logging(format: LogFormat) {
    INIT.call_once(|| {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        match format {
            LogFormat::Json => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(fmt::layer().json())
                    .init();
            }
            LogFormat::Pretty => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(fmt::layer().pretty())
                    .init();
            }
        }
    });
}

/// Creates a span for callback ingestion with standard fields.
///
/// # Example
///
/// ```rust
/// use callbox_core::observability::ingestion_span;
///
/// let span = ingestion_span("strict", true);
/// let _guard = span.enter();
/// // ... validate and append the callback
/// ```
#[must_use]
pub fn ingestion_span(variant: &str, api_key_provided: bool) -> Span {
    tracing::info_span!(
        "ingestion",
        variant = variant,
        api_key_provided = api_key_provided,
    )
}
