//! API server implementation.
//!
//! Wires configuration, the callback store, and the durable log sink into
//! an axum router, and serves it.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tower_http::trace::TraceLayer;

use callbox_core::sink::{MemorySink, RecordSink};
use callbox_core::store::CallbackStore;
use callbox_core::{Error, Result};

use crate::config::Config;
use crate::error::ApiError;

// ============================================================================
// Health Response
// ============================================================================

/// Health check response.
#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct HealthResponse {
    /// Service status banner.
    pub status: String,
    /// Primary ingestion endpoint.
    pub endpoint: String,
    /// Number of callbacks received since startup.
    pub total_callbacks: u64,
}

// ============================================================================
// Application State
// ============================================================================

/// Shared application state for all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Config,
    /// In-memory callback store (source of truth).
    store: Arc<CallbackStore>,
    /// Durable log sink for accepted callbacks.
    sink: Arc<dyn RecordSink>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("store", &self.store)
            .field("sink", &"<RecordSink>")
            .finish()
    }
}

impl AppState {
    /// Creates new application state with the given sink.
    #[must_use]
    pub fn new(config: Config, sink: Arc<dyn RecordSink>) -> Self {
        Self {
            config,
            store: Arc::new(CallbackStore::new()),
            sink,
        }
    }

    /// Returns the callback store.
    #[must_use]
    pub fn store(&self) -> &CallbackStore {
        &self.store
    }

    /// Returns the durable log sink.
    #[must_use]
    pub fn record_sink(&self) -> &dyn RecordSink {
        self.sink.as_ref()
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// Health check endpoint handler.
///
/// Returns 200 OK with a running total of received callbacks and the
/// primary ingestion path, so a polling harness can confirm it is talking
/// to the right service.
async fn health(
    State(state): State<Arc<AppState>>,
) -> std::result::Result<impl IntoResponse, ApiError> {
    let total_callbacks = state.store().count()?;

    Ok(Json(HealthResponse {
        status: "Callback API is running".to_string(),
        endpoint: "/api/v1/callback".to_string(),
        total_callbacks,
    }))
}

/// Serves the generated `OpenAPI` spec.
async fn serve_openapi() -> impl IntoResponse {
    Json(crate::openapi::openapi())
}

// ============================================================================
// Server
// ============================================================================

/// The Callbox receiver server.
pub struct Server {
    config: Config,
    sink: Arc<dyn RecordSink>,
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("config", &self.config)
            .field("sink", &"<RecordSink>")
            .finish()
    }
}

impl Server {
    /// Creates a new server with the given configuration.
    ///
    /// Defaults to an in-memory sink; use [`Server::with_record_sink`] for
    /// production.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            sink: Arc::new(MemorySink::new()),
        }
    }

    /// Creates a new server with an explicit durable log sink.
    #[must_use]
    pub fn with_record_sink(config: Config, sink: Arc<dyn RecordSink>) -> Self {
        Self { config, sink }
    }

    /// Creates a new `ServerBuilder`.
    #[must_use]
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    /// Returns the server configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Creates the router with all routes and middleware.
    fn create_router(&self) -> Router {
        let state = Arc::new(AppState::new(self.config.clone(), Arc::clone(&self.sink)));

        Router::new()
            .route("/", get(health))
            .route("/openapi.json", get(serve_openapi))
            .nest("/api/v1", crate::routes::api_v1_routes())
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }

    /// Starts the server and blocks until shutdown.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the server
    /// cannot bind to the port.
    pub async fn serve(&self) -> Result<()> {
        self.validate_config()?;

        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.port));
        let router = self.create_router();

        tracing::info!(
            port = self.config.port,
            endpoint = "/api/v1/callback",
            auth_enabled = self.config.auth_enabled(),
            log_path = %self.config.log_path().display(),
            "Starting Callbox callback receiver"
        );

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| Error::Internal {
                message: format!("failed to bind to {addr}: {e}"),
            })?;

        axum::serve(listener, router)
            .await
            .map_err(|e| Error::Internal {
                message: format!("server error: {e}"),
            })?;

        Ok(())
    }

    /// Creates a test router for the server.
    ///
    /// This is useful for integration tests where you want to exercise the
    /// routes without binding to a port.
    #[doc(hidden)]
    pub fn test_router(&self) -> Router {
        self.create_router()
    }

    fn validate_config(&self) -> Result<()> {
        if self.config.log_dir.trim().is_empty() {
            return Err(Error::InvalidInput("LOG_DIR cannot be empty".to_string()));
        }
        Ok(())
    }
}

/// Builder for constructing a server.
pub struct ServerBuilder {
    config: Config,
    sink: Arc<dyn RecordSink>,
}

impl std::fmt::Debug for ServerBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerBuilder")
            .field("config", &self.config)
            .field("sink", &"<RecordSink>")
            .finish()
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self {
            config: Config::default(),
            sink: Arc::new(MemorySink::new()),
        }
    }
}

impl ServerBuilder {
    /// Creates a new server builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the HTTP port.
    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Sets the shared secret required on ingestion requests.
    #[must_use]
    pub fn app_key(mut self, key: impl Into<String>) -> Self {
        self.config.app_key = Some(key.into());
        self
    }

    /// Sets the durable log directory.
    #[must_use]
    pub fn log_dir(mut self, dir: impl Into<String>) -> Self {
        self.config.log_dir = dir.into();
        self
    }

    /// Sets the durable log sink used by request handlers.
    ///
    /// By default, the server uses an in-memory sink intended only for
    /// tests/dev.
    #[must_use]
    pub fn record_sink(mut self, sink: Arc<dyn RecordSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Builds the server.
    #[must_use]
    pub fn build(self) -> Server {
        Server {
            config: self.config,
            sink: self.sink,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Context, Result};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn health_endpoint_reports_running_total() -> Result<()> {
        let server = ServerBuilder::new().build();
        let router = server.test_router();

        let request = Request::builder()
            .uri("/")
            .body(Body::empty())
            .context("build request")?;

        let response = router
            .oneshot(request)
            .await
            .map_err(|err| -> anyhow::Error { match err {} })?;

        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), 1024)
            .await
            .context("read response body")?;
        let health: HealthResponse = serde_json::from_slice(&body).context("parse JSON body")?;
        assert_eq!(health.status, "Callback API is running");
        assert_eq!(health.endpoint, "/api/v1/callback");
        assert_eq!(health.total_callbacks, 0);
        Ok(())
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() -> Result<()> {
        let server = ServerBuilder::new().build();
        let router = server.test_router();

        let request = Request::builder()
            .uri("/api/v1/unknown")
            .body(Body::empty())
            .context("build request")?;

        let response = router
            .oneshot(request)
            .await
            .map_err(|err| -> anyhow::Error { match err {} })?;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        Ok(())
    }

    #[test]
    fn builder_sets_config_fields() {
        let server = Server::builder()
            .port(9100)
            .app_key("secret")
            .log_dir("/tmp/callbox-logs")
            .build();

        assert_eq!(server.config().port, 9100);
        assert_eq!(server.config().app_key.as_deref(), Some("secret"));
        assert_eq!(server.config().log_dir, "/tmp/callbox-logs");
    }

    #[tokio::test]
    async fn serve_rejects_empty_log_dir() {
        let server = ServerBuilder::new().log_dir("").build();
        let err = server.serve().await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }
}
