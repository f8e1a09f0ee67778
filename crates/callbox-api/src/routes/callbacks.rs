//! Callback API routes.
//!
//! Ingestion and read endpoints for received callbacks.
//!
//! ## Routes
//!
//! - `POST /callback` - Receive a callback (strict payload validation)
//! - `POST /raw_callback` - Receive a callback (any JSON document)
//! - `GET  /callbacks` - List all received callbacks in arrival order
//! - `GET  /latest_callback` - Most recent callback, `null` when empty
//!
//! Both POST routes share one pipeline: authenticate, validate, append to
//! the store, then best-effort write to the durable log. A request rejected
//! at any step persists nothing.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use callbox_core::authenticate;
use callbox_core::model::{
    CallbackDraft, CallbackRecord, HeaderSnapshot, PayloadModel, PermissiveModel, StrictModel,
};
use callbox_core::observability::ingestion_span;

use crate::error::ApiError;
use crate::server::AppState;

/// Strict request body for `POST /api/v1/callback`.
///
/// Fields beyond the ones listed here are accepted and preserved verbatim.
#[derive(Debug, ToSchema)]
pub struct CallbackRequest {
    /// Agent reply text. Required; may be empty.
    pub agent_answer: String,
    /// Opaque session correlation id.
    pub session_id: Option<String>,
    /// Opaque turn tag within the session.
    pub turn_id: Option<String>,
    /// Free-form string-keyed metadata.
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<serde_json::Value>,
}

/// One stored callback, as returned by the read endpoints.
#[derive(Debug, Serialize, ToSchema)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct StoredCallback {
    /// 1-based id assigned at receive time; matches the `callback_id`
    /// returned to the poster.
    pub sequence_id: u64,
    /// Receive timestamp (RFC 3339).
    #[schema(value_type = String)]
    pub received_at: DateTime<Utc>,
    /// Whether the posting request supplied an `X-API-Key` header.
    pub api_key_provided: bool,
    /// The accepted payload.
    #[schema(value_type = Object)]
    pub payload: serde_json::Value,
    /// Request headers captured by permissive ingestion.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub headers: Option<HeaderSnapshot>,
}

impl From<&CallbackRecord> for StoredCallback {
    fn from(record: &CallbackRecord) -> Self {
        Self {
            sequence_id: record.sequence_id,
            received_at: record.received_at,
            api_key_provided: record.api_key_provided,
            payload: record.payload.clone(),
            headers: record.headers.clone(),
        }
    }
}

/// Response for `GET /api/v1/callbacks`.
#[derive(Debug, Serialize, ToSchema)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct CallbackListResponse {
    /// Number of callbacks received so far.
    pub count: u64,
    /// All callbacks in arrival order.
    pub items: Vec<StoredCallback>,
}

/// Response for `GET /api/v1/latest_callback`.
#[derive(Debug, Serialize, ToSchema)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct LatestCallbackResponse {
    /// Number of callbacks received so far.
    pub count: u64,
    /// Most recent callback; `null` when nothing has arrived.
    pub item: Option<StoredCallback>,
}

/// Acknowledgement returned by both ingestion routes.
#[derive(Debug, Serialize, ToSchema)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct CallbackAccepted {
    /// Always `"success"`.
    pub status: String,
    /// Receive timestamp of the stored record (RFC 3339).
    #[schema(value_type = String)]
    pub received_at: DateTime<Utc>,
    /// Assigned sequence id; `GET /callbacks` returns ids 1..=count.
    pub callback_id: u64,
}

/// Creates callback routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/callback", post(receive_callback))
        .route("/raw_callback", post(receive_raw_callback))
        .route("/callbacks", get(list_callbacks))
        .route("/latest_callback", get(latest_callback))
}

/// Receive a strict callback.
///
/// POST /api/v1/callback
#[utoipa::path(
    post,
    path = "/api/v1/callback",
    tag = "callbacks",
    request_body = CallbackRequest,
    responses(
        (status = 200, description = "Callback stored", body = CallbackAccepted),
        (status = 400, description = "Malformed JSON body", body = ApiErrorBody),
        (status = 401, description = "Missing or invalid API key", body = ApiErrorBody),
        (status = 422, description = "Schema violation", body = ApiErrorBody),
        (status = 500, description = "Internal error", body = ApiErrorBody),
    ),
    security(
        ("apiKeyAuth" = [])
    )
)]
pub(crate) async fn receive_callback(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    ingest(&state, &headers, &body, &StrictModel).await
}

/// Receive an arbitrary JSON callback.
///
/// POST /api/v1/raw_callback
///
/// Accepts any syntactically valid JSON document and captures the request
/// headers onto the stored record.
#[utoipa::path(
    post,
    path = "/api/v1/raw_callback",
    tag = "callbacks",
    responses(
        (status = 200, description = "Callback stored", body = CallbackAccepted),
        (status = 400, description = "Malformed JSON body", body = ApiErrorBody),
        (status = 401, description = "Missing or invalid API key", body = ApiErrorBody),
        (status = 500, description = "Internal error", body = ApiErrorBody),
    ),
    security(
        ("apiKeyAuth" = [])
    )
)]
pub(crate) async fn receive_raw_callback(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    ingest(&state, &headers, &body, &PermissiveModel).await
}

/// List all received callbacks.
///
/// GET /api/v1/callbacks
#[utoipa::path(
    get,
    path = "/api/v1/callbacks",
    tag = "callbacks",
    responses(
        (status = 200, description = "Callbacks listed", body = CallbackListResponse),
        (status = 500, description = "Internal error", body = ApiErrorBody),
    )
)]
pub(crate) async fn list_callbacks(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    tracing::debug!("Listing callbacks");

    let records = state.store().all()?;
    let items: Vec<StoredCallback> = records
        .iter()
        .map(|record| StoredCallback::from(record.as_ref()))
        .collect();

    Ok(Json(CallbackListResponse {
        count: items.len() as u64,
        items,
    }))
}

/// Get the most recent callback.
///
/// GET /api/v1/latest_callback
#[utoipa::path(
    get,
    path = "/api/v1/latest_callback",
    tag = "callbacks",
    responses(
        (status = 200, description = "Latest callback (item is null when none)", body = LatestCallbackResponse),
        (status = 500, description = "Internal error", body = ApiErrorBody),
    )
)]
pub(crate) async fn latest_callback(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    tracing::debug!("Getting latest callback");

    let count = state.store().count()?;
    let item = state
        .store()
        .latest()?
        .map(|record| StoredCallback::from(record.as_ref()));

    Ok(Json(LatestCallbackResponse { count, item }))
}

/// Shared ingestion pipeline for both POST routes.
///
/// Order matters: authenticate, validate, append, then best-effort durable
/// log. A sink failure is logged and does not fail the request; the record
/// is already committed to the store.
async fn ingest(
    state: &AppState,
    headers: &HeaderMap,
    body: &[u8],
    model: &dyn PayloadModel,
) -> Result<Json<CallbackAccepted>, ApiError> {
    let supplied = header_string(headers, "x-api-key");
    let span = ingestion_span(model.name(), supplied.is_some());

    let record = {
        let _guard = span.enter();

        let outcome = authenticate(state.config.app_key.as_deref(), supplied.as_deref())?;
        let payload = model.validate(body)?;
        let snapshot = model.capture_headers().then(|| header_snapshot(headers));

        state.store().append(CallbackDraft {
            api_key_provided: outcome.key_provided,
            payload,
            headers: snapshot,
        })?
    };

    if let Err(e) = state.record_sink().append(&record).await {
        tracing::error!(
            callback_id = record.sequence_id,
            error = %e,
            "Failed to write callback to durable log"
        );
    }

    tracing::info!(
        callback_id = record.sequence_id,
        variant = model.name(),
        api_key_provided = record.api_key_provided,
        "Callback received"
    );

    Ok(Json(CallbackAccepted {
        status: "success".to_string(),
        received_at: record.received_at,
        callback_id: record.sequence_id,
    }))
}

fn header_string(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

/// Captures all request headers, lowercased. Later duplicates win,
/// matching how a single-valued header view behaves.
fn header_snapshot(headers: &HeaderMap) -> HeaderSnapshot {
    let mut snapshot = HeaderSnapshot::new();
    for (name, value) in headers {
        snapshot.insert(
            name.as_str().to_string(),
            String::from_utf8_lossy(value.as_bytes()).into_owned(),
        );
    }
    snapshot
}
