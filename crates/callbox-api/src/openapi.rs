//! `OpenAPI` (3.1) specification generation for `callbox-api`.
//!
//! The generated spec is served at `/openapi.json` so a test harness can
//! discover the callback contract without reading this crate.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// `OpenAPI` documentation for the Callbox REST API (`/api/v1/*`).
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Callbox API",
        description = "Callback receiver for async agent-callback testing"
    ),
    paths(
        crate::routes::callbacks::receive_callback,
        crate::routes::callbacks::receive_raw_callback,
        crate::routes::callbacks::list_callbacks,
        crate::routes::callbacks::latest_callback,
    ),
    components(
        schemas(
            crate::error::ApiErrorBody,
            crate::routes::callbacks::CallbackRequest,
            crate::routes::callbacks::CallbackAccepted,
            crate::routes::callbacks::StoredCallback,
            crate::routes::callbacks::CallbackListResponse,
            crate::routes::callbacks::LatestCallbackResponse,
        )
    ),
    tags(
        (name = "callbacks", description = "Callback ingestion and inspection"),
    ),
    modifiers(&SecurityAddon),
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "apiKeyAuth",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("X-API-Key"))),
        );
    }
}

/// Returns the generated `OpenAPI` spec.
#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
