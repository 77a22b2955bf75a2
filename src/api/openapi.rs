use super::handlers::{gate, health, logout};
use axum::response::{IntoResponse, Json};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(gate::gate_get, gate::gate_post, logout::logout, health::health),
    components(schemas(gate::LoginForm, health::Health)),
    tags(
        (name = "gate", description = "Login checkpoint and deep-link redirects"),
        (name = "health", description = "Service status")
    )
)]
struct ApiDoc;

/// OpenAPI document for every served route.
#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

pub(super) async fn openapi_json() -> impl IntoResponse {
    Json(openapi())
}
