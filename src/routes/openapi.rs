use aide::openapi::OpenApi;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use std::sync::Arc;

/// Generated OpenAPI document for the relay routes
pub async fn openapi_json(Extension(openapi): Extension<Arc<OpenApi>>) -> impl IntoResponse {
    Json(openapi.as_ref().clone())
}
