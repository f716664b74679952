pub mod errors;
pub mod health;
pub mod openapi;
pub mod pages;
pub mod responses;
pub mod upscale;

use crate::config::Config;
use aide::axum::ApiRouter;
use aide::axum::routing::{get, get_with, post_with};
use aide::openapi::{Info, OpenApi};
use aide::swagger::Swagger;
use axum::extract::DefaultBodyLimit;
use axum::{Extension, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Full application router: relay routes, health probe and optional docs
pub fn router(config: Arc<Config>) -> Router {
    let mut api = OpenApi {
        info: Info {
            title: "sono-upscale".to_string(),
            description: Some(
                "Relays ultrasound images to a creative upscale api and serves the results"
                    .to_string(),
            ),
            version: env!("CARGO_PKG_VERSION").to_string(),
            ..Info::default()
        },
        ..OpenApi::default()
    };

    let mut api_router = ApiRouter::new()
        .api_route(
            "/",
            get_with(upscale::upload_form, |op| op.description("Upload form page.")),
        )
        .api_route(
            "/upload",
            post_with(upscale::upload_image, |op| {
                op.description(
                    "Multipart upload with an `image` field. Starts an upscale job and \
                     redirects to its result.",
                )
            }),
        )
        .api_route(
            "/result/{generation_id}",
            get_with(upscale::get_result, |op| {
                op.description("Generated image when ready, still-processing page otherwise.")
            }),
        )
        .api_route("/health", get(health::health_check));

    if config.enable_docs {
        api_router = api_router.route("/docs", Swagger::new("/openapi.json").axum_route());
    }

    let mut app: Router<Arc<Config>> = api_router.finish_api(&mut api);
    if config.enable_docs {
        app = app.route("/openapi.json", axum::routing::get(openapi::openapi_json));
    }

    app.layer(Extension(Arc::new(api)))
        .layer(DefaultBodyLimit::max(config.max_upload_size))
        .layer(TraceLayer::new_for_http())
        .with_state(config)
}
