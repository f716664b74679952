pub mod config;
pub mod image_types;
pub mod relay;
pub mod routes;
pub mod types;
pub mod upload_store;
pub mod upscale_api;
