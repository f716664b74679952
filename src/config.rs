use crate::image_types::OutputFormat;
use crate::relay::{Relay, RelayError};
use crate::types::GenerationParams;
use crate::upload_store::UploadArea;
use crate::upscale_api::{DEFAULT_UPSCALE_API_URL, StabilityUpscaleBackend, UpscaleBackend};
use envconfig::Envconfig;
use log::{info, warn};
use std::sync::Arc;
use thiserror::Error;

#[derive(Envconfig)]
struct EnvConfig {
    #[envconfig(from = "HOST", default = "0.0.0.0")]
    pub host: String,
    #[envconfig(from = "PORT", default = "3000")]
    pub port: u16,

    // ------------------
    // Upscale api
    /// Bearer token for the upscale api
    #[envconfig(from = "API_KEY", default = "")]
    pub api_key: String,
    #[envconfig(from = "UPSCALE_API_URL", default = "https://api.stability.ai/v2beta/stable-image/upscale/creative")]
    pub upscale_api_url: String,
    /// Seconds before a remote call is abandoned. Unset means no limit
    #[envconfig(from = "UPSTREAM_TIMEOUT")]
    pub upstream_timeout: Option<u64>,

    // ------------------
    // Generation parameters, fixed for every job
    #[envconfig(from = "POSITIVE_PROMPT", default = "Default positive prompt")]
    pub positive_prompt: String,
    #[envconfig(from = "NEGATIVE_PROMPT", default = "Default negative prompt")]
    pub negative_prompt: String,
    #[envconfig(from = "OUTPUT_FORMAT", default = "webp")]
    pub output_format: OutputFormat,

    // ------------------
    // Uploads
    /// Directory for temporary uploads, created on start
    #[envconfig(from = "UPLOAD_DIR", default = "uploads")]
    pub upload_dir: String,
    /// Request body limit in bytes. The form itself only offers files under 5MB
    #[envconfig(from = "MAX_UPLOAD_SIZE", default = "10485760")]
    pub max_upload_size: usize,
    /// Seconds the processing page waits before opening the result
    #[envconfig(from = "REDIRECT_DELAY", default = "5")]
    pub redirect_delay: u32,

    /// Enable OpenAPI and Swagger docs routes
    #[envconfig(from = "ENABLE_DOCS", default = "true")]
    pub enable_docs: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid environment: {0}")]
    Env(#[from] envconfig::Error),
    #[error("failed to build upscale api client: {0}")]
    Client(#[from] RelayError),
}

pub struct Config {
    pub host: String,
    pub port: u16,
    pub relay: Relay,
    pub upload_area: UploadArea,

    pub max_upload_size: usize,
    pub redirect_delay: u32,
    pub enable_docs: bool,
}

impl Config {
    pub fn from_env() -> Result<Config, ConfigError> {
        let env_conf = EnvConfig::init_from_env()?;

        if env_conf.api_key.is_empty() {
            warn!("API_KEY is not set, upscale requests will be rejected by the provider");
        }
        if env_conf.upscale_api_url != DEFAULT_UPSCALE_API_URL {
            info!("Using upscale api at {}", env_conf.upscale_api_url);
        }

        let backend = Arc::new(StabilityUpscaleBackend::new(
            env_conf.upscale_api_url,
            env_conf.api_key,
            env_conf.upstream_timeout,
        )?) as Arc<dyn UpscaleBackend + Send + Sync>;
        let params = GenerationParams {
            prompt: env_conf.positive_prompt,
            negative_prompt: env_conf.negative_prompt,
            output_format: env_conf.output_format,
        };
        info!("Generating {} images", params.output_format.name());

        Ok(Config {
            host: env_conf.host,
            port: env_conf.port,
            relay: Relay::new(backend, params),
            upload_area: UploadArea::new(env_conf.upload_dir),
            max_upload_size: env_conf.max_upload_size,
            redirect_delay: env_conf.redirect_delay,
            enable_docs: env_conf.enable_docs,
        })
    }
}
