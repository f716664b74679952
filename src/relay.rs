use crate::image_types::OutputFormat;
use crate::types::{GenerationJob, GenerationParams, GenerationPoll, UploadedImage};
use crate::upload_store::ScopedUpload;
use crate::upscale_api::UpscaleBackend;
use log::debug;
use std::sync::Arc;
use thiserror::Error;
use tracing::instrument;

#[derive(Debug, Error, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum RelayError {
    #[error("No valid image file was received")]
    MissingUpload,
    #[error("Invalid image upload: {0}")]
    InvalidUpload(String),
    /// Submit endpoint answered with anything but 200. Payload is the provider body
    #[error("{payload}")]
    RemoteSubmission { status: u16, payload: String },
    /// Result endpoint answered with an unexpected status
    #[error("{status} - {payload}")]
    RemoteRetrieval { status: u16, payload: String },
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    #[error("Temporary storage failure: {0}")]
    Storage(#[from] std::io::Error),
}

impl RelayError {
    pub fn kind(&self) -> &'static str {
        self.into()
    }

    /// Upstream http status, if the error came from the upscale api
    pub fn remote_status(&self) -> Option<u16> {
        match self {
            RelayError::RemoteSubmission { status, .. }
            | RelayError::RemoteRetrieval { status, .. } => Some(*status),
            RelayError::Transport(err) => err.status().map(|status| status.as_u16()),
            _ => None,
        }
    }
}

/// Submits uploads as upscale jobs and observes their results
pub struct Relay {
    backend: Arc<dyn UpscaleBackend + Send + Sync>,
    params: GenerationParams,
}

impl Relay {
    pub fn new(backend: Arc<dyn UpscaleBackend + Send + Sync>, params: GenerationParams) -> Self {
        Relay { backend, params }
    }

    pub fn output_format(&self) -> OutputFormat {
        self.params.output_format
    }

    /// Send stored upload to the upscale api. Does not release the upload,
    /// caller owns it
    #[instrument(skip(self, upload), fields(size = upload.size()))]
    pub async fn submit(&self, upload: &ScopedUpload) -> Result<GenerationJob, RelayError> {
        let data = upload.read().await?;
        if data.is_empty() {
            return Err(RelayError::MissingUpload);
        }
        let image = UploadedImage::new(
            data,
            upload.file_name().to_string(),
            upload.content_type().map(str::to_string),
        );
        debug!(
            "Submitting {} ({} bytes) for upscaling",
            image.file_name,
            image.size()
        );

        let job = self.backend.submit(image, &self.params).await?;
        debug!("Upscale job {} accepted", job.id);
        Ok(job)
    }

    #[instrument(skip(self))]
    pub async fn poll(&self, generation_id: &str) -> Result<GenerationPoll, RelayError> {
        let poll = self.backend.fetch_result(generation_id).await?;
        match &poll {
            GenerationPoll::Processing => debug!("Generation {} still processing", generation_id),
            GenerationPoll::Ready(data) => {
                debug!("Generation {} ready, {} bytes", generation_id, data.len())
            }
        }
        Ok(poll)
    }
}
