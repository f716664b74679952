//! Client for the third party creative upscale api
use crate::relay::RelayError;
use crate::types::{GenerationJob, GenerationParams, GenerationPoll, UploadedImage};
use async_trait::async_trait;
use log::debug;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode, header};
use std::time::Duration;
use tracing::instrument;

pub const DEFAULT_UPSCALE_API_URL: &str =
    "https://api.stability.ai/v2beta/stable-image/upscale/creative";

#[async_trait]
pub trait UpscaleBackend {
    /// Start an upscale job for the image
    async fn submit(
        &self,
        image: UploadedImage,
        params: &GenerationParams,
    ) -> Result<GenerationJob, RelayError>;

    /// Observe current state of a job, exactly one remote round trip
    async fn fetch_result(&self, generation_id: &str) -> Result<GenerationPoll, RelayError>;
}

pub struct StabilityUpscaleBackend {
    base_api_url: String,
    api_key: String,
    client: Client,
}

impl StabilityUpscaleBackend {
    pub fn new(
        base_api_url: String,
        api_key: String,
        timeout: Option<u64>,
    ) -> Result<Self, RelayError> {
        let mut builder = Client::builder().redirect(reqwest::redirect::Policy::limited(5));
        if let Some(timeout) = timeout {
            let timeout = Duration::from_secs(timeout);
            builder = builder.timeout(timeout).connect_timeout(timeout / 3);
        }

        Ok(StabilityUpscaleBackend {
            base_api_url: base_api_url.trim_end_matches('/').into(),
            api_key,
            client: builder.build()?,
        })
    }

    fn result_url(&self, generation_id: &str) -> String {
        format!(
            "{}/result/{}",
            self.base_api_url,
            urlencoding::encode(generation_id)
        )
    }
}

/// Short preview of a remote body for logs
fn preview(body: &str) -> String {
    body.chars().take(100).collect()
}

#[async_trait]
impl UpscaleBackend for StabilityUpscaleBackend {
    #[instrument(skip(self, image, params), fields(file_name = %image.file_name))]
    async fn submit(
        &self,
        image: UploadedImage,
        params: &GenerationParams,
    ) -> Result<GenerationJob, RelayError> {
        let mut part = Part::bytes(image.data).file_name(image.file_name);
        if let Some(content_type) = image.content_type {
            part = part.mime_str(&content_type).map_err(|_| {
                RelayError::InvalidUpload(format!("unsupported media type {}", content_type))
            })?;
        }
        let form = Form::new()
            .part("image", part)
            .text("prompt", params.prompt.clone())
            .text("negative_prompt", params.negative_prompt.clone())
            .text("output_format", params.output_format.name().to_string());

        let resp = self
            .client
            .post(&self.base_api_url)
            .bearer_auth(&self.api_key)
            .header(header::ACCEPT, "application/json")
            .multipart(form)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if status != StatusCode::OK {
            debug!(
                "Got error from upscale api status={},resp={}",
                status,
                preview(&body)
            );
            return Err(RelayError::RemoteSubmission {
                status: status.as_u16(),
                payload: body,
            });
        }

        serde_json::from_str::<GenerationJob>(&body).map_err(|err| {
            debug!("Unexpected upscale api response: {}", preview(&body));
            RelayError::RemoteSubmission {
                status: status.as_u16(),
                payload: format!("malformed job response: {}", err),
            }
        })
    }

    #[instrument(skip(self))]
    async fn fetch_result(&self, generation_id: &str) -> Result<GenerationPoll, RelayError> {
        let resp = self
            .client
            .get(self.result_url(generation_id))
            .bearer_auth(&self.api_key)
            .header(header::ACCEPT, "image/*")
            .send()
            .await?;

        match resp.status() {
            StatusCode::ACCEPTED => Ok(GenerationPoll::Processing),
            StatusCode::OK => {
                let data = resp.bytes().await?;
                if data.is_empty() {
                    debug!("Empty result body for {}, treating as processing", generation_id);
                    return Ok(GenerationPoll::Processing);
                }
                Ok(GenerationPoll::Ready(data))
            }
            status => {
                let body = resp
                    .text()
                    .await
                    .unwrap_or("unable to get response".into());
                debug!(
                    "Got error from upscale api status={},resp={}",
                    status,
                    preview(&body)
                );
                Err(RelayError::RemoteRetrieval {
                    status: status.as_u16(),
                    payload: body,
                })
            }
        }
    }
}
