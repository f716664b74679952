use crate::config::Config;
use crate::image_types::MimeType;
use crate::routes::pages;
use crate::routes::responses::{ApiError, HtmlPage, ImageResponse, PollResponse};
use crate::relay::RelayError;
use crate::types::GenerationPoll;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, Path, State};
use log::{debug, info, warn};
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Deserialize, JsonSchema)]
pub struct GenerationPath {
    /// Job identifier issued by the upscale api
    pub generation_id: String,
}

/// Upload form
pub async fn upload_form() -> HtmlPage {
    HtmlPage(pages::UPLOAD_FORM.to_string())
}

/// Store the uploaded image, submit it as an upscale job and send the browser
/// to the result page
///
/// The temp file is released whatever the outcome of the remote call. A body
/// that is not multipart at all is reported like any other bad upload
pub async fn upload_image(
    State(state): State<Arc<Config>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<HtmlPage, ApiError> {
    let mut multipart = multipart
        .map_err(|rejection| ApiError::upload(RelayError::InvalidUpload(rejection.body_text())))?;
    let upload = state
        .upload_area
        .receive(&mut multipart)
        .await
        .map_err(ApiError::upload)?;
    info!(
        "Received upload {} ({} bytes)",
        upload.file_name(),
        upload.size()
    );

    let submitted = state.relay.submit(&upload).await;
    if let Err(err) = upload.release() {
        warn!("Failed to remove temp upload: {}", err);
    }

    let job = submitted.map_err(ApiError::upload)?;
    info!("Upscale job {} started", job.id);
    Ok(HtmlPage(pages::processing_page(&job.id, state.redirect_delay)))
}

/// Single look at the job: the image if ready, a retry hint otherwise
pub async fn get_result(
    Path(path): Path<GenerationPath>,
    State(state): State<Arc<Config>>,
) -> Result<PollResponse, ApiError> {
    let generation_id = path.generation_id;
    info!("Polling generation {}", generation_id);

    let poll = state
        .relay
        .poll(&generation_id)
        .await
        .map_err(ApiError::result)?;

    let response = match poll {
        GenerationPoll::Processing => {
            PollResponse::Processing(HtmlPage(pages::STILL_PROCESSING.to_string()))
        }
        GenerationPoll::Ready(data) => {
            let mime_type = state.relay.output_format().mime_type().to_string();
            let image = ImageResponse::new(data, &mime_type);
            PollResponse::Ready(image)
        }
    };

    debug!("generated response");
    Ok(response)
}
