use crate::image_types::OutputFormat;
use axum::body::Bytes;
use serde::Deserialize;

/// Remote generation identifier. Opaque, passed through without validation
pub type GenerationId = String;

/// Upload read back from the temp area, ready to be sent to the upscale api
pub struct UploadedImage {
    pub data: Vec<u8>,
    pub file_name: String,
    pub content_type: Option<String>,
}

impl UploadedImage {
    pub fn new(data: Vec<u8>, file_name: String, content_type: Option<String>) -> Self {
        UploadedImage {
            data,
            file_name,
            content_type,
        }
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// Accepted upscale job
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationJob {
    pub id: GenerationId,
}

/// One observation of a remote job
#[derive(Debug)]
pub enum GenerationPoll {
    Processing,
    Ready(Bytes),
}

/// Fixed parameters attached to every upscale job
#[derive(Debug, Clone)]
pub struct GenerationParams {
    pub prompt: String,
    pub negative_prompt: String,
    pub output_format: OutputFormat,
}
