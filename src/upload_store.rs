//! Temporary storage for incoming uploads
//!
//! Every upload lives in its own uniquely named file inside the upload area and
//! is owned by a [`ScopedUpload`]. The file is removed exactly once: either by
//! an explicit [`ScopedUpload::release`] or, on any other exit path, on drop.
use crate::relay::RelayError;
use axum::extract::Multipart;
use axum::extract::multipart::Field;
use log::{debug, warn};
use sanitize_filename::sanitize;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempPath;
use tokio::io::AsyncWriteExt;

const UPLOAD_FIELD: &str = "image";
const DEFAULT_FILE_NAME: &str = "image";

pub struct UploadArea {
    dir: PathBuf,
}

impl UploadArea {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        UploadArea { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn ensure_exists(&self) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await
    }

    /// Create a fresh temp file, already tied to a guard
    pub fn acquire(
        &self,
        file_name: String,
        content_type: Option<String>,
    ) -> io::Result<(ScopedUpload, tokio::fs::File)> {
        let (file, path) = tempfile::Builder::new()
            .prefix("upload-")
            .tempfile_in(&self.dir)?
            .into_parts();
        debug!("Acquired temp upload {}", path.display());

        let upload = ScopedUpload {
            path: Some(path),
            file_name,
            content_type,
            size: 0,
        };
        Ok((upload, tokio::fs::File::from_std(file)))
    }

    /// Persist the `image` field of a multipart body. Other fields are skipped
    pub async fn receive(&self, multipart: &mut Multipart) -> Result<ScopedUpload, RelayError> {
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|err| RelayError::InvalidUpload(err.body_text()))?
        {
            if field.name() != Some(UPLOAD_FIELD) {
                debug!("Skipping multipart field {:?}", field.name());
                continue;
            }

            let upload = self.store_field(field).await?;
            if upload.size() == 0 {
                // browsers send an empty part when no file was picked
                return Err(RelayError::MissingUpload);
            }
            return Ok(upload);
        }

        Err(RelayError::MissingUpload)
    }

    async fn store_field(&self, mut field: Field<'_>) -> Result<ScopedUpload, RelayError> {
        let file_name = field
            .file_name()
            .map(sanitize)
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| DEFAULT_FILE_NAME.to_string());
        let content_type = field.content_type().map(str::to_string);

        let (mut upload, mut file) = self.acquire(file_name, content_type)?;
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|err| RelayError::InvalidUpload(err.body_text()))?
        {
            file.write_all(&chunk).await?;
            upload.size += chunk.len() as u64;
        }
        file.flush().await?;

        Ok(upload)
    }
}

/// Temp file owned by a single request
pub struct ScopedUpload {
    path: Option<TempPath>,
    file_name: String,
    content_type: Option<String>,
    size: u64,
}

impl ScopedUpload {
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub async fn read(&self) -> io::Result<Vec<u8>> {
        match self.path() {
            Some(path) => tokio::fs::read(path).await,
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                "upload was already released",
            )),
        }
    }

    /// Delete the temp file now, reporting failures
    pub fn release(mut self) -> io::Result<()> {
        match self.path.take() {
            Some(path) => {
                let display = path.display().to_string();
                path.close()?;
                debug!("Released temp upload {}", display);
                Ok(())
            }
            None => Ok(()),
        }
    }
}

impl Drop for ScopedUpload {
    fn drop(&mut self) {
        if let Some(path) = self.path.take() {
            let display = path.display().to_string();
            match path.close() {
                Ok(()) => debug!("Released temp upload {} on drop", display),
                Err(err) => warn!("Failed to remove temp upload {}: {}", display, err),
            }
        }
    }
}
