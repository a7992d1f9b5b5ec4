//! Media store for banner image uploads
//!
//! Files are written under `UploadConfig::path` with a random name and are
//! referenced publicly as `<public_prefix>/<file>`.

use anyhow::{Context, Result};
use std::path::PathBuf;
use tokio::fs;
use uuid::Uuid;

use super::validation::ValidationErrors;
use crate::config::UploadConfig;
use crate::models::ImageUpload;

pub struct MediaStore {
    config: UploadConfig,
}

impl MediaStore {
    pub fn new(config: UploadConfig) -> Self {
        Self { config }
    }

    /// Check type and size of an upload before anything is written
    pub fn check(&self, field: &'static str, upload: &ImageUpload) -> Result<(), ValidationErrors> {
        if !self.config.is_type_allowed(&upload.content_type) {
            tracing::warn!(
                "Rejected upload {}: type {} not allowed",
                upload.filename,
                upload.content_type
            );
            return Err(ValidationErrors::single(
                field,
                format!(
                    "Unsupported image type: {}. Allowed types: {}",
                    upload.content_type,
                    self.config.allowed_types.join(", ")
                ),
            ));
        }

        if upload.data.is_empty() {
            tracing::warn!("Rejected upload {}: empty file", upload.filename);
            return Err(ValidationErrors::single(field, "The submitted file is empty."));
        }

        if upload.size() > self.config.max_file_size {
            tracing::warn!(
                "Rejected upload {}: {} bytes exceeds limit of {}",
                upload.filename,
                upload.size(),
                self.config.max_file_size
            );
            return Err(ValidationErrors::single(
                field,
                format!(
                    "File too large. Maximum size: {} bytes",
                    self.config.max_file_size
                ),
            ));
        }

        Ok(())
    }

    /// Write an upload to disk and return its public reference
    ///
    /// Callers run `check` first; this only fails on I/O errors.
    pub async fn save(&self, upload: &ImageUpload) -> Result<String> {
        if !self.config.path.exists() {
            fs::create_dir_all(&self.config.path)
                .await
                .with_context(|| {
                    format!("Failed to create upload dir {}", self.config.path.display())
                })?;
        }

        let ext = self.config.extension_for(&upload.content_type);
        let filename = format!("{}.{}", Uuid::new_v4(), ext);
        let file_path = self.config.path.join(&filename);

        fs::write(&file_path, &upload.data)
            .await
            .with_context(|| format!("Failed to save file {}", file_path.display()))?;

        tracing::info!("Stored banner image {} ({} bytes)", filename, upload.size());
        Ok(self.reference_for(&filename))
    }

    /// Delete a previously stored file; unknown references are ignored
    pub async fn remove(&self, reference: &str) -> Result<()> {
        let Some(path) = self.path_for(reference) else {
            return Ok(());
        };
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => {
                Err(e).with_context(|| format!("Failed to remove file {}", path.display()))
            }
        }
    }

    fn reference_for(&self, filename: &str) -> String {
        format!("{}/{}", self.config.public_prefix.trim_end_matches('/'), filename)
    }

    /// Map a public reference back to a file inside the upload directory
    fn path_for(&self, reference: &str) -> Option<PathBuf> {
        let prefix = format!("{}/", self.config.public_prefix.trim_end_matches('/'));
        let filename = reference.strip_prefix(&prefix)?;
        if filename.is_empty()
            || filename.contains('/')
            || filename.contains('\\')
            || filename.starts_with('.')
        {
            return None;
        }
        Some(self.config.path.join(filename))
    }
}
