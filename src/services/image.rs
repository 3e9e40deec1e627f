//! Upload processing: validate, shrink to the configured box, re-encode as JPEG.

use crate::config::UploadConfig;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;
use tokio::fs;
use tracing::info;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("{0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Where a processed upload ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredImage {
    pub filename: String,
    pub url: String,
}

pub struct ImageService {
    config: UploadConfig,
}

impl ImageService {
    #[must_use]
    pub const fn new(config: UploadConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn max_bytes(&self) -> usize {
        self.config.max_bytes
    }

    /// Validates and processes one uploaded file and writes the result to the
    /// upload directory.
    pub async fn store_upload(
        &self,
        original_name: &str,
        content_type: Option<&str>,
        bytes: Vec<u8>,
    ) -> Result<StoredImage, UploadError> {
        if bytes.is_empty() {
            return Err(UploadError::Validation("No file uploaded".to_string()));
        }

        let format = accepted_format(content_type, original_name).ok_or_else(|| {
            UploadError::Validation(
                "Invalid file type. Only JPEG, PNG, and WebP are allowed.".to_string(),
            )
        })?;

        if bytes.len() > self.config.max_bytes {
            return Err(UploadError::Validation(format!(
                "File too large. Maximum size is {}.",
                human_size(self.config.max_bytes)
            )));
        }

        let (max_width, max_height, quality) = (
            self.config.max_width,
            self.config.max_height,
            self.config.jpeg_quality,
        );
        let jpeg = tokio::task::spawn_blocking(move || {
            reencode(&bytes, format, max_width, max_height, quality)
        })
        .await
        .map_err(|e| UploadError::Storage(format!("image task panicked: {e}")))??;

        let dir = PathBuf::from(&self.config.directory);
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| UploadError::Storage(format!("cannot create {}: {e}", dir.display())))?;

        let filename = stored_filename(original_name, chrono::Utc::now().timestamp_millis());
        let path = dir.join(&filename);
        fs::write(&path, &jpeg)
            .await
            .map_err(|e| UploadError::Storage(format!("cannot write {}: {e}", path.display())))?;

        info!(path = %path.display(), bytes = jpeg.len(), "Stored upload");

        Ok(StoredImage {
            url: format!("{}/{}", self.config.url_prefix.trim_end_matches('/'), filename),
            filename,
        })
    }
}

/// JPEG, PNG or WebP by declared content type; the file name decides only when
/// the client sent no specific type.
fn accepted_format(content_type: Option<&str>, filename: &str) -> Option<ImageFormat> {
    let declared = content_type
        .map(|ct| ct.split(';').next().unwrap_or(ct).trim().to_ascii_lowercase())
        .filter(|ct| !ct.is_empty() && ct != "application/octet-stream");

    let mime = declared.or_else(|| {
        mime_guess::from_path(filename)
            .first()
            .map(|m| m.essence_str().to_string())
    })?;

    match mime.as_str() {
        "image/jpeg" | "image/jpg" => Some(ImageFormat::Jpeg),
        "image/png" => Some(ImageFormat::Png),
        "image/webp" => Some(ImageFormat::WebP),
        _ => None,
    }
}

/// Decodes, shrinks to fit `max_width`x`max_height` (never enlarges) and
/// encodes as JPEG.
fn reencode(
    bytes: &[u8],
    format: ImageFormat,
    max_width: u32,
    max_height: u32,
    quality: u8,
) -> Result<Vec<u8>, UploadError> {
    let img = image::load_from_memory_with_format(bytes, format)
        .map_err(|e| UploadError::Validation(format!("Could not decode image: {e}")))?;

    let img = if img.width() > max_width || img.height() > max_height {
        img.resize(max_width, max_height, FilterType::Lanczos3)
    } else {
        img
    };

    // JPEG has no alpha channel.
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());

    let mut buffer = Vec::new();
    JpegEncoder::new_with_quality(&mut buffer, quality)
        .encode_image(&rgb)
        .map_err(|e| UploadError::Storage(format!("Failed to encode image: {e}")))?;

    Ok(buffer)
}

/// `<millis>-<name>.jpg`, with characters outside `[A-Za-z0-9.-]` replaced.
fn stored_filename(original_name: &str, millis: i64) -> String {
    let base = original_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(original_name);
    let stem = match base.rfind('.') {
        Some(idx) if idx > 0 => &base[..idx],
        _ => base,
    };

    let mut sanitized: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if sanitized.is_empty() {
        sanitized.push_str("upload");
    }

    format!("{millis}-{sanitized}.jpg")
}

fn human_size(bytes: usize) -> String {
    const MIB: usize = 1024 * 1024;
    if bytes % MIB == 0 {
        format!("{}MB", bytes / MIB)
    } else {
        format!("{bytes} bytes")
    }
}
