//! Image Store - menu item image blob storage
//!
//! 上传图片统一转为 JPEG (质量 85)，以内容 SHA256 命名，相同内容只存一份。
//! `public_id` 即文件名去掉扩展名，`url` 指向 `/api/image/{public_id}.jpg`。

use std::io::Cursor;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;
use sha2::{Digest, Sha256};
use shared::{AppError, ErrorCode};
use thiserror::Error;

/// Supported upload extensions
pub const SUPPORTED_FORMATS: &[&str] = &["png", "jpg", "jpeg", "webp"];

/// JPEG quality for dish images
const JPEG_QUALITY: u8 = 85;

#[derive(Debug, Error)]
pub enum ImageStoreError {
    #[error("File too large. Maximum size is {max} bytes")]
    TooLarge { max: usize },

    #[error("Unsupported file format '{0}'. Supported: png, jpg, jpeg, webp")]
    UnsupportedFormat(String),

    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("Image not found: {0}")]
    NotFound(String),

    #[error("Image store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image encoding failed: {0}")]
    Encode(String),
}

impl From<ImageStoreError> for AppError {
    fn from(err: ImageStoreError) -> Self {
        let code = match &err {
            ImageStoreError::TooLarge { .. } => ErrorCode::ImageTooLarge,
            ImageStoreError::UnsupportedFormat(_) | ImageStoreError::InvalidImage(_) => {
                ErrorCode::ImageFormatUnsupported
            }
            ImageStoreError::NotFound(_) => ErrorCode::ImageNotFound,
            ImageStoreError::Io(_) | ImageStoreError::Encode(_) => ErrorCode::ImageStoreFailed,
        };
        AppError::dependency(code, err.to_string())
    }
}

/// Result of a successful upload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredImage {
    pub url: String,
    pub public_id: String,
    pub width: u32,
    pub height: u32,
    pub format: String,
    pub size: usize,
}

/// Blob store for menu images
#[async_trait]
pub trait ImageStore: Send + Sync {
    async fn put(&self, data: Vec<u8>, filename: &str) -> Result<StoredImage, ImageStoreError>;

    async fn delete(&self, public_id: &str) -> Result<(), ImageStoreError>;

    /// Local path of a stored file, if this store serves files itself
    fn resolve(&self, filename: &str) -> Option<PathBuf>;
}

/// Calculate SHA256 hash of data
fn calculate_hash(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Hex hash ids only (no separators, no traversal)
fn is_valid_public_id(public_id: &str) -> bool {
    !public_id.is_empty() && public_id.chars().all(|c| c.is_ascii_hexdigit())
}

/// Decode, validate and re-encode as JPEG
fn process_image(data: &[u8]) -> Result<(Vec<u8>, u32, u32), ImageStoreError> {
    let img = image::load_from_memory(data)
        .map_err(|e| ImageStoreError::InvalidImage(e.to_string()))?;

    let mut buffer = Vec::new();
    {
        let mut cursor = Cursor::new(&mut buffer);
        let rgb_img = img.to_rgb8();
        let encoder =
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut cursor, JPEG_QUALITY);
        rgb_img
            .write_with_encoder(encoder)
            .map_err(|e| ImageStoreError::Encode(e.to_string()))?;
    }
    Ok((buffer, img.width(), img.height()))
}

/// Local-disk image store under `<WORK_DIR>/uploads/images`
#[derive(Debug, Clone)]
pub struct LocalImageStore {
    images_dir: PathBuf,
    max_bytes: usize,
}

impl LocalImageStore {
    pub fn new(images_dir: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self {
            images_dir: images_dir.into(),
            max_bytes,
        }
    }

    pub fn images_dir(&self) -> &Path {
        &self.images_dir
    }

    fn validate(&self, data: &[u8], filename: &str) -> Result<(), ImageStoreError> {
        if data.len() > self.max_bytes {
            return Err(ImageStoreError::TooLarge {
                max: self.max_bytes,
            });
        }
        if data.is_empty() {
            return Err(ImageStoreError::InvalidImage("Empty file provided".into()));
        }
        let ext = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();
        if !SUPPORTED_FORMATS.contains(&ext.as_str()) {
            return Err(ImageStoreError::UnsupportedFormat(ext));
        }
        Ok(())
    }
}

#[async_trait]
impl ImageStore for LocalImageStore {
    async fn put(&self, data: Vec<u8>, filename: &str) -> Result<StoredImage, ImageStoreError> {
        self.validate(&data, filename)?;

        let (jpeg, width, height) = tokio::task::spawn_blocking(move || process_image(&data))
            .await
            .map_err(|e| ImageStoreError::Encode(e.to_string()))??;

        let hash = calculate_hash(&jpeg);
        let stored_name = format!("{}.jpg", hash);
        let path = self.images_dir.join(&stored_name);

        if tokio::fs::try_exists(&path).await? {
            tracing::debug!(hash = %hash, "Image already stored, reusing");
        } else {
            tokio::fs::create_dir_all(&self.images_dir).await?;
            tokio::fs::write(&path, &jpeg).await?;
            tracing::info!(hash = %hash, size = jpeg.len(), "Image stored");
        }

        Ok(StoredImage {
            url: format!("/api/image/{}", stored_name),
            public_id: hash,
            width,
            height,
            format: "jpg".to_string(),
            size: jpeg.len(),
        })
    }

    async fn delete(&self, public_id: &str) -> Result<(), ImageStoreError> {
        if !is_valid_public_id(public_id) {
            return Err(ImageStoreError::NotFound(public_id.to_string()));
        }
        let path = self.images_dir.join(format!("{}.jpg", public_id));
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                tracing::info!(public_id = %public_id, "Image deleted");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ImageStoreError::NotFound(public_id.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn resolve(&self, filename: &str) -> Option<PathBuf> {
        let stem = filename.strip_suffix(".jpg")?;
        is_valid_public_id(stem).then(|| self.images_dir.join(filename))
    }
}
