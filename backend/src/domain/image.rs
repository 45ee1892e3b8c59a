//! Uploaded menu images.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Largest accepted upload.
pub const IMAGE_MAX_BYTES: usize = 5 * 1024 * 1024;

/// Rejected upload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImageValidationError {
    #[error("unsupported image type '{0}'")]
    UnsupportedType(String),
    #[error("image must not be empty")]
    Empty,
    #[error("image must be at most {max} bytes")]
    TooLarge { max: usize },
}

/// Accepted image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageKind {
    Png,
    Jpeg,
    Webp,
    Gif,
}

impl ImageKind {
    /// Match a `Content-Type` value, ignoring parameters and case.
    ///
    /// # Examples
    /// ```
    /// use bistro::domain::image::ImageKind;
    ///
    /// assert_eq!(ImageKind::from_content_type("Image/PNG; q=1").ok(), Some(ImageKind::Png));
    /// assert!(ImageKind::from_content_type("text/plain").is_err());
    /// ```
    pub fn from_content_type(raw: &str) -> Result<Self, ImageValidationError> {
        let essence = raw
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match essence.as_str() {
            "image/png" => Ok(Self::Png),
            "image/jpeg" | "image/jpg" => Ok(Self::Jpeg),
            "image/webp" => Ok(Self::Webp),
            "image/gif" => Ok(Self::Gif),
            _ => Err(ImageValidationError::UnsupportedType(raw.to_owned())),
        }
    }

    /// Canonical MIME type.
    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Webp => "image/webp",
            Self::Gif => "image/gif",
        }
    }

    /// File extension used on disk.
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Webp => "webp",
            Self::Gif => "gif",
        }
    }
}

/// A validated upload waiting to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub kind: ImageKind,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Check type and size.
    pub fn new(content_type: &str, bytes: Vec<u8>) -> Result<Self, ImageValidationError> {
        let kind = ImageKind::from_content_type(content_type)?;
        if bytes.is_empty() {
            return Err(ImageValidationError::Empty);
        }
        if bytes.len() > IMAGE_MAX_BYTES {
            return Err(ImageValidationError::TooLarge {
                max: IMAGE_MAX_BYTES,
            });
        }
        Ok(Self { kind, bytes })
    }
}

/// Metadata of a stored image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    pub id: Uuid,
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub created_at: DateTime<Utc>,
}

impl StoredImage {
    /// Public URL the image is served from.
    pub fn url(&self) -> String {
        format!("/api/v1/uploads/{}", self.id)
    }
}

/// Response to a successful upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadedImage {
    pub id: Uuid,
    pub url: String,
}

impl From<&StoredImage> for UploadedImage {
    fn from(value: &StoredImage) -> Self {
        Self {
            id: value.id,
            url: value.url(),
        }
    }
}

/// Image bytes ready to serve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageContent {
    pub content_type: String,
    pub bytes: Vec<u8>,
}
