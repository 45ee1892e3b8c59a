//! Driving port for uploaded images.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::image::{ImageContent, ImageUpload, UploadedImage};

/// Store and serve images.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageLibrary: Send + Sync {
    /// Persist an upload under a fresh id.
    async fn upload(&self, upload: ImageUpload) -> Result<UploadedImage, Error>;

    /// Bytes and content type of a stored image.
    async fn fetch(&self, id: Uuid) -> Result<ImageContent, Error>;
}
