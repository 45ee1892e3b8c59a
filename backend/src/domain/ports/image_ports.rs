//! Ports for uploaded image metadata and bytes.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::image::StoredImage;

use super::define_port_error;

define_port_error! {
    /// Errors raised by image metadata repositories.
    pub enum ImageRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "image repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "image repository query failed: {message}",
    }
}

define_port_error! {
    /// Errors raised by image byte stores.
    pub enum ImageStoreError {
        /// Reading or writing the backing storage failed.
        Io { message: String } => "image storage failed: {message}",
    }
}

/// Port for the `uploaded_images` metadata table.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageRepository: Send + Sync {
    /// Record a stored image.
    async fn save(&self, image: &StoredImage) -> Result<(), ImageRepositoryError>;

    /// Look up metadata by id.
    async fn find(&self, id: Uuid) -> Result<Option<StoredImage>, ImageRepositoryError>;
}

/// Port for raw image bytes keyed by file name.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Write a new file.
    async fn write(&self, file_name: &str, bytes: &[u8]) -> Result<(), ImageStoreError>;

    /// Read a file, `None` when it does not exist.
    async fn read(&self, file_name: &str) -> Result<Option<Vec<u8>>, ImageStoreError>;
}
