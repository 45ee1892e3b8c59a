//! Image uploads: bytes go to the store, metadata to the repository.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::image::{ImageContent, ImageUpload, StoredImage, UploadedImage};
use crate::domain::ports::{
    ImageLibrary, ImageRepository, ImageRepositoryError, ImageStore, ImageStoreError,
};

fn map_repository_error(error: ImageRepositoryError) -> Error {
    match error {
        ImageRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("image repository unavailable: {message}"))
        }
        ImageRepositoryError::Query { message } => {
            Error::internal(format!("image repository error: {message}"))
        }
    }
}

fn map_store_error(error: ImageStoreError) -> Error {
    tracing::error!(%error, "image storage failed");
    Error::internal("image storage failed")
}

/// Image service implementing [`ImageLibrary`].
#[derive(Clone)]
pub struct ImageService<R, S> {
    images: Arc<R>,
    store: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<R, S> ImageService<R, S> {
    /// Create a service over a metadata repository and a byte store.
    pub fn new(images: Arc<R>, store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self {
            images,
            store,
            clock,
        }
    }
}

#[async_trait]
impl<R, S> ImageLibrary for ImageService<R, S>
where
    R: ImageRepository,
    S: ImageStore,
{
    async fn upload(&self, upload: ImageUpload) -> Result<UploadedImage, Error> {
        let id = Uuid::new_v4();
        let file_name = format!("{id}.{}", upload.kind.extension());
        self.store
            .write(&file_name, &upload.bytes)
            .await
            .map_err(map_store_error)?;
        let stored = StoredImage {
            id,
            file_name,
            content_type: upload.kind.content_type().to_owned(),
            size_bytes: i64::try_from(upload.bytes.len()).unwrap_or(i64::MAX),
            created_at: self.clock.utc(),
        };
        self.images
            .save(&stored)
            .await
            .map_err(map_repository_error)?;
        tracing::info!(image_id = %id, size = stored.size_bytes, "image stored");
        Ok(UploadedImage::from(&stored))
    }

    async fn fetch(&self, id: Uuid) -> Result<ImageContent, Error> {
        let stored = self
            .images
            .find(id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found(format!("image {id} not found")))?;
        let bytes = self
            .store
            .read(&stored.file_name)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::not_found(format!("image {id} not found")))?;
        Ok(ImageContent {
            content_type: stored.content_type,
            bytes,
        })
    }
}
