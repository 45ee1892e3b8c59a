//! PostgreSQL-backed `ImageRepository` for upload metadata.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::image::StoredImage;
use crate::domain::ports::{ImageRepository, ImageRepositoryError};

use super::diesel_basic_error_mapping::{basic, classify, pool_message};
use super::models::ImageRow;
use super::pool::{DbPool, PoolError};
use super::schema::uploaded_images;

/// Diesel implementation of [`ImageRepository`].
#[derive(Clone)]
pub struct DieselImageRepository {
    pool: DbPool,
}

impl DieselImageRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ImageRepositoryError {
    ImageRepositoryError::connection(pool_message(error))
}

fn map_diesel_error(error: diesel::result::Error) -> ImageRepositoryError {
    basic(
        classify(error),
        ImageRepositoryError::connection,
        ImageRepositoryError::query,
    )
}

#[async_trait]
impl ImageRepository for DieselImageRepository {
    async fn save(&self, image: &StoredImage) -> Result<(), ImageRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(uploaded_images::table)
            .values(&ImageRow::from(image))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<Option<StoredImage>, ImageRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = uploaded_images::table
            .find(id)
            .select(ImageRow::as_select())
            .first::<ImageRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(StoredImage::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn checkout_failures_are_connection_errors() {
        let mapped = map_pool_error(PoolError::checkout("timed out"));
        assert!(matches!(mapped, ImageRepositoryError::Connection { .. }));
    }
}
