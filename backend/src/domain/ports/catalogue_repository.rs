//! Port for menu category and product persistence.

use async_trait::async_trait;
use pagination::{Page, PageRequest};
use uuid::Uuid;

use crate::domain::{Category, CategoryDraft, Product, ProductDraft, ProductFilter, Slug};

use super::define_port_error;

define_port_error! {
    /// Errors raised by catalogue repository adapters.
    pub enum CatalogueRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "catalogue repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "catalogue repository query failed: {message}",
        /// Another category or product already uses the slug.
        DuplicateSlug { slug: String } => "slug '{slug}' is already taken",
        /// The product references a category that does not exist.
        UnknownCategory { category_id: Uuid } => "category {category_id} does not exist",
        /// The category still has products.
        CategoryInUse { category_id: Uuid } => "category {category_id} still has products",
    }
}

/// Port for reading and writing the menu.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogueRepository: Send + Sync {
    /// All categories ordered by name.
    async fn list_categories(&self) -> Result<Vec<Category>, CatalogueRepositoryError>;

    /// Insert a category.
    async fn create_category(
        &self,
        draft: &CategoryDraft,
    ) -> Result<Category, CatalogueRepositoryError>;

    /// Replace a category, `None` when missing.
    async fn update_category(
        &self,
        id: Uuid,
        draft: &CategoryDraft,
    ) -> Result<Option<Category>, CatalogueRepositoryError>;

    /// Delete a category, `false` when missing.
    async fn delete_category(&self, id: Uuid) -> Result<bool, CatalogueRepositoryError>;

    /// Page through products matching `filter`, newest first.
    async fn list_products(
        &self,
        filter: &ProductFilter,
        page: PageRequest,
    ) -> Result<Page<Product>, CatalogueRepositoryError>;

    /// Find a product by slug regardless of availability.
    async fn find_product_by_slug(
        &self,
        slug: &Slug,
    ) -> Result<Option<Product>, CatalogueRepositoryError>;

    /// Find a product by id regardless of availability.
    async fn find_product(&self, id: Uuid) -> Result<Option<Product>, CatalogueRepositoryError>;

    /// Insert a product.
    async fn create_product(
        &self,
        draft: &ProductDraft,
    ) -> Result<Product, CatalogueRepositoryError>;

    /// Replace a product, `None` when missing.
    async fn update_product(
        &self,
        id: Uuid,
        draft: &ProductDraft,
    ) -> Result<Option<Product>, CatalogueRepositoryError>;

    /// Delete a product, `false` when missing.
    async fn delete_product(&self, id: Uuid) -> Result<bool, CatalogueRepositoryError>;
}
