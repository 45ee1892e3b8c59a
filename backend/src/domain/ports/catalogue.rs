//! Driving ports for the menu.

use async_trait::async_trait;
use pagination::{Page, PageRequest};
use uuid::Uuid;

use crate::domain::{Category, CategoryDraft, Error, Product, ProductDraft, ProductFilter, Slug};

/// Menu reads for customers and admins.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogueQuery: Send + Sync {
    /// Every category.
    async fn list_categories(&self) -> Result<Vec<Category>, Error>;

    /// Page through products matching `filter`.
    async fn list_products(
        &self,
        filter: ProductFilter,
        page: PageRequest,
    ) -> Result<Page<Product>, Error>;

    /// One available product by slug; unavailable products read as missing.
    async fn product_by_slug(&self, slug: &Slug) -> Result<Product, Error>;
}

/// Menu maintenance.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogueCommand: Send + Sync {
    /// Add a category.
    async fn create_category(&self, draft: CategoryDraft) -> Result<Category, Error>;

    /// Replace a category.
    async fn update_category(&self, id: Uuid, draft: CategoryDraft) -> Result<Category, Error>;

    /// Remove an empty category.
    async fn delete_category(&self, id: Uuid) -> Result<(), Error>;

    /// Add a product.
    async fn create_product(&self, draft: ProductDraft) -> Result<Product, Error>;

    /// Replace a product.
    async fn update_product(&self, id: Uuid, draft: ProductDraft) -> Result<Product, Error>;

    /// Remove a product; past order items keep their snapshot.
    async fn delete_product(&self, id: Uuid) -> Result<(), Error>;
}
