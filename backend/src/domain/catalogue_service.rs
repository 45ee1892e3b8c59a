//! Menu reads and maintenance.

use std::sync::Arc;

use async_trait::async_trait;
use pagination::{Page, PageRequest};
use uuid::Uuid;

use crate::domain::ports::{
    CatalogueCommand, CatalogueQuery, CatalogueRepository, CatalogueRepositoryError,
};
use crate::domain::{Category, CategoryDraft, Error, Product, ProductDraft, ProductFilter, Slug};

pub(crate) fn map_catalogue_error(error: CatalogueRepositoryError) -> Error {
    match error {
        CatalogueRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("catalogue repository unavailable: {message}"))
        }
        CatalogueRepositoryError::Query { message } => {
            Error::internal(format!("catalogue repository error: {message}"))
        }
        CatalogueRepositoryError::DuplicateSlug { slug } => {
            Error::conflict(format!("slug '{slug}' is already taken"))
        }
        CatalogueRepositoryError::UnknownCategory { category_id } => Error::invalid_field(
            "categoryId",
            format!("category {category_id} does not exist"),
        ),
        CatalogueRepositoryError::CategoryInUse { category_id } => {
            Error::conflict(format!("category {category_id} still has products"))
        }
    }
}

/// Catalogue service implementing the menu driving ports.
#[derive(Clone)]
pub struct CatalogueService<R> {
    catalogue: Arc<R>,
}

impl<R> CatalogueService<R> {
    /// Create a service over a catalogue repository.
    pub fn new(catalogue: Arc<R>) -> Self {
        Self { catalogue }
    }
}

#[async_trait]
impl<R> CatalogueQuery for CatalogueService<R>
where
    R: CatalogueRepository,
{
    async fn list_categories(&self) -> Result<Vec<Category>, Error> {
        self.catalogue
            .list_categories()
            .await
            .map_err(map_catalogue_error)
    }

    async fn list_products(
        &self,
        filter: ProductFilter,
        page: PageRequest,
    ) -> Result<Page<Product>, Error> {
        self.catalogue
            .list_products(&filter, page)
            .await
            .map_err(map_catalogue_error)
    }

    async fn product_by_slug(&self, slug: &Slug) -> Result<Product, Error> {
        self.catalogue
            .find_product_by_slug(slug)
            .await
            .map_err(map_catalogue_error)?
            .filter(|product| product.is_available)
            .ok_or_else(|| Error::not_found(format!("product '{slug}' not found")))
    }
}

#[async_trait]
impl<R> CatalogueCommand for CatalogueService<R>
where
    R: CatalogueRepository,
{
    async fn create_category(&self, draft: CategoryDraft) -> Result<Category, Error> {
        self.catalogue
            .create_category(&draft)
            .await
            .map_err(map_catalogue_error)
    }

    async fn update_category(&self, id: Uuid, draft: CategoryDraft) -> Result<Category, Error> {
        self.catalogue
            .update_category(id, &draft)
            .await
            .map_err(map_catalogue_error)?
            .ok_or_else(|| Error::not_found(format!("category {id} not found")))
    }

    async fn delete_category(&self, id: Uuid) -> Result<(), Error> {
        let deleted = self
            .catalogue
            .delete_category(id)
            .await
            .map_err(map_catalogue_error)?;
        deleted
            .then_some(())
            .ok_or_else(|| Error::not_found(format!("category {id} not found")))
    }

    async fn create_product(&self, draft: ProductDraft) -> Result<Product, Error> {
        self.catalogue
            .create_product(&draft)
            .await
            .map_err(map_catalogue_error)
    }

    async fn update_product(&self, id: Uuid, draft: ProductDraft) -> Result<Product, Error> {
        self.catalogue
            .update_product(id, &draft)
            .await
            .map_err(map_catalogue_error)?
            .ok_or_else(|| Error::not_found(format!("product {id} not found")))
    }

    async fn delete_product(&self, id: Uuid) -> Result<(), Error> {
        let deleted = self
            .catalogue
            .delete_product(id)
            .await
            .map_err(map_catalogue_error)?;
        deleted
            .then_some(())
            .ok_or_else(|| Error::not_found(format!("product {id} not found")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::MockCatalogueRepository;
    use crate::test_support::product;
    use rstest::rstest;

    fn service(repo: MockCatalogueRepository) -> CatalogueService<MockCatalogueRepository> {
        CatalogueService::new(Arc::new(repo))
    }

    #[rstest]
    #[tokio::test]
    async fn unavailable_products_read_as_missing() {
        let mut hidden = product(900, 10);
        hidden.is_available = false;
        let mut repo = MockCatalogueRepository::new();
        repo.expect_find_product_by_slug()
            .return_once(move |_| Ok(Some(hidden)));

        let slug = Slug::new("margherita").expect("slug");
        let err = service(repo)
            .product_by_slug(&slug)
            .await
            .expect_err("hidden");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[case(CatalogueRepositoryError::duplicate_slug("pizza"), ErrorCode::Conflict)]
    #[case(
        CatalogueRepositoryError::category_in_use(Uuid::nil()),
        ErrorCode::Conflict
    )]
    #[case(
        CatalogueRepositoryError::unknown_category(Uuid::nil()),
        ErrorCode::InvalidRequest
    )]
    #[case(CatalogueRepositoryError::query("boom"), ErrorCode::InternalError)]
    #[case(
        CatalogueRepositoryError::connection("down"),
        ErrorCode::ServiceUnavailable
    )]
    fn repository_errors_map_to_api_codes(
        #[case] error: CatalogueRepositoryError,
        #[case] expected: ErrorCode,
    ) {
        assert_eq!(map_catalogue_error(error).code(), expected);
    }

    #[rstest]
    #[tokio::test]
    async fn deleting_a_missing_category_is_not_found() {
        let mut repo = MockCatalogueRepository::new();
        repo.expect_delete_category().return_once(|_| Ok(false));

        let err = service(repo)
            .delete_category(Uuid::new_v4())
            .await
            .expect_err("missing");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn listing_passes_the_filter_through() {
        let filter = ProductFilter::public(Some("pizza"), Some("basil"), None)
            .expect("filter")
            .including_unavailable();
        let expected = filter.clone();
        let mut repo = MockCatalogueRepository::new();
        repo.expect_list_products()
            .withf(move |seen, _| *seen == expected)
            .return_once(|_, page| Ok(Page::new(vec![product(900, 10)], 1, page)));

        let page = service(repo)
            .list_products(filter, PageRequest::new(1, 12).expect("page"))
            .await
            .expect("listed");
        assert_eq!(page.items.len(), 1);
    }
}
