//! PostgreSQL-backed `CatalogueRepository`.
//!
//! Slug uniqueness and the category/product foreign key are enforced by the
//! database; their violations are mapped onto the port's domain variants.

use async_trait::async_trait;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use pagination::{Page, PageRequest};
use uuid::Uuid;

use crate::domain::ports::{CatalogueRepository, CatalogueRepositoryError};
use crate::domain::{Category, CategoryDraft, Product, ProductDraft, ProductFilter, Slug};

use super::diesel_basic_error_mapping::{DbFailure, basic, classify, count_to_total, pool_message};
use super::models::{CategoryChanges, CategoryRow, ProductChanges, ProductRow};
use super::pool::{DbPool, PoolError};
use super::schema::{categories, products};

const CATEGORY_SLUG_UNIQUE: &str = "categories_slug_key";
const PRODUCT_SLUG_UNIQUE: &str = "products_slug_key";
const PRODUCT_CATEGORY_FK: &str = "products_category_id_fkey";

/// Diesel implementation of [`CatalogueRepository`].
#[derive(Clone)]
pub struct DieselCatalogueRepository {
    pool: DbPool,
}

impl DieselCatalogueRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> CatalogueRepositoryError {
    CatalogueRepositoryError::connection(pool_message(error))
}

fn fallback(failure: DbFailure) -> CatalogueRepositoryError {
    basic(
        failure,
        CatalogueRepositoryError::connection,
        CatalogueRepositoryError::query,
    )
}

fn map_diesel_error(error: diesel::result::Error) -> CatalogueRepositoryError {
    fallback(classify(error))
}

fn map_category_write(error: diesel::result::Error, slug: &Slug) -> CatalogueRepositoryError {
    let failure = classify(error);
    if failure.is_unique(CATEGORY_SLUG_UNIQUE) {
        return CatalogueRepositoryError::duplicate_slug(slug.as_ref());
    }
    fallback(failure)
}

fn map_product_write(error: diesel::result::Error, draft: &ProductDraft) -> CatalogueRepositoryError {
    let failure = classify(error);
    if failure.is_unique(PRODUCT_SLUG_UNIQUE) {
        return CatalogueRepositoryError::duplicate_slug(draft.slug.as_ref());
    }
    if failure.is_foreign_key(PRODUCT_CATEGORY_FK) {
        return CatalogueRepositoryError::unknown_category(draft.category_id);
    }
    fallback(failure)
}

/// Escape `LIKE` wildcards so search terms match literally.
fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

fn filtered(filter: &ProductFilter) -> products::BoxedQuery<'_, Pg> {
    let mut query = products::table.into_boxed();
    if !filter.include_unavailable {
        query = query.filter(products::is_available.eq(true));
    }
    if let Some(slug) = &filter.category {
        query = query.filter(
            products::category_id.eq_any(
                categories::table
                    .filter(categories::slug.eq(slug.as_ref()))
                    .select(categories::id),
            ),
        );
    }
    if let Some(term) = &filter.search {
        let pattern = like_pattern(term);
        query = query.filter(
            products::name.ilike(pattern.clone()).or(products::description
                .assume_not_null()
                .ilike(pattern)),
        );
    }
    if let Some(featured) = filter.featured {
        query = query.filter(products::is_featured.eq(featured));
    }
    query
}

fn category_changes(draft: &CategoryDraft) -> CategoryChanges<'_> {
    CategoryChanges {
        name: &draft.name,
        slug: draft.slug.as_ref(),
        description: draft.description.as_deref(),
        image_url: draft.image_url.as_deref(),
    }
}

fn product_changes(draft: &ProductDraft) -> ProductChanges<'_> {
    ProductChanges {
        category_id: draft.category_id,
        name: &draft.name,
        slug: draft.slug.as_ref(),
        description: draft.description.as_deref(),
        price_cents: draft.price.cents(),
        image_url: draft.image_url.as_deref(),
        preparation_minutes: i32::try_from(draft.preparation_minutes.get()).unwrap_or(i32::MAX),
        is_available: draft.is_available,
        is_featured: draft.is_featured,
    }
}

fn to_category(row: CategoryRow) -> Result<Category, CatalogueRepositoryError> {
    row.into_domain().map_err(CatalogueRepositoryError::query)
}

fn to_product(row: ProductRow) -> Result<Product, CatalogueRepositoryError> {
    row.into_domain().map_err(CatalogueRepositoryError::query)
}

#[async_trait]
impl CatalogueRepository for DieselCatalogueRepository {
    async fn list_categories(&self) -> Result<Vec<Category>, CatalogueRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        categories::table
            .select(CategoryRow::as_select())
            .order(categories::name.asc())
            .load::<CategoryRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?
            .into_iter()
            .map(to_category)
            .collect()
    }

    async fn create_category(
        &self,
        draft: &CategoryDraft,
    ) -> Result<Category, CatalogueRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = diesel::insert_into(categories::table)
            .values((categories::id.eq(Uuid::new_v4()), category_changes(draft)))
            .returning(CategoryRow::as_returning())
            .get_result::<CategoryRow>(&mut conn)
            .await
            .map_err(|err| map_category_write(err, &draft.slug))?;
        to_category(row)
    }

    async fn update_category(
        &self,
        id: Uuid,
        draft: &CategoryDraft,
    ) -> Result<Option<Category>, CatalogueRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = diesel::update(categories::table.find(id))
            .set(category_changes(draft))
            .returning(CategoryRow::as_returning())
            .get_result::<CategoryRow>(&mut conn)
            .await
            .optional()
            .map_err(|err| map_category_write(err, &draft.slug))?;
        row.map(to_category).transpose()
    }

    async fn delete_category(&self, id: Uuid) -> Result<bool, CatalogueRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(categories::table.find(id))
            .execute(&mut conn)
            .await
            .map_err(|err| {
                let failure = classify(err);
                if failure.is_foreign_key(PRODUCT_CATEGORY_FK) {
                    CatalogueRepositoryError::category_in_use(id)
                } else {
                    fallback(failure)
                }
            })?;
        Ok(deleted > 0)
    }

    async fn list_products(
        &self,
        filter: &ProductFilter,
        page: PageRequest,
    ) -> Result<Page<Product>, CatalogueRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total: i64 = filtered(filter)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let items = filtered(filter)
            .select(ProductRow::as_select())
            .order((products::created_at.desc(), products::id.asc()))
            .limit(page.limit_i64())
            .offset(page.offset())
            .load::<ProductRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?
            .into_iter()
            .map(to_product)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, count_to_total(total), page))
    }

    async fn find_product_by_slug(
        &self,
        slug: &Slug,
    ) -> Result<Option<Product>, CatalogueRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = products::table
            .filter(products::slug.eq(slug.as_ref()))
            .select(ProductRow::as_select())
            .first::<ProductRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(to_product).transpose()
    }

    async fn find_product(&self, id: Uuid) -> Result<Option<Product>, CatalogueRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = products::table
            .find(id)
            .select(ProductRow::as_select())
            .first::<ProductRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(to_product).transpose()
    }

    async fn create_product(
        &self,
        draft: &ProductDraft,
    ) -> Result<Product, CatalogueRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = diesel::insert_into(products::table)
            .values((products::id.eq(Uuid::new_v4()), product_changes(draft)))
            .returning(ProductRow::as_returning())
            .get_result::<ProductRow>(&mut conn)
            .await
            .map_err(|err| map_product_write(err, draft))?;
        to_product(row)
    }

    async fn update_product(
        &self,
        id: Uuid,
        draft: &ProductDraft,
    ) -> Result<Option<Product>, CatalogueRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = diesel::update(products::table.find(id))
            .set((product_changes(draft), products::updated_at.eq(diesel::dsl::now)))
            .returning(ProductRow::as_returning())
            .get_result::<ProductRow>(&mut conn)
            .await
            .optional()
            .map_err(|err| map_product_write(err, draft))?;
        row.map(to_product).transpose()
    }

    async fn delete_product(&self, id: Uuid) -> Result<bool, CatalogueRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(products::table.find(id))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("pizza", "%pizza%")]
    #[case("50%", "%50\\%%")]
    #[case("a_b", "%a\\_b%")]
    #[case("c:\\", "%c:\\\\%")]
    fn search_terms_match_literally(#[case] term: &str, #[case] expected: &str) {
        assert_eq!(like_pattern(term), expected);
    }

    #[rstest]
    fn checkout_failures_are_connection_errors() {
        let mapped = map_pool_error(PoolError::checkout("timed out"));
        assert!(matches!(mapped, CatalogueRepositoryError::Connection { .. }));
    }

    #[rstest]
    fn public_filters_render_sql() {
        let filter = ProductFilter::public(Some("pizza"), Some("basil"), Some(true))
            .expect("valid filter");
        let sql = diesel::debug_query::<Pg, _>(&filtered(&filter)).to_string();
        assert!(sql.contains("\"is_available\" = $1"), "{sql}");
        assert!(sql.contains("ILIKE"), "{sql}");
        assert!(sql.contains("\"is_featured\""), "{sql}");
    }
}
