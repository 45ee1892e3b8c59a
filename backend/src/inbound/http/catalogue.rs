//! Public menu endpoints.
//!
//! ```text
//! GET /api/v1/categories
//! GET /api/v1/products?category=pizza&q=basil&featured=true&page=1&limit=12
//! GET /api/v1/products/{slug}
//! ```

use actix_web::{get, web};
use chrono::{DateTime, Utc};
use pagination::PageLimits;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::{Category, Error, Product, ProductFilter, Slug};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ErrorSchema, PageResponse};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{field_error, page_request};

/// Product listing page size defaults.
pub(crate) fn product_page_limits() -> PageLimits {
    PageLimits::new(12, 100)
}

/// Menu section.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponse {
    pub id: Uuid,
    #[schema(example = "Pizza")]
    pub name: String,
    #[schema(example = "pizza")]
    pub slug: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

impl From<Category> for CategoryResponse {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
            slug: category.slug.into(),
            description: category.description,
            image_url: category.image_url,
        }
    }
}

/// Dish on the menu.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: Uuid,
    pub category_id: Uuid,
    #[schema(example = "Margherita")]
    pub name: String,
    #[schema(example = "margherita")]
    pub slug: String,
    pub description: Option<String>,
    #[schema(example = 1250)]
    pub price_cents: i64,
    pub image_url: Option<String>,
    #[schema(example = 15)]
    pub preparation_minutes: u32,
    pub is_available: bool,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            category_id: product.category_id,
            name: product.name,
            slug: product.slug.into(),
            description: product.description,
            price_cents: product.price.cents(),
            image_url: product.image_url,
            preparation_minutes: product.preparation_minutes.get(),
            is_available: product.is_available,
            is_featured: product.is_featured,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

/// Product search and pagination query.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ProductQuery {
    /// Category slug.
    pub category: Option<String>,
    /// Case-insensitive substring of the name or description.
    pub q: Option<String>,
    pub featured: Option<bool>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl ProductQuery {
    pub(crate) fn filter(&self) -> Result<ProductFilter, Error> {
        ProductFilter::public(self.category.as_deref(), self.q.as_deref(), self.featured)
            .map_err(|err| field_error(err.field(), &err))
    }
}

/// List every menu category.
#[utoipa::path(
    get,
    path = "/api/v1/categories",
    responses(
        (status = 200, description = "Categories", body = [CategoryResponse]),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["catalogue"],
    operation_id = "listCategories",
    security([])
)]
#[get("/categories")]
pub async fn list_categories(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<CategoryResponse>>> {
    let categories = state.catalogue.list_categories().await?;
    Ok(web::Json(
        categories.into_iter().map(CategoryResponse::from).collect(),
    ))
}

/// Search available products.
#[utoipa::path(
    get,
    path = "/api/v1/products",
    params(ProductQuery),
    responses(
        (status = 200, description = "Matching products", body = PageResponse<ProductResponse>),
        (status = 400, description = "Invalid query", body = ErrorSchema)
    ),
    tags = ["catalogue"],
    operation_id = "listProducts",
    security([])
)]
#[get("/products")]
pub async fn list_products(
    state: web::Data<HttpState>,
    query: web::Query<ProductQuery>,
) -> ApiResult<web::Json<PageResponse<ProductResponse>>> {
    let filter = query.filter()?;
    let request = page_request(product_page_limits(), query.page, query.limit)?;
    let page = state.catalogue.list_products(filter, request).await?;
    Ok(web::Json(PageResponse::from_page(page, ProductResponse::from)))
}

/// Fetch one available product by slug.
#[utoipa::path(
    get,
    path = "/api/v1/products/{slug}",
    params(("slug" = String, Path, description = "Product slug")),
    responses(
        (status = 200, description = "Product", body = ProductResponse),
        (status = 404, description = "Unknown product", body = ErrorSchema)
    ),
    tags = ["catalogue"],
    operation_id = "productBySlug",
    security([])
)]
#[get("/products/{slug}")]
pub async fn product_by_slug(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<ProductResponse>> {
    // A malformed slug cannot name a stored product.
    let slug = Slug::new(path.into_inner()).map_err(|_| Error::not_found("product not found"))?;
    let product = state.catalogue.product_by_slug(&slug).await?;
    Ok(web::Json(product.into()))
}
