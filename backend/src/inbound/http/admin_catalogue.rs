//! Admin menu management.
//!
//! ```text
//! POST   /api/v1/admin/categories
//! PUT    /api/v1/admin/categories/{id}
//! DELETE /api/v1/admin/categories/{id}
//! GET    /api/v1/admin/products
//! POST   /api/v1/admin/products
//! PUT    /api/v1/admin/products/{id}
//! DELETE /api/v1/admin/products/{id}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{
    CatalogueValidationError, CategoryDraft, CategoryInput, Error, ProductDraft, ProductInput,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::require_admin;
use crate::inbound::http::catalogue::{
    CategoryResponse, ProductQuery, ProductResponse, product_page_limits,
};
use crate::inbound::http::schemas::{ErrorSchema, PageResponse};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, field_error, page_request, parse_uuid};

const ID: FieldName = FieldName::new("id");

/// Category create/update body. A missing slug is derived from the name.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRequest {
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

impl TryFrom<CategoryRequest> for CategoryDraft {
    type Error = CatalogueValidationError;

    fn try_from(value: CategoryRequest) -> Result<Self, Self::Error> {
        CategoryInput {
            name: value.name,
            slug: value.slug,
            description: value.description,
            image_url: value.image_url,
        }
        .try_into()
    }
}

fn default_available() -> bool {
    true
}

/// Product create/update body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductRequest {
    pub category_id: Uuid,
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    #[schema(example = 1250)]
    pub price_cents: i64,
    pub image_url: Option<String>,
    #[schema(example = 15)]
    pub preparation_minutes: u32,
    #[serde(default = "default_available")]
    pub is_available: bool,
    #[serde(default)]
    pub is_featured: bool,
}

impl TryFrom<ProductRequest> for ProductDraft {
    type Error = CatalogueValidationError;

    fn try_from(value: ProductRequest) -> Result<Self, Self::Error> {
        ProductInput {
            category_id: value.category_id,
            name: value.name,
            slug: value.slug,
            description: value.description,
            price_cents: value.price_cents,
            image_url: value.image_url,
            preparation_minutes: value.preparation_minutes,
            is_available: value.is_available,
            is_featured: value.is_featured,
        }
        .try_into()
    }
}

fn invalid(err: CatalogueValidationError) -> Error {
    field_error(err.field(), &err)
}

/// Create a menu category.
#[utoipa::path(
    post,
    path = "/api/v1/admin/categories",
    request_body = CategoryRequest,
    responses(
        (status = 201, description = "Created", body = CategoryResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 409, description = "Slug already taken", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "createCategory"
)]
#[post("/admin/categories")]
pub async fn create_category(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CategoryRequest>,
) -> ApiResult<HttpResponse> {
    require_admin(&state, &session).await?;
    let draft = CategoryDraft::try_from(payload.into_inner()).map_err(invalid)?;
    let category = state.catalogue_admin.create_category(draft).await?;
    Ok(HttpResponse::Created().json(CategoryResponse::from(category)))
}

/// Replace a category's fields.
#[utoipa::path(
    put,
    path = "/api/v1/admin/categories/{id}",
    params(("id" = Uuid, Path, description = "Category id")),
    request_body = CategoryRequest,
    responses(
        (status = 200, description = "Updated", body = CategoryResponse),
        (status = 404, description = "Unknown category", body = ErrorSchema),
        (status = 409, description = "Slug already taken", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "updateCategory"
)]
#[put("/admin/categories/{id}")]
pub async fn update_category(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<CategoryRequest>,
) -> ApiResult<web::Json<CategoryResponse>> {
    require_admin(&state, &session).await?;
    let id = parse_uuid(path.into_inner(), ID)?;
    let draft = CategoryDraft::try_from(payload.into_inner()).map_err(invalid)?;
    let category = state.catalogue_admin.update_category(id, draft).await?;
    Ok(web::Json(category.into()))
}

/// Delete an empty category.
#[utoipa::path(
    delete,
    path = "/api/v1/admin/categories/{id}",
    params(("id" = Uuid, Path, description = "Category id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Unknown category", body = ErrorSchema),
        (status = 409, description = "Category still has products", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "deleteCategory"
)]
#[delete("/admin/categories/{id}")]
pub async fn delete_category(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    require_admin(&state, &session).await?;
    let id = parse_uuid(path.into_inner(), ID)?;
    state.catalogue_admin.delete_category(id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Search products, including those hidden from the menu.
#[utoipa::path(
    get,
    path = "/api/v1/admin/products",
    params(ProductQuery),
    responses(
        (status = 200, description = "Matching products", body = PageResponse<ProductResponse>),
        (status = 403, description = "Forbidden", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "adminListProducts"
)]
#[get("/admin/products")]
pub async fn list_all_products(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<ProductQuery>,
) -> ApiResult<web::Json<PageResponse<ProductResponse>>> {
    require_admin(&state, &session).await?;
    let filter = query.filter()?.including_unavailable();
    let request = page_request(product_page_limits(), query.page, query.limit)?;
    let page = state.catalogue.list_products(filter, request).await?;
    Ok(web::Json(PageResponse::from_page(page, ProductResponse::from)))
}

/// Add a dish.
#[utoipa::path(
    post,
    path = "/api/v1/admin/products",
    request_body = ProductRequest,
    responses(
        (status = 201, description = "Created", body = ProductResponse),
        (status = 400, description = "Invalid request or unknown category", body = ErrorSchema),
        (status = 409, description = "Slug already taken", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "createProduct"
)]
#[post("/admin/products")]
pub async fn create_product(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<ProductRequest>,
) -> ApiResult<HttpResponse> {
    require_admin(&state, &session).await?;
    let draft = ProductDraft::try_from(payload.into_inner()).map_err(invalid)?;
    let product = state.catalogue_admin.create_product(draft).await?;
    Ok(HttpResponse::Created().json(ProductResponse::from(product)))
}

/// Replace a dish's fields.
#[utoipa::path(
    put,
    path = "/api/v1/admin/products/{id}",
    params(("id" = Uuid, Path, description = "Product id")),
    request_body = ProductRequest,
    responses(
        (status = 200, description = "Updated", body = ProductResponse),
        (status = 404, description = "Unknown product", body = ErrorSchema),
        (status = 409, description = "Slug already taken", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "updateProduct"
)]
#[put("/admin/products/{id}")]
pub async fn update_product(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<ProductRequest>,
) -> ApiResult<web::Json<ProductResponse>> {
    require_admin(&state, &session).await?;
    let id = parse_uuid(path.into_inner(), ID)?;
    let draft = ProductDraft::try_from(payload.into_inner()).map_err(invalid)?;
    let product = state.catalogue_admin.update_product(id, draft).await?;
    Ok(web::Json(product.into()))
}

/// Remove a dish.
#[utoipa::path(
    delete,
    path = "/api/v1/admin/products/{id}",
    params(("id" = Uuid, Path, description = "Product id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Unknown product", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "deleteProduct"
)]
#[delete("/admin/products/{id}")]
pub async fn delete_product(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    require_admin(&state, &session).await?;
    let id = parse_uuid(path.into_inner(), ID)?;
    state.catalogue_admin.delete_product(id).await?;
    Ok(HttpResponse::NoContent().finish())
}
