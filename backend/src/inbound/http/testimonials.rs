//! Testimonial submission and moderation.

use actix_web::{HttpResponse, delete, get, patch, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::testimonial::{Testimonial, TestimonialDraft};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::{require_admin, require_user};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, field_error, parse_uuid};

const TESTIMONIAL_ID: FieldName = FieldName::new("id");

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TestimonialResponse {
    pub id: Uuid,
    pub author_name: String,
    pub content: String,
    #[schema(example = 5)]
    pub rating: u8,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Testimonial> for TestimonialResponse {
    fn from(testimonial: Testimonial) -> Self {
        Self {
            id: testimonial.id,
            author_name: testimonial.author_name,
            content: testimonial.content,
            rating: testimonial.rating.into(),
            is_published: testimonial.is_published,
            created_at: testimonial.created_at,
        }
    }
}

fn responses(testimonials: Vec<Testimonial>) -> Vec<TestimonialResponse> {
    testimonials
        .into_iter()
        .map(TestimonialResponse::from)
        .collect()
}

/// Body for `POST /api/v1/testimonials`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct TestimonialRequest {
    #[schema(example = "Best margherita in town.")]
    pub content: String,
    #[schema(example = 5, minimum = 1, maximum = 5)]
    pub rating: u8,
}

/// Body for `PATCH /api/v1/admin/testimonials/{id}`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublishRequest {
    pub is_published: bool,
}

/// Published testimonials.
#[utoipa::path(
    get,
    path = "/api/v1/testimonials",
    responses((status = 200, description = "Published testimonials", body = [TestimonialResponse])),
    tags = ["testimonials"],
    operation_id = "listTestimonials"
)]
#[get("/testimonials")]
pub async fn published(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<TestimonialResponse>>> {
    let testimonials = state.testimonials.published().await?;
    Ok(web::Json(responses(testimonials)))
}

/// Submit a testimonial; it stays hidden until an admin publishes it.
#[utoipa::path(
    post,
    path = "/api/v1/testimonials",
    request_body = TestimonialRequest,
    responses(
        (status = 201, description = "Submitted", body = TestimonialResponse),
        (status = 400, description = "Invalid content or rating", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["testimonials"],
    operation_id = "submitTestimonial"
)]
#[post("/testimonials")]
pub async fn submit(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<TestimonialRequest>,
) -> ApiResult<HttpResponse> {
    let user = require_user(&state, &session).await?;
    let draft = TestimonialDraft::new(&payload.content, payload.rating)
        .map_err(|err| field_error(err.field(), err))?;
    let testimonial = state.testimonials.submit(user.id(), draft).await?;
    Ok(HttpResponse::Created().json(TestimonialResponse::from(testimonial)))
}

/// Every testimonial, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/admin/testimonials",
    responses(
        (status = 200, description = "Testimonials", body = [TestimonialResponse]),
        (status = 403, description = "Forbidden", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "adminListTestimonials"
)]
#[get("/admin/testimonials")]
pub async fn list_all(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<TestimonialResponse>>> {
    require_admin(&state, &session).await?;
    let testimonials = state.testimonials.all().await?;
    Ok(web::Json(responses(testimonials)))
}

/// Publish or hide a testimonial.
#[utoipa::path(
    patch,
    path = "/api/v1/admin/testimonials/{id}",
    params(("id" = Uuid, Path, description = "Testimonial id")),
    request_body = PublishRequest,
    responses(
        (status = 200, description = "Updated", body = TestimonialResponse),
        (status = 404, description = "Unknown testimonial", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "adminPublishTestimonial"
)]
#[patch("/admin/testimonials/{id}")]
pub async fn set_published(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<PublishRequest>,
) -> ApiResult<web::Json<TestimonialResponse>> {
    require_admin(&state, &session).await?;
    let id = parse_uuid(path.into_inner(), TESTIMONIAL_ID)?;
    let testimonial = state
        .testimonials
        .set_published(id, payload.is_published)
        .await?;
    Ok(web::Json(testimonial.into()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/testimonials/{id}",
    params(("id" = Uuid, Path, description = "Testimonial id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Unknown testimonial", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "adminDeleteTestimonial"
)]
#[delete("/admin/testimonials/{id}")]
pub async fn delete_testimonial(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    require_admin(&state, &session).await?;
    let id = parse_uuid(path.into_inner(), TESTIMONIAL_ID)?;
    state.testimonials.delete(id).await?;
    Ok(HttpResponse::NoContent().finish())
}
