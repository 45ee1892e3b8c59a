//! Menu image uploads.
//!
//! Admins `POST` the raw image with its `Content-Type`; anyone can read it
//! back from the returned URL.

use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::image::{IMAGE_MAX_BYTES, ImageUpload, ImageValidationError, UploadedImage};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::require_admin;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, field_error, parse_uuid};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadedImageResponse {
    pub id: Uuid,
    #[schema(example = "/api/v1/uploads/3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub url: String,
}

impl From<UploadedImage> for UploadedImageResponse {
    fn from(image: UploadedImage) -> Self {
        Self {
            id: image.id,
            url: image.url,
        }
    }
}

fn upload_error(err: ImageValidationError) -> Error {
    match err {
        ImageValidationError::UnsupportedType(_) => field_error("contentType", err),
        ImageValidationError::Empty | ImageValidationError::TooLarge { .. } => {
            field_error("body", err)
        }
    }
}

/// Register the upload routes; the upload body limit matches the domain cap.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/admin/uploads")
            .app_data(web::PayloadConfig::new(IMAGE_MAX_BYTES))
            .route(web::post().to(upload_image)),
    )
    .service(web::resource("/uploads/{id}").route(web::get().to(fetch_image)));
}

/// Store a PNG, JPEG, WebP or GIF image of at most 5 MiB.
#[utoipa::path(
    post,
    path = "/api/v1/admin/uploads",
    request_body(content = Vec<u8>, content_type = "image/png", description = "Raw image bytes"),
    responses(
        (status = 201, description = "Stored", body = UploadedImageResponse),
        (status = 400, description = "Unsupported type or size", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 413, description = "Body exceeds 5 MiB")
    ),
    tags = ["admin"],
    operation_id = "uploadImage"
)]
pub async fn upload_image(
    state: web::Data<HttpState>,
    session: SessionContext,
    request: HttpRequest,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    require_admin(&state, &session).await?;
    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    let upload = ImageUpload::new(content_type, body.to_vec()).map_err(upload_error)?;
    let stored = state.images.upload(upload).await?;
    Ok(HttpResponse::Created().json(UploadedImageResponse::from(stored)))
}

/// Serve a stored image.
#[utoipa::path(
    get,
    path = "/api/v1/uploads/{id}",
    params(("id" = Uuid, Path, description = "Image id")),
    responses(
        (status = 200, description = "Image bytes", content_type = "image/*", body = Vec<u8>),
        (status = 404, description = "Unknown image", body = ErrorSchema)
    ),
    tags = ["uploads"],
    operation_id = "fetchImage"
)]
pub async fn fetch_image(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_uuid(path.into_inner(), FieldName::new("id"))?;
    let image = state.images.fetch(id).await?;
    Ok(HttpResponse::Ok()
        .content_type(image.content_type)
        .insert_header((header::CACHE_CONTROL, "public, max-age=86400"))
        .body(image.bytes))
}
