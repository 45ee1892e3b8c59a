//! Newsletter sign-up and the admin subscriber list.

use actix_web::{HttpResponse, delete, get, post, web};
use chrono::{DateTime, Utc};
use pagination::PageLimits;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::Email;
use crate::domain::newsletter::Subscriber;
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::require_admin;
use crate::inbound::http::schemas::{ErrorSchema, PageQuery, PageResponse};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, field_error, page_request, parse_uuid};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubscriberResponse {
    pub id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<Subscriber> for SubscriberResponse {
    fn from(subscriber: Subscriber) -> Self {
        Self {
            id: subscriber.id,
            email: subscriber.email.into(),
            created_at: subscriber.created_at,
        }
    }
}

/// Body for `POST /api/v1/subscribers`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct SubscribeRequest {
    #[schema(example = "ada@example.com")]
    pub email: String,
}

/// Subscribe an address to the newsletter.
#[utoipa::path(
    post,
    path = "/api/v1/subscribers",
    request_body = SubscribeRequest,
    responses(
        (status = 201, description = "Subscribed", body = SubscriberResponse),
        (status = 400, description = "Invalid email", body = ErrorSchema),
        (status = 409, description = "Already subscribed", body = ErrorSchema)
    ),
    tags = ["newsletter"],
    operation_id = "subscribe"
)]
#[post("/subscribers")]
pub async fn subscribe(
    state: web::Data<HttpState>,
    payload: web::Json<SubscribeRequest>,
) -> ApiResult<HttpResponse> {
    let email = Email::new(&payload.email).map_err(|err| field_error("email", err))?;
    let subscriber = state.subscribers.subscribe(email).await?;
    Ok(HttpResponse::Created().json(SubscriberResponse::from(subscriber)))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/subscribers",
    params(PageQuery),
    responses(
        (status = 200, description = "Subscribers", body = PageResponse<SubscriberResponse>),
        (status = 403, description = "Forbidden", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "adminListSubscribers"
)]
#[get("/admin/subscribers")]
pub async fn list_subscribers(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<PageQuery>,
) -> ApiResult<web::Json<PageResponse<SubscriberResponse>>> {
    require_admin(&state, &session).await?;
    let request = page_request(PageLimits::new(50, 200), query.page, query.limit)?;
    let page = state.subscribers.list(request).await?;
    Ok(web::Json(PageResponse::from_page(
        page,
        SubscriberResponse::from,
    )))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/subscribers/{id}",
    params(("id" = Uuid, Path, description = "Subscriber id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Unknown subscriber", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "adminDeleteSubscriber"
)]
#[delete("/admin/subscribers/{id}")]
pub async fn delete_subscriber(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    require_admin(&state, &session).await?;
    let id = parse_uuid(path.into_inner(), FieldName::new("id"))?;
    state.subscribers.delete(id).await?;
    Ok(HttpResponse::NoContent().finish())
}
