//! Public contact form and the admin inbox.
//!
//! ```text
//! POST   /api/v1/contact
//! GET    /api/v1/admin/contact?unread=true&page=1&limit=20
//! PATCH  /api/v1/admin/contact/{id} {"isRead":true}
//! DELETE /api/v1/admin/contact/{id}
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, web};
use chrono::{DateTime, Utc};
use pagination::PageLimits;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::contact::{ContactDraft, ContactMessage};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::require_admin;
use crate::inbound::http::schemas::{ErrorSchema, PageResponse};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, field_error, page_request, parse_uuid};

const MESSAGE_ID: FieldName = FieldName::new("id");

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessageResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl From<ContactMessage> for ContactMessageResponse {
    fn from(message: ContactMessage) -> Self {
        Self {
            id: message.id,
            name: message.name.into(),
            email: message.email.into(),
            subject: message.subject,
            message: message.message,
            is_read: message.is_read,
            created_at: message.created_at,
        }
    }
}

/// Contact form body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct ContactRequest {
    #[schema(example = "Ada Lovelace")]
    pub name: String,
    #[schema(example = "ada@example.com")]
    pub email: String,
    #[schema(example = "Catering")]
    pub subject: String,
    pub message: String,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct InboxQuery {
    /// Only unread messages when `true`.
    pub unread: Option<bool>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Body for `PATCH /api/v1/admin/contact/{id}`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReadRequest {
    pub is_read: bool,
}

/// Send a message to the restaurant. Staff are notified.
#[utoipa::path(
    post,
    path = "/api/v1/contact",
    request_body = ContactRequest,
    responses(
        (status = 201, description = "Message stored", body = ContactMessageResponse),
        (status = 400, description = "Invalid form", body = ErrorSchema)
    ),
    tags = ["contact"],
    operation_id = "sendContactMessage"
)]
#[post("/contact")]
pub async fn send_message(
    state: web::Data<HttpState>,
    payload: web::Json<ContactRequest>,
) -> ApiResult<HttpResponse> {
    let ContactRequest {
        name,
        email,
        subject,
        message,
    } = payload.into_inner();
    let draft = ContactDraft::new(&name, &email, &subject, &message)
        .map_err(|err| field_error(err.field(), &err))?;
    let stored = state.contact.submit(draft).await?;
    Ok(HttpResponse::Created().json(ContactMessageResponse::from(stored)))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/contact",
    params(InboxQuery),
    responses(
        (status = 200, description = "Messages", body = PageResponse<ContactMessageResponse>),
        (status = 403, description = "Forbidden", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "adminListContactMessages"
)]
#[get("/admin/contact")]
pub async fn inbox(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<InboxQuery>,
) -> ApiResult<web::Json<PageResponse<ContactMessageResponse>>> {
    require_admin(&state, &session).await?;
    let request = page_request(PageLimits::new(20, 100), query.page, query.limit)?;
    let unread_only = query.unread.unwrap_or(false);
    let page = state.contact.list(unread_only, request).await?;
    Ok(web::Json(PageResponse::from_page(
        page,
        ContactMessageResponse::from,
    )))
}

#[utoipa::path(
    patch,
    path = "/api/v1/admin/contact/{id}",
    params(("id" = Uuid, Path, description = "Message id")),
    request_body = ReadRequest,
    responses(
        (status = 200, description = "Updated", body = ContactMessageResponse),
        (status = 404, description = "Unknown message", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "adminMarkContactMessage"
)]
#[patch("/admin/contact/{id}")]
pub async fn mark_read(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<ReadRequest>,
) -> ApiResult<web::Json<ContactMessageResponse>> {
    require_admin(&state, &session).await?;
    let id = parse_uuid(path.into_inner(), MESSAGE_ID)?;
    let message = state.contact.set_read(id, payload.is_read).await?;
    Ok(web::Json(message.into()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/contact/{id}",
    params(("id" = Uuid, Path, description = "Message id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Unknown message", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "adminDeleteContactMessage"
)]
#[delete("/admin/contact/{id}")]
pub async fn delete_message(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    require_admin(&state, &session).await?;
    let id = parse_uuid(path.into_inner(), MESSAGE_ID)?;
    state.contact.delete(id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Email, Role, UserName};
    use crate::inbound::http::test_utils::{TestPorts, call_json, signed_in};
    use crate::test_support::fixture_now;
    use actix_web::http::StatusCode;
    use actix_web::test;
    use pagination::Page;
    use rstest::rstest;
    use serde_json::{Value, json};

    fn routes(cfg: &mut web::ServiceConfig) {
        cfg.service(send_message)
            .service(inbox)
            .service(mark_read)
            .service(delete_message);
    }

    fn form() -> Value {
        json!({
            "name": "Ada Lovelace",
            "email": "ada@example.com",
            "subject": "Catering",
            "message": "Do you cater for forty?"
        })
    }

    fn stored(is_read: bool) -> ContactMessage {
        ContactMessage {
            id: Uuid::nil(),
            name: UserName::new("Ada Lovelace").expect("valid name"),
            email: Email::new("ada@example.com").expect("valid email"),
            subject: "Catering".to_owned(),
            message: "Do you cater for forty?".to_owned(),
            is_read,
            created_at: fixture_now(),
        }
    }

    #[rstest]
    #[case("name", json!(""))]
    #[case("email", json!("nope"))]
    #[case("subject", json!("   "))]
    #[case("message", json!(""))]
    #[actix_web::test]
    async fn invalid_forms_name_the_field(#[case] field: &str, #[case] value: Value) {
        let mut body = form();
        body[field] = value;
        let (status, payload) = call_json(
            TestPorts::default(),
            None,
            routes,
            test::TestRequest::post().uri("/api/v1/contact").set_json(body),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(payload["details"]["field"], field);
    }

    #[actix_web::test]
    async fn valid_messages_are_stored_unread() {
        let mut ports = TestPorts::default();
        ports
            .contact
            .expect_submit()
            .withf(|draft| draft.subject == "Catering")
            .times(1)
            .returning(|_| Ok(stored(false)));
        let (status, body) = call_json(
            ports,
            None,
            routes,
            test::TestRequest::post().uri("/api/v1/contact").set_json(form()),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["isRead"], false);
        assert_eq!(body["email"], "ada@example.com");
    }

    #[rstest]
    #[case("/api/v1/admin/contact?unread=true", true)]
    #[case("/api/v1/admin/contact", false)]
    #[actix_web::test]
    async fn unread_filter_reaches_the_inbox(#[case] uri: &str, #[case] unread_only: bool) {
        let (mut ports, admin) = signed_in(Role::Admin);
        ports
            .contact
            .expect_list()
            .withf(move |unread, _| *unread == unread_only)
            .returning(|_, request| Ok(Page::new(vec![stored(false)], 1, request)));
        let (status, body) = call_json(
            ports,
            Some(&admin),
            routes,
            test::TestRequest::get().uri(uri),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["items"][0]["subject"], "Catering");
    }

    #[actix_web::test]
    async fn admins_mark_messages_read() {
        let (mut ports, admin) = signed_in(Role::Admin);
        ports
            .contact
            .expect_set_read()
            .withf(|_, read| *read)
            .returning(|_, _| Ok(stored(true)));
        let (status, body) = call_json(
            ports,
            Some(&admin),
            routes,
            test::TestRequest::patch()
                .uri(&format!("/api/v1/admin/contact/{}", Uuid::nil()))
                .set_json(json!({"isRead": true})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["isRead"], true);
    }
}
