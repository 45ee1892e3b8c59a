//! Admin chat: groups, messages and presence.
//!
//! Clients poll `GET /api/v1/admin/chat/messages` with the highest id they
//! have seen as `after`, or subscribe to the event stream in
//! [`crate::inbound::http::chat_stream`].

use actix_web::{HttpResponse, delete, get, post, put, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::chat::{
    AdminPresence, ChatGroup, ChatMessage, ChatValidationError, GroupName, MessageBody,
    MessageWindow,
};
use crate::domain::Error;
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::require_admin;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, field_error, parse_uuid};

pub(crate) fn chat_error(err: ChatValidationError) -> Error {
    field_error(err.field(), err)
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatGroupResponse {
    pub id: Uuid,
    pub name: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl From<ChatGroup> for ChatGroupResponse {
    fn from(group: ChatGroup) -> Self {
        Self {
            id: group.id,
            name: group.name,
            created_by: group.created_by.to_string(),
            created_at: group.created_at,
        }
    }
}

/// Message as sent to clients, polled or streamed.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessageResponse {
    /// Monotonic cursor value.
    pub id: i64,
    /// Absent for the general channel.
    pub group_id: Option<Uuid>,
    pub sender_id: String,
    pub sender_name: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl From<ChatMessage> for ChatMessageResponse {
    fn from(message: ChatMessage) -> Self {
        Self {
            id: message.id,
            group_id: message.group_id,
            sender_id: message.sender_id.to_string(),
            sender_name: message.sender_name,
            body: message.body,
            created_at: message.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PresenceResponse {
    pub user_id: String,
    pub name: String,
    pub online: bool,
    pub last_seen_at: DateTime<Utc>,
}

impl From<AdminPresence> for PresenceResponse {
    fn from(admin: AdminPresence) -> Self {
        Self {
            user_id: admin.user_id.to_string(),
            name: admin.name,
            online: admin.online,
            last_seen_at: admin.last_seen_at,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct GroupRequest {
    #[schema(example = "Kitchen")]
    pub name: String,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostMessageRequest {
    pub group_id: Option<Uuid>,
    #[schema(example = "Table 4 wants the bill")]
    pub body: String,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct PresenceRequest {
    pub online: bool,
}

/// Cursor query shared by polling and streaming.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(rename_all = "camelCase")]
pub struct MessageQuery {
    /// Group to read; the general channel when absent.
    pub group_id: Option<Uuid>,
    /// Only messages with a greater id.
    pub after: Option<i64>,
    /// Page size, default 50, capped at 200.
    pub limit: Option<u32>,
}

impl MessageQuery {
    pub(crate) fn window(&self) -> ApiResult<MessageWindow> {
        MessageWindow::new(self.group_id, self.after, self.limit).map_err(chat_error)
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/chat/groups",
    responses(
        (status = 200, description = "Groups", body = [ChatGroupResponse]),
        (status = 403, description = "Forbidden", body = ErrorSchema)
    ),
    tags = ["chat"],
    operation_id = "listChatGroups"
)]
#[get("/admin/chat/groups")]
pub async fn list_groups(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<ChatGroupResponse>>> {
    require_admin(&state, &session).await?;
    let groups = state.chat.groups().await?;
    Ok(web::Json(
        groups.into_iter().map(ChatGroupResponse::from).collect(),
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/chat/groups",
    request_body = GroupRequest,
    responses(
        (status = 201, description = "Group created", body = ChatGroupResponse),
        (status = 400, description = "Invalid name", body = ErrorSchema)
    ),
    tags = ["chat"],
    operation_id = "createChatGroup"
)]
#[post("/admin/chat/groups")]
pub async fn create_group(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<GroupRequest>,
) -> ApiResult<HttpResponse> {
    let admin = require_admin(&state, &session).await?;
    let name = GroupName::new(&payload.name).map_err(chat_error)?;
    let group = state.chat.create_group(admin.id(), name).await?;
    Ok(HttpResponse::Created().json(ChatGroupResponse::from(group)))
}

/// Delete a group with its messages.
#[utoipa::path(
    delete,
    path = "/api/v1/admin/chat/groups/{id}",
    params(("id" = Uuid, Path, description = "Group id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Unknown group", body = ErrorSchema)
    ),
    tags = ["chat"],
    operation_id = "deleteChatGroup"
)]
#[delete("/admin/chat/groups/{id}")]
pub async fn delete_group(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    require_admin(&state, &session).await?;
    let id = parse_uuid(path.into_inner(), FieldName::new("id"))?;
    state.chat.delete_group(id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Messages after a cursor, oldest first.
#[utoipa::path(
    get,
    path = "/api/v1/admin/chat/messages",
    params(MessageQuery),
    responses(
        (status = 200, description = "Messages", body = [ChatMessageResponse]),
        (status = 400, description = "Negative cursor", body = ErrorSchema)
    ),
    tags = ["chat"],
    operation_id = "listChatMessages"
)]
#[get("/admin/chat/messages")]
pub async fn list_messages(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<MessageQuery>,
) -> ApiResult<web::Json<Vec<ChatMessageResponse>>> {
    require_admin(&state, &session).await?;
    let messages = state.chat.messages(query.window()?).await?;
    Ok(web::Json(
        messages.into_iter().map(ChatMessageResponse::from).collect(),
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/chat/messages",
    request_body = PostMessageRequest,
    responses(
        (status = 201, description = "Posted", body = ChatMessageResponse),
        (status = 400, description = "Invalid body", body = ErrorSchema),
        (status = 404, description = "Unknown group", body = ErrorSchema)
    ),
    tags = ["chat"],
    operation_id = "postChatMessage"
)]
#[post("/admin/chat/messages")]
pub async fn post_message(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<PostMessageRequest>,
) -> ApiResult<HttpResponse> {
    let admin = require_admin(&state, &session).await?;
    let body = MessageBody::new(&payload.body).map_err(chat_error)?;
    let message = state.chat.post(admin.id(), payload.group_id, body).await?;
    Ok(HttpResponse::Created().json(ChatMessageResponse::from(message)))
}

/// Check in as online or offline.
#[utoipa::path(
    put,
    path = "/api/v1/admin/chat/presence",
    request_body = PresenceRequest,
    responses((status = 204, description = "Recorded")),
    tags = ["chat"],
    operation_id = "setChatPresence"
)]
#[put("/admin/chat/presence")]
pub async fn set_presence(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<PresenceRequest>,
) -> ApiResult<HttpResponse> {
    let admin = require_admin(&state, &session).await?;
    state.chat.set_presence(admin.id(), payload.online).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Who is online. Stale check-ins count as offline.
#[utoipa::path(
    get,
    path = "/api/v1/admin/chat/presence",
    responses((status = 200, description = "Presence", body = [PresenceResponse])),
    tags = ["chat"],
    operation_id = "listChatPresence"
)]
#[get("/admin/chat/presence")]
pub async fn presence(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<PresenceResponse>>> {
    require_admin(&state, &session).await?;
    let admins = state.chat.presence().await?;
    Ok(web::Json(
        admins.into_iter().map(PresenceResponse::from).collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;
    use crate::domain::chat::MAX_MESSAGE_LIMIT;
    use crate::inbound::http::test_utils::{call_json, signed_in};
    use crate::test_support::fixture_now;
    use actix_web::http::StatusCode;
    use actix_web::test;
    use rstest::rstest;
    use serde_json::json;

    fn routes(cfg: &mut web::ServiceConfig) {
        cfg.service(list_groups)
            .service(create_group)
            .service(delete_group)
            .service(list_messages)
            .service(post_message)
            .service(set_presence)
            .service(presence);
    }

    fn message(id: i64, group_id: Option<Uuid>) -> ChatMessage {
        ChatMessage {
            id,
            group_id,
            sender_id: crate::domain::UserId::random(),
            sender_name: "Ada".to_owned(),
            body: "Table 4 wants the bill".to_owned(),
            created_at: fixture_now(),
        }
    }

    #[actix_web::test]
    async fn polling_passes_the_cursor_through() {
        let (mut ports, admin) = signed_in(Role::Admin);
        let group = Uuid::new_v4();
        ports
            .chat
            .expect_messages()
            .withf(move |window| {
                window.group_id == Some(group)
                    && window.after == 7
                    && window.limit == MAX_MESSAGE_LIMIT
            })
            .returning(move |_| Ok(vec![message(8, Some(group))]));
        let (status, body) = call_json(
            ports,
            Some(&admin),
            routes,
            test::TestRequest::get().uri(&format!(
                "/api/v1/admin/chat/messages?groupId={group}&after=7&limit=999"
            )),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["id"], 8);
        assert_eq!(body[0]["groupId"], group.to_string());
    }

    #[actix_web::test]
    async fn negative_cursors_are_rejected() {
        let (ports, admin) = signed_in(Role::Admin);
        let (status, body) = call_json(
            ports,
            Some(&admin),
            routes,
            test::TestRequest::get().uri("/api/v1/admin/chat/messages?after=-1"),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"]["field"], "after");
    }

    #[rstest]
    #[case("   ".to_owned())]
    #[case("x".repeat(2001))]
    #[actix_web::test]
    async fn message_bodies_are_bounded(#[case] raw: String) {
        let (ports, admin) = signed_in(Role::Admin);
        let (status, body) = call_json(
            ports,
            Some(&admin),
            routes,
            test::TestRequest::post()
                .uri("/api/v1/admin/chat/messages")
                .set_json(json!({"body": raw})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"]["field"], "body");
    }

    #[actix_web::test]
    async fn general_channel_posts_have_no_group() {
        let (mut ports, admin) = signed_in(Role::Admin);
        let sender = *admin.id();
        ports
            .chat
            .expect_post()
            .withf(move |from, group, body| {
                *from == sender && group.is_none() && body.as_ref() == "hello"
            })
            .returning(|_, _, _| Ok(message(1, None)));
        let (status, body) = call_json(
            ports,
            Some(&admin),
            routes,
            test::TestRequest::post()
                .uri("/api/v1/admin/chat/messages")
                .set_json(json!({"body": "  hello  "})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(body["groupId"].is_null());
    }

    #[actix_web::test]
    async fn groups_are_created_by_the_caller() {
        let (mut ports, admin) = signed_in(Role::Admin);
        let creator = *admin.id();
        ports
            .chat
            .expect_create_group()
            .withf(move |by, name| *by == creator && name.as_ref() == "Kitchen")
            .returning(|by, name| {
                Ok(ChatGroup {
                    id: Uuid::nil(),
                    name: name.as_ref().to_owned(),
                    created_by: *by,
                    created_at: fixture_now(),
                })
            });
        let (status, body) = call_json(
            ports,
            Some(&admin),
            routes,
            test::TestRequest::post()
                .uri("/api/v1/admin/chat/groups")
                .set_json(json!({"name": "Kitchen"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["name"], "Kitchen");
        assert_eq!(body["createdBy"], creator.to_string());
    }

    #[actix_web::test]
    async fn presence_check_ins_record_the_caller() {
        let (mut ports, admin) = signed_in(Role::Admin);
        let caller = *admin.id();
        ports
            .chat
            .expect_set_presence()
            .withf(move |user, online| *user == caller && *online)
            .times(1)
            .returning(|_, _| Ok(()));
        let (status, _) = call_json(
            ports,
            Some(&admin),
            routes,
            test::TestRequest::put()
                .uri("/api/v1/admin/chat/presence")
                .set_json(json!({"online": true})),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    #[actix_web::test]
    async fn chat_is_admin_only() {
        let (ports, customer) = signed_in(Role::Customer);
        let (status, _) = call_json(
            ports,
            Some(&customer),
            routes,
            test::TestRequest::get().uri("/api/v1/admin/chat/groups"),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }
}
