//! Server-sent events for the admin chat.
//!
//! The stream polls [`StaffChat::messages`] every
//! `HttpState::chat_poll_interval` and writes one `message` event per new
//! message. Empty polls write a comment so proxies keep the connection
//! open. The cursor only moves forward.

use std::sync::Arc;
use std::time::Duration;

use actix_web::web::Bytes;
use actix_web::{HttpResponse, get, http::header, web};
use futures_util::Stream;
use futures_util::stream::unfold;
use tracing::warn;

use crate::domain::chat::{ChatMessage, MessageWindow};
use crate::domain::ports::StaffChat;
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::require_admin;
use crate::inbound::http::chat::{ChatMessageResponse, MessageQuery};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

const KEEP_ALIVE: &str = ": keep-alive\n\n";

struct Cursor {
    chat: Arc<dyn StaffChat>,
    window: MessageWindow,
    interval: Duration,
    polled: bool,
}

fn message_frames(messages: Vec<ChatMessage>) -> String {
    let mut frames = String::new();
    for message in messages {
        let id = message.id;
        match serde_json::to_string(&ChatMessageResponse::from(message)) {
            Ok(data) => {
                frames.push_str(&format!("id: {id}\nevent: message\ndata: {data}\n\n"));
            }
            Err(error) => warn!(%error, message_id = id, "skipping unserialisable chat message"),
        }
    }
    if frames.is_empty() {
        frames.push_str(KEEP_ALIVE);
    }
    frames
}

/// Endless stream of SSE frames starting after `window.after`.
pub(crate) fn event_stream(
    chat: Arc<dyn StaffChat>,
    window: MessageWindow,
    interval: Duration,
) -> impl Stream<Item = Result<Bytes, actix_web::Error>> {
    let cursor = Cursor {
        chat,
        window,
        interval,
        polled: false,
    };
    unfold(cursor, |mut cursor| async move {
        if cursor.polled {
            actix_web::rt::time::sleep(cursor.interval).await;
        }
        cursor.polled = true;
        let frames = match cursor.chat.messages(cursor.window).await {
            Ok(messages) => {
                cursor.window = cursor.window.advance(&messages);
                message_frames(messages)
            }
            Err(error) => {
                warn!(%error, after = cursor.window.after, "chat poll failed");
                KEEP_ALIVE.to_owned()
            }
        };
        Some((Ok(Bytes::from(frames)), cursor))
    })
}

/// Subscribe to new chat messages as `text/event-stream`.
#[utoipa::path(
    get,
    path = "/api/v1/admin/chat/stream",
    params(MessageQuery),
    responses(
        (status = 200, description = "Event stream", content_type = "text/event-stream", body = String),
        (status = 400, description = "Negative cursor", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema)
    ),
    tags = ["chat"],
    operation_id = "streamChatMessages"
)]
#[get("/admin/chat/stream")]
pub async fn stream_messages(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<MessageQuery>,
) -> ApiResult<HttpResponse> {
    require_admin(&state, &session).await?;
    let window = query.window()?;
    let events = event_stream(state.chat.clone(), window, state.chat_poll_interval);
    Ok(HttpResponse::Ok()
        .content_type("text/event-stream")
        .insert_header((header::CACHE_CONTROL, "no-cache"))
        .streaming(events))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::MockStaffChat;
    use crate::domain::{Error, Role, UserId};
    use crate::inbound::http::test_utils::{call_json, signed_in};
    use crate::test_support::fixture_now;
    use actix_web::http::StatusCode;
    use actix_web::test;
    use futures_util::StreamExt;
    use mockall::Sequence;
    use std::pin::pin;

    fn message(id: i64) -> ChatMessage {
        ChatMessage {
            id,
            group_id: None,
            sender_id: UserId::random(),
            sender_name: "Ada".to_owned(),
            body: format!("message {id}"),
            created_at: fixture_now(),
        }
    }

    async fn next_frame<S>(stream: &mut S) -> String
    where
        S: Stream<Item = Result<Bytes, actix_web::Error>> + Unpin,
    {
        let bytes = stream
            .next()
            .await
            .expect("stream is endless")
            .expect("frame");
        String::from_utf8(bytes.to_vec()).expect("utf-8 frame")
    }

    #[actix_web::test]
    async fn new_messages_become_events_and_advance_the_cursor() {
        let mut chat = MockStaffChat::new();
        let mut seq = Sequence::new();
        chat.expect_messages()
            .withf(|window| window.after == 3)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(vec![message(4), message(6)]));
        chat.expect_messages()
            .withf(|window| window.after == 6)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(Vec::new()));
        let window = MessageWindow::new(None, Some(3), None).expect("valid window");
        let mut events = pin!(event_stream(
            Arc::new(chat),
            window,
            Duration::from_millis(1)
        ));

        let first = next_frame(&mut events).await;
        assert!(first.starts_with("id: 4\nevent: message\ndata: {"));
        assert!(first.contains("id: 6\nevent: message\n"));
        assert!(first.contains("\"body\":\"message 6\""));

        assert_eq!(next_frame(&mut events).await, KEEP_ALIVE);
    }

    #[actix_web::test]
    async fn failed_polls_keep_the_connection_alive() {
        let mut chat = MockStaffChat::new();
        chat.expect_messages()
            .withf(|window| window.after == 0)
            .returning(|_| Err(Error::internal("database unavailable")));
        let window = MessageWindow::new(None, None, None).expect("valid window");
        let mut events = pin!(event_stream(
            Arc::new(chat),
            window,
            Duration::from_millis(1)
        ));
        assert_eq!(next_frame(&mut events).await, KEEP_ALIVE);
        assert_eq!(next_frame(&mut events).await, KEEP_ALIVE);
    }

    #[actix_web::test]
    async fn customers_cannot_subscribe() {
        let (ports, customer) = signed_in(Role::Customer);
        let (status, _) = call_json(
            ports,
            Some(&customer),
            |cfg| {
                cfg.service(stream_messages);
            },
            test::TestRequest::get().uri("/api/v1/admin/chat/stream"),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }
}
