//! Staff chat: groups, messages and presence.
//!
//! Message ids come from a database sequence and only grow, so clients page
//! forward with an `after` cursor.

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::user::UserId;

/// Longest message body after trimming.
pub const BODY_MAX: usize = 2000;
/// Longest group name.
pub const GROUP_NAME_MAX: usize = 80;
/// Default page size for message polls.
pub const DEFAULT_MESSAGE_LIMIT: u32 = 50;
/// Largest page size for message polls.
pub const MAX_MESSAGE_LIMIT: u32 = 200;
/// How recently an admin must have checked in to count as online.
pub const PRESENCE_WINDOW_SECONDS: i64 = 60;

/// Validation failures for chat input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ChatValidationError {
    #[error("message must be between 1 and {max} characters")]
    Body { max: usize },
    #[error("group name must be between 1 and {max} characters")]
    GroupName { max: usize },
    #[error("cursor must not be negative")]
    NegativeCursor,
}

impl ChatValidationError {
    /// Request field the failure refers to.
    pub fn field(self) -> &'static str {
        match self {
            Self::Body { .. } => "body",
            Self::GroupName { .. } => "name",
            Self::NegativeCursor => "after",
        }
    }
}

/// Trimmed, bounded message text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageBody(String);

impl MessageBody {
    /// Validate raw message text.
    pub fn new(raw: &str) -> Result<Self, ChatValidationError> {
        let text = raw.trim();
        let length = text.chars().count();
        if length == 0 || length > BODY_MAX {
            return Err(ChatValidationError::Body { max: BODY_MAX });
        }
        Ok(Self(text.to_owned()))
    }
}

impl AsRef<str> for MessageBody {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Validated group name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupName(String);

impl GroupName {
    /// Validate a raw group name.
    pub fn new(raw: &str) -> Result<Self, ChatValidationError> {
        let text = raw.trim();
        let length = text.chars().count();
        if length == 0 || length > GROUP_NAME_MAX {
            return Err(ChatValidationError::GroupName {
                max: GROUP_NAME_MAX,
            });
        }
        Ok(Self(text.to_owned()))
    }
}

impl AsRef<str> for GroupName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A named conversation between admins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatGroup {
    pub id: Uuid,
    pub name: String,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
}

/// A posted message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: i64,
    /// `None` for the general channel.
    pub group_id: Option<Uuid>,
    pub sender_id: UserId,
    pub sender_name: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// Message to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewChatMessage {
    pub group_id: Option<Uuid>,
    pub sender_id: UserId,
    pub body: MessageBody,
    pub created_at: DateTime<Utc>,
}

/// Forward-only page of messages in one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageWindow {
    pub group_id: Option<Uuid>,
    /// Only ids strictly greater than this are returned.
    pub after: i64,
    pub limit: u32,
}

impl MessageWindow {
    /// Validate a cursor and clamp the limit.
    ///
    /// # Examples
    /// ```
    /// use bistro::domain::chat::{MessageWindow, MAX_MESSAGE_LIMIT};
    ///
    /// let window = MessageWindow::new(None, Some(10), Some(5_000)).expect("valid");
    /// assert_eq!(window.after, 10);
    /// assert_eq!(window.limit, MAX_MESSAGE_LIMIT);
    /// ```
    pub fn new(
        group_id: Option<Uuid>,
        after: Option<i64>,
        limit: Option<u32>,
    ) -> Result<Self, ChatValidationError> {
        let after = after.unwrap_or(0);
        if after < 0 {
            return Err(ChatValidationError::NegativeCursor);
        }
        let limit = limit
            .unwrap_or(DEFAULT_MESSAGE_LIMIT)
            .clamp(1, MAX_MESSAGE_LIMIT);
        Ok(Self {
            group_id,
            after,
            limit,
        })
    }

    /// The window that follows `messages`, keeping the cursor when empty.
    #[must_use]
    pub fn advance(self, messages: &[ChatMessage]) -> Self {
        let after = messages
            .iter()
            .map(|message| message.id)
            .fold(self.after, i64::max);
        Self { after, ..self }
    }
}

/// An admin's stored presence flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceRecord {
    pub user_id: UserId,
    pub name: String,
    pub is_online: bool,
    pub last_seen_at: DateTime<Utc>,
}

impl PresenceRecord {
    /// Online only when flagged and seen within the presence window.
    pub fn online_at(&self, now: DateTime<Utc>) -> bool {
        self.is_online && now - self.last_seen_at <= TimeDelta::seconds(PRESENCE_WINDOW_SECONDS)
    }
}

/// Presence as shown to other admins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminPresence {
    pub user_id: UserId,
    pub name: String,
    pub online: bool,
    pub last_seen_at: DateTime<Utc>,
}

impl AdminPresence {
    /// Resolve a stored record against the current time.
    pub fn resolve(record: PresenceRecord, now: DateTime<Utc>) -> Self {
        Self {
            online: record.online_at(now),
            user_id: record.user_id,
            name: record.name,
            last_seen_at: record.last_seen_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    fn at(seconds: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + seconds, 0)
            .single()
            .expect("valid timestamp")
    }

    fn message(id: i64) -> ChatMessage {
        ChatMessage {
            id,
            group_id: None,
            sender_id: UserId::random(),
            sender_name: String::from("Ada"),
            body: String::from("hi"),
            created_at: at(0),
        }
    }

    #[rstest]
    #[case("", false)]
    #[case("   ", false)]
    #[case(" hello ", true)]
    fn bodies_must_have_content(#[case] raw: &str, #[case] ok: bool) {
        assert_eq!(MessageBody::new(raw).is_ok(), ok);
    }

    #[rstest]
    fn bodies_are_bounded() {
        let long = "x".repeat(BODY_MAX + 1);
        assert_eq!(
            MessageBody::new(&long),
            Err(ChatValidationError::Body { max: BODY_MAX })
        );
        assert!(MessageBody::new(&"x".repeat(BODY_MAX)).is_ok());
    }

    #[rstest]
    #[case(None, DEFAULT_MESSAGE_LIMIT)]
    #[case(Some(0), 1)]
    #[case(Some(20), 20)]
    #[case(Some(10_000), MAX_MESSAGE_LIMIT)]
    fn limits_are_clamped(#[case] raw: Option<u32>, #[case] expected: u32) {
        let window = MessageWindow::new(None, None, raw).expect("valid");
        assert_eq!(window.limit, expected);
    }

    #[rstest]
    fn negative_cursors_are_rejected() {
        assert_eq!(
            MessageWindow::new(None, Some(-1), None),
            Err(ChatValidationError::NegativeCursor)
        );
    }

    #[rstest]
    fn cursor_only_moves_forward() {
        let window = MessageWindow::new(None, Some(7), None).expect("valid");
        assert_eq!(window.advance(&[]).after, 7);
        assert_eq!(window.advance(&[message(8), message(12)]).after, 12);
        assert_eq!(window.advance(&[message(3)]).after, 7);
    }

    #[rstest]
    #[case(true, 0, true)]
    #[case(true, 60, true)]
    #[case(true, 61, false)]
    #[case(false, 0, false)]
    fn presence_expires_after_window(#[case] flag: bool, #[case] age: i64, #[case] expected: bool) {
        let record = PresenceRecord {
            user_id: UserId::random(),
            name: String::from("Ada"),
            is_online: flag,
            last_seen_at: at(0),
        };
        assert_eq!(record.online_at(at(age)), expected);
    }
}
