//! Port for staff chat persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::UserId;
use crate::domain::chat::{
    ChatGroup, ChatMessage, GroupName, MessageWindow, NewChatMessage, PresenceRecord,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by chat repository adapters.
    pub enum ChatRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "chat repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "chat repository query failed: {message}",
        /// The message targets a group that does not exist.
        UnknownGroup { group_id: Uuid } => "chat group {group_id} does not exist",
    }
}

/// Port for chat groups, messages and presence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatRepository: Send + Sync {
    /// All groups ordered by name.
    async fn list_groups(&self) -> Result<Vec<ChatGroup>, ChatRepositoryError>;

    /// Insert a group.
    async fn create_group(
        &self,
        name: &GroupName,
        created_by: &UserId,
        created_at: DateTime<Utc>,
    ) -> Result<ChatGroup, ChatRepositoryError>;

    /// Delete a group and its messages, `false` when missing.
    async fn delete_group(&self, id: Uuid) -> Result<bool, ChatRepositoryError>;

    /// Insert a message, returning it with its sequence id.
    async fn post(&self, message: &NewChatMessage) -> Result<ChatMessage, ChatRepositoryError>;

    /// Messages in the window, ascending by id.
    async fn messages(
        &self,
        window: &MessageWindow,
    ) -> Result<Vec<ChatMessage>, ChatRepositoryError>;

    /// Upsert the caller's presence flag.
    async fn set_presence(
        &self,
        user_id: &UserId,
        online: bool,
        seen_at: DateTime<Utc>,
    ) -> Result<(), ChatRepositoryError>;

    /// Stored presence of admins who have checked in at least once.
    async fn list_presence(&self) -> Result<Vec<PresenceRecord>, ChatRepositoryError>;
}
