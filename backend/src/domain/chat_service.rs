//! Admin chat: groups, messages and presence.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use uuid::Uuid;

use crate::domain::chat::{
    AdminPresence, ChatGroup, ChatMessage, GroupName, MessageBody, MessageWindow, NewChatMessage,
};
use crate::domain::ports::{ChatRepository, ChatRepositoryError, StaffChat};
use crate::domain::{Error, UserId};

fn map_chat_error(error: ChatRepositoryError) -> Error {
    match error {
        ChatRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("chat repository unavailable: {message}"))
        }
        ChatRepositoryError::Query { message } => {
            Error::internal(format!("chat repository error: {message}"))
        }
        ChatRepositoryError::UnknownGroup { group_id } => {
            Error::not_found(format!("chat group {group_id} not found"))
        }
    }
}

/// Chat service implementing [`StaffChat`].
#[derive(Clone)]
pub struct ChatService<R> {
    chat: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R> ChatService<R> {
    /// Create a service over a chat repository.
    pub fn new(chat: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { chat, clock }
    }
}

#[async_trait]
impl<R> StaffChat for ChatService<R>
where
    R: ChatRepository,
{
    async fn groups(&self) -> Result<Vec<ChatGroup>, Error> {
        self.chat.list_groups().await.map_err(map_chat_error)
    }

    async fn create_group(&self, creator: &UserId, name: GroupName) -> Result<ChatGroup, Error> {
        self.chat
            .create_group(&name, creator, self.clock.utc())
            .await
            .map_err(map_chat_error)
    }

    async fn delete_group(&self, id: Uuid) -> Result<(), Error> {
        let deleted = self.chat.delete_group(id).await.map_err(map_chat_error)?;
        deleted
            .then_some(())
            .ok_or_else(|| Error::not_found(format!("chat group {id} not found")))
    }

    async fn messages(&self, window: MessageWindow) -> Result<Vec<ChatMessage>, Error> {
        self.chat.messages(&window).await.map_err(map_chat_error)
    }

    async fn post(
        &self,
        sender: &UserId,
        group_id: Option<Uuid>,
        body: MessageBody,
    ) -> Result<ChatMessage, Error> {
        let message = NewChatMessage {
            group_id,
            sender_id: *sender,
            body,
            created_at: self.clock.utc(),
        };
        self.chat.post(&message).await.map_err(map_chat_error)
    }

    async fn set_presence(&self, user_id: &UserId, online: bool) -> Result<(), Error> {
        self.chat
            .set_presence(user_id, online, self.clock.utc())
            .await
            .map_err(map_chat_error)
    }

    async fn presence(&self) -> Result<Vec<AdminPresence>, Error> {
        let now = self.clock.utc();
        let records = self.chat.list_presence().await.map_err(map_chat_error)?;
        Ok(records
            .into_iter()
            .map(|record| AdminPresence::resolve(record, now))
            .collect())
    }
}
