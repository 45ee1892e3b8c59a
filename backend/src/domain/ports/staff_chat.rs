//! Driving port for the admin chat.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::chat::{
    AdminPresence, ChatGroup, ChatMessage, GroupName, MessageBody, MessageWindow,
};
use crate::domain::{Error, UserId};

/// Groups, messages and presence for staff.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StaffChat: Send + Sync {
    /// Every group.
    async fn groups(&self) -> Result<Vec<ChatGroup>, Error>;

    /// Open a group.
    async fn create_group(&self, creator: &UserId, name: GroupName) -> Result<ChatGroup, Error>;

    /// Close a group and drop its messages.
    async fn delete_group(&self, id: Uuid) -> Result<(), Error>;

    /// Messages after the window's cursor.
    async fn messages(&self, window: MessageWindow) -> Result<Vec<ChatMessage>, Error>;

    /// Post to a group or, with `None`, the general channel.
    async fn post(
        &self,
        sender: &UserId,
        group_id: Option<Uuid>,
        body: MessageBody,
    ) -> Result<ChatMessage, Error>;

    /// Record the caller's presence.
    async fn set_presence(&self, user_id: &UserId, online: bool) -> Result<(), Error>;

    /// Presence of every admin who has checked in.
    async fn presence(&self) -> Result<Vec<AdminPresence>, Error>;
}
