//! PostgreSQL-backed `ChatRepository`.
//!
//! Messages carry the sender's current display name by joining `users` at
//! read time rather than copying it into each row.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::chat::{
    ChatGroup, ChatMessage, GroupName, MessageWindow, NewChatMessage, PresenceRecord,
};
use crate::domain::ports::{ChatRepository, ChatRepositoryError};
use crate::domain::{Role, UserId};

use super::diesel_basic_error_mapping::{basic, classify, pool_message};
use super::models::{ChatGroupRow, ChatMessageRow, NewChatMessageRow, PresenceRow};
use super::pool::{DbPool, PoolError};
use super::schema::{admin_presence, chat_groups, chat_messages, users};

const MESSAGE_GROUP_FK: &str = "chat_messages_group_id_fkey";

/// Diesel implementation of [`ChatRepository`].
#[derive(Clone)]
pub struct DieselChatRepository {
    pool: DbPool,
}

impl DieselChatRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ChatRepositoryError {
    ChatRepositoryError::connection(pool_message(error))
}

fn map_diesel_error(error: diesel::result::Error) -> ChatRepositoryError {
    basic(
        classify(error),
        ChatRepositoryError::connection,
        ChatRepositoryError::query,
    )
}

fn map_post_error(error: diesel::result::Error, group_id: Option<Uuid>) -> ChatRepositoryError {
    let failure = classify(error);
    match group_id {
        Some(id) if failure.is_foreign_key(MESSAGE_GROUP_FK) => {
            ChatRepositoryError::unknown_group(id)
        }
        _ => basic(
            failure,
            ChatRepositoryError::connection,
            ChatRepositoryError::query,
        ),
    }
}

fn window_query(
    window: &MessageWindow,
) -> chat_messages::BoxedQuery<'static, Pg> {
    let query = chat_messages::table
        .filter(chat_messages::id.gt(window.after))
        .into_boxed();
    match window.group_id {
        Some(group_id) => query.filter(chat_messages::group_id.eq(group_id)),
        None => query.filter(chat_messages::group_id.is_null()),
    }
}

#[async_trait]
impl ChatRepository for DieselChatRepository {
    async fn list_groups(&self) -> Result<Vec<ChatGroup>, ChatRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = chat_groups::table
            .select(ChatGroupRow::as_select())
            .order((chat_groups::name.asc(), chat_groups::id.asc()))
            .load::<ChatGroupRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(ChatGroup::from).collect())
    }

    async fn create_group(
        &self,
        name: &GroupName,
        created_by: &UserId,
        created_at: DateTime<Utc>,
    ) -> Result<ChatGroup, ChatRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = ChatGroupRow {
            id: Uuid::new_v4(),
            name: name.as_ref().to_owned(),
            created_by: *created_by.as_uuid(),
            created_at,
        };
        let stored = diesel::insert_into(chat_groups::table)
            .values(&row)
            .returning(ChatGroupRow::as_returning())
            .get_result::<ChatGroupRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(stored.into())
    }

    async fn delete_group(&self, id: Uuid) -> Result<bool, ChatRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(chat_groups::table.find(id))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn post(&self, message: &NewChatMessage) -> Result<ChatMessage, ChatRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewChatMessageRow {
            group_id: message.group_id,
            sender_id: *message.sender_id.as_uuid(),
            body: message.body.as_ref(),
            created_at: message.created_at,
        };
        let stored = diesel::insert_into(chat_messages::table)
            .values(&row)
            .returning(ChatMessageRow::as_returning())
            .get_result::<ChatMessageRow>(&mut conn)
            .await
            .map_err(|err| map_post_error(err, message.group_id))?;
        let sender_name = users::table
            .find(stored.sender_id)
            .select(users::name)
            .first::<String>(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(stored.with_sender(sender_name))
    }

    async fn messages(
        &self,
        window: &MessageWindow,
    ) -> Result<Vec<ChatMessage>, ChatRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = window_query(window)
            .inner_join(users::table)
            .select((ChatMessageRow::as_select(), users::name))
            .order(chat_messages::id.asc())
            .limit(i64::from(window.limit))
            .load::<(ChatMessageRow, String)>(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows
            .into_iter()
            .map(|(row, name)| row.with_sender(name))
            .collect())
    }

    async fn set_presence(
        &self,
        user_id: &UserId,
        online: bool,
        seen_at: DateTime<Utc>,
    ) -> Result<(), ChatRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = PresenceRow {
            user_id: *user_id.as_uuid(),
            is_online: online,
            last_seen_at: seen_at,
        };
        diesel::insert_into(admin_presence::table)
            .values(&row)
            .on_conflict(admin_presence::user_id)
            .do_update()
            .set((
                admin_presence::is_online.eq(excluded(admin_presence::is_online)),
                admin_presence::last_seen_at.eq(excluded(admin_presence::last_seen_at)),
            ))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn list_presence(&self) -> Result<Vec<PresenceRecord>, ChatRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = admin_presence::table
            .inner_join(users::table)
            .filter(users::role.eq(Role::Admin.as_str()))
            .select((PresenceRow::as_select(), users::name))
            .order((users::name.asc(), users::id.asc()))
            .load::<(PresenceRow, String)>(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows
            .into_iter()
            .map(|(row, name)| row.with_name(name))
            .collect())
    }
}
