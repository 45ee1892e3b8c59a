//! PostgreSQL-backed `UserRepository`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use pagination::{Page, PageRequest};

use crate::domain::ports::{NewAccount, StoredCredentials, UserPersistenceError, UserRepository};
use crate::domain::{Email, Role, User, UserId};

use super::diesel_basic_error_mapping::{basic, classify, count_to_total, pool_message};
use super::models::{CredentialRow, NewUserRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

const EMAIL_UNIQUE: &str = "users_email_key";

/// Diesel implementation of [`UserRepository`].
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    UserPersistenceError::connection(pool_message(error))
}

fn map_diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    basic(
        classify(error),
        UserPersistenceError::connection,
        UserPersistenceError::query,
    )
}

fn to_user(row: UserRow) -> Result<User, UserPersistenceError> {
    row.into_domain().map_err(UserPersistenceError::query)
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn register(&self, account: &NewAccount) -> Result<User, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let result = conn
            .transaction(|conn| {
                async move {
                    // Serialise first-account checks so only one admin is minted.
                    diesel::sql_query("LOCK TABLE users IN SHARE ROW EXCLUSIVE MODE")
                        .execute(conn)
                        .await?;
                    let existing: i64 = users::table.count().get_result(conn).await?;
                    let role = if existing == 0 {
                        Role::Admin
                    } else {
                        Role::Customer
                    };
                    let row = NewUserRow {
                        id: *account.id.as_uuid(),
                        name: account.name.as_ref(),
                        email: account.email.as_ref(),
                        password_hash: account.password.as_ref(),
                        role: role.as_str(),
                        created_at: account.created_at,
                    };
                    diesel::insert_into(users::table)
                        .values(&row)
                        .returning(UserRow::as_returning())
                        .get_result::<UserRow>(conn)
                        .await
                }
                .scope_boxed()
            })
            .await;

        match result {
            Ok(row) => to_user(row),
            Err(error) => {
                let failure = classify(error);
                if failure.is_unique(EMAIL_UNIQUE) {
                    return Err(UserPersistenceError::duplicate_email(
                        account.email.as_ref(),
                    ));
                }
                Err(basic(
                    failure,
                    UserPersistenceError::connection,
                    UserPersistenceError::query,
                ))
            }
        }
    }

    async fn find_credentials(
        &self,
        email: &Email,
    ) -> Result<Option<StoredCredentials>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .filter(users::email.eq(email.as_ref()))
            .select(CredentialRow::as_select())
            .first::<CredentialRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(|found| found.into_domain().map_err(UserPersistenceError::query))
            .transpose()
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .find(*id.as_uuid())
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(to_user).transpose()
    }

    async fn list(&self, page: PageRequest) -> Result<Page<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total: i64 = users::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let rows = users::table
            .select(UserRow::as_select())
            .order((users::created_at.asc(), users::id.asc()))
            .limit(page.limit_i64())
            .offset(page.offset())
            .load::<UserRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let items = rows
            .into_iter()
            .map(to_user)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, count_to_total(total), page))
    }

    async fn update_role(
        &self,
        id: &UserId,
        role: Role,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = diesel::update(users::table.find(*id.as_uuid()))
            .set(users::role.eq(role.as_str()))
            .returning(UserRow::as_returning())
            .get_result::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(to_user).transpose()
    }
}
