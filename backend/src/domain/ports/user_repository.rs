//! Port abstraction for account persistence adapters and their errors.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::{Page, PageRequest};

use crate::domain::{Email, PasswordDigest, Role, User, UserId, UserName};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// Another account already uses the email address.
        DuplicateEmail { email: String } => "email {email} is already registered",
    }
}

/// Account to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub id: UserId,
    pub name: UserName,
    pub email: Email,
    pub password: PasswordDigest,
    pub created_at: DateTime<Utc>,
}

/// A user together with the digest needed to check their password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCredentials {
    pub user: User,
    pub password: PasswordDigest,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert an account.
    ///
    /// The very first account is stored as [`Role::Admin`], every later one
    /// as [`Role::Customer`]. The count and the insert share a transaction.
    async fn register(&self, account: &NewAccount) -> Result<User, UserPersistenceError>;

    /// Fetch credentials by login email.
    async fn find_credentials(
        &self,
        email: &Email,
    ) -> Result<Option<StoredCredentials>, UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Page through users, oldest first.
    async fn list(&self, page: PageRequest) -> Result<Page<User>, UserPersistenceError>;

    /// Change a user's role, returning `None` when the user does not exist.
    async fn update_role(
        &self,
        id: &UserId,
        role: Role,
    ) -> Result<Option<User>, UserPersistenceError>;
}
