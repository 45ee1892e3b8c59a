//! Driving ports for account registration, login and administration.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::{Error, LoginCredentials, Registration, Role, User, UserId};

/// Account mutations and credential checks.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountCommand: Send + Sync {
    /// Create an account. Duplicate emails yield a conflict.
    async fn register(&self, registration: Registration) -> Result<User, Error>;

    /// Check credentials. Unknown emails and wrong passwords are
    /// indistinguishable to the caller.
    async fn login(&self, credentials: LoginCredentials) -> Result<User, Error>;

    /// Change another user's role.
    async fn change_role(&self, id: &UserId, role: Role) -> Result<User, Error>;
}

/// Account reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountQuery: Send + Sync {
    /// Resolve a session's user; `None` when the account has gone.
    async fn find_user(&self, id: &UserId) -> Result<Option<User>, Error>;

    /// Page through every account.
    async fn list_users(&self, page: PageRequest) -> Result<Page<User>, Error>;
}
