//! Account registration, login and role management.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use pagination::{Page, PageRequest};

use crate::domain::ports::{
    AccountCommand, AccountQuery, NewAccount, UserPersistenceError, UserRepository,
};
use crate::domain::{Error, LoginCredentials, PasswordDigest, Registration, Role, User, UserId};

const INVALID_CREDENTIALS: &str = "invalid email or password";

fn map_repository_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::DuplicateEmail { email } => {
            Error::conflict(format!("email {email} is already registered"))
        }
    }
}

/// Account service implementing both account driving ports.
#[derive(Clone)]
pub struct AccountService<R> {
    users: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R> AccountService<R> {
    /// Create a service over a user repository.
    pub fn new(users: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { users, clock }
    }
}

#[async_trait]
impl<R> AccountCommand for AccountService<R>
where
    R: UserRepository,
{
    async fn register(&self, registration: Registration) -> Result<User, Error> {
        let password = PasswordDigest::hash(registration.password())
            .map_err(|err| Error::internal(err.to_string()))?;
        let account = NewAccount {
            id: UserId::random(),
            name: registration.name().clone(),
            email: registration.email().clone(),
            password,
            created_at: self.clock.utc(),
        };
        let user = self
            .users
            .register(&account)
            .await
            .map_err(map_repository_error)?;
        tracing::info!(user_id = %user.id(), role = %user.role(), "account registered");
        Ok(user)
    }

    async fn login(&self, credentials: LoginCredentials) -> Result<User, Error> {
        let stored = self
            .users
            .find_credentials(credentials.email())
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::unauthorized(INVALID_CREDENTIALS))?;
        if !stored.password.verify(credentials.password()) {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }
        Ok(stored.user)
    }

    async fn change_role(&self, id: &UserId, role: Role) -> Result<User, Error> {
        self.users
            .update_role(id, role)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found(format!("user {id} not found")))
    }
}

#[async_trait]
impl<R> AccountQuery for AccountService<R>
where
    R: UserRepository,
{
    async fn find_user(&self, id: &UserId) -> Result<Option<User>, Error> {
        self.users.find_by_id(id).await.map_err(map_repository_error)
    }

    async fn list_users(&self, page: PageRequest) -> Result<Page<User>, Error> {
        self.users.list(page).await.map_err(map_repository_error)
    }
}
