//! Authentication guards used by HTTP handlers.
//!
//! The session only proves who the caller was when they signed in; the
//! account is re-read on every guarded request so a deleted user loses
//! access and role changes apply at once.

use crate::domain::{Error, User};

use super::ApiResult;
use super::session::SessionContext;
use super::state::HttpState;

/// Resolve the signed-in user or fail with `401`.
pub async fn require_user(state: &HttpState, session: &SessionContext) -> ApiResult<User> {
    let user_id = session.require_user_id()?;
    match state.account_query.find_user(&user_id).await? {
        Some(user) => Ok(user),
        None => {
            tracing::info!(%user_id, "session refers to a missing user");
            session.sign_out();
            Err(Error::unauthorized("login required"))
        }
    }
}

/// Resolve the signed-in user and insist on the admin role (`403`).
pub async fn require_admin(state: &HttpState, session: &SessionContext) -> ApiResult<User> {
    let user = require_user(state, session).await?;
    if user.is_admin() {
        Ok(user)
    } else {
        Err(Error::forbidden("admin access required"))
    }
}
