//! Newsletter subscribers.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::user::Email;

/// A stored subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscriber {
    pub id: Uuid,
    pub email: Email,
    pub created_at: DateTime<Utc>,
}
