//! Messages sent through the public contact form.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::user::{Email, UserName, UserValidationError};

/// Longest accepted subject line.
pub const SUBJECT_MAX: usize = 150;
/// Longest accepted message body.
pub const MESSAGE_MAX: usize = 5000;

/// Validation failures for contact submissions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContactValidationError {
    #[error(transparent)]
    Name(UserValidationError),
    #[error(transparent)]
    Email(UserValidationError),
    #[error("subject must be between 1 and {max} characters")]
    Subject { max: usize },
    #[error("message must be between 1 and {max} characters")]
    Message { max: usize },
}

impl ContactValidationError {
    /// Request field the failure refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Name(_) => "name",
            Self::Email(_) => "email",
            Self::Subject { .. } => "subject",
            Self::Message { .. } => "message",
        }
    }
}

fn bounded(raw: &str, max: usize) -> Option<String> {
    let text = raw.trim();
    (!text.is_empty() && text.chars().count() <= max).then(|| text.to_owned())
}

/// Validated contact form submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactDraft {
    pub name: UserName,
    pub email: Email,
    pub subject: String,
    pub message: String,
}

impl ContactDraft {
    /// Validate raw form fields.
    pub fn new(
        name: &str,
        email: &str,
        subject: &str,
        message: &str,
    ) -> Result<Self, ContactValidationError> {
        Ok(Self {
            name: UserName::new(name).map_err(ContactValidationError::Name)?,
            email: Email::new(email).map_err(ContactValidationError::Email)?,
            subject: bounded(subject, SUBJECT_MAX)
                .ok_or(ContactValidationError::Subject { max: SUBJECT_MAX })?,
            message: bounded(message, MESSAGE_MAX)
                .ok_or(ContactValidationError::Message { max: MESSAGE_MAX })?,
        })
    }
}

/// Stored contact message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
    pub id: Uuid,
    pub name: UserName,
    pub email: Email,
    pub subject: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}
