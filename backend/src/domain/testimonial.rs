//! Customer testimonials shown on the landing page once published.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::user::UserId;

/// Longest accepted testimonial text.
pub const TESTIMONIAL_MAX: usize = 1000;

/// Validation failures for testimonial submissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TestimonialValidationError {
    #[error("testimonial must not be empty")]
    EmptyContent,
    #[error("testimonial must be at most {max} characters")]
    ContentTooLong { max: usize },
    #[error("rating must be between 1 and 5")]
    RatingOutOfRange,
}

impl TestimonialValidationError {
    /// Request field the failure refers to.
    pub fn field(self) -> &'static str {
        match self {
            Self::EmptyContent | Self::ContentTooLong { .. } => "content",
            Self::RatingOutOfRange => "rating",
        }
    }
}

/// Star rating from one to five.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(into = "u8")]
pub struct Rating(u8);

impl Rating {
    /// Validate a rating.
    pub fn new(value: u8) -> Result<Self, TestimonialValidationError> {
        if (1..=5).contains(&value) {
            Ok(Self(value))
        } else {
            Err(TestimonialValidationError::RatingOutOfRange)
        }
    }

    /// Stars.
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl From<Rating> for u8 {
    fn from(value: Rating) -> Self {
        value.0
    }
}

/// Validated submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestimonialDraft {
    pub content: String,
    pub rating: Rating,
}

impl TestimonialDraft {
    /// Validate raw input.
    pub fn new(content: &str, rating: u8) -> Result<Self, TestimonialValidationError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(TestimonialValidationError::EmptyContent);
        }
        if content.chars().count() > TESTIMONIAL_MAX {
            return Err(TestimonialValidationError::ContentTooLong {
                max: TESTIMONIAL_MAX,
            });
        }
        Ok(Self {
            content: content.to_owned(),
            rating: Rating::new(rating)?,
        })
    }
}

/// Stored testimonial.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Testimonial {
    pub id: Uuid,
    #[serde(skip)]
    pub user_id: Option<UserId>,
    pub author_name: String,
    pub content: String,
    pub rating: Rating,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}
