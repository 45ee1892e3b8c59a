//! Ports for customer feedback: testimonials, newsletter sign-ups and
//! contact messages.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::{Page, PageRequest};
use uuid::Uuid;

use crate::domain::contact::{ContactDraft, ContactMessage};
use crate::domain::newsletter::Subscriber;
use crate::domain::testimonial::{Testimonial, TestimonialDraft};
use crate::domain::{Email, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by feedback repository adapters.
    pub enum FeedbackRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "feedback repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "feedback repository query failed: {message}",
        /// The email address is already subscribed.
        DuplicateSubscriber { email: String } => "{email} is already subscribed",
    }
}

/// Testimonial to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTestimonial {
    pub user_id: UserId,
    pub author_name: String,
    pub draft: TestimonialDraft,
    pub created_at: DateTime<Utc>,
}

/// Port for testimonials.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TestimonialRepository: Send + Sync {
    /// Insert an unpublished testimonial.
    async fn create(
        &self,
        testimonial: &NewTestimonial,
    ) -> Result<Testimonial, FeedbackRepositoryError>;

    /// Newest first; only published ones when `published_only`.
    async fn list(
        &self,
        published_only: bool,
    ) -> Result<Vec<Testimonial>, FeedbackRepositoryError>;

    /// Toggle publication, `None` when missing.
    async fn set_published(
        &self,
        id: Uuid,
        published: bool,
    ) -> Result<Option<Testimonial>, FeedbackRepositoryError>;

    /// Delete, `false` when missing.
    async fn delete(&self, id: Uuid) -> Result<bool, FeedbackRepositoryError>;
}

/// Port for newsletter subscribers.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubscriberRepository: Send + Sync {
    /// Insert a subscriber, failing with `DuplicateSubscriber` on a repeat.
    async fn create(
        &self,
        email: &Email,
        created_at: DateTime<Utc>,
    ) -> Result<Subscriber, FeedbackRepositoryError>;

    /// Page through subscribers, newest first.
    async fn list(&self, page: PageRequest) -> Result<Page<Subscriber>, FeedbackRepositoryError>;

    /// Delete, `false` when missing.
    async fn delete(&self, id: Uuid) -> Result<bool, FeedbackRepositoryError>;
}

/// Port for contact form messages.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContactRepository: Send + Sync {
    /// Insert an unread message.
    async fn create(
        &self,
        draft: &ContactDraft,
        created_at: DateTime<Utc>,
    ) -> Result<ContactMessage, FeedbackRepositoryError>;

    /// Page through messages, newest first; only unread ones when `unread_only`.
    async fn list(
        &self,
        unread_only: bool,
        page: PageRequest,
    ) -> Result<Page<ContactMessage>, FeedbackRepositoryError>;

    /// Mark read or unread, `None` when missing.
    async fn set_read(
        &self,
        id: Uuid,
        read: bool,
    ) -> Result<Option<ContactMessage>, FeedbackRepositoryError>;

    /// Delete, `false` when missing.
    async fn delete(&self, id: Uuid) -> Result<bool, FeedbackRepositoryError>;
}
