//! Driving ports for testimonials, newsletter sign-ups and the contact form.

use async_trait::async_trait;
use pagination::{Page, PageRequest};
use uuid::Uuid;

use crate::domain::contact::{ContactDraft, ContactMessage};
use crate::domain::newsletter::Subscriber;
use crate::domain::testimonial::{Testimonial, TestimonialDraft};
use crate::domain::{Email, Error, UserId};

/// Testimonial submission and moderation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Testimonials: Send + Sync {
    /// Published testimonials for the landing page.
    async fn published(&self) -> Result<Vec<Testimonial>, Error>;

    /// Submit a testimonial for moderation.
    async fn submit(
        &self,
        user_id: &UserId,
        draft: TestimonialDraft,
    ) -> Result<Testimonial, Error>;

    /// Every testimonial, for moderation.
    async fn all(&self) -> Result<Vec<Testimonial>, Error>;

    /// Publish or hide one.
    async fn set_published(&self, id: Uuid, published: bool) -> Result<Testimonial, Error>;

    /// Remove one.
    async fn delete(&self, id: Uuid) -> Result<(), Error>;
}

/// Newsletter sign-ups.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Subscribers: Send + Sync {
    /// Subscribe an address.
    async fn subscribe(&self, email: Email) -> Result<Subscriber, Error>;

    /// Page through subscribers.
    async fn list(&self, page: PageRequest) -> Result<Page<Subscriber>, Error>;

    /// Remove one.
    async fn delete(&self, id: Uuid) -> Result<(), Error>;
}

/// Contact form inbox.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContactInbox: Send + Sync {
    /// Store a message and alert staff.
    async fn submit(&self, draft: ContactDraft) -> Result<ContactMessage, Error>;

    /// Page through messages.
    async fn list(
        &self,
        unread_only: bool,
        page: PageRequest,
    ) -> Result<Page<ContactMessage>, Error>;

    /// Mark read or unread.
    async fn set_read(&self, id: Uuid, read: bool) -> Result<ContactMessage, Error>;

    /// Remove one.
    async fn delete(&self, id: Uuid) -> Result<(), Error>;
}
