//! Contact form inbox.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use pagination::{Page, PageRequest};
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::contact::{ContactDraft, ContactMessage};
use crate::domain::notification::contact_message;
use crate::domain::ports::{ContactInbox, ContactRepository, Notifier};
use crate::domain::testimonial_service::map_feedback_error;

/// Contact service implementing [`ContactInbox`].
#[derive(Clone)]
pub struct ContactService<R> {
    messages: Arc<R>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
}

impl<R> ContactService<R> {
    /// Create a service that stores messages and alerts staff.
    pub fn new(messages: Arc<R>, notifier: Arc<dyn Notifier>, clock: Arc<dyn Clock>) -> Self {
        Self {
            messages,
            notifier,
            clock,
        }
    }
}

#[async_trait]
impl<R> ContactInbox for ContactService<R>
where
    R: ContactRepository,
{
    async fn submit(&self, draft: ContactDraft) -> Result<ContactMessage, Error> {
        let message = self
            .messages
            .create(&draft, self.clock.utc())
            .await
            .map_err(map_feedback_error)?;
        self.notifier.notify(contact_message(&message));
        Ok(message)
    }

    async fn list(
        &self,
        unread_only: bool,
        page: PageRequest,
    ) -> Result<Page<ContactMessage>, Error> {
        self.messages
            .list(unread_only, page)
            .await
            .map_err(map_feedback_error)
    }

    async fn set_read(&self, id: Uuid, read: bool) -> Result<ContactMessage, Error> {
        self.messages
            .set_read(id, read)
            .await
            .map_err(map_feedback_error)?
            .ok_or_else(|| Error::not_found(format!("contact message {id} not found")))
    }

    async fn delete(&self, id: Uuid) -> Result<(), Error> {
        let deleted = self
            .messages
            .delete(id)
            .await
            .map_err(map_feedback_error)?;
        deleted
            .then_some(())
            .ok_or_else(|| Error::not_found(format!("contact message {id} not found")))
    }
}
