//! Testimonial submission and moderation.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use uuid::Uuid;

use crate::domain::ports::{
    FeedbackRepositoryError, NewTestimonial, TestimonialRepository, Testimonials, UserPersistenceError,
    UserRepository,
};
use crate::domain::testimonial::{Testimonial, TestimonialDraft};
use crate::domain::{Error, UserId};

pub(crate) fn map_feedback_error(error: FeedbackRepositoryError) -> Error {
    match error {
        FeedbackRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("feedback repository unavailable: {message}"))
        }
        FeedbackRepositoryError::Query { message } => {
            Error::internal(format!("feedback repository error: {message}"))
        }
        FeedbackRepositoryError::DuplicateSubscriber { email } => {
            Error::conflict(format!("{email} is already subscribed"))
        }
    }
}

fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        other => Error::internal(format!("user repository error: {other}")),
    }
}

/// Testimonial service implementing [`Testimonials`].
#[derive(Clone)]
pub struct TestimonialService<T, U> {
    testimonials: Arc<T>,
    users: Arc<U>,
    clock: Arc<dyn Clock>,
}

impl<T, U> TestimonialService<T, U> {
    /// Create a service over testimonial and user repositories.
    pub fn new(testimonials: Arc<T>, users: Arc<U>, clock: Arc<dyn Clock>) -> Self {
        Self {
            testimonials,
            users,
            clock,
        }
    }
}

#[async_trait]
impl<T, U> Testimonials for TestimonialService<T, U>
where
    T: TestimonialRepository,
    U: UserRepository,
{
    async fn published(&self) -> Result<Vec<Testimonial>, Error> {
        self.testimonials
            .list(true)
            .await
            .map_err(map_feedback_error)
    }

    async fn submit(
        &self,
        user_id: &UserId,
        draft: TestimonialDraft,
    ) -> Result<Testimonial, Error> {
        let author = self
            .users
            .find_by_id(user_id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::unauthorized("session user no longer exists"))?;
        let testimonial = NewTestimonial {
            user_id: *user_id,
            author_name: author.name().as_ref().to_owned(),
            draft,
            created_at: self.clock.utc(),
        };
        self.testimonials
            .create(&testimonial)
            .await
            .map_err(map_feedback_error)
    }

    async fn all(&self) -> Result<Vec<Testimonial>, Error> {
        self.testimonials
            .list(false)
            .await
            .map_err(map_feedback_error)
    }

    async fn set_published(&self, id: Uuid, published: bool) -> Result<Testimonial, Error> {
        self.testimonials
            .set_published(id, published)
            .await
            .map_err(map_feedback_error)?
            .ok_or_else(|| Error::not_found(format!("testimonial {id} not found")))
    }

    async fn delete(&self, id: Uuid) -> Result<(), Error> {
        let deleted = self
            .testimonials
            .delete(id)
            .await
            .map_err(map_feedback_error)?;
        deleted
            .then_some(())
            .ok_or_else(|| Error::not_found(format!("testimonial {id} not found")))
    }
}
