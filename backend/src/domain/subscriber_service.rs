//! Newsletter sign-ups.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use pagination::{Page, PageRequest};
use uuid::Uuid;

use crate::domain::newsletter::Subscriber;
use crate::domain::ports::{SubscriberRepository, Subscribers};
use crate::domain::testimonial_service::map_feedback_error;
use crate::domain::{Email, Error};

/// Subscriber service implementing [`Subscribers`].
#[derive(Clone)]
pub struct SubscriberService<S> {
    subscribers: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S> SubscriberService<S> {
    /// Create a service over a subscriber repository.
    pub fn new(subscribers: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self { subscribers, clock }
    }
}

#[async_trait]
impl<S> Subscribers for SubscriberService<S>
where
    S: SubscriberRepository,
{
    async fn subscribe(&self, email: Email) -> Result<Subscriber, Error> {
        self.subscribers
            .create(&email, self.clock.utc())
            .await
            .map_err(map_feedback_error)
    }

    async fn list(&self, page: PageRequest) -> Result<Page<Subscriber>, Error> {
        self.subscribers
            .list(page)
            .await
            .map_err(map_feedback_error)
    }

    async fn delete(&self, id: Uuid) -> Result<(), Error> {
        let deleted = self
            .subscribers
            .delete(id)
            .await
            .map_err(map_feedback_error)?;
        deleted
            .then_some(())
            .ok_or_else(|| Error::not_found(format!("subscriber {id} not found")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::{FeedbackRepositoryError, MockSubscriberRepository};
    use crate::test_support::{MutableClock, fixture_now};
    use rstest::rstest;

    fn service(repo: MockSubscriberRepository) -> SubscriberService<MockSubscriberRepository> {
        SubscriberService::new(Arc::new(repo), Arc::new(MutableClock::new(fixture_now())))
    }

    #[rstest]
    #[tokio::test]
    async fn repeat_sign_ups_conflict() {
        let mut repo = MockSubscriberRepository::new();
        repo.expect_create().return_once(|email, _| {
            Err(FeedbackRepositoryError::duplicate_subscriber(
                email.as_ref(),
            ))
        });

        let err = service(repo)
            .subscribe(Email::new("fan@bistro.test").expect("email"))
            .await
            .expect_err("duplicate");
        assert_eq!(err.code(), ErrorCode::Conflict);
    }

    #[rstest]
    #[tokio::test]
    async fn sign_ups_are_timestamped_by_the_clock() {
        let mut repo = MockSubscriberRepository::new();
        repo.expect_create()
            .withf(|_, at| *at == fixture_now())
            .return_once(|email, at| {
                Ok(Subscriber {
                    id: Uuid::new_v4(),
                    email: email.clone(),
                    created_at: at,
                })
            });

        let subscriber = service(repo)
            .subscribe(Email::new("fan@bistro.test").expect("email"))
            .await
            .expect("subscribed");
        assert_eq!(subscriber.email.as_ref(), "fan@bistro.test");
    }
}
