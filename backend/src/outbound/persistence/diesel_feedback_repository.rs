//! PostgreSQL-backed feedback repositories: testimonials, newsletter
//! subscribers and contact messages.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use pagination::{Page, PageRequest};
use uuid::Uuid;

use crate::domain::Email;
use crate::domain::contact::{ContactDraft, ContactMessage};
use crate::domain::newsletter::Subscriber;
use crate::domain::ports::{
    ContactRepository, FeedbackRepositoryError, NewTestimonial, SubscriberRepository,
    TestimonialRepository,
};
use crate::domain::testimonial::Testimonial;

use super::diesel_basic_error_mapping::{DbFailure, basic, classify, count_to_total, pool_message};
use super::models::{ContactMessageRow, NewTestimonialRow, SubscriberRow, TestimonialRow};
use super::pool::{DbPool, PoolError};
use super::schema::{contact_messages, subscribers, testimonials};

const SUBSCRIBER_EMAIL_UNIQUE: &str = "subscribers_email_key";

fn map_pool_error(error: PoolError) -> FeedbackRepositoryError {
    FeedbackRepositoryError::connection(pool_message(error))
}

fn fallback(failure: DbFailure) -> FeedbackRepositoryError {
    basic(
        failure,
        FeedbackRepositoryError::connection,
        FeedbackRepositoryError::query,
    )
}

fn map_diesel_error(error: diesel::result::Error) -> FeedbackRepositoryError {
    fallback(classify(error))
}

/// Diesel implementation of [`TestimonialRepository`].
#[derive(Clone)]
pub struct DieselTestimonialRepository {
    pool: DbPool,
}

impl DieselTestimonialRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn to_testimonial(row: TestimonialRow) -> Result<Testimonial, FeedbackRepositoryError> {
    row.into_domain().map_err(FeedbackRepositoryError::query)
}

#[async_trait]
impl TestimonialRepository for DieselTestimonialRepository {
    async fn create(
        &self,
        testimonial: &NewTestimonial,
    ) -> Result<Testimonial, FeedbackRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewTestimonialRow {
            id: Uuid::new_v4(),
            user_id: Some(*testimonial.user_id.as_uuid()),
            author_name: &testimonial.author_name,
            content: &testimonial.draft.content,
            rating: i16::from(testimonial.draft.rating.get()),
            is_published: false,
            created_at: testimonial.created_at,
        };
        let stored = diesel::insert_into(testimonials::table)
            .values(&row)
            .returning(TestimonialRow::as_returning())
            .get_result::<TestimonialRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        to_testimonial(stored)
    }

    async fn list(
        &self,
        published_only: bool,
    ) -> Result<Vec<Testimonial>, FeedbackRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = testimonials::table.into_boxed::<Pg>();
        if published_only {
            query = query.filter(testimonials::is_published.eq(true));
        }
        query
            .select(TestimonialRow::as_select())
            .order((testimonials::created_at.desc(), testimonials::id.asc()))
            .load::<TestimonialRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?
            .into_iter()
            .map(to_testimonial)
            .collect()
    }

    async fn set_published(
        &self,
        id: Uuid,
        published: bool,
    ) -> Result<Option<Testimonial>, FeedbackRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = diesel::update(testimonials::table.find(id))
            .set(testimonials::is_published.eq(published))
            .returning(TestimonialRow::as_returning())
            .get_result::<TestimonialRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(to_testimonial).transpose()
    }

    async fn delete(&self, id: Uuid) -> Result<bool, FeedbackRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(testimonials::table.find(id))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }
}

/// Diesel implementation of [`SubscriberRepository`].
#[derive(Clone)]
pub struct DieselSubscriberRepository {
    pool: DbPool,
}

impl DieselSubscriberRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_subscriber_write(error: diesel::result::Error, email: &Email) -> FeedbackRepositoryError {
    let failure = classify(error);
    if failure.is_unique(SUBSCRIBER_EMAIL_UNIQUE) {
        return FeedbackRepositoryError::duplicate_subscriber(email.as_ref());
    }
    fallback(failure)
}

fn to_subscriber(row: SubscriberRow) -> Result<Subscriber, FeedbackRepositoryError> {
    row.into_domain().map_err(FeedbackRepositoryError::query)
}

#[async_trait]
impl SubscriberRepository for DieselSubscriberRepository {
    async fn create(
        &self,
        email: &Email,
        created_at: DateTime<Utc>,
    ) -> Result<Subscriber, FeedbackRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = SubscriberRow {
            id: Uuid::new_v4(),
            email: email.as_ref().to_owned(),
            created_at,
        };
        let stored = diesel::insert_into(subscribers::table)
            .values(&row)
            .returning(SubscriberRow::as_returning())
            .get_result::<SubscriberRow>(&mut conn)
            .await
            .map_err(|err| map_subscriber_write(err, email))?;
        to_subscriber(stored)
    }

    async fn list(&self, page: PageRequest) -> Result<Page<Subscriber>, FeedbackRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total: i64 = subscribers::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let items = subscribers::table
            .select(SubscriberRow::as_select())
            .order((subscribers::created_at.desc(), subscribers::id.asc()))
            .limit(page.limit_i64())
            .offset(page.offset())
            .load::<SubscriberRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?
            .into_iter()
            .map(to_subscriber)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, count_to_total(total), page))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, FeedbackRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(subscribers::table.find(id))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }
}

/// Diesel implementation of [`ContactRepository`].
#[derive(Clone)]
pub struct DieselContactRepository {
    pool: DbPool,
}

impl DieselContactRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn to_contact(row: ContactMessageRow) -> Result<ContactMessage, FeedbackRepositoryError> {
    row.into_domain().map_err(FeedbackRepositoryError::query)
}

fn contact_query(unread_only: bool) -> contact_messages::BoxedQuery<'static, Pg> {
    let query = contact_messages::table.into_boxed();
    if unread_only {
        query.filter(contact_messages::is_read.eq(false))
    } else {
        query
    }
}

#[async_trait]
impl ContactRepository for DieselContactRepository {
    async fn create(
        &self,
        draft: &ContactDraft,
        created_at: DateTime<Utc>,
    ) -> Result<ContactMessage, FeedbackRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = ContactMessageRow {
            id: Uuid::new_v4(),
            name: draft.name.as_ref().to_owned(),
            email: draft.email.as_ref().to_owned(),
            subject: draft.subject.clone(),
            message: draft.message.clone(),
            is_read: false,
            created_at,
        };
        let stored = diesel::insert_into(contact_messages::table)
            .values(&row)
            .returning(ContactMessageRow::as_returning())
            .get_result::<ContactMessageRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        to_contact(stored)
    }

    async fn list(
        &self,
        unread_only: bool,
        page: PageRequest,
    ) -> Result<Page<ContactMessage>, FeedbackRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total: i64 = contact_query(unread_only)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let items = contact_query(unread_only)
            .select(ContactMessageRow::as_select())
            .order((contact_messages::created_at.desc(), contact_messages::id.asc()))
            .limit(page.limit_i64())
            .offset(page.offset())
            .load::<ContactMessageRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?
            .into_iter()
            .map(to_contact)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, count_to_total(total), page))
    }

    async fn set_read(
        &self,
        id: Uuid,
        read: bool,
    ) -> Result<Option<ContactMessage>, FeedbackRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = diesel::update(contact_messages::table.find(id))
            .set(contact_messages::is_read.eq(read))
            .returning(ContactMessageRow::as_returning())
            .get_result::<ContactMessageRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(to_contact).transpose()
    }

    async fn delete(&self, id: Uuid) -> Result<bool, FeedbackRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(contact_messages::table.find(id))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }
}
