//! Internal Diesel row structs and their conversions to domain types.
//!
//! Conversions return `Err(String)` when a stored value no longer passes
//! domain validation; repositories surface that as a query error.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::catalogue::{Category, PreparationMinutes, Product};
use crate::domain::chat::{ChatGroup, ChatMessage, PresenceRecord};
use crate::domain::contact::ContactMessage;
use crate::domain::image::StoredImage;
use crate::domain::newsletter::Subscriber;
use crate::domain::order::{OrderItem, OrderPricing};
use crate::domain::ports::StoredCredentials;
use crate::domain::testimonial::{Rating, Testimonial};
use crate::domain::{
    CartLine, DeliveryDetails, Email, EstimatedMinutes, Money, Order, PasswordDigest, Quantity,
    Role, Slug, User, UserId, UserName,
};

use super::schema::{
    admin_presence, cart_items, categories, chat_groups, chat_messages, contact_messages,
    order_items, orders, products, subscribers, testimonials, uploaded_images, users,
};

fn invalid(column: &str, error: impl std::fmt::Display) -> String {
    format!("stored {column} is invalid: {error}")
}

fn money(column: &str, cents: i64) -> Result<Money, String> {
    Money::from_cents(cents).map_err(|err| invalid(column, err))
}

fn unsigned(column: &str, value: i32) -> Result<u32, String> {
    u32::try_from(value).map_err(|err| invalid(column, err))
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl UserRow {
    pub(crate) fn into_domain(self) -> Result<User, String> {
        Ok(User::new(
            UserId::from_uuid(self.id),
            UserName::new(&self.name).map_err(|err| invalid("user name", err))?,
            Email::new(&self.email).map_err(|err| invalid("email", err))?,
            self.role.parse::<Role>().map_err(|err| invalid("role", err))?,
            self.created_at,
        ))
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CredentialRow {
    #[diesel(embed)]
    pub user: UserRow,
    pub password_hash: String,
}

impl CredentialRow {
    pub(crate) fn into_domain(self) -> Result<StoredCredentials, String> {
        Ok(StoredCredentials {
            user: self.user.into_domain()?,
            password: PasswordDigest::from_stored(self.password_hash),
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub role: &'a str,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Catalogue
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = categories)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CategoryRow {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

impl CategoryRow {
    pub(crate) fn into_domain(self) -> Result<Category, String> {
        Ok(Category {
            id: self.id,
            name: self.name,
            slug: Slug::new(&self.slug).map_err(|err| invalid("category slug", err))?,
            description: self.description,
            image_url: self.image_url,
        })
    }
}

/// Insert and full-replace changeset for categories.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = categories)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct CategoryChanges<'a> {
    pub name: &'a str,
    pub slug: &'a str,
    pub description: Option<&'a str>,
    pub image_url: Option<&'a str>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ProductRow {
    pub id: Uuid,
    pub category_id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub image_url: Option<String>,
    pub preparation_minutes: i32,
    pub is_available: bool,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProductRow {
    fn preparation(&self) -> Result<PreparationMinutes, String> {
        let minutes = unsigned("preparation minutes", self.preparation_minutes)?;
        PreparationMinutes::new(minutes).map_err(|err| invalid("preparation minutes", err))
    }

    pub(crate) fn into_domain(self) -> Result<Product, String> {
        Ok(Product {
            preparation_minutes: self.preparation()?,
            price: money("price", self.price_cents)?,
            slug: Slug::new(&self.slug).map_err(|err| invalid("product slug", err))?,
            id: self.id,
            category_id: self.category_id,
            name: self.name,
            description: self.description,
            image_url: self.image_url,
            is_available: self.is_available,
            is_featured: self.is_featured,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }

    /// A cart line pairing this product with a stored quantity.
    pub(crate) fn into_cart_line(self, quantity: i32) -> Result<CartLine, String> {
        let quantity = Quantity::new(unsigned("cart quantity", quantity)?)
            .map_err(|err| invalid("cart quantity", err))?;
        Ok(CartLine {
            preparation_minutes: self.preparation()?,
            unit_price: money("price", self.price_cents)?,
            product_id: self.id,
            name: self.name,
            quantity,
            image_url: self.image_url,
            is_available: self.is_available,
        })
    }
}

/// Insert and full-replace changeset for products.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = products)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct ProductChanges<'a> {
    pub category_id: Uuid,
    pub name: &'a str,
    pub slug: &'a str,
    pub description: Option<&'a str>,
    pub price_cents: i64,
    pub image_url: Option<&'a str>,
    pub preparation_minutes: i32,
    pub is_available: bool,
    pub is_featured: bool,
}

// ---------------------------------------------------------------------------
// Cart
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = cart_items)]
pub(crate) struct NewCartItemRow {
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
}

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct OrderRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: String,
    pub stage: String,
    pub payment_method: String,
    pub payment_status: String,
    pub paypal_order_id: Option<String>,
    pub subtotal_cents: i64,
    pub delivery_fee_cents: i64,
    pub total_cents: i64,
    pub delivery_address: String,
    pub phone: String,
    pub notes: Option<String>,
    pub estimated_minutes: i32,
    pub created_at: DateTime<Utc>,
    pub stage_updated_at: DateTime<Utc>,
}

impl OrderRow {
    pub(crate) fn into_domain(self, items: Vec<OrderItemRow>) -> Result<Order, String> {
        let estimated_minutes = EstimatedMinutes::new(unsigned(
            "estimated minutes",
            self.estimated_minutes,
        )?)
        .ok_or_else(|| invalid("estimated minutes", "zero"))?;
        let items = items
            .into_iter()
            .map(OrderItemRow::into_domain)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Order {
            id: self.id,
            user_id: UserId::from_uuid(self.user_id),
            status: self.status.parse().map_err(|err| invalid("status", err))?,
            stage: self.stage.parse().map_err(|err| invalid("stage", err))?,
            payment_method: self
                .payment_method
                .parse()
                .map_err(|err| invalid("payment method", err))?,
            payment_status: self
                .payment_status
                .parse()
                .map_err(|err| invalid("payment status", err))?,
            paypal_order_id: self.paypal_order_id,
            pricing: OrderPricing {
                subtotal: money("subtotal", self.subtotal_cents)?,
                delivery_fee: money("delivery fee", self.delivery_fee_cents)?,
                total: money("total", self.total_cents)?,
            },
            delivery: DeliveryDetails {
                address: self.delivery_address,
                phone: self.phone,
                notes: self.notes,
            },
            estimated_minutes,
            created_at: self.created_at,
            stage_updated_at: self.stage_updated_at,
            items,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = orders)]
pub(crate) struct NewOrderRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: &'a str,
    pub stage: &'a str,
    pub payment_method: &'a str,
    pub payment_status: &'a str,
    pub paypal_order_id: Option<&'a str>,
    pub subtotal_cents: i64,
    pub delivery_fee_cents: i64,
    pub total_cents: i64,
    pub delivery_address: &'a str,
    pub phone: &'a str,
    pub notes: Option<&'a str>,
    pub estimated_minutes: i32,
    pub created_at: DateTime<Utc>,
    pub stage_updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Associations)]
#[diesel(table_name = order_items)]
#[diesel(belongs_to(OrderRow, foreign_key = order_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct OrderItemRow {
    pub id: i64,
    pub order_id: Uuid,
    pub product_id: Option<Uuid>,
    pub name: String,
    pub unit_price_cents: i64,
    pub quantity: i32,
}

impl OrderItemRow {
    fn into_domain(self) -> Result<OrderItem, String> {
        Ok(OrderItem {
            product_id: self.product_id,
            name: self.name,
            unit_price: money("unit price", self.unit_price_cents)?,
            quantity: Quantity::new(unsigned("quantity", self.quantity)?)
                .map_err(|err| invalid("quantity", err))?,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = order_items)]
pub(crate) struct NewOrderItemRow<'a> {
    pub order_id: Uuid,
    pub product_id: Option<Uuid>,
    pub name: &'a str,
    pub unit_price_cents: i64,
    pub quantity: i32,
}

// ---------------------------------------------------------------------------
// Feedback
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = testimonials)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct TestimonialRow {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub author_name: String,
    pub content: String,
    pub rating: i16,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

impl TestimonialRow {
    pub(crate) fn into_domain(self) -> Result<Testimonial, String> {
        let rating = u8::try_from(self.rating)
            .ok()
            .and_then(|value| Rating::new(value).ok())
            .ok_or_else(|| invalid("rating", self.rating))?;
        Ok(Testimonial {
            id: self.id,
            user_id: self.user_id.map(UserId::from_uuid),
            author_name: self.author_name,
            content: self.content,
            rating,
            is_published: self.is_published,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = testimonials)]
pub(crate) struct NewTestimonialRow<'a> {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub author_name: &'a str,
    pub content: &'a str,
    pub rating: i16,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = subscribers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct SubscriberRow {
    pub id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl SubscriberRow {
    pub(crate) fn into_domain(self) -> Result<Subscriber, String> {
        Ok(Subscriber {
            id: self.id,
            email: Email::new(&self.email).map_err(|err| invalid("email", err))?,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = contact_messages)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ContactMessageRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl ContactMessageRow {
    pub(crate) fn into_domain(self) -> Result<ContactMessage, String> {
        Ok(ContactMessage {
            id: self.id,
            name: UserName::new(&self.name).map_err(|err| invalid("sender name", err))?,
            email: Email::new(&self.email).map_err(|err| invalid("email", err))?,
            subject: self.subject,
            message: self.message,
            is_read: self.is_read,
            created_at: self.created_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Chat
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = chat_groups)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ChatGroupRow {
    pub id: Uuid,
    pub name: String,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<ChatGroupRow> for ChatGroup {
    fn from(row: ChatGroupRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            created_by: UserId::from_uuid(row.created_by),
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = chat_messages)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ChatMessageRow {
    pub id: i64,
    pub group_id: Option<Uuid>,
    pub sender_id: Uuid,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl ChatMessageRow {
    pub(crate) fn with_sender(self, sender_name: String) -> ChatMessage {
        ChatMessage {
            id: self.id,
            group_id: self.group_id,
            sender_id: UserId::from_uuid(self.sender_id),
            sender_name,
            body: self.body,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = chat_messages)]
pub(crate) struct NewChatMessageRow<'a> {
    pub group_id: Option<Uuid>,
    pub sender_id: Uuid,
    pub body: &'a str,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = admin_presence)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PresenceRow {
    pub user_id: Uuid,
    pub is_online: bool,
    pub last_seen_at: DateTime<Utc>,
}

impl PresenceRow {
    pub(crate) fn with_name(self, name: String) -> PresenceRecord {
        PresenceRecord {
            user_id: UserId::from_uuid(self.user_id),
            name,
            is_online: self.is_online,
            last_seen_at: self.last_seen_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Images
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = uploaded_images)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ImageRow {
    pub id: Uuid,
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub created_at: DateTime<Utc>,
}

impl From<ImageRow> for StoredImage {
    fn from(row: ImageRow) -> Self {
        Self {
            id: row.id,
            file_name: row.file_name,
            content_type: row.content_type,
            size_bytes: row.size_bytes,
            created_at: row.created_at,
        }
    }
}

impl From<&StoredImage> for ImageRow {
    fn from(image: &StoredImage) -> Self {
        Self {
            id: image.id,
            file_name: image.file_name.clone(),
            content_type: image.content_type.clone(),
            size_bytes: image.size_bytes,
            created_at: image.created_at,
        }
    }
}
