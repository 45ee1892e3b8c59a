//! Domain primitives, services and ports.
//!
//! Entities validate their own input and know nothing about HTTP or SQL.
//! Services implement the driving ports in [`ports`] on top of the driven
//! repository ports, translating repository failures into [`Error`].
//!
//! Public surface:
//! - [`Error`] / [`ErrorCode`]: API error payload and stable code.
//! - [`TraceId`]: per-request correlation identifier.
//! - [`stage_for_elapsed`]: delivery stage derivation.

pub mod auth;
pub mod cart;
pub mod catalogue;
pub mod chat;
pub mod contact;
pub mod error;
pub mod image;
pub mod money;
pub mod newsletter;
pub mod notification;
pub mod order;
pub mod order_stage;
pub mod ports;
pub mod slug;
pub mod testimonial;
pub mod trace_id;
pub mod user;

mod account_service;
mod cart_service;
mod catalogue_service;
mod chat_service;
mod checkout_service;
mod contact_service;
mod image_service;
mod order_service;
mod subscriber_service;
mod testimonial_service;

pub use self::account_service::AccountService;
pub use self::auth::{
    CredentialsValidationError, LoginCredentials, PasswordDigest, PasswordHashError, Registration,
};
pub use self::cart::{Cart, CartLine, Quantity, QuantityOutOfRange};
pub use self::cart_service::CartService;
pub use self::catalogue::{
    Category, CategoryDraft, CategoryInput, CatalogueValidationError, PreparationMinutes, Product,
    ProductDraft, ProductFilter, ProductInput,
};
pub use self::catalogue_service::CatalogueService;
pub use self::chat_service::ChatService;
pub use self::checkout_service::{CheckoutService, CheckoutSettings};
pub use self::contact_service::ContactService;
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::image_service::ImageService;
pub use self::money::Money;
pub use self::order::{
    DeliveryDetails, NewOrder, Order, OrderFilter, OrderStage, OrderStatus, PaymentMethod,
    PaymentStatus, StageChange,
};
pub use self::order_service::OrderService;
pub use self::order_stage::{EstimatedMinutes, TrackedOrder, progress_percent, stage_for_elapsed};
pub use self::slug::Slug;
pub use self::subscriber_service::SubscriberService;
pub use self::testimonial_service::TestimonialService;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{Email, Role, User, UserId, UserName, UserValidationError};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use bistro::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
