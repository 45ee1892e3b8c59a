//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Each repository implements one driven port from
//! [`crate::domain::ports`] over a shared `bb8` pool of `diesel-async`
//! connections. Row structs (`models.rs`) and table definitions
//! (`schema.rs`) stay private to this module; adapters translate them into
//! domain types and map database failures onto the port's error enum.
//!
//! Constraint violations the domain cares about (duplicate emails and slugs,
//! unknown categories, unknown chat groups) are recognised by constraint
//! name and surfaced as dedicated port error variants.
//!
//! # Example
//!
//! ```ignore
//! use bistro::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/bistro")).await?;
//! let users = DieselUserRepository::new(pool);
//! ```

mod diesel_basic_error_mapping;
mod diesel_cart_repository;
mod diesel_catalogue_repository;
mod diesel_chat_repository;
mod diesel_feedback_repository;
mod diesel_image_repository;
mod diesel_order_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_cart_repository::DieselCartRepository;
pub use diesel_catalogue_repository::DieselCatalogueRepository;
pub use diesel_chat_repository::DieselChatRepository;
pub use diesel_feedback_repository::{
    DieselContactRepository, DieselSubscriberRepository, DieselTestimonialRepository,
};
pub use diesel_image_repository::DieselImageRepository;
pub use diesel_order_repository::DieselOrderRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::run_pending_migrations;
pub use pool::{DbPool, PoolConfig, PoolError, PoolStatus};
