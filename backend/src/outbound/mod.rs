//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL repositories using Diesel ORM
//! - **paypal**: PayPal REST payment gateway
//! - **telegram**: staff notifications over the Telegram Bot API
//! - **storage**: uploaded image bytes on the local filesystem
//!
//! Adapters translate between domain types and infrastructure
//! representations and contain no business logic.

pub mod paypal;
pub mod persistence;
pub mod storage;
pub mod telegram;
