//! Driving ports for order tracking and administration.
//!
//! Every read re-derives the delivery stage before returning.

use async_trait::async_trait;
use pagination::{Page, PageRequest};
use uuid::Uuid;

use crate::domain::{Error, OrderFilter, OrderStatus, TrackedOrder, UserId};

/// A customer's view of their own orders.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderTracking: Send + Sync {
    /// The caller's orders, newest first.
    async fn my_orders(&self, user_id: &UserId) -> Result<Vec<TrackedOrder>, Error>;

    /// One of the caller's orders; other users' orders read as missing.
    async fn my_order(&self, user_id: &UserId, id: Uuid) -> Result<TrackedOrder, Error>;

    /// Cancel an order that has not left the `RECEIVED` stage.
    async fn cancel(&self, user_id: &UserId, id: Uuid) -> Result<TrackedOrder, Error>;
}

/// Back-office order management.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderAdministration: Send + Sync {
    /// Page through every order.
    async fn list_orders(
        &self,
        filter: OrderFilter,
        page: PageRequest,
    ) -> Result<Page<TrackedOrder>, Error>;

    /// Any order by id.
    async fn order(&self, id: Uuid) -> Result<TrackedOrder, Error>;

    /// Force a status; `COMPLETED` also marks the order delivered.
    async fn set_status(&self, id: Uuid, status: OrderStatus) -> Result<TrackedOrder, Error>;

    /// Remove an order.
    async fn delete_order(&self, id: Uuid) -> Result<(), Error>;
}
