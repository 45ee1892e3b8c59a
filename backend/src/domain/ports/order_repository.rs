//! Port for order persistence.

use async_trait::async_trait;
use pagination::{Page, PageRequest};
use uuid::Uuid;

use crate::domain::{NewOrder, Order, OrderFilter, StageChange, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by order repository adapters.
    pub enum OrderRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "order repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "order repository query failed: {message}",
    }
}

/// Port for reading and writing orders with their items.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Insert the order and its items and empty the owner's cart, atomically.
    async fn create_from_cart(&self, order: &NewOrder) -> Result<Order, OrderRepositoryError>;

    /// Orders owned by `user_id`, newest first.
    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Order>, OrderRepositoryError>;

    /// Page through all orders, newest first.
    async fn list(
        &self,
        filter: OrderFilter,
        page: PageRequest,
    ) -> Result<Page<Order>, OrderRepositoryError>;

    /// Find any order by id.
    async fn find(&self, id: Uuid) -> Result<Option<Order>, OrderRepositoryError>;

    /// Persist a stage/status pair, `false` when the order is gone.
    async fn update_stage(
        &self,
        id: Uuid,
        change: &StageChange,
    ) -> Result<bool, OrderRepositoryError>;

    /// Delete an order and its items, `false` when missing.
    async fn delete(&self, id: Uuid) -> Result<bool, OrderRepositoryError>;
}
