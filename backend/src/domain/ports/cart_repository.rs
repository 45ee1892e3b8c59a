//! Port for per-user cart persistence.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Cart, Quantity, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by cart repository adapters.
    pub enum CartRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "cart repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "cart repository query failed: {message}",
    }
}

/// Port for a user's cart. Adapters create the cart row on first write.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CartRepository: Send + Sync {
    /// Cart lines joined with current product data, in insertion order.
    async fn load(&self, user_id: &UserId) -> Result<Cart, CartRepositoryError>;

    /// Set a line's quantity, inserting the line when absent.
    async fn set_quantity(
        &self,
        user_id: &UserId,
        product_id: Uuid,
        quantity: Quantity,
    ) -> Result<(), CartRepositoryError>;

    /// Remove a line, `false` when it was not in the cart.
    async fn remove(&self, user_id: &UserId, product_id: Uuid) -> Result<bool, CartRepositoryError>;

    /// Remove every line.
    async fn clear(&self, user_id: &UserId) -> Result<(), CartRepositoryError>;
}
