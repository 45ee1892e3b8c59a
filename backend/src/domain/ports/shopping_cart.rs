//! Driving port for the signed-in user's cart.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Cart, Error, Quantity, UserId};

/// Cart operations; every call returns the cart as it now stands.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ShoppingCart: Send + Sync {
    /// Current contents.
    async fn view(&self, user_id: &UserId) -> Result<Cart, Error>;

    /// Add units of an available product, merging with an existing line.
    async fn add_item(
        &self,
        user_id: &UserId,
        product_id: Uuid,
        quantity: Quantity,
    ) -> Result<Cart, Error>;

    /// Overwrite a line's quantity; `None` removes the line.
    async fn set_quantity(
        &self,
        user_id: &UserId,
        product_id: Uuid,
        quantity: Option<Quantity>,
    ) -> Result<Cart, Error>;

    /// Drop a line.
    async fn remove_item(&self, user_id: &UserId, product_id: Uuid) -> Result<Cart, Error>;

    /// Empty the cart.
    async fn clear(&self, user_id: &UserId) -> Result<Cart, Error>;
}
