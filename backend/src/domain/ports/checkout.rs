//! Driving port for turning a cart into an order.

use async_trait::async_trait;

use crate::domain::{DeliveryDetails, Error, Order, PaymentMethod, UserId};

/// Validated checkout form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRequest {
    pub delivery: DeliveryDetails,
    pub payment_method: PaymentMethod,
}

/// Checkout flows.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Checkout: Send + Sync {
    /// Place a pay-on-delivery order from the cart.
    async fn place_order(
        &self,
        user_id: &UserId,
        request: CheckoutRequest,
    ) -> Result<Order, Error>;

    /// Open a PayPal order for the cart total and return its id.
    async fn start_paypal(
        &self,
        user_id: &UserId,
        request: CheckoutRequest,
    ) -> Result<String, Error>;

    /// Capture an approved PayPal order and place the order.
    async fn capture_paypal(
        &self,
        user_id: &UserId,
        paypal_order_id: &str,
        request: CheckoutRequest,
    ) -> Result<Order, Error>;
}
