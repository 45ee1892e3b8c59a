//! Checkout: cart to order, with optional PayPal capture.
//!
//! Orders are priced from the cart at current menu prices. Placing one
//! inserts the order, snapshots its items and empties the cart in a single
//! repository transaction. Staff are notified afterwards, best effort.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;

use crate::domain::cart_service::map_cart_error;
use crate::domain::notification::new_order_message;
use crate::domain::order::{OrderPricing, Settlement};
use crate::domain::ports::{
    CartRepository, Checkout, CheckoutRequest, Notifier, OrderRepository, OrderRepositoryError,
    PaymentGateway, PaymentGatewayError, UserRepository,
};
use crate::domain::{Cart, Error, Money, NewOrder, Order, PaymentMethod, UserId};

/// Pricing and payment knobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSettings {
    pub delivery_fee: Money,
    pub delivery_minutes: u32,
    /// ISO 4217 code sent to PayPal.
    pub currency: String,
}

pub(crate) fn map_order_error(error: OrderRepositoryError) -> Error {
    match error {
        OrderRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("order repository unavailable: {message}"))
        }
        OrderRepositoryError::Query { message } => {
            Error::internal(format!("order repository error: {message}"))
        }
    }
}

fn map_gateway_error(error: PaymentGatewayError) -> Error {
    tracing::warn!(%error, "payment provider call failed");
    match error {
        PaymentGatewayError::Disabled => Error::service_unavailable("payments are not configured"),
        _ => Error::service_unavailable("payment provider unavailable"),
    }
}

/// Checkout service implementing [`Checkout`].
#[derive(Clone)]
pub struct CheckoutService<C, O, U, G> {
    carts: Arc<C>,
    orders: Arc<O>,
    users: Arc<U>,
    gateway: Arc<G>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    settings: CheckoutSettings,
}

impl<C, O, U, G> CheckoutService<C, O, U, G> {
    /// Wire the service.
    pub fn new(
        carts: Arc<C>,
        orders: Arc<O>,
        users: Arc<U>,
        gateway: Arc<G>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        settings: CheckoutSettings,
    ) -> Self {
        Self {
            carts,
            orders,
            users,
            gateway,
            notifier,
            clock,
            settings,
        }
    }
}

impl<C, O, U, G> CheckoutService<C, O, U, G>
where
    C: CartRepository,
    O: OrderRepository,
    U: UserRepository,
    G: PaymentGateway,
{
    async fn orderable_cart(&self, user_id: &UserId) -> Result<Cart, Error> {
        let cart = self.carts.load(user_id).await.map_err(map_cart_error)?;
        if cart.is_empty() {
            return Err(Error::invalid_request("cart is empty"));
        }
        if let Some(line) = cart.first_unavailable() {
            return Err(Error::invalid_request(format!(
                "{} is no longer available",
                line.name
            ))
            .with_details(json!({ "productId": line.product_id, "code": "product_unavailable" })));
        }
        Ok(cart)
    }

    async fn place(
        &self,
        user_id: &UserId,
        cart: &Cart,
        request: CheckoutRequest,
        settlement: Settlement,
    ) -> Result<Order, Error> {
        let new_order = NewOrder::from_cart(
            *user_id,
            cart,
            request.delivery,
            settlement,
            self.settings.delivery_fee,
            self.settings.delivery_minutes,
            self.clock.utc(),
        )
        .ok_or_else(|| Error::invalid_request("cart is empty"))?;
        let order = self
            .orders
            .create_from_cart(&new_order)
            .await
            .map_err(map_order_error)?;
        tracing::info!(order_id = %order.id, total = %order.pricing.total, "order placed");
        self.announce(&order).await;
        Ok(order)
    }

    async fn announce(&self, order: &Order) {
        match self.users.find_by_id(&order.user_id).await {
            Ok(Some(customer)) => self.notifier.notify(new_order_message(order, &customer)),
            Ok(None) => tracing::warn!(order_id = %order.id, "order owner vanished"),
            Err(error) => tracing::warn!(%error, order_id = %order.id, "order notification skipped"),
        }
    }
}

#[async_trait]
impl<C, O, U, G> Checkout for CheckoutService<C, O, U, G>
where
    C: CartRepository,
    O: OrderRepository,
    U: UserRepository,
    G: PaymentGateway,
{
    async fn place_order(
        &self,
        user_id: &UserId,
        request: CheckoutRequest,
    ) -> Result<Order, Error> {
        if request.payment_method == PaymentMethod::Paypal {
            return Err(Error::invalid_request(
                "PayPal orders are placed through /api/v1/checkout/paypal",
            )
            .with_details(json!({ "field": "paymentMethod", "code": "use_paypal_flow" })));
        }
        let cart = self.orderable_cart(user_id).await?;
        self.place(user_id, &cart, request, Settlement::OnDelivery)
            .await
    }

    async fn start_paypal(
        &self,
        user_id: &UserId,
        _request: CheckoutRequest,
    ) -> Result<String, Error> {
        let cart = self.orderable_cart(user_id).await?;
        let pricing = OrderPricing::new(cart.subtotal(), self.settings.delivery_fee);
        let paypal_order_id = self
            .gateway
            .create_order(pricing.total, &self.settings.currency)
            .await
            .map_err(map_gateway_error)?;
        tracing::info!(%paypal_order_id, total = %pricing.total, "paypal order opened");
        Ok(paypal_order_id)
    }

    async fn capture_paypal(
        &self,
        user_id: &UserId,
        paypal_order_id: &str,
        request: CheckoutRequest,
    ) -> Result<Order, Error> {
        let cart = self.orderable_cart(user_id).await?;
        let outcome = self
            .gateway
            .capture_order(paypal_order_id)
            .await
            .map_err(map_gateway_error)?;
        if !outcome.is_completed() {
            return Err(Error::invalid_request("payment not completed").with_details(json!({
                "code": "payment_not_completed",
                "status": outcome.status,
            })));
        }
        let expected = OrderPricing::new(cart.subtotal(), self.settings.delivery_fee).total;
        if !outcome.settles(expected, &self.settings.currency) {
            let captured_cents = outcome.captured.as_ref().map(|c| c.amount.cents());
            tracing::warn!(
                %paypal_order_id,
                expected_cents = expected.cents(),
                ?captured_cents,
                "captured amount differs from the cart total"
            );
            return Err(
                Error::invalid_request("captured amount does not match the order total")
                    .with_details(json!({
                        "code": "payment_amount_mismatch",
                        "expectedCents": expected.cents(),
                        "capturedCents": captured_cents,
                    })),
            );
        }
        let settlement = Settlement::PaypalCaptured {
            paypal_order_id: paypal_order_id.to_owned(),
        };
        self.place(user_id, &cart, request, settlement).await
    }
}

#[cfg(test)]
#[path = "checkout_service_tests.rs"]
mod tests;
