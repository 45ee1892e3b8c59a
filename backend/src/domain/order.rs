//! Orders, their lifecycle flags and checkout input.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::cart::{Cart, Quantity};
use super::money::Money;
use super::order_stage::EstimatedMinutes;
use super::user::UserId;

/// Unknown enum label read from a request or a row.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownLabel {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! labelled_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $label:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $label)] $variant, )+
        }

        impl $name {
            /// Storage and wire label.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $( Self::$variant => $label, )+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownLabel;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $label => Ok(Self::$variant), )+
                    other => Err(UnknownLabel {
                        kind: $kind,
                        value: other.to_owned(),
                    }),
                }
            }
        }
    };
}

labelled_enum! {
    /// Order lifecycle flag, independent of the delivery stage except that
    /// reaching [`OrderStage::Delivered`] forces [`OrderStatus::Completed`].
    OrderStatus, "order status" {
        Pending => "PENDING",
        Confirmed => "CONFIRMED",
        Completed => "COMPLETED",
        Cancelled => "CANCELLED",
    }
}

impl OrderStatus {
    /// Completed and cancelled orders no longer move through stages.
    pub const fn freezes_stage(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

labelled_enum! {
    /// Delivery pipeline phase, ordered from first to last.
    #[derive(PartialOrd, Ord)]
    OrderStage, "order stage" {
        Received => "RECEIVED",
        Preparing => "PREPARING",
        Ready => "READY",
        OutDelivery => "OUT_DELIVERY",
        Delivered => "DELIVERED",
    }
}

labelled_enum! {
    /// How the customer pays.
    PaymentMethod, "payment method" {
        /// Settled by card at the door or counter.
        Card => "card",
        /// Captured up front through PayPal.
        Paypal => "paypal",
    }
}

labelled_enum! {
    /// Whether money has been received.
    PaymentStatus, "payment status" {
        Unpaid => "unpaid",
        Paid => "paid",
    }
}

/// Snapshot of one purchased product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderItem {
    /// `None` once the product has been deleted from the menu.
    pub product_id: Option<Uuid>,
    pub name: String,
    pub unit_price: Money,
    pub quantity: Quantity,
}

impl OrderItem {
    /// Unit price times quantity.
    pub fn line_total(&self) -> Money {
        self.unit_price
            .times(self.quantity.get())
            .unwrap_or(Money::MAX)
    }
}

/// Price breakdown fixed at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderPricing {
    pub subtotal: Money,
    pub delivery_fee: Money,
    pub total: Money,
}

impl OrderPricing {
    /// Add the delivery fee to a subtotal, saturating on overflow.
    pub fn new(subtotal: Money, delivery_fee: Money) -> Self {
        Self {
            subtotal,
            delivery_fee,
            total: subtotal.checked_add(delivery_fee).unwrap_or(Money::MAX),
        }
    }
}

/// A stored order with its items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub id: Uuid,
    pub user_id: UserId,
    pub status: OrderStatus,
    pub stage: OrderStage,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub paypal_order_id: Option<String>,
    pub pricing: OrderPricing,
    pub delivery: DeliveryDetails,
    pub estimated_minutes: EstimatedMinutes,
    pub created_at: DateTime<Utc>,
    pub stage_updated_at: DateTime<Utc>,
    pub items: Vec<OrderItem>,
}

/// Longest accepted delivery address.
pub const ADDRESS_MAX: usize = 300;
/// Longest accepted order note.
pub const NOTES_MAX: usize = 500;

/// Validation failures for checkout input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CheckoutValidationError {
    #[error("delivery address must not be empty")]
    EmptyAddress,
    #[error("delivery address must be at most {max} characters")]
    AddressTooLong { max: usize },
    #[error("phone number must contain 6 to 20 digits")]
    InvalidPhone,
    #[error("notes must be at most {max} characters")]
    NotesTooLong { max: usize },
    #[error(transparent)]
    PaymentMethod(#[from] UnknownLabel),
}

impl CheckoutValidationError {
    /// Request field the failure refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyAddress | Self::AddressTooLong { .. } => "deliveryAddress",
            Self::InvalidPhone => "phone",
            Self::NotesTooLong { .. } => "notes",
            Self::PaymentMethod(_) => "paymentMethod",
        }
    }
}

/// Where and how to reach the customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryDetails {
    pub address: String,
    pub phone: String,
    pub notes: Option<String>,
}

impl DeliveryDetails {
    /// Validate raw checkout fields.
    ///
    /// Phones may contain spaces, dashes, dots, parentheses and a leading
    /// `+` around 6 to 20 digits.
    pub fn new(
        address: &str,
        phone: &str,
        notes: Option<&str>,
    ) -> Result<Self, CheckoutValidationError> {
        let address = address.trim();
        if address.is_empty() {
            return Err(CheckoutValidationError::EmptyAddress);
        }
        if address.chars().count() > ADDRESS_MAX {
            return Err(CheckoutValidationError::AddressTooLong { max: ADDRESS_MAX });
        }
        let phone = phone.trim();
        let digits = phone.chars().filter(char::is_ascii_digit).count();
        let allowed = phone.chars().enumerate().all(|(index, ch)| {
            ch.is_ascii_digit() || " -.()".contains(ch) || (ch == '+' && index == 0)
        });
        if !allowed || !(6..=20).contains(&digits) {
            return Err(CheckoutValidationError::InvalidPhone);
        }
        let notes = notes.map(str::trim).filter(|text| !text.is_empty());
        if notes.is_some_and(|text| text.chars().count() > NOTES_MAX) {
            return Err(CheckoutValidationError::NotesTooLong { max: NOTES_MAX });
        }
        Ok(Self {
            address: address.to_owned(),
            phone: phone.to_owned(),
            notes: notes.map(str::to_owned),
        })
    }
}

/// An order ready to be inserted together with its items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub id: Uuid,
    pub user_id: UserId,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub paypal_order_id: Option<String>,
    pub pricing: OrderPricing,
    pub delivery: DeliveryDetails,
    pub estimated_minutes: EstimatedMinutes,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderItem>,
}

/// How an order was paid for at checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement {
    /// Pay on delivery; the order waits for staff confirmation.
    OnDelivery,
    /// PayPal capture completed with this PayPal order id.
    PaypalCaptured { paypal_order_id: String },
}

impl NewOrder {
    /// Snapshot a cart into an order.
    ///
    /// Returns `None` for an empty cart.
    pub fn from_cart(
        user_id: UserId,
        cart: &Cart,
        delivery: DeliveryDetails,
        settlement: Settlement,
        delivery_fee: Money,
        delivery_minutes: u32,
        now: DateTime<Utc>,
    ) -> Option<Self> {
        let kitchen = cart.longest_preparation()?;
        let estimated_minutes =
            EstimatedMinutes::new(kitchen.get().saturating_add(delivery_minutes))?;
        let (status, payment_method, payment_status, paypal_order_id) = match settlement {
            Settlement::OnDelivery => (
                OrderStatus::Pending,
                PaymentMethod::Card,
                PaymentStatus::Unpaid,
                None,
            ),
            Settlement::PaypalCaptured { paypal_order_id } => (
                OrderStatus::Confirmed,
                PaymentMethod::Paypal,
                PaymentStatus::Paid,
                Some(paypal_order_id),
            ),
        };
        let items = cart
            .lines()
            .iter()
            .map(|line| OrderItem {
                product_id: Some(line.product_id),
                name: line.name.clone(),
                unit_price: line.unit_price,
                quantity: line.quantity,
            })
            .collect();
        Some(Self {
            id: Uuid::new_v4(),
            user_id,
            status,
            payment_method,
            payment_status,
            paypal_order_id,
            pricing: OrderPricing::new(cart.subtotal(), delivery_fee),
            delivery,
            estimated_minutes,
            created_at: now,
            items,
        })
    }
}

/// Stage and status to persist after re-deriving an order's stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageChange {
    pub stage: OrderStage,
    pub status: OrderStatus,
    pub stage_updated_at: DateTime<Utc>,
}

/// Admin listing filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cart::CartLine;
    use crate::domain::catalogue::PreparationMinutes;
    use rstest::rstest;

    fn cart() -> Cart {
        Cart::new(vec![
            CartLine {
                product_id: Uuid::new_v4(),
                name: String::from("Lasagne"),
                unit_price: Money::from_cents(1400).expect("price"),
                quantity: Quantity::new(2).expect("qty"),
                image_url: None,
                preparation_minutes: PreparationMinutes::new(25).expect("prep"),
                is_available: true,
            },
            CartLine {
                product_id: Uuid::new_v4(),
                name: String::from("Tiramisu"),
                unit_price: Money::from_cents(650).expect("price"),
                quantity: Quantity::new(1).expect("qty"),
                image_url: None,
                preparation_minutes: PreparationMinutes::new(5).expect("prep"),
                is_available: true,
            },
        ])
    }

    fn delivery() -> DeliveryDetails {
        DeliveryDetails::new("1 Main Street", "+44 20 7946 0000", None).expect("delivery")
    }

    #[rstest]
    fn card_orders_start_pending_and_unpaid() {
        let order = NewOrder::from_cart(
            UserId::random(),
            &cart(),
            delivery(),
            Settlement::OnDelivery,
            Money::from_cents(300).expect("fee"),
            15,
            Utc::now(),
        )
        .expect("non-empty cart");

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.payment_status, PaymentStatus::Unpaid);
        assert_eq!(order.pricing.subtotal.cents(), 3450);
        assert_eq!(order.pricing.total.cents(), 3750);
        assert_eq!(order.estimated_minutes.get(), 40);
        assert_eq!(order.items.len(), 2);
    }

    #[rstest]
    fn paypal_orders_start_confirmed_and_paid() {
        let order = NewOrder::from_cart(
            UserId::random(),
            &cart(),
            delivery(),
            Settlement::PaypalCaptured {
                paypal_order_id: String::from("5O190127TN364715T"),
            },
            Money::ZERO,
            0,
            Utc::now(),
        )
        .expect("non-empty cart");

        assert_eq!(order.status, OrderStatus::Confirmed);
        assert_eq!(order.payment_method, PaymentMethod::Paypal);
        assert_eq!(order.payment_status, PaymentStatus::Paid);
        assert_eq!(order.paypal_order_id.as_deref(), Some("5O190127TN364715T"));
    }

    #[rstest]
    fn empty_carts_produce_no_order() {
        let order = NewOrder::from_cart(
            UserId::random(),
            &Cart::default(),
            delivery(),
            Settlement::OnDelivery,
            Money::ZERO,
            15,
            Utc::now(),
        );
        assert!(order.is_none());
    }

    #[rstest]
    #[case("", "0123456789", "deliveryAddress")]
    #[case("1 Main Street", "12345", "phone")]
    #[case("1 Main Street", "12+3456789", "phone")]
    #[case("1 Main Street", "call me", "phone")]
    fn delivery_details_reject_bad_input(
        #[case] address: &str,
        #[case] phone: &str,
        #[case] field: &str,
    ) {
        let err = DeliveryDetails::new(address, phone, None).expect_err("invalid");
        assert_eq!(err.field(), field);
    }

    #[rstest]
    #[case("PENDING", OrderStatus::Pending)]
    #[case("CANCELLED", OrderStatus::Cancelled)]
    fn status_labels_round_trip(#[case] label: &str, #[case] status: OrderStatus) {
        assert_eq!(label.parse::<OrderStatus>(), Ok(status));
        assert_eq!(status.to_string(), label);
    }

    #[rstest]
    fn stages_are_ordered_along_the_pipeline() {
        assert!(OrderStage::Received < OrderStage::Preparing);
        assert!(OrderStage::OutDelivery < OrderStage::Delivered);
        assert_eq!(OrderStage::OutDelivery.as_str(), "OUT_DELIVERY");
    }

    #[rstest]
    fn unknown_labels_name_their_kind() {
        let err = "bitcoin".parse::<PaymentMethod>().expect_err("unknown");
        assert_eq!(err.to_string(), "unknown payment method 'bitcoin'");
    }
}
