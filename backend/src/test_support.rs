//! Shared fixtures for unit tests across the crate.

use std::sync::Mutex;

use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;
use uuid::Uuid;

use crate::domain::cart::CartLine;
use crate::domain::order::{OrderItem, OrderPricing};
use crate::domain::{
    Category, DeliveryDetails, Email, EstimatedMinutes, Money, Order, OrderStage, OrderStatus,
    PaymentMethod, PaymentStatus, PreparationMinutes, Product, Quantity, Role, Slug, User, UserId,
    UserName,
};

/// Fixed reference instant used by fixtures.
pub fn fixture_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0)
        .single()
        .expect("valid fixture timestamp")
}

/// Clock that only moves when told to.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    /// Start at `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    /// Move forward.
    pub fn advance(&self, by: TimeDelta) {
        let mut guard = self.0.lock().expect("clock lock");
        *guard += by;
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.0.lock().expect("clock lock")
    }
}

/// A user with the given role.
pub fn user(role: Role) -> User {
    User::new(
        UserId::random(),
        UserName::new("Ada Lovelace").expect("name"),
        Email::new("ada@bistro.test").expect("email"),
        role,
        fixture_now(),
    )
}

/// A category named "Pizza".
pub fn category() -> Category {
    Category {
        id: Uuid::new_v4(),
        name: String::from("Pizza"),
        slug: Slug::new("pizza").expect("slug"),
        description: None,
        image_url: None,
    }
}

/// An available product.
pub fn product(price_cents: i64, preparation_minutes: u32) -> Product {
    Product {
        id: Uuid::new_v4(),
        category_id: Uuid::new_v4(),
        name: String::from("Margherita"),
        slug: Slug::new("margherita").expect("slug"),
        description: Some(String::from("Tomato, mozzarella, basil")),
        price: Money::from_cents(price_cents).expect("price"),
        image_url: None,
        preparation_minutes: PreparationMinutes::new(preparation_minutes).expect("minutes"),
        is_available: true,
        is_featured: false,
        created_at: fixture_now(),
        updated_at: fixture_now(),
    }
}

/// A cart line for `product`.
pub fn cart_line(product: &Product, quantity: u32) -> CartLine {
    CartLine {
        product_id: product.id,
        name: product.name.clone(),
        unit_price: product.price,
        quantity: Quantity::new(quantity).expect("quantity"),
        image_url: product.image_url.clone(),
        preparation_minutes: product.preparation_minutes,
        is_available: product.is_available,
    }
}

/// Valid delivery details.
pub fn delivery() -> DeliveryDetails {
    DeliveryDetails::new("1 Main Street", "+44 20 7946 0000", None).expect("delivery")
}

/// A 20-minute card order created at [`fixture_now`].
pub fn order(user_id: UserId, status: OrderStatus, stage: OrderStage) -> Order {
    let price = Money::from_cents(1250).expect("price");
    Order {
        id: Uuid::new_v4(),
        user_id,
        status,
        stage,
        payment_method: PaymentMethod::Card,
        payment_status: PaymentStatus::Unpaid,
        paypal_order_id: None,
        pricing: OrderPricing::new(price, Money::ZERO),
        delivery: delivery(),
        estimated_minutes: EstimatedMinutes::new(20).expect("estimate"),
        created_at: fixture_now(),
        stage_updated_at: fixture_now(),
        items: vec![OrderItem {
            product_id: Some(Uuid::new_v4()),
            name: String::from("Margherita"),
            unit_price: price,
            quantity: Quantity::new(1).expect("quantity"),
        }],
    }
}
