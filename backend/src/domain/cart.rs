//! Shopping cart contents priced at current menu prices.

use serde::Serialize;
use uuid::Uuid;

use super::catalogue::PreparationMinutes;
use super::money::Money;

/// Largest quantity of one product per cart line.
pub const QUANTITY_MAX: u32 = 99;

/// Line quantity outside `1..=QUANTITY_MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("quantity must be between 1 and {max}")]
pub struct QuantityOutOfRange {
    pub max: u32,
}

/// Positive, bounded line quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(into = "u32")]
pub struct Quantity(u32);

impl Quantity {
    /// Validate a quantity.
    pub fn new(value: u32) -> Result<Self, QuantityOutOfRange> {
        if (1..=QUANTITY_MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(QuantityOutOfRange { max: QUANTITY_MAX })
        }
    }

    /// Raw count.
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Merge another quantity into this one, failing past the cap.
    pub fn add(self, other: Self) -> Result<Self, QuantityOutOfRange> {
        Self::new(self.0.saturating_add(other.0))
    }
}

impl From<Quantity> for u32 {
    fn from(value: Quantity) -> Self {
        value.0
    }
}

/// A product in the cart joined with its current menu data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub product_id: Uuid,
    pub name: String,
    pub unit_price: Money,
    pub quantity: Quantity,
    pub image_url: Option<String>,
    pub preparation_minutes: PreparationMinutes,
    pub is_available: bool,
}

impl CartLine {
    /// Unit price times quantity, saturating on overflow.
    pub fn line_total(&self) -> Money {
        self.unit_price
            .times(self.quantity.get())
            .unwrap_or(Money::MAX)
    }
}

/// A user's cart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Wrap loaded lines.
    pub fn new(lines: Vec<CartLine>) -> Self {
        Self { lines }
    }

    /// Lines in insertion order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Whether nothing is in the cart.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of line totals.
    pub fn subtotal(&self) -> Money {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Total number of units across lines.
    pub fn item_count(&self) -> u32 {
        self.lines
            .iter()
            .map(|line| line.quantity.get())
            .fold(0, u32::saturating_add)
    }

    /// Slowest dish in the cart; it bounds kitchen time for the order.
    pub fn longest_preparation(&self) -> Option<PreparationMinutes> {
        self.lines
            .iter()
            .map(|line| line.preparation_minutes)
            .max()
    }

    /// First line whose product has been taken off the menu.
    pub fn first_unavailable(&self) -> Option<&CartLine> {
        self.lines.iter().find(|line| !line.is_available)
    }
}
