//! Minor-unit money amounts.

use serde::{Deserialize, Serialize};

/// Non-negative amount in minor currency units (cents).
///
/// # Examples
/// ```
/// use bistro::domain::Money;
///
/// let price = Money::from_cents(1250).expect("non-negative");
/// let total = price.times(3).and_then(|sum| sum.checked_add(Money::ZERO));
/// assert_eq!(total.map(|m| m.to_string()), Some(String::from("37.50")));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Money(i64);

/// Negative amounts are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("amount must not be negative (got {0})")]
pub struct NegativeAmount(pub i64);

impl Money {
    /// Zero.
    pub const ZERO: Self = Self(0);

    /// Largest representable amount.
    pub const MAX: Self = Self(i64::MAX);

    /// Wrap a cent amount.
    pub fn from_cents(cents: i64) -> Result<Self, NegativeAmount> {
        if cents < 0 {
            return Err(NegativeAmount(cents));
        }
        Ok(Self(cents))
    }

    /// Amount in cents.
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Sum, `None` on overflow.
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    /// Multiply by a quantity, `None` on overflow.
    pub fn times(self, quantity: u32) -> Option<Self> {
        self.0.checked_mul(i64::from(quantity)).map(Self)
    }

    /// Parse a decimal amount such as `"36.00"` or `"12.5"`.
    ///
    /// `None` for signs, exponents, more than two fraction digits or
    /// overflow.
    pub fn from_decimal_str(raw: &str) -> Option<Self> {
        let (whole, fraction) = raw.split_once('.').unwrap_or((raw, ""));
        let digits = |part: &str| part.bytes().all(|byte| byte.is_ascii_digit());
        if whole.is_empty() || fraction.len() > 2 || !digits(whole) || !digits(fraction) {
            return None;
        }
        let cents = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().ok()?.checked_mul(10)?,
            _ => fraction.parse::<i64>().ok()?,
        };
        whole.parse::<i64>().ok()?.checked_mul(100)?.checked_add(cents).map(Self)
    }

    /// Decimal string with two fraction digits, as PayPal expects.
    pub fn to_decimal_string(self) -> String {
        format!("{}.{:02}", self.0.div_euclid(100), self.0.rem_euclid(100))
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_decimal_string())
    }
}

impl From<Money> for i64 {
    fn from(value: Money) -> Self {
        value.0
    }
}

impl TryFrom<i64> for Money {
    type Error = NegativeAmount;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::from_cents(value)
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, item| Self(acc.0.saturating_add(item.0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, "0.00")]
    #[case(5, "0.05")]
    #[case(1999, "19.99")]
    #[case(120_000, "1200.00")]
    fn formats_two_decimals(#[case] cents: i64, #[case] expected: &str) {
        let money = Money::from_cents(cents).expect("non-negative");
        assert_eq!(money.to_decimal_string(), expected);
    }

    #[rstest]
    #[case("36.00", Some(3600))]
    #[case("12.5", Some(1250))]
    #[case("7", Some(700))]
    #[case("0.05", Some(5))]
    #[case("-1.00", None)]
    #[case("1.005", None)]
    #[case("1e3", None)]
    #[case(".50", None)]
    #[case("", None)]
    fn parses_provider_amounts(#[case] raw: &str, #[case] cents: Option<i64>) {
        assert_eq!(Money::from_decimal_str(raw).map(Money::cents), cents);
    }

    #[rstest]
    fn rejects_negative_amounts() {
        assert_eq!(Money::from_cents(-1), Err(NegativeAmount(-1)));
    }

    #[rstest]
    fn multiplication_detects_overflow() {
        let big = Money::from_cents(i64::MAX).expect("non-negative");
        assert_eq!(big.times(2), None);
    }
}
