//! Type-safe price representation using decimal arithmetic.
//!
//! Prices travel as plain JSON numbers (`"price": 10.5`), both on the wire
//! and in the persisted cart, but are held as [`Decimal`] so that line totals
//! and subtotals never accumulate floating point error.

use core::fmt;
use core::iter::Sum;
use core::ops::Add;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is below zero.
    #[error("price cannot be negative (got {0})")]
    Negative(Decimal),
}

/// A non-negative unit price.
///
/// ## Examples
///
/// ```
/// use record_shop_core::Price;
/// use rust_decimal::Decimal;
///
/// let price = Price::new(Decimal::new(1050, 2)).unwrap();
/// assert_eq!(price.to_string(), "$10.50");
/// assert_eq!(price.times(3).to_string(), "$31.50");
///
/// assert!(Price::new(Decimal::new(-1, 0)).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Price(Decimal);

impl Price {
    /// A price of zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if `amount` is below zero.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(amount));
        }
        Ok(Self(amount))
    }

    /// Create a price from a whole number of currency units.
    #[must_use]
    pub fn whole(units: u32) -> Self {
        Self(Decimal::from(units))
    }

    /// Create a price from an amount in cents.
    #[must_use]
    pub fn from_cents(cents: u64) -> Self {
        Self(Decimal::from(cents) / Decimal::ONE_HUNDRED)
    }

    /// Price of `quantity` units.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2}", self.0)
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        Self::new(amount)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        rust_decimal::serde::float::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let amount = rust_decimal::serde::float::deserialize(deserializer)?;
        Self::new(amount).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_rejected() {
        assert!(matches!(
            Price::new(Decimal::new(-5, 1)),
            Err(PriceError::Negative(_))
        ));
    }

    #[test]
    fn test_zero_allowed() {
        assert_eq!(Price::new(Decimal::ZERO).unwrap(), Price::ZERO);
    }

    #[test]
    fn test_display_two_decimals() {
        assert_eq!(Price::whole(10).to_string(), "$10.00");
        assert_eq!(Price::from_cents(1999).to_string(), "$19.99");
    }

    #[test]
    fn test_sum_of_line_totals() {
        let total: Price = [Price::whole(10).times(2), Price::from_cents(550)]
            .into_iter()
            .sum();
        assert_eq!(total, Price::from_cents(2550));
    }

    #[test]
    fn test_serializes_as_number() {
        let json = serde_json::to_string(&Price::from_cents(1050)).unwrap();
        assert_eq!(json, "10.5");
    }

    #[test]
    fn test_deserializes_integer_and_float() {
        let whole: Price = serde_json::from_str("10").unwrap();
        assert_eq!(whole, Price::whole(10));

        let cents: Price = serde_json::from_str("10.25").unwrap();
        assert_eq!(cents, Price::from_cents(1025));
    }

    #[test]
    fn test_deserialize_rejects_negative() {
        assert!(serde_json::from_str::<Price>("-1").is_err());
    }
}
