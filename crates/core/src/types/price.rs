//! Type-safe price representation using decimal arithmetic.
//!
//! Prices are persisted as plain JSON numbers (`5.5`) so the stored cart stays
//! a list of ordinary objects, but all arithmetic happens on [`Decimal`] so a
//! subtotal never picks up binary floating point error.

use std::iter::Sum;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A unit price in the site's single currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(#[serde(with = "rust_decimal::serde::float")] Decimal);

impl Price {
    /// A zero price.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from minor units (e.g. sen), `550` -> `5.50`.
    #[must_use]
    pub fn from_minor(minor: i64) -> Self {
        Self(Decimal::new(minor, 2))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Whether the amount is below zero.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Line total for `quantity` units. Saturates instead of overflowing.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Self {
        Self(
            self.0
                .checked_mul(Decimal::from(quantity))
                .unwrap_or(Decimal::MAX),
        )
    }

    /// The amount rounded half away from zero and padded to two decimals.
    ///
    /// `5.5` -> `"5.50"`, `1.005` -> `"1.01"`.
    #[must_use]
    pub fn fixed_2(&self) -> String {
        let mut rounded = self
            .0
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        rounded.rescale(2);
        rounded.to_string()
    }

    /// Format for display with a currency prefix (e.g., `"RM 5.50"`).
    #[must_use]
    pub fn display(&self, prefix: &str) -> String {
        if prefix.is_empty() {
            self.fixed_2()
        } else {
            format!("{prefix} {}", self.fixed_2())
        }
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, price| {
            Self(acc.0.checked_add(price.0).unwrap_or(Decimal::MAX))
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_price_deserializes_from_json_number() {
        let price: Price = serde_json::from_str("5.5").unwrap();
        assert_eq!(price, Price::from_minor(550));

        let price: Price = serde_json::from_str("12").unwrap();
        assert_eq!(price, Price::from_minor(1200));
    }

    #[test]
    fn test_price_serializes_as_json_number() {
        let json = serde_json::to_string(&Price::from_minor(550)).unwrap();
        assert_eq!(json, "5.5");
    }

    #[test]
    fn test_fixed_2_pads_and_rounds() {
        assert_eq!(Price::from_minor(550).fixed_2(), "5.50");
        assert_eq!(Price::from_minor(0).fixed_2(), "0.00");
        assert_eq!(Price::new(Decimal::new(1005, 3)).fixed_2(), "1.01");
        assert_eq!(Price::new(Decimal::new(12, 0)).fixed_2(), "12.00");
    }

    #[test]
    fn test_display_with_prefix() {
        assert_eq!(Price::from_minor(1850).display("RM"), "RM 18.50");
        assert_eq!(Price::from_minor(1850).display(""), "18.50");
    }

    #[test]
    fn test_times_and_sum() {
        let total: Price = [Price::from_minor(550).times(2), Price::from_minor(125).times(3)]
            .into_iter()
            .sum();
        assert_eq!(total, Price::from_minor(1475));
    }

    #[test]
    fn test_is_negative() {
        assert!(Price::from_minor(-1).is_negative());
        assert!(!Price::ZERO.is_negative());
        assert!(!Price::from_minor(1).is_negative());
    }

    #[test]
    fn test_float_noise_does_not_leak_into_sum() {
        // 0.1 + 0.2 as binary floats is 0.30000000000000004
        let a: Price = serde_json::from_str("0.1").unwrap();
        let b: Price = serde_json::from_str("0.2").unwrap();
        assert_eq!([a, b].into_iter().sum::<Price>(), Price::from_minor(30));
    }
}
