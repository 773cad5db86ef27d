//! Type-safe price representation using decimal arithmetic.
//!
//! Catalog records arrive with floating-point prices; they are converted to
//! [`Price`] once at the fetch boundary so that cart totals are exact decimal
//! sums from then on.

use core::fmt;
use core::ops::Mul;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::quantity::Quantity;

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is below zero.
    #[error("price cannot be negative (got {0})")]
    Negative(Decimal),
    /// The amount is NaN or infinite.
    #[error("price must be a finite number")]
    NotFinite,
    /// The input text is not a decimal number.
    #[error("invalid price: {0}")]
    Invalid(String),
    /// The amount is above [`Price::MAX`].
    #[error("price cannot exceed {max} (got {0})", max = Price::MAX.0)]
    TooLarge(Decimal),
}

/// A unit price between zero and [`Price::MAX`].
///
/// There is no currency attached: the storefront displays every amount in
/// dollars and performs no conversion. The upper bound keeps
/// `price * u32::MAX` and cart sums far inside `Decimal`'s range.
///
/// # Examples
///
/// ```
/// use bazaar_core::Price;
///
/// let price = Price::parse("19.99").unwrap();
/// assert_eq!(price.display(), "$19.99");
/// assert!(Price::parse("-1").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// A price of zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// The largest accepted price, one billion.
    pub const MAX: Self = Self(Decimal::from_parts(1_000_000_000, 0, 0, false, 0));

    /// Create a price from a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if the amount is below zero and
    /// [`PriceError::TooLarge`] if it is above [`Price::MAX`].
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(amount));
        }
        if amount > Self::MAX.0 {
            return Err(PriceError::TooLarge(amount));
        }
        Ok(Self(amount))
    }

    /// Create a price from a floating-point amount, as found in catalog JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not finite or is negative.
    pub fn from_f64(amount: f64) -> Result<Self, PriceError> {
        let amount = Decimal::try_from(amount).map_err(|_| PriceError::NotFinite)?;
        Self::new(amount)
    }

    /// Parse a price from user-entered text (surrounding whitespace ignored).
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a decimal number or is out of
    /// range.
    pub fn parse(s: &str) -> Result<Self, PriceError> {
        let amount =
            Decimal::from_str(s.trim()).map_err(|_| PriceError::Invalid(s.to_owned()))?;
        Self::new(amount)
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Format for display (e.g., "$19.99").
    #[must_use]
    pub fn display(&self) -> String {
        format_amount(self.0)
    }
}

/// Format any decimal amount the way prices are displayed.
#[must_use]
pub fn format_amount(amount: Decimal) -> String {
    format!("${amount:.2}")
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        Self::new(amount)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl Mul<Quantity> for Price {
    type Output = Decimal;

    fn mul(self, quantity: Quantity) -> Decimal {
        self.0.saturating_mul(Decimal::from(quantity.get()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn test_new_rejects_negative() {
        assert_eq!(
            Price::new(dec!(-0.01)),
            Err(PriceError::Negative(dec!(-0.01)))
        );
        assert!(Price::new(Decimal::ZERO).is_ok());
    }

    #[test]
    fn test_from_f64() {
        assert_eq!(Price::from_f64(10.5).unwrap().amount(), dec!(10.5));
        assert_eq!(Price::from_f64(f64::NAN), Err(PriceError::NotFinite));
        assert!(Price::from_f64(-3.0).is_err());
    }

    #[test]
    fn test_parse() {
        assert_eq!(Price::parse(" 109.95 ").unwrap().amount(), dec!(109.95));
        assert!(matches!(Price::parse("ten"), Err(PriceError::Invalid(_))));
    }

    #[test]
    fn test_upper_bound() {
        assert_eq!(Price::parse("1000000000").unwrap(), Price::MAX);
        assert_eq!(
            Price::parse("1000000000.01"),
            Err(PriceError::TooLarge(dec!(1000000000.01)))
        );
        assert!(matches!(
            Price::parse("50000000000000000000000000000"),
            Err(PriceError::TooLarge(_))
        ));
        assert!(Price::from_f64(1e12).is_err());
        assert!(serde_json::from_str::<Price>("\"2000000000\"").is_err());
    }

    #[test]
    fn test_max_times_max_quantity() {
        let quantity = Quantity::new(u32::MAX).unwrap();
        assert_eq!(
            Price::MAX * quantity,
            dec!(1000000000) * Decimal::from(u32::MAX)
        );
    }

    #[test]
    fn test_display_rounds_to_cents() {
        assert_eq!(Price::parse("7").unwrap().display(), "$7.00");
        assert_eq!(Price::parse("22.3").unwrap().to_string(), "$22.30");
    }

    #[test]
    fn test_multiply_by_quantity() {
        let price = Price::parse("2.50").unwrap();
        let quantity = Quantity::new(3).unwrap();
        assert_eq!(price * quantity, dec!(7.50));
    }

    #[test]
    fn test_deserialize_validates() {
        let price: Price = serde_json::from_str("\"4.20\"").unwrap();
        assert_eq!(price.amount(), dec!(4.20));
        assert!(serde_json::from_str::<Price>("\"-4.20\"").is_err());
    }
}
