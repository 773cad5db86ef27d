//! Line item quantities.

use core::fmt;
use core::num::NonZeroU32;

use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Quantity`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityError {
    /// Quantities start at one.
    #[error("quantity must be at least 1")]
    Zero,
    /// The input could not be read as a whole number.
    #[error("quantity must be a whole number")]
    Invalid,
}

/// A positive item count.
///
/// Zero cannot be represented, so a cart line can never hold a quantity of
/// zero or less. Requests to set a quantity below one are rejected when the
/// `Quantity` is built, before any cart operation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Quantity(NonZeroU32);

impl Quantity {
    /// A quantity of one, the default for a newly added line.
    pub const ONE: Self = Self(NonZeroU32::MIN);

    /// Create a quantity.
    ///
    /// # Errors
    ///
    /// Returns [`QuantityError::Zero`] for zero.
    pub const fn new(count: u32) -> Result<Self, QuantityError> {
        match NonZeroU32::new(count) {
            Some(count) => Ok(Self(count)),
            None => Err(QuantityError::Zero),
        }
    }

    /// Parse a quantity from user input. Negative numbers are rejected.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a whole number of at least one.
    pub fn parse(s: &str) -> Result<Self, QuantityError> {
        let count = s
            .trim()
            .parse::<i64>()
            .map_err(|_| QuantityError::Invalid)?;
        if count < 1 {
            return Err(QuantityError::Zero);
        }
        let count = u32::try_from(count).map_err(|_| QuantityError::Invalid)?;
        Self::new(count)
    }

    /// The count as a plain integer.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }

    /// One more than this quantity, saturating at `u32::MAX`.
    #[must_use]
    pub const fn incremented(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self::ONE
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u32> for Quantity {
    type Error = QuantityError;

    fn try_from(count: u32) -> Result<Self, Self::Error> {
        Self::new(count)
    }
}

impl From<Quantity> for u32 {
    fn from(quantity: Quantity) -> Self {
        quantity.get()
    }
}
