//! Product identity.
//!
//! The catalog service numbers its products while the document store keys
//! them by generated strings, so a [`ProductId`] carries either form. It is
//! opaque to the cart and wishlist: they only compare ids for equality.

use core::cmp::Ordering;
use core::fmt;

use serde::{Deserialize, Serialize};

/// A catalog product identifier.
///
/// Serialized untagged, so `1` and `"abc"` both round-trip as-is.
///
/// Ordering is total: numeric ids compare by value and sort before textual
/// ids, textual ids compare lexicographically. The "newest" listing order is
/// the reverse of this ordering.
///
/// # Examples
///
/// ```
/// use bazaar_core::ProductId;
///
/// assert!(ProductId::from(2) > ProductId::from(1));
/// assert!(ProductId::from("a") > ProductId::from(999));
/// assert_eq!("42".parse::<ProductId>().unwrap(), ProductId::from(42));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProductId {
    /// Integer id assigned by the catalog service.
    Numeric(i64),
    /// Opaque id assigned by the document store.
    Text(String),
}

impl ProductId {
    /// Returns the numeric id, if this is one.
    #[must_use]
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Numeric(id) => Some(*id),
            Self::Text(_) => None,
        }
    }
}

impl Ord for ProductId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Numeric(a), Self::Numeric(b)) => a.cmp(b),
            (Self::Numeric(_), Self::Text(_)) => Ordering::Less,
            (Self::Text(_), Self::Numeric(_)) => Ordering::Greater,
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
        }
    }
}

impl PartialOrd for ProductId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(id) => write!(f, "{id}"),
            Self::Text(id) => f.write_str(id),
        }
    }
}

impl std::str::FromStr for ProductId {
    type Err = core::convert::Infallible;

    /// Digits parse as a numeric id; anything else is kept as text.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.parse::<i64>()
            .map_or_else(|_| Self::Text(s.to_owned()), Self::Numeric))
    }
}

impl From<i64> for ProductId {
    fn from(id: i64) -> Self {
        Self::Numeric(id)
    }
}

impl From<String> for ProductId {
    fn from(id: String) -> Self {
        Self::Text(id)
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        Self::Text(id.to_owned())
    }
}
