//! Wire records for the catalog service.
//!
//! These mirror the JSON the service sends. Only the fields the storefront
//! needs are declared; extra fields (such as `rating`) are ignored.

use bazaar_core::ProductId;
use serde::{Deserialize, Serialize};

/// A product as returned by `GET /products` and friends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: ProductId,
    pub title: String,
    /// Floating-point price; converted to a decimal `Price` on the way in.
    pub price: f64,
    pub image: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
}
