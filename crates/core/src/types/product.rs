//! Product snapshots.

use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;

/// A validated product record.
///
/// Catalog responses and store documents are converted into this type once,
/// at the fetch boundary. Cart lines and wishlist entries are snapshots taken
/// from it at the moment of the add.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Catalog identity.
    pub id: ProductId,
    /// Display title.
    pub title: String,
    /// Unit price.
    pub price: Price,
    /// Image URL.
    pub image: String,
    /// Long-form description. Empty when the source has none.
    #[serde(default)]
    pub description: String,
    /// Category name as reported by the source.
    #[serde(default)]
    pub category: String,
}

impl Product {
    /// Create a product with an empty description and category.
    #[must_use]
    pub fn new(
        id: impl Into<ProductId>,
        title: impl Into<String>,
        price: Price,
        image: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            price,
            image: image.into(),
            description: String::new(),
            category: String::new(),
        }
    }

    /// Set the category.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}
