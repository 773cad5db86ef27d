//! Wishlist state.
//!
//! Re-adding a product that is already saved is an idempotent add. Removal
//! is its own operation, and [`Wishlist::toggle`] exists as a separately
//! named action for call sites that want add-or-remove.

use serde::{Deserialize, Serialize};

use crate::types::{Product, ProductId};

/// Outcome of [`Wishlist::toggle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WishlistChange {
    Added,
    Removed,
}

/// Saved product snapshots, unique by id, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "WishlistRecord")]
pub struct Wishlist {
    items: Vec<Product>,
}

#[derive(Deserialize)]
struct WishlistRecord {
    items: Vec<Product>,
}

impl From<WishlistRecord> for Wishlist {
    fn from(record: WishlistRecord) -> Self {
        let mut wishlist = Self::new();
        for product in &record.items {
            wishlist.add(product);
        }
        wishlist
    }
}

impl Wishlist {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Save `product` unless its id is already present.
    /// Returns whether it was inserted.
    pub fn add(&mut self, product: &Product) -> bool {
        if self.contains(&product.id) {
            return false;
        }
        self.items.push(product.clone());
        true
    }

    /// Remove the entry for `id`. Returns whether one was removed.
    pub fn remove(&mut self, id: &ProductId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| &item.id != id);
        self.items.len() != before
    }

    /// Remove `product` if saved, otherwise save it.
    pub fn toggle(&mut self, product: &Product) -> WishlistChange {
        if self.remove(&product.id) {
            WishlistChange::Removed
        } else {
            self.items.push(product.clone());
            WishlistChange::Added
        }
    }

    /// Remove everything.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    #[must_use]
    pub fn contains(&self, id: &ProductId) -> bool {
        self.items.iter().any(|item| &item.id == id)
    }

    #[must_use]
    pub fn items(&self) -> &[Product] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
