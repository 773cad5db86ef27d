//! Shopping cart state.
//!
//! A [`Cart`] is an insertion-ordered list of [`LineItem`]s keyed by product
//! id, plus a derived total. The total is recomputed from scratch after every
//! mutation, inside the same call, so a reader can never observe it out of
//! step with the items.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Price, Product, ProductId, Quantity};

/// A cart entry: a product snapshot and how many of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub product_id: ProductId,
    pub title: String,
    pub price: Price,
    pub image: String,
    pub quantity: Quantity,
}

impl LineItem {
    fn from_product(product: &Product) -> Self {
        Self {
            product_id: product.id.clone(),
            title: product.title.clone(),
            price: product.price,
            image: product.image.clone(),
            quantity: Quantity::ONE,
        }
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * self.quantity
    }
}

/// The shopping cart.
///
/// Not-found ids are silent no-ops for every mutation. None of the
/// operations can fail.
///
/// Deserializing reads only the lines: repeated ids keep their first line
/// and the total is recomputed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "CartRecord")]
pub struct Cart {
    items: Vec<LineItem>,
    total: Decimal,
}

#[derive(Deserialize)]
struct CartRecord {
    items: Vec<LineItem>,
}

impl From<CartRecord> for Cart {
    fn from(record: CartRecord) -> Self {
        let mut cart = Self::new();
        for line in record.items {
            if cart.get(&line.product_id).is_none() {
                cart.items.push(line);
            }
        }
        cart.recompute_total();
        cart
    }
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one unit of `product`.
    ///
    /// An existing line for the same id has its quantity bumped by one; the
    /// snapshot taken on the first add is kept. Otherwise a new line with
    /// quantity 1 is appended.
    pub fn add_item(&mut self, product: &Product) {
        match self.find_mut(&product.id) {
            Some(line) => line.quantity = line.quantity.incremented(),
            None => self.items.push(LineItem::from_product(product)),
        }
        self.recompute_total();
    }

    /// Remove the line for `id`. Returns whether a line was removed.
    pub fn remove_item(&mut self, id: &ProductId) -> bool {
        let before = self.items.len();
        self.items.retain(|line| &line.product_id != id);
        self.recompute_total();
        self.items.len() != before
    }

    /// Set the quantity of the line for `id`. Returns whether a line matched.
    pub fn set_quantity(&mut self, id: &ProductId, quantity: Quantity) -> bool {
        let found = self.find_mut(id).map(|line| line.quantity = quantity).is_some();
        self.recompute_total();
        found
    }

    /// Lines in the order they were first added.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Sum of price times quantity over all lines.
    #[must_use]
    pub const fn total(&self) -> Decimal {
        self.total
    }

    /// The line for `id`, if present.
    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&LineItem> {
        self.items.iter().find(|line| &line.product_id == id)
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of quantities over all lines.
    #[must_use]
    pub fn quantity_total(&self) -> u64 {
        self.items
            .iter()
            .map(|line| u64::from(line.quantity.get()))
            .sum()
    }

    fn find_mut(&mut self, id: &ProductId) -> Option<&mut LineItem> {
        self.items.iter_mut().find(|line| &line.product_id == id)
    }

    fn recompute_total(&mut self) {
        self.total = self
            .items
            .iter()
            .map(LineItem::line_total)
            .fold(Decimal::ZERO, Decimal::saturating_add);
    }
}
