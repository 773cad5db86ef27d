//! Product listing: price-bracket filtering, sorting and category grouping.
//!
//! These are pure functions of the fetched list. Nothing here is cached;
//! callers re-derive the listing whenever the filter, sort or list changes.

use core::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;

use crate::types::{Price, Product};

/// Category name used for products without one.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Errors parsing a filter or sort key from user input.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ListingParseError {
    #[error("unknown price range: {0} (expected all, 0-50, 50-100, 100-200 or 200+)")]
    PriceBracket(String),
    #[error("unknown sort order: {0} (expected featured, price-low, price-high or newest)")]
    SortKey(String),
}

/// Price filter brackets.
///
/// Lower bounds are exclusive and upper bounds inclusive, so a price of
/// exactly 50 lands in [`PriceBracket::UpTo50`] and exactly 100 in
/// [`PriceBracket::From50To100`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PriceBracket {
    /// No filtering.
    #[default]
    All,
    /// price ≤ 50
    UpTo50,
    /// 50 < price ≤ 100
    From50To100,
    /// 100 < price ≤ 200
    From100To200,
    /// price > 200
    Over200,
}

impl PriceBracket {
    /// Whether `price` falls in this bracket.
    #[must_use]
    pub fn contains(self, price: Price) -> bool {
        let amount = price.amount();
        let fifty = Decimal::from(50);
        let hundred = Decimal::from(100);
        let two_hundred = Decimal::from(200);
        match self {
            Self::All => true,
            Self::UpTo50 => amount <= fifty,
            Self::From50To100 => amount > fifty && amount <= hundred,
            Self::From100To200 => amount > hundred && amount <= two_hundred,
            Self::Over200 => amount > two_hundred,
        }
    }

    /// The key used in query strings and on the command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::UpTo50 => "0-50",
            Self::From50To100 => "50-100",
            Self::From100To200 => "100-200",
            Self::Over200 => "200+",
        }
    }
}

impl FromStr for PriceBracket {
    type Err = ListingParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "all" => Ok(Self::All),
            "0-50" => Ok(Self::UpTo50),
            "50-100" => Ok(Self::From50To100),
            "100-200" => Ok(Self::From100To200),
            "200+" => Ok(Self::Over200),
            other => Err(ListingParseError::PriceBracket(other.to_owned())),
        }
    }
}

impl fmt::Display for PriceBracket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Listing sort orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Keep the order the catalog returned.
    #[default]
    Featured,
    /// Cheapest first.
    PriceLow,
    /// Most expensive first.
    PriceHigh,
    /// Highest id first.
    Newest,
}

impl SortKey {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Featured => "featured",
            Self::PriceLow => "price-low",
            Self::PriceHigh => "price-high",
            Self::Newest => "newest",
        }
    }
}

impl FromStr for SortKey {
    type Err = ListingParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "featured" => Ok(Self::Featured),
            "price-low" => Ok(Self::PriceLow),
            "price-high" => Ok(Self::PriceHigh),
            "newest" => Ok(Self::Newest),
            other => Err(ListingParseError::SortKey(other.to_owned())),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Filter `products` by `bracket`, then order them by `sort`.
///
/// Sorting is stable: products with equal prices keep their fetch order.
#[must_use]
pub fn apply(products: &[Product], bracket: PriceBracket, sort: SortKey) -> Vec<Product> {
    let mut listed: Vec<Product> = products
        .iter()
        .filter(|product| bracket.contains(product.price))
        .cloned()
        .collect();

    match sort {
        SortKey::Featured => {}
        SortKey::PriceLow => listed.sort_by(|a, b| a.price.cmp(&b.price)),
        SortKey::PriceHigh => listed.sort_by(|a, b| b.price.cmp(&a.price)),
        SortKey::Newest => listed.sort_by(|a, b| b.id.cmp(&a.id)),
    }

    listed
}

/// A category heading and the products under it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryGroup {
    pub category: String,
    pub products: Vec<Product>,
}

/// Group products by category for the admin panel.
///
/// Groups appear in the order their category is first seen; blank categories
/// are filed under [`UNCATEGORIZED`].
#[must_use]
pub fn group_by_category(products: &[Product]) -> Vec<CategoryGroup> {
    let mut groups: Vec<CategoryGroup> = Vec::new();

    for product in products {
        let category = match product.category.trim() {
            "" => UNCATEGORIZED,
            name => name,
        };

        match groups.iter_mut().find(|group| group.category == category) {
            Some(group) => group.products.push(product.clone()),
            None => groups.push(CategoryGroup {
                category: category.to_owned(),
                products: vec![product.clone()],
            }),
        }
    }

    groups
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::types::ProductId;

    fn product(id: i64, price: Decimal) -> Product {
        Product::new(id, format!("#{id}"), Price::new(price).unwrap(), "")
    }

    fn ids(products: &[Product]) -> Vec<ProductId> {
        products.iter().map(|p| p.id.clone()).collect()
    }

    #[test]
    fn test_bracket_50_100() {
        let products = [
            product(1, dec!(20)),
            product(2, dec!(60)),
            product(3, dec!(150)),
            product(4, dec!(250)),
        ];
        let listed = apply(&products, PriceBracket::From50To100, SortKey::Featured);
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].price.amount(), dec!(60));
    }

    #[test]
    fn test_bracket_boundaries() {
        let at = |amount| Price::new(amount).unwrap();
        assert!(PriceBracket::UpTo50.contains(at(dec!(50))));
        assert!(!PriceBracket::From50To100.contains(at(dec!(50))));
        assert!(PriceBracket::From50To100.contains(at(dec!(100))));
        assert!(PriceBracket::From100To200.contains(at(dec!(200))));
        assert!(!PriceBracket::Over200.contains(at(dec!(200))));
        assert!(PriceBracket::Over200.contains(at(dec!(200.01))));
        assert!(PriceBracket::All.contains(at(dec!(0))));
    }

    #[test]
    fn test_sort_price_low_and_newest() {
        let products = [product(3, dec!(30)), product(1, dec!(10))];

        let low = apply(&products, PriceBracket::All, SortKey::PriceLow);
        assert_eq!(ids(&low), vec![ProductId::from(1), ProductId::from(3)]);

        let newest = apply(&products, PriceBracket::All, SortKey::Newest);
        assert_eq!(ids(&newest), vec![ProductId::from(3), ProductId::from(1)]);
    }

    #[test]
    fn test_featured_preserves_fetch_order() {
        let products = [product(2, dec!(9)), product(7, dec!(1)), product(1, dec!(5))];
        let listed = apply(&products, PriceBracket::All, SortKey::Featured);
        assert_eq!(ids(&listed), ids(&products));
    }

    #[test]
    fn test_price_high_is_stable() {
        let products = [product(1, dec!(5)), product(2, dec!(8)), product(3, dec!(5))];
        let listed = apply(&products, PriceBracket::All, SortKey::PriceHigh);
        assert_eq!(
            ids(&listed),
            vec![ProductId::from(2), ProductId::from(1), ProductId::from(3)]
        );
    }

    #[test]
    fn test_empty_result_is_valid() {
        let products = [product(1, dec!(10))];
        assert!(apply(&products, PriceBracket::Over200, SortKey::Newest).is_empty());
    }

    #[test]
    fn test_parse_keys() {
        assert_eq!("200+".parse::<PriceBracket>().unwrap(), PriceBracket::Over200);
        assert_eq!("price-high".parse::<SortKey>().unwrap(), SortKey::PriceHigh);
        assert!(matches!(
            "cheap".parse::<PriceBracket>(),
            Err(ListingParseError::PriceBracket(_))
        ));
        assert!(matches!(
            "oldest".parse::<SortKey>(),
            Err(ListingParseError::SortKey(_))
        ));
    }

    #[test]
    fn test_group_by_category() {
        let products = [
            product(1, dec!(1)).with_category("electronics"),
            product(2, dec!(1)).with_category("  "),
            product(3, dec!(1)).with_category("jewelery"),
            product(4, dec!(1)).with_category("electronics"),
        ];
        let groups = group_by_category(&products);

        let names: Vec<_> = groups.iter().map(|g| g.category.as_str()).collect();
        assert_eq!(names, vec!["electronics", UNCATEGORIZED, "jewelery"]);
        assert_eq!(
            ids(&groups[0].products),
            vec![ProductId::from(1), ProductId::from(4)]
        );
    }
}
