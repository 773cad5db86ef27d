//! Conversions from catalog wire records to domain types.

use bazaar_core::{Price, Product};

use super::CatalogError;
use super::types::ProductRecord;

/// Validate a wire record into a [`Product`].
pub fn convert_product(record: ProductRecord) -> Result<Product, CatalogError> {
    let invalid = |reason: String| CatalogError::InvalidRecord {
        id: record.id.to_string(),
        reason,
    };

    if record.title.trim().is_empty() {
        return Err(invalid("title is empty".to_string()));
    }
    let price = Price::from_f64(record.price).map_err(|e| invalid(e.to_string()))?;

    Ok(Product {
        id: record.id,
        title: record.title,
        price,
        image: record.image,
        description: record.description,
        category: record.category,
    })
}

/// Validate a list of wire records. One bad record fails the whole list.
pub fn convert_products(records: Vec<ProductRecord>) -> Result<Vec<Product>, CatalogError> {
    records.into_iter().map(convert_product).collect()
}
