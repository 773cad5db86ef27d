//! Loading catalog data into the store.
//!
//! Each loader marks its state as loading, fetches, then records either the
//! data or the error message. Failures touch nothing but that one state.

use bazaar_core::{Product, ProductId};
use tracing::{instrument, warn};

use crate::catalog::{CatalogClient, CatalogError};
use crate::store::Store;

/// Load the product listing, optionally narrowed to one category.
///
/// # Errors
///
/// Returns the fetch error after recording it in the products state.
#[instrument(skip(catalog, store))]
pub async fn load_products(
    catalog: &CatalogClient,
    store: &mut Store,
    category: Option<&str>,
) -> Result<(), CatalogError> {
    store.set_products_loading(true);

    let result = match category {
        Some(category) => catalog.products_in_category(category).await,
        None => catalog.list_products().await,
    };

    match result {
        Ok(products) => {
            store.set_products(products);
            Ok(())
        }
        Err(e) => {
            warn!(error = %e, "Failed to load products");
            store.set_products_error(e.to_string());
            Err(e)
        }
    }
}

/// Load one product as the selected product.
///
/// # Errors
///
/// Returns the fetch error after recording it in the products state.
#[instrument(skip(catalog, store), fields(product_id = %id))]
pub async fn load_product(
    catalog: &CatalogClient,
    store: &mut Store,
    id: &ProductId,
) -> Result<Product, CatalogError> {
    store.set_products_loading(true);

    match catalog.get_product(id).await {
        Ok(product) => {
            store.set_selected_product(Some(product.clone()));
            Ok(product)
        }
        Err(e) => {
            warn!(error = %e, "Failed to load product");
            store.set_products_error(e.to_string());
            Err(e)
        }
    }
}

/// Load the category names.
///
/// # Errors
///
/// Returns the fetch error after recording it in the categories state.
#[instrument(skip(catalog, store))]
pub async fn load_categories(catalog: &CatalogClient, store: &mut Store) -> Result<(), CatalogError> {
    store.set_categories_loading(true);

    match catalog.list_categories().await {
        Ok(categories) => {
            store.set_categories(categories);
            Ok(())
        }
        Err(e) => {
            warn!(error = %e, "Failed to load categories");
            store.set_categories_error(e.to_string());
            Err(e)
        }
    }
}
