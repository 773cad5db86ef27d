//! Catalog client integration tests.
//!
//! Run against [`MockCatalog`], an in-process stand-in for the catalog
//! service.

#![allow(clippy::unwrap_used)]

use bazaar_core::ProductId;
use bazaar_integration_tests::MockCatalog;
use bazaar_storefront::catalog::{CatalogClient, CatalogError};
use bazaar_storefront::services::catalog;
use bazaar_storefront::{AppState, StoreEvent};
use rust_decimal_macros::dec;

// =============================================================================
// Fetching
// =============================================================================

#[tokio::test]
async fn test_list_products_converts_prices() {
    let mock = MockCatalog::start().await;
    let client = CatalogClient::new(&mock.catalog_config());

    let products = client.list_products().await.unwrap();

    assert_eq!(products.len(), 5);
    assert_eq!(products[0].id, ProductId::from(1));
    assert_eq!(products[0].price.amount(), dec!(109.95));
    assert_eq!(products[2].price.amount(), dec!(695));
}

#[tokio::test]
async fn test_products_in_category() {
    let mock = MockCatalog::start().await;
    let client = CatalogClient::new(&mock.catalog_config());

    let electronics = client.products_in_category("Electronics").await.unwrap();

    assert_eq!(electronics.len(), 2);
    assert!(electronics.iter().all(|p| p.category == "electronics"));
}

#[tokio::test]
async fn test_all_category_lists_everything() {
    let mock = MockCatalog::start().await;
    let client = CatalogClient::new(&mock.catalog_config());

    let products = client.products_in_category("all").await.unwrap();

    assert_eq!(products.len(), 5);
}

#[tokio::test]
async fn test_get_product() {
    let mock = MockCatalog::start().await;
    let client = CatalogClient::new(&mock.catalog_config());

    let product = client.get_product(&ProductId::from(9)).await.unwrap();

    assert_eq!(product.title, "WD 2TB Elements Portable Hard Drive");
    assert_eq!(product.price.amount(), dec!(64));
}

#[tokio::test]
async fn test_unknown_product_is_not_found() {
    let mock = MockCatalog::start().await;
    let client = CatalogClient::new(&mock.catalog_config());

    let result = client.get_product(&ProductId::from(404)).await;

    assert!(matches!(result, Err(CatalogError::NotFound(_))));
}

#[tokio::test]
async fn test_list_categories_in_service_order() {
    let mock = MockCatalog::start().await;
    let client = CatalogClient::new(&mock.catalog_config());

    let categories = client.list_categories().await.unwrap();

    assert_eq!(categories, vec!["men's clothing", "jewelery", "electronics"]);
}

// =============================================================================
// Caching
// =============================================================================

#[tokio::test]
async fn test_repeat_fetches_are_cached() {
    let mock = MockCatalog::start().await;
    let client = CatalogClient::new(&mock.catalog_config());

    client.list_products().await.unwrap();
    client.list_products().await.unwrap();
    client.get_product(&ProductId::from(1)).await.unwrap();
    client.get_product(&ProductId::from(1)).await.unwrap();

    assert_eq!(mock.requests(), 2);
}

#[tokio::test]
async fn test_invalidate_cache_refetches() {
    let mock = MockCatalog::start().await;
    let client = CatalogClient::new(&mock.catalog_config());

    client.list_categories().await.unwrap();
    client.invalidate_cache();
    client.list_categories().await.unwrap();

    assert_eq!(mock.requests(), 2);
}

// =============================================================================
// Failures
// =============================================================================

#[tokio::test]
async fn test_server_error_is_status() {
    let mock = MockCatalog::start().await;
    mock.fail();
    let client = CatalogClient::new(&mock.catalog_config());

    let result = client.list_products().await;

    assert!(matches!(result, Err(CatalogError::Status { status: 500, .. })));
}

#[tokio::test]
async fn test_failed_load_keeps_cart_and_records_error() {
    let mock = MockCatalog::start().await;
    let state = AppState::new(mock.config());
    let mut store = state.new_store();

    catalog::load_products(state.catalog(), &mut store, None).await.unwrap();
    let first = store.products().products()[0].clone();
    store.add_to_cart(&first);

    mock.fail();
    state.catalog().invalidate_cache();
    let result = catalog::load_products(state.catalog(), &mut store, None).await;

    assert!(result.is_err());
    assert!(!store.products().is_loading());
    assert!(store.products().error().is_some());
    assert_eq!(store.cart().len(), 1);
    assert_eq!(store.cart().total(), dec!(109.95));
}

#[tokio::test]
async fn test_load_products_publishes_change() {
    let mock = MockCatalog::start().await;
    let state = AppState::new(mock.config());
    let mut store = state.new_store();
    let mut events = store.subscribe();

    catalog::load_products(state.catalog(), &mut store, Some("jewelery"))
        .await
        .unwrap();

    assert_eq!(store.products().products().len(), 1);
    assert!(events.drain().contains(&StoreEvent::ProductsChanged));
}
