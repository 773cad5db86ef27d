//! Read-only catalog commands.

use bazaar_core::{PriceBracket, ProductId, SortKey};
use bazaar_storefront::AppState;
use bazaar_storefront::error::Result;
use bazaar_storefront::services::catalog;

use super::{print_product, print_products};

/// `bazaar products`
pub async fn products(
    state: &AppState,
    category: Option<&str>,
    bracket: PriceBracket,
    sort: SortKey,
) -> Result<()> {
    let mut store = state.new_store();
    catalog::load_products(state.catalog(), &mut store, category).await?;

    let listing = store.listing(bracket, sort);
    tracing::debug!(
        loaded = store.products().products().len(),
        shown = listing.len(),
        %bracket,
        %sort,
        "Listing products"
    );
    print_products(&listing);
    Ok(())
}

/// `bazaar product <id>`
pub async fn product(state: &AppState, id: &str) -> Result<()> {
    let mut store = state.new_store();
    let Ok(id) = id.parse::<ProductId>();
    let product = catalog::load_product(state.catalog(), &mut store, &id).await?;
    print_product(&product);
    Ok(())
}

/// `bazaar categories`
pub async fn categories(state: &AppState) -> Result<()> {
    let mut store = state.new_store();
    catalog::load_categories(state.catalog(), &mut store).await?;
    for category in store.categories().categories() {
        println!("{category}");
    }
    Ok(())
}
