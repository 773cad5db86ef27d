//! Client-side state container.
//!
//! [`Store`] owns every piece of shopper state: cart, wishlist, signed-in
//! user, product listing and categories. It is an ordinary value passed by
//! reference; mutations take `&mut self`, run to completion and then
//! publish a [`StoreEvent`] so views can re-render from the new snapshot.

mod events;
mod state;

pub use events::{EventBus, StoreEvent, Subscription};
pub use state::{AuthState, CategoriesState, ProductsState};

use bazaar_core::listing::{self, PriceBracket, SortKey};
use bazaar_core::{AuthUser, Cart, Product, ProductId, Quantity, Wishlist, WishlistChange};
use tracing::debug;

use crate::backend::AuthSession;
use crate::error::add_breadcrumb;

/// Default number of events buffered per subscriber.
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Shopper state plus change notifications.
pub struct Store {
    cart: Cart,
    wishlist: Wishlist,
    auth: AuthState,
    products: ProductsState,
    categories: CategoriesState,
    events: EventBus,
}

impl Default for Store {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

impl Store {
    /// Create an empty store.
    #[must_use]
    pub fn new(event_capacity: usize) -> Self {
        Self {
            cart: Cart::new(),
            wishlist: Wishlist::new(),
            auth: AuthState::default(),
            products: ProductsState::default(),
            categories: CategoriesState::default(),
            events: EventBus::new(event_capacity),
        }
    }

    /// Receive an event after every mutation from now on.
    #[must_use]
    pub fn subscribe(&self) -> Subscription {
        self.events.subscribe()
    }

    // =========================================================================
    // Snapshots
    // =========================================================================

    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    #[must_use]
    pub const fn wishlist(&self) -> &Wishlist {
        &self.wishlist
    }

    #[must_use]
    pub const fn auth(&self) -> &AuthState {
        &self.auth
    }

    #[must_use]
    pub const fn products(&self) -> &ProductsState {
        &self.products
    }

    #[must_use]
    pub const fn categories(&self) -> &CategoriesState {
        &self.categories
    }

    /// The loaded products, filtered to `bracket` and ordered by `sort`.
    #[must_use]
    pub fn listing(&self, bracket: PriceBracket, sort: SortKey) -> Vec<Product> {
        listing::apply(self.products.products(), bracket, sort)
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Add one unit of `product`, snapshotting it on first add.
    pub fn add_to_cart(&mut self, product: &Product) {
        self.cart.add_item(product);
        let id = product.id.to_string();
        add_breadcrumb("cart", "Added to cart", Some(&[("product_id", id.as_str())]));
        self.cart_changed();
    }

    /// Remove a line. Unknown ids change nothing and publish nothing.
    pub fn remove_from_cart(&mut self, id: &ProductId) -> bool {
        let removed = self.cart.remove_item(id);
        if removed {
            let id = id.to_string();
            add_breadcrumb("cart", "Removed from cart", Some(&[("product_id", id.as_str())]));
            self.cart_changed();
        }
        removed
    }

    /// Set a line's quantity. Unknown ids change nothing.
    pub fn set_quantity(&mut self, id: &ProductId, quantity: Quantity) -> bool {
        let updated = self.cart.set_quantity(id, quantity);
        if updated {
            self.cart_changed();
        }
        updated
    }

    fn cart_changed(&self) {
        debug!(lines = self.cart.len(), total = %self.cart.total(), "Cart changed");
        self.events.publish(StoreEvent::CartChanged {
            lines: self.cart.len(),
            total: self.cart.total(),
        });
    }

    // =========================================================================
    // Wishlist
    // =========================================================================

    /// Save a product. Returns `false` if it was already saved.
    pub fn add_to_wishlist(&mut self, product: &Product) -> bool {
        let added = self.wishlist.add(product);
        if added {
            self.wishlist_changed();
        }
        added
    }

    pub fn remove_from_wishlist(&mut self, id: &ProductId) -> bool {
        let removed = self.wishlist.remove(id);
        if removed {
            self.wishlist_changed();
        }
        removed
    }

    /// Save the product if absent, remove it if present.
    pub fn toggle_wishlist(&mut self, product: &Product) -> WishlistChange {
        let change = self.wishlist.toggle(product);
        self.wishlist_changed();
        change
    }

    pub fn clear_wishlist(&mut self) {
        if self.wishlist.is_empty() {
            return;
        }
        self.wishlist.clear();
        self.wishlist_changed();
    }

    fn wishlist_changed(&self) {
        self.events.publish(StoreEvent::WishlistChanged {
            count: self.wishlist.len(),
        });
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// Record the signed-in user. A `None` session keeps the current one,
    /// which is how profile edits refresh the user.
    pub fn set_user(&mut self, user: AuthUser, session: Option<AuthSession>) {
        self.auth.set_user(user, session);
        self.auth_changed();
    }

    pub fn set_auth_loading(&mut self, loading: bool) {
        self.auth.set_loading(loading);
        self.auth_changed();
    }

    pub fn set_auth_error(&mut self, error: impl Into<String>) {
        self.auth.set_error(error.into());
        self.auth_changed();
    }

    /// Forget the signed-in user. Cart and wishlist are kept.
    pub fn logout(&mut self) {
        self.auth.logout();
        self.auth_changed();
    }

    fn auth_changed(&self) {
        self.events.publish(StoreEvent::AuthChanged {
            signed_in: self.auth.is_authenticated(),
        });
    }

    // =========================================================================
    // Products and categories
    // =========================================================================

    pub fn set_products(&mut self, products: Vec<Product>) {
        self.products.set_products(products);
        self.events.publish(StoreEvent::ProductsChanged);
    }

    pub fn set_selected_product(&mut self, product: Option<Product>) {
        self.products.set_selected(product);
        self.events.publish(StoreEvent::ProductsChanged);
    }

    pub fn set_products_loading(&mut self, loading: bool) {
        self.products.set_loading(loading);
        self.events.publish(StoreEvent::ProductsChanged);
    }

    pub fn set_products_error(&mut self, error: impl Into<String>) {
        self.products.set_error(error.into());
        self.events.publish(StoreEvent::ProductsChanged);
    }

    pub fn set_categories(&mut self, categories: Vec<String>) {
        self.categories.set_categories(categories);
        self.events.publish(StoreEvent::CategoriesChanged);
    }

    pub fn set_categories_loading(&mut self, loading: bool) {
        self.categories.set_loading(loading);
        self.events.publish(StoreEvent::CategoriesChanged);
    }

    pub fn set_categories_error(&mut self, error: impl Into<String>) {
        self.categories.set_error(error.into());
        self.events.publish(StoreEvent::CategoriesChanged);
    }
}
