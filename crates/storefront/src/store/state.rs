//! Auth, product and category states.
//!
//! Each state has the same shape: data plus `loading` and `error`. Setting
//! data clears both flags; setting an error clears `loading`.

use bazaar_core::{AuthUser, Product};

use crate::backend::AuthSession;

/// The signed-in user, if any.
#[derive(Debug, Clone, Default)]
pub struct AuthState {
    user: Option<AuthUser>,
    session: Option<AuthSession>,
    loading: bool,
    error: Option<String>,
}

impl AuthState {
    #[must_use]
    pub const fn user(&self) -> Option<&AuthUser> {
        self.user.as_ref()
    }

    /// The backend session behind [`Self::user`], if it came from a sign-in.
    #[must_use]
    pub const fn session(&self) -> Option<&AuthSession> {
        self.session.as_ref()
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub(super) fn set_user(&mut self, user: AuthUser, session: Option<AuthSession>) {
        self.user = Some(user);
        if session.is_some() {
            self.session = session;
        }
        self.loading = false;
        self.error = None;
    }

    pub(super) const fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    pub(super) fn set_error(&mut self, error: String) {
        self.error = Some(error);
        self.loading = false;
    }

    pub(super) fn logout(&mut self) {
        *self = Self::default();
    }
}

/// The current product listing and the product being viewed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductsState {
    products: Vec<Product>,
    selected: Option<Product>,
    loading: bool,
    error: Option<String>,
}

impl ProductsState {
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    #[must_use]
    pub const fn selected(&self) -> Option<&Product> {
        self.selected.as_ref()
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub(super) fn set_products(&mut self, products: Vec<Product>) {
        self.products = products;
        self.loading = false;
        self.error = None;
    }

    pub(super) fn set_selected(&mut self, product: Option<Product>) {
        self.selected = product;
        self.loading = false;
        self.error = None;
    }

    pub(super) const fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    pub(super) fn set_error(&mut self, error: String) {
        self.error = Some(error);
        self.loading = false;
    }
}

/// Category names offered by the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoriesState {
    categories: Vec<String>,
    loading: bool,
    error: Option<String>,
}

impl CategoriesState {
    #[must_use]
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub(super) fn set_categories(&mut self, categories: Vec<String>) {
        self.categories = categories;
        self.loading = false;
        self.error = None;
    }

    pub(super) const fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    pub(super) fn set_error(&mut self, error: String) {
        self.error = Some(error);
        self.loading = false;
    }
}
