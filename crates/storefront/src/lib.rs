//! Bazaar storefront library.
//!
//! Everything a storefront front end needs below the view layer:
//!
//! - [`store`] - Cart, wishlist, auth and listing state with change events
//! - [`catalog`] - Cached client for the product catalog service
//! - [`backend`] - Identity and document store ports with Firebase and
//!   in-memory adapters
//! - [`services`] - Catalog loading, auth and profiles, checkout, admin
//! - [`config`] - Environment configuration
//! - [`error`] - Unified error type with Sentry reporting

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod backend;
pub mod catalog;
pub mod config;
pub mod error;
pub mod services;
pub mod state;
pub mod store;

pub use error::AppError;
pub use state::AppState;
pub use store::{Store, StoreEvent};
