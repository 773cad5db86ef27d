//! Bazaar Core - Shared types and reducers.
//!
//! This crate provides the domain model used across all Bazaar components:
//! - `storefront` - Catalog client, backend adapters, store and services
//! - `cli` - Terminal consumer of the store
//!
//! # Architecture
//!
//! The core crate contains only types and pure state transitions - no I/O,
//! no HTTP clients, no async. Every reducer here runs to completion
//! synchronously, which is what lets the storefront `Store` publish a
//! consistent snapshot after each mutation.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for product ids, prices, quantities, emails
//! - [`cart`] - Cart line items with a derived total
//! - [`wishlist`] - Deduplicated product snapshots
//! - [`listing`] - Price-bracket filtering, sorting and category grouping
//! - [`forms`] - Checkout, registration and product draft validation

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod forms;
pub mod listing;
pub mod types;
pub mod wishlist;

pub use cart::{Cart, LineItem};
pub use listing::{ListingParseError, PriceBracket, SortKey};
pub use types::*;
pub use wishlist::{Wishlist, WishlistChange};
