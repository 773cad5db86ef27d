//! Core types for Bazaar.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod price;
pub mod product;
pub mod quantity;
pub mod user;

pub use email::{Email, EmailError};
pub use id::ProductId;
pub use price::{Price, PriceError};
pub use product::Product;
pub use quantity::{Quantity, QuantityError};
pub use user::{AuthUser, UserProfile};
