//! Storefront operations that combine the store with remote services.
//!
//! # Services
//!
//! - `catalog` - Load products and categories into the store
//! - `auth` - Registration, sign-in and profiles
//! - `checkout` - Order validation and confirmation
//! - `admin` - Product and user management for the admin account

pub mod admin;
pub mod auth;
pub mod catalog;
pub mod checkout;
