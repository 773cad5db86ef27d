//! Catalog service client.
//!
//! # Architecture
//!
//! - Plain REST over `reqwest`: `/products`, `/products/{id}`,
//!   `/products/category/{name}`, `/products/categories`
//! - Responses are decoded into wire records and converted into validated
//!   [`Product`](bazaar_core::Product)s before anything else sees them
//! - In-memory caching via `moka` (5 minute TTL by default)
//! - No retries: a failed fetch is reported once and left to the caller
//!
//! # Example
//!
//! ```rust,ignore
//! use bazaar_storefront::catalog::CatalogClient;
//!
//! let client = CatalogClient::new(&config.catalog);
//! let products = client.products_in_category("jewelery").await?;
//! ```

mod cache;
mod client;
mod conversions;
pub mod types;

pub use client::CatalogClient;
pub use types::ProductRecord;

use thiserror::Error;

/// Category value meaning "no category filter".
pub const ALL_CATEGORIES: &str = "all";

/// Errors that can occur when talking to the catalog service.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("Catalog returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// First part of the response body.
        body: String,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A record decoded but failed validation.
    #[error("Invalid product {id}: {reason}")]
    InvalidRecord {
        /// Id of the offending record.
        id: String,
        /// What was wrong with it.
        reason: String,
    },

    /// The configured base URL cannot have paths appended.
    #[error("Invalid catalog URL: {0}")]
    InvalidUrl(String),
}
