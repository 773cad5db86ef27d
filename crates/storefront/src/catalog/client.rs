//! Catalog REST client implementation.

use std::sync::Arc;

use bazaar_core::{Product, ProductId};
use moka::future::Cache;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use super::cache::{CacheKey, CacheValue};
use super::conversions::{convert_product, convert_products};
use super::types::ProductRecord;
use super::{ALL_CATEGORIES, CatalogError};
use crate::config::CatalogConfig;

/// How much of an error body to keep for diagnostics.
const ERROR_BODY_LIMIT: usize = 200;

// =============================================================================
// CatalogClient
// =============================================================================

/// Client for the catalog REST service.
///
/// Cheap to clone; clones share the HTTP connection pool and the cache.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    client: reqwest::Client,
    base_url: Url,
    cache: Cache<CacheKey, CacheValue>,
}

impl CatalogClient {
    /// Create a new catalog client.
    #[must_use]
    pub fn new(config: &CatalogConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.cache_capacity)
            .time_to_live(config.cache_ttl)
            .build();

        Self {
            inner: Arc::new(CatalogClientInner {
                client: reqwest::Client::new(),
                base_url: config.base_url.clone(),
                cache,
            }),
        }
    }

    /// Build `base_url/segment/segment/...`, percent-encoding each segment.
    fn url(&self, segments: &[&str]) -> Result<Url, CatalogError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| CatalogError::InvalidUrl(self.inner.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// GET a JSON document. Returns `None` for 404 and for an empty or
    /// `null` body, which is how the service answers unknown ids.
    async fn get_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
    ) -> Result<Option<T>, CatalogError> {
        let url = self.url(segments)?;
        let response = self.inner.client.get(url).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Catalog returned non-success status"
            );
            return Err(CatalogError::Status {
                status: status.as_u16(),
                body: body.chars().take(ERROR_BODY_LIMIT).collect(),
            });
        }

        let trimmed = body.trim();
        if trimmed.is_empty() || trimmed == "null" {
            return Ok(None);
        }

        serde_json::from_str(trimmed).map(Some).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse catalog response"
            );
            CatalogError::Parse(e)
        })
    }

    // =========================================================================
    // Product Methods
    // =========================================================================

    /// List every product, in catalog order.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or a record is invalid.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>, CatalogError> {
        if let Some(CacheValue::Products(products)) =
            self.inner.cache.get(&CacheKey::Products).await
        {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let records: Vec<ProductRecord> = self
            .get_json(&["products"])
            .await?
            .unwrap_or_default();
        let products = convert_products(records)?;

        self.inner
            .cache
            .insert(CacheKey::Products, CacheValue::Products(products.clone()))
            .await;

        Ok(products)
    }

    /// Get a single product.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] for an unknown id, or an error if
    /// the request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: &ProductId) -> Result<Product, CatalogError> {
        let cache_key = CacheKey::Product(id.clone());

        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let segment = id.to_string();
        let record: ProductRecord = self
            .get_json(&["products", &segment])
            .await?
            .ok_or_else(|| CatalogError::NotFound(format!("Product not found: {id}")))?;
        let product = convert_product(record)?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// List the products in `category` (case-insensitive).
    ///
    /// `"all"` (or a blank name) lists every product.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or a record is invalid.
    #[instrument(skip(self))]
    pub async fn products_in_category(&self, category: &str) -> Result<Vec<Product>, CatalogError> {
        let category = category.trim().to_lowercase();
        if category.is_empty() || category == ALL_CATEGORIES {
            return self.list_products().await;
        }

        let cache_key = CacheKey::Category(category.clone());
        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for category");
            return Ok(products);
        }

        let records: Vec<ProductRecord> = self
            .get_json(&["products", "category", &category])
            .await?
            .unwrap_or_default();
        let products = convert_products(records)?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Products(products.clone()))
            .await;

        Ok(products)
    }

    // =========================================================================
    // Category Methods
    // =========================================================================

    /// List category names as the service reports them.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Vec<String>, CatalogError> {
        if let Some(CacheValue::Categories(categories)) =
            self.inner.cache.get(&CacheKey::Categories).await
        {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let categories: Vec<String> = self
            .get_json(&["products", "categories"])
            .await?
            .unwrap_or_default();

        self.inner
            .cache
            .insert(CacheKey::Categories, CacheValue::Categories(categories.clone()))
            .await;

        Ok(categories)
    }

    /// Drop every cached response.
    pub fn invalidate_cache(&self) {
        self.inner.cache.invalidate_all();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str) -> CatalogClient {
        CatalogClient::new(&CatalogConfig::new(Url::parse(base).unwrap()))
    }

    #[test]
    fn test_url_appends_segments() {
        let client = client("https://fakestoreapi.com");
        let url = client.url(&["products", "category", "men's clothing"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://fakestoreapi.com/products/category/men's%20clothing"
        );
    }

    #[test]
    fn test_url_keeps_base_path() {
        let client = client("http://127.0.0.1:8080/api/");
        let url = client.url(&["products", "3"]).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8080/api/products/3");
    }

    #[test]
    fn test_url_rejects_cannot_be_a_base() {
        let client = client("mailto:shop@example.com");
        assert!(matches!(
            client.url(&["products"]),
            Err(CatalogError::InvalidUrl(_))
        ));
    }
}
