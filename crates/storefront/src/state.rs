//! Services shared by every storefront session.

use std::sync::Arc;

use tracing::info;

use crate::backend::{DocumentStore, FirebaseClient, IdentityProvider, MemoryBackend};
use crate::catalog::CatalogClient;
use crate::config::StorefrontConfig;
use crate::services::admin::AdminService;
use crate::services::auth::AuthService;
use crate::store::Store;

/// Configuration, catalog client and backend ports.
///
/// This struct is cheaply cloneable via `Arc`. Shopper state lives in a
/// [`Store`], one per session.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: CatalogClient,
    identity: Arc<dyn IdentityProvider>,
    documents: Arc<dyn DocumentStore>,
}

impl AppState {
    /// Create the application state.
    ///
    /// Uses Firebase when it is configured and an in-memory backend
    /// otherwise.
    #[must_use]
    pub fn new(config: StorefrontConfig) -> Self {
        let (identity, documents): (Arc<dyn IdentityProvider>, Arc<dyn DocumentStore>) =
            match &config.firebase {
                Some(firebase) => {
                    info!(project = %firebase.project_id, "Using Firebase backend");
                    let client = FirebaseClient::new(firebase.clone());
                    (Arc::new(client.clone()), Arc::new(client))
                }
                None => {
                    info!("Firebase not configured, using in-memory backend");
                    let backend = MemoryBackend::new();
                    (Arc::new(backend.clone()), Arc::new(backend))
                }
            };
        Self::with_backend(config, identity, documents)
    }

    /// Create the application state over explicit backend ports.
    #[must_use]
    pub fn with_backend(
        config: StorefrontConfig,
        identity: Arc<dyn IdentityProvider>,
        documents: Arc<dyn DocumentStore>,
    ) -> Self {
        let catalog = CatalogClient::new(&config.catalog);
        Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                identity,
                documents,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn catalog(&self) -> &CatalogClient {
        &self.inner.catalog
    }

    /// A fresh, empty store for a new session.
    #[must_use]
    pub fn new_store(&self) -> Store {
        Store::new(self.inner.config.event_capacity)
    }

    #[must_use]
    pub fn auth(&self) -> AuthService<'_> {
        AuthService::new(self.inner.identity.as_ref(), self.inner.documents.as_ref())
    }

    #[must_use]
    pub fn admin(&self) -> AdminService<'_> {
        AdminService::new(self.inner.documents.as_ref(), &self.inner.config.admin_email)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use bazaar_core::forms::RegistrationForm;
    use url::Url;

    use super::*;

    #[tokio::test]
    async fn test_memory_backend_by_default() {
        let config =
            StorefrontConfig::with_catalog(Url::parse("http://127.0.0.1:9").unwrap());
        let state = AppState::new(config);
        let mut store = state.new_store();

        let form = RegistrationForm {
            email: "admin@example.com".to_string(),
            confirm_email: "admin@example.com".to_string(),
            password: "correct horse".to_string(),
            confirm_password: "correct horse".to_string(),
            first_name: "Site".to_string(),
            last_name: "Admin".to_string(),
            ..RegistrationForm::default()
        };
        state.auth().register(&mut store, &form).await.unwrap();

        let groups = state.admin().grouped_products(&store).await.unwrap();
        assert!(groups.is_empty());
    }
}
