//! Admin panel operations.
//!
//! Products and users stored in the document store, editable only by the
//! configured admin account.

use bazaar_core::forms::{FieldErrors, ProductDraft, ProductFields, UserDraft};
use bazaar_core::listing::{CategoryGroup, UNCATEGORIZED, group_by_category};
use bazaar_core::{AuthUser, Email, Price, Product, ProductId, UserProfile};
use rust_decimal::prelude::ToPrimitive;
use serde::Deserialize;
use serde_json::{Number, Value};
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::backend::{
    BackendError, Document, DocumentStore, Fields, PRODUCTS_COLLECTION, USERS_COLLECTION,
};
use crate::services::auth::profile_from_document;
use crate::store::Store;

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error("sign in as an admin to continue")]
    NotSignedIn,

    /// Signed in, but not as the admin.
    #[error("{0} is not an admin")]
    Forbidden(Email),

    #[error("{0}")]
    Validation(#[from] FieldErrors),

    #[error("not found: {0}")]
    NotFound(String),

    /// A stored document does not decode.
    #[error("invalid document {id}: {reason}")]
    InvalidDocument { id: String, reason: String },

    #[error("backend error: {0}")]
    Backend(#[from] BackendError),
}

/// Stored product fields. Prices written by other tools may be text.
#[derive(Debug, Deserialize)]
struct ProductDocument {
    #[serde(default)]
    title: String,
    #[serde(default)]
    price: Value,
    #[serde(default)]
    image: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    category: String,
}

/// Admin panel service.
pub struct AdminService<'a> {
    documents: &'a dyn DocumentStore,
    admin_email: &'a Email,
}

impl<'a> AdminService<'a> {
    #[must_use]
    pub const fn new(documents: &'a dyn DocumentStore, admin_email: &'a Email) -> Self {
        Self {
            documents,
            admin_email,
        }
    }

    /// Whether `user` may use the admin panel.
    #[must_use]
    pub fn is_admin(&self, user: &AuthUser) -> bool {
        &user.email == self.admin_email
    }

    fn authorize<'s>(&self, store: &'s Store) -> Result<&'s AuthUser, AdminError> {
        let user = store.auth().user().ok_or(AdminError::NotSignedIn)?;
        if self.is_admin(user) {
            Ok(user)
        } else {
            warn!(email = %user.email, "Admin access refused");
            Err(AdminError::Forbidden(user.email.clone()))
        }
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// Every stored product. Documents that do not decode are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error for a non-admin user or a failed request.
    #[instrument(skip(self, store))]
    pub async fn list_products(&self, store: &Store) -> Result<Vec<Product>, AdminError> {
        self.authorize(store)?;
        let docs = self.documents.list(PRODUCTS_COLLECTION).await?;

        Ok(docs
            .into_iter()
            .filter_map(|doc| match product_from_document(doc) {
                Ok(product) => Some(product),
                Err(e) => {
                    warn!(error = %e, "Skipping product document");
                    None
                }
            })
            .collect())
    }

    /// Stored products grouped by category, in first-seen order.
    ///
    /// # Errors
    ///
    /// Returns an error for a non-admin user or a failed request.
    pub async fn grouped_products(&self, store: &Store) -> Result<Vec<CategoryGroup>, AdminError> {
        let products = self.list_products(store).await?;
        Ok(group_by_category(&products))
    }

    /// Add a product under a generated id.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Validation` for an invalid draft.
    #[instrument(skip(self, store, draft), fields(title = %draft.title))]
    pub async fn create_product(
        &self,
        store: &Store,
        draft: &ProductDraft,
    ) -> Result<Product, AdminError> {
        self.authorize(store)?;
        let fields = draft.validate()?;

        let doc = self
            .documents
            .create(PRODUCTS_COLLECTION, product_fields(&fields))
            .await?;
        info!(product_id = %doc.id, "Product created");
        product_from_document(doc)
    }

    /// Overwrite an existing product's fields.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::NotFound` if no product has `id`.
    #[instrument(skip(self, store, draft))]
    pub async fn update_product(
        &self,
        store: &Store,
        id: &str,
        draft: &ProductDraft,
    ) -> Result<Product, AdminError> {
        self.authorize(store)?;
        let fields = draft.validate()?;

        if self.documents.get(PRODUCTS_COLLECTION, id).await?.is_none() {
            return Err(AdminError::NotFound(format!("product {id}")));
        }
        let doc = self
            .documents
            .set(PRODUCTS_COLLECTION, id, product_fields(&fields), true)
            .await?;
        info!("Product updated");
        product_from_document(doc)
    }

    /// # Errors
    ///
    /// Returns an error for a non-admin user or a failed request.
    #[instrument(skip(self, store))]
    pub async fn delete_product(&self, store: &Store, id: &str) -> Result<(), AdminError> {
        self.authorize(store)?;
        self.documents.delete(PRODUCTS_COLLECTION, id).await?;
        info!("Product deleted");
        Ok(())
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// Every stored user profile. Documents that do not decode are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error for a non-admin user or a failed request.
    #[instrument(skip(self, store))]
    pub async fn list_users(&self, store: &Store) -> Result<Vec<UserProfile>, AdminError> {
        self.authorize(store)?;
        let docs = self.documents.list(USERS_COLLECTION).await?;

        Ok(docs
            .into_iter()
            .filter_map(|doc| {
                let id = doc.id.clone();
                match profile_from_document(doc) {
                    Ok(profile) => Some(profile),
                    Err(e) => {
                        warn!(user = %id, error = %e, "Skipping user document");
                        None
                    }
                }
            })
            .collect())
    }

    /// Create or update the user keyed by the draft's email. Fields the
    /// draft does not carry are kept.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Validation` for an invalid email.
    #[instrument(skip(self, store, draft), fields(email = %draft.email))]
    pub async fn save_user(
        &self,
        store: &Store,
        draft: &UserDraft,
    ) -> Result<UserProfile, AdminError> {
        self.authorize(store)?;
        let email = draft.validate()?;

        let mut fields = Fields::new();
        fields.insert("email".to_string(), Value::String(email.to_string()));
        fields.insert(
            "displayName".to_string(),
            Value::String(draft.display_name.trim().to_string()),
        );
        fields.insert(
            "photo".to_string(),
            Value::String(draft.photo.trim().to_string()),
        );

        let doc = self
            .documents
            .set(USERS_COLLECTION, email.as_str(), fields, true)
            .await?;
        info!("User saved");
        let id = doc.id.clone();
        profile_from_document(doc).map_err(|e| AdminError::InvalidDocument {
            id,
            reason: e.to_string(),
        })
    }

    /// # Errors
    ///
    /// Returns an error for a non-admin user or a failed request.
    #[instrument(skip(self, store))]
    pub async fn delete_user(&self, store: &Store, email: &str) -> Result<(), AdminError> {
        self.authorize(store)?;
        let email = Email::parse(email).map_err(|e| AdminError::NotFound(e.to_string()))?;
        self.documents.delete(USERS_COLLECTION, email.as_str()).await?;
        info!("User deleted");
        Ok(())
    }
}

/// Product document fields. Price is written as a number.
fn product_fields(fields: &ProductFields) -> Fields {
    let price = fields
        .price
        .amount()
        .to_f64()
        .and_then(Number::from_f64)
        .map_or(Value::Null, Value::Number);

    let mut doc = Fields::new();
    doc.insert("title".to_string(), Value::String(fields.title.clone()));
    doc.insert("price".to_string(), price);
    doc.insert("image".to_string(), Value::String(fields.image.clone()));
    doc.insert(
        "description".to_string(),
        Value::String(fields.description.clone()),
    );
    doc.insert("category".to_string(), Value::String(fields.category.clone()));
    doc
}

fn product_from_document(doc: Document) -> Result<Product, AdminError> {
    let invalid = |reason: String| AdminError::InvalidDocument {
        id: doc.id.clone(),
        reason,
    };

    let stored: ProductDocument =
        serde_json::from_value(Value::Object(doc.fields.clone())).map_err(|e| invalid(e.to_string()))?;

    let price = match &stored.price {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| invalid("price out of range".to_string()))
            .and_then(|n| Price::from_f64(n).map_err(|e| invalid(e.to_string())))?,
        Value::String(s) => Price::parse(s).map_err(|e| invalid(e.to_string()))?,
        _ => return Err(invalid("price is missing".to_string())),
    };

    let category = match stored.category.trim() {
        "" => UNCATEGORIZED.to_string(),
        name => name.to_string(),
    };

    Ok(Product {
        id: ProductId::from(doc.id.clone()),
        title: stored.title,
        price,
        image: stored.image,
        description: stored.description,
        category,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;
    use serde_json::json;

    use super::*;
    use crate::backend::MemoryBackend;

    fn admin_email() -> Email {
        Email::parse("admin@example.com").unwrap()
    }

    fn store_as(email: &str) -> Store {
        let mut store = Store::default();
        store.set_user(
            AuthUser {
                uid: "u1".to_string(),
                email: Email::parse(email).unwrap(),
                display_name: None,
                photo: None,
            },
            None,
        );
        store
    }

    fn draft(title: &str, price: &str, category: &str) -> ProductDraft {
        ProductDraft {
            title: title.to_string(),
            price: price.to_string(),
            image: "https://img.example/p.jpg".to_string(),
            description: String::new(),
            category: category.to_string(),
        }
    }

    #[tokio::test]
    async fn test_non_admin_refused() {
        let backend = MemoryBackend::new();
        let email = admin_email();
        let admin = AdminService::new(&backend, &email);

        let err = admin.list_products(&Store::default()).await.unwrap_err();
        assert!(matches!(err, AdminError::NotSignedIn));

        let shopper = store_as("ada@example.com");
        let err = admin
            .create_product(&shopper, &draft("Lamp", "12", ""))
            .await
            .unwrap_err();
        assert!(matches!(err, AdminError::Forbidden(_)));
        assert_eq!(backend.document_count(PRODUCTS_COLLECTION).await, 0);
    }

    #[tokio::test]
    async fn test_product_crud() {
        let backend = MemoryBackend::new();
        let email = admin_email();
        let admin = AdminService::new(&backend, &email);
        let store = store_as("Admin@Example.com");

        let lamp = admin
            .create_product(&store, &draft("Lamp", "12.50", ""))
            .await
            .unwrap();
        assert_eq!(lamp.category, UNCATEGORIZED);
        assert_eq!(lamp.price.amount(), dec!(12.50));

        let ProductId::Text(id) = &lamp.id else {
            panic!("document ids are text");
        };
        let updated = admin
            .update_product(&store, id, &draft("Desk lamp", "15", "lighting"))
            .await
            .unwrap();
        assert_eq!(updated.title, "Desk lamp");
        assert_eq!(updated.category, "lighting");

        admin.delete_product(&store, id).await.unwrap();
        assert!(admin.list_products(&store).await.unwrap().is_empty());

        let err = admin
            .update_product(&store, id, &draft("Gone", "1", ""))
            .await
            .unwrap_err();
        assert!(matches!(err, AdminError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_invalid_price_rejected() {
        let backend = MemoryBackend::new();
        let email = admin_email();
        let admin = AdminService::new(&backend, &email);
        let store = store_as("admin@example.com");

        let err = admin
            .create_product(&store, &draft("Lamp", "cheap", ""))
            .await
            .unwrap_err();
        assert!(matches!(err, AdminError::Validation(_)));
    }

    #[tokio::test]
    async fn test_grouped_products() {
        let backend = MemoryBackend::new();
        let email = admin_email();
        let admin = AdminService::new(&backend, &email);
        let store = store_as("admin@example.com");

        for (title, category) in [("Lamp", "lighting"), ("Mug", ""), ("Bulb", "lighting")] {
            admin
                .create_product(&store, &draft(title, "5", category))
                .await
                .unwrap();
        }

        let groups = admin.grouped_products(&store).await.unwrap();
        assert_eq!(groups.len(), 2);
        let lighting = groups.iter().find(|g| g.category == "lighting").unwrap();
        assert_eq!(lighting.products.len(), 2);
    }

    #[tokio::test]
    async fn test_save_user_merges_profile() {
        let backend = MemoryBackend::new();
        backend
            .set(
                USERS_COLLECTION,
                "grace@example.com",
                json!({ "email": "grace@example.com", "firstName": "Grace" })
                    .as_object()
                    .unwrap()
                    .clone(),
                false,
            )
            .await
            .unwrap();

        let email = admin_email();
        let admin = AdminService::new(&backend, &email);
        let store = store_as("admin@example.com");

        let profile = admin
            .save_user(
                &store,
                &UserDraft {
                    email: "grace@example.com".to_string(),
                    display_name: "Grace Hopper".to_string(),
                    photo: String::new(),
                },
            )
            .await
            .unwrap();
        assert_eq!(profile.first_name.as_deref(), Some("Grace"));
        assert_eq!(profile.display_name.as_deref(), Some("Grace Hopper"));

        assert_eq!(admin.list_users(&store).await.unwrap().len(), 1);
        admin.delete_user(&store, "grace@example.com").await.unwrap();
        assert!(admin.list_users(&store).await.unwrap().is_empty());
    }

    #[test]
    fn test_product_from_text_price() {
        let doc = Document {
            id: "abc".to_string(),
            fields: json!({ "title": "Lamp", "price": "9.99" })
                .as_object()
                .unwrap()
                .clone(),
        };
        let product = product_from_document(doc).unwrap();
        assert_eq!(product.price.amount(), dec!(9.99));
        assert_eq!(product.id, ProductId::from("abc"));
        assert_eq!(product.category, UNCATEGORIZED);
    }

    #[test]
    fn test_product_fields_write_numeric_price() {
        let fields = draft("Lamp", "12.50", "").validate().unwrap();
        assert_eq!(product_fields(&fields)["price"], json!(12.5));
    }
}
