//! Firebase adapter integration tests.
//!
//! Run the auth and admin services over [`FirebaseClient`] against
//! [`MockFirebase`], which keeps documents in Firestore's typed encoding.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use bazaar_core::Email;
use bazaar_core::forms::{ProductDraft, RegistrationForm};
use bazaar_integration_tests::{MockCatalog, MockFirebase};
use bazaar_storefront::AppState;
use bazaar_storefront::backend::{
    BackendError, DocumentStore, FirebaseClient, IdentityProvider, PRODUCTS_COLLECTION,
};
use bazaar_storefront::services::auth::{AuthError, ProfilePhoto, ProfileUpdate};
use rust_decimal_macros::dec;
use secrecy::SecretString;
use serde_json::{Map, Value, json};

async fn app() -> (MockCatalog, MockFirebase, AppState) {
    let catalog = MockCatalog::start().await;
    let firebase = MockFirebase::start().await;
    let mut config = catalog.config();
    config.firebase = Some(firebase.config());
    let state = AppState::new(config);
    (catalog, firebase, state)
}

fn registration(email: &str) -> RegistrationForm {
    RegistrationForm {
        email: email.to_string(),
        confirm_email: email.to_string(),
        password: "analytical engine".to_string(),
        confirm_password: "analytical engine".to_string(),
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        gender: "female".to_string(),
        dob: String::new(),
    }
}

fn typed_string(value: &str) -> Value {
    json!({ "stringValue": value })
}

// =============================================================================
// Auth
// =============================================================================

#[tokio::test]
async fn test_register_writes_typed_profile_with_token() {
    let (_catalog, firebase, state) = app().await;
    let mut store = state.new_store();

    let user = state
        .auth()
        .register(&mut store, &registration("ada@example.com"))
        .await
        .unwrap();

    assert_eq!(user.display_name.as_deref(), Some("Ada Lovelace"));
    let raw = firebase.raw_document("users", "ada@example.com").await.unwrap();
    assert_eq!(raw["firstName"], typed_string("Ada"));
    assert_eq!(raw["gender"], typed_string("female"));
    assert!(!raw.contains_key("dob"));
    assert_eq!(firebase.anonymous_requests(), 0);
    assert!(firebase.bearer_requests() > 0);
}

#[tokio::test]
async fn test_provider_errors_map_to_auth_errors() {
    let (_catalog, _firebase, state) = app().await;
    let mut store = state.new_store();
    state
        .auth()
        .register(&mut store, &registration("ada@example.com"))
        .await
        .unwrap();

    let mut other = state.new_store();
    let duplicate = state
        .auth()
        .register(&mut other, &registration("ada@example.com"))
        .await;
    assert!(matches!(duplicate, Err(AuthError::UserAlreadyExists)));

    let wrong = state
        .auth()
        .login(&mut other, "ada@example.com", &SecretString::from("difference engine"))
        .await;
    assert!(matches!(wrong, Err(AuthError::InvalidCredentials)));
}

#[tokio::test]
async fn test_login_reads_profile_written_at_sign_up() {
    let (_catalog, _firebase, state) = app().await;
    let mut first = state.new_store();
    state
        .auth()
        .register(&mut first, &registration("ada@example.com"))
        .await
        .unwrap();
    state.auth().logout(&mut first).await.unwrap();

    let mut second = state.new_store();
    let user = state
        .auth()
        .login(&mut second, "ada@example.com", &SecretString::from("analytical engine"))
        .await
        .unwrap();

    assert_eq!(user.greeting_name(), "Ada Lovelace");
}

#[tokio::test]
async fn test_update_profile_merges_photo() {
    let (_catalog, firebase, state) = app().await;
    let mut store = state.new_store();
    state
        .auth()
        .register(&mut store, &registration("ada@example.com"))
        .await
        .unwrap();

    let photo = ProfilePhoto::from_bytes("image/png", &[0x89, b'P', b'N', b'G']).unwrap();
    let profile = state
        .auth()
        .update_profile(
            &mut store,
            ProfileUpdate {
                display_name: "Countess".to_string(),
                photo: Some(photo),
            },
        )
        .await
        .unwrap();

    assert_eq!(profile.display_name.as_deref(), Some("Countess"));
    assert_eq!(profile.last_name.as_deref(), Some("Lovelace"));
    assert_eq!(store.auth().user().unwrap().greeting_name(), "Countess");

    let raw = firebase.raw_document("users", "ada@example.com").await.unwrap();
    let stored = raw["photo"]["stringValue"].as_str().unwrap();
    assert!(stored.starts_with("data:image/png;base64,"));
}

#[tokio::test]
async fn test_sign_out_drops_bearer_token() {
    let firebase = MockFirebase::start().await;
    let client = FirebaseClient::new(firebase.config());
    let email = Email::parse("ada@example.com").unwrap();
    let session = client
        .create_account(&email, &SecretString::from("analytical engine"))
        .await
        .unwrap();

    client.get("users", "ada@example.com").await.unwrap();
    client.sign_out(&session).await.unwrap();
    client.get("users", "ada@example.com").await.unwrap();

    assert_eq!(firebase.bearer_requests(), 1);
    assert_eq!(firebase.anonymous_requests(), 1);
}

#[tokio::test]
async fn test_weak_password_from_provider() {
    let firebase = MockFirebase::start().await;
    let client = FirebaseClient::new(firebase.config());
    let email = Email::parse("ada@example.com").unwrap();

    let result = client.create_account(&email, &SecretString::from("abc")).await;

    assert!(matches!(result, Err(BackendError::WeakPassword(detail)) if detail.contains("6 characters")));
}

// =============================================================================
// Documents
// =============================================================================

#[tokio::test]
async fn test_admin_products_over_firestore() {
    let (_catalog, firebase, state) = app().await;
    let mut session = state.new_store();
    let admin_email = state.config().admin_email.to_string();
    state
        .auth()
        .register(&mut session, &registration(&admin_email))
        .await
        .unwrap();

    let product = state
        .admin()
        .create_product(
            &session,
            &ProductDraft {
                title: "Brass sextant".to_string(),
                price: "149.50".to_string(),
                category: "navigation".to_string(),
                ..ProductDraft::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(product.price.amount(), dec!(149.50));

    let id = product.id.to_string();
    let raw = firebase.raw_document(PRODUCTS_COLLECTION, &id).await.unwrap();
    assert!(raw["price"].get("doubleValue").is_some());

    state.admin().delete_product(&session, &id).await.unwrap();
    assert!(firebase.raw_document(PRODUCTS_COLLECTION, &id).await.is_none());
}

#[tokio::test]
async fn test_list_follows_page_tokens() {
    let firebase = MockFirebase::start().await;
    for n in 0..305 {
        let mut fields = Map::new();
        fields.insert("title".to_string(), typed_string(&format!("Item {n}")));
        fields.insert("price".to_string(), json!({ "integerValue": "3" }));
        firebase
            .seed(PRODUCTS_COLLECTION, &format!("item{n:03}"), fields)
            .await;
    }
    let client = FirebaseClient::new(firebase.config());

    let docs = client.list(PRODUCTS_COLLECTION).await.unwrap();

    assert_eq!(docs.len(), 305);
    assert_eq!(docs[0].id, "item000");
    assert_eq!(docs[0].fields["price"], json!(3));
}

#[tokio::test]
async fn test_missing_document_is_none_and_delete_is_idempotent() {
    let firebase = MockFirebase::start().await;
    let client = FirebaseClient::new(firebase.config());

    assert!(client.get("users", "nobody@example.com").await.unwrap().is_none());
    client.delete("users", "nobody@example.com").await.unwrap();
}

#[tokio::test]
async fn test_merge_set_keeps_other_fields() {
    let firebase = MockFirebase::start().await;
    let client = FirebaseClient::new(firebase.config());

    let mut first = Map::new();
    first.insert("email".to_string(), json!("ada@example.com"));
    first.insert("firstName".to_string(), json!("Ada"));
    client.set("users", "ada@example.com", first, false).await.unwrap();

    let mut second = Map::new();
    second.insert("displayName".to_string(), json!("Countess"));
    let doc = client.set("users", "ada@example.com", second, true).await.unwrap();

    assert_eq!(doc.fields["firstName"], json!("Ada"));
    assert_eq!(doc.fields["displayName"], json!("Countess"));

    let mut replacement = Map::new();
    replacement.insert("email".to_string(), json!("ada@example.com"));
    let doc = client.set("users", "ada@example.com", replacement, false).await.unwrap();

    assert!(!doc.fields.contains_key("firstName"));
}
