//! End-to-end shopper and admin flows.
//!
//! The catalog is [`MockCatalog`]; accounts and documents live in the
//! in-memory backend.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;

use bazaar_core::forms::{ProductDraft, RegistrationForm, ShippingDetails, UserDraft};
use bazaar_core::{PriceBracket, ProductId, Quantity, SortKey, WishlistChange};
use bazaar_integration_tests::MockCatalog;
use bazaar_storefront::backend::MemoryBackend;
use bazaar_storefront::services::admin::AdminError;
use bazaar_storefront::services::auth::AuthError;
use bazaar_storefront::services::catalog;
use bazaar_storefront::services::checkout::{self, CheckoutError};
use bazaar_storefront::{AppState, Store, StoreEvent};
use rust_decimal_macros::dec;
use secrecy::SecretString;

async fn app() -> (MockCatalog, AppState) {
    let mock = MockCatalog::start().await;
    let backend = MemoryBackend::new();
    let state = AppState::with_backend(mock.config(), Arc::new(backend.clone()), Arc::new(backend));
    (mock, state)
}

fn registration(email: &str) -> RegistrationForm {
    RegistrationForm {
        email: email.to_string(),
        confirm_email: email.to_string(),
        password: "correct horse".to_string(),
        confirm_password: "correct horse".to_string(),
        first_name: "Grace".to_string(),
        last_name: "Hopper".to_string(),
        gender: String::new(),
        dob: "1906-12-09".to_string(),
    }
}

fn shipping() -> ShippingDetails {
    ShippingDetails {
        full_name: "Grace Hopper".to_string(),
        address: "1 Navy Yard".to_string(),
        city: "Arlington".to_string(),
        postal_code: "22202".to_string(),
        country: "US".to_string(),
    }
}

async fn signed_in_admin(state: &AppState) -> Store {
    let mut store = state.new_store();
    let admin = state.config().admin_email.to_string();
    state
        .auth()
        .register(&mut store, &registration(&admin))
        .await
        .unwrap();
    store
}

// =============================================================================
// Shopper
// =============================================================================

#[tokio::test]
async fn test_browse_filter_and_sort() {
    let (_mock, state) = app().await;
    let mut store = state.new_store();

    catalog::load_products(state.catalog(), &mut store, None).await.unwrap();

    let cheap_first = store.listing(PriceBracket::All, SortKey::PriceLow);
    assert_eq!(cheap_first[0].id, ProductId::from(2));

    let mid = store.listing(PriceBracket::From50To100, SortKey::Featured);
    let ids: Vec<_> = mid.iter().map(|p| p.id.clone()).collect();
    assert_eq!(ids, vec![ProductId::from(9)]);

    let newest = store.listing(PriceBracket::All, SortKey::Newest);
    assert_eq!(newest[0].id, ProductId::from(12));
}

#[tokio::test]
async fn test_shop_sign_up_and_check_out() {
    let (_mock, state) = app().await;
    let mut store = state.new_store();
    let mut events = store.subscribe();

    catalog::load_products(state.catalog(), &mut store, None).await.unwrap();
    let products = store.products().products().to_vec();
    store.add_to_cart(&products[0]);
    store.add_to_cart(&products[0]);
    store.add_to_cart(&products[3]);
    assert!(store.set_quantity(&products[3].id, Quantity::parse("3").unwrap()));

    let early = checkout::place_order(&store, &shipping());
    assert!(matches!(early, Err(CheckoutError::NotSignedIn)));

    let user = state
        .auth()
        .register(&mut store, &registration("grace@example.com"))
        .await
        .unwrap();
    assert_eq!(user.greeting_name(), "Grace Hopper");

    let order = checkout::place_order(&store, &shipping()).unwrap();
    assert_eq!(order.email.as_str(), "grace@example.com");
    assert_eq!(order.lines.len(), 2);
    // 2 x 109.95 + 3 x 64
    assert_eq!(order.total, dec!(411.90));

    let seen = events.drain();
    assert!(seen.contains(&StoreEvent::AuthChanged { signed_in: true }));
    assert!(seen.contains(&StoreEvent::CartChanged {
        lines: 2,
        total: dec!(411.90)
    }));
}

#[tokio::test]
async fn test_cart_and_wishlist_survive_logout() {
    let (_mock, state) = app().await;
    let mut store = state.new_store();
    catalog::load_products(state.catalog(), &mut store, None).await.unwrap();
    let product = store.products().products()[1].clone();

    state
        .auth()
        .register(&mut store, &registration("grace@example.com"))
        .await
        .unwrap();
    store.add_to_cart(&product);
    assert_eq!(store.toggle_wishlist(&product), WishlistChange::Added);

    state.auth().logout(&mut store).await.unwrap();

    assert!(!store.auth().is_authenticated());
    assert_eq!(store.cart().len(), 1);
    assert_eq!(store.wishlist().len(), 1);
}

#[tokio::test]
async fn test_returning_shopper_logs_in() {
    let (_mock, state) = app().await;
    let mut first = state.new_store();
    state
        .auth()
        .register(&mut first, &registration("grace@example.com"))
        .await
        .unwrap();

    let mut second = state.new_store();
    let wrong = state
        .auth()
        .login(&mut second, "grace@example.com", &SecretString::from("nope nope"))
        .await;
    assert!(matches!(wrong, Err(AuthError::InvalidCredentials)));
    assert!(second.auth().error().is_some());

    let user = state
        .auth()
        .login(&mut second, "Grace@Example.com", &SecretString::from("correct horse"))
        .await
        .unwrap();
    assert_eq!(user.display_name.as_deref(), Some("Grace Hopper"));
    assert!(second.auth().error().is_none());
}

#[tokio::test]
async fn test_duplicate_sign_up_rejected() {
    let (_mock, state) = app().await;
    let mut store = state.new_store();
    state
        .auth()
        .register(&mut store, &registration("grace@example.com"))
        .await
        .unwrap();

    let mut other = state.new_store();
    let result = state
        .auth()
        .register(&mut other, &registration("grace@example.com"))
        .await;

    assert!(matches!(result, Err(AuthError::UserAlreadyExists)));
    assert!(!other.auth().is_authenticated());
}

// =============================================================================
// Admin
// =============================================================================

#[tokio::test]
async fn test_admin_requires_admin_account() {
    let (_mock, state) = app().await;
    let anonymous = state.new_store();
    assert!(matches!(
        state.admin().list_products(&anonymous).await,
        Err(AdminError::NotSignedIn)
    ));

    let mut shopper = state.new_store();
    state
        .auth()
        .register(&mut shopper, &registration("grace@example.com"))
        .await
        .unwrap();
    assert!(matches!(
        state.admin().list_users(&shopper).await,
        Err(AdminError::Forbidden(_))
    ));
}

#[tokio::test]
async fn test_admin_product_lifecycle() {
    let (_mock, state) = app().await;
    let session = signed_in_admin(&state).await;
    let admin = state.admin();

    let lamp = admin
        .create_product(
            &session,
            &ProductDraft {
                title: "Desk lamp".to_string(),
                price: "24.99".to_string(),
                category: "lighting".to_string(),
                ..ProductDraft::default()
            },
        )
        .await
        .unwrap();
    admin
        .create_product(
            &session,
            &ProductDraft {
                title: "Mystery box".to_string(),
                price: "5".to_string(),
                ..ProductDraft::default()
            },
        )
        .await
        .unwrap();

    let lamp_id = lamp.id.to_string();
    let updated = admin
        .update_product(
            &session,
            &lamp_id,
            &ProductDraft {
                title: "Desk lamp".to_string(),
                price: "19.99".to_string(),
                category: "lighting".to_string(),
                ..ProductDraft::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.price.amount(), dec!(19.99));

    let groups = admin.grouped_products(&session).await.unwrap();
    let names: Vec<_> = groups.iter().map(|g| g.category.as_str()).collect();
    assert_eq!(groups.len(), 2);
    assert!(names.contains(&"lighting"));
    assert!(names.contains(&"Uncategorized"));

    admin.delete_product(&session, &lamp_id).await.unwrap();
    assert_eq!(admin.list_products(&session).await.unwrap().len(), 1);

    let missing = admin
        .update_product(
            &session,
            &lamp_id,
            &ProductDraft {
                title: "Desk lamp".to_string(),
                price: "1".to_string(),
                ..ProductDraft::default()
            },
        )
        .await;
    assert!(matches!(missing, Err(AdminError::NotFound(_))));
}

#[tokio::test]
async fn test_admin_rejects_invalid_draft() {
    let (_mock, state) = app().await;
    let session = signed_in_admin(&state).await;

    let result = state
        .admin()
        .create_product(
            &session,
            &ProductDraft {
                title: "  ".to_string(),
                price: "free".to_string(),
                ..ProductDraft::default()
            },
        )
        .await;

    let Err(AdminError::Validation(errors)) = result else {
        panic!("expected validation errors");
    };
    assert!(errors.get("title").is_some());
    assert!(errors.get("price").is_some());
}

#[tokio::test]
async fn test_admin_user_upsert_keeps_registration_fields() {
    let (_mock, state) = app().await;
    let session = signed_in_admin(&state).await;

    let mut shopper = state.new_store();
    state
        .auth()
        .register(&mut shopper, &registration("grace@example.com"))
        .await
        .unwrap();

    let saved = state
        .admin()
        .save_user(
            &session,
            &UserDraft {
                email: "grace@example.com".to_string(),
                display_name: "Amazing Grace".to_string(),
                photo: String::new(),
            },
        )
        .await
        .unwrap();
    assert_eq!(saved.display_name.as_deref(), Some("Amazing Grace"));
    assert_eq!(saved.first_name.as_deref(), Some("Grace"));

    let users = state.admin().list_users(&session).await.unwrap();
    assert_eq!(users.len(), 2);

    state
        .admin()
        .delete_user(&session, "grace@example.com")
        .await
        .unwrap();
    let users = state.admin().list_users(&session).await.unwrap();
    assert_eq!(users.len(), 1);
}
