//! Admin panel commands.
//!
//! # Usage
//!
//! ```bash
//! # Products grouped by category
//! bazaar admin -e admin@example.com -p '...' products
//!
//! # Add a product
//! bazaar admin -e admin@example.com add-product -t "Desk lamp" -p 24.99 -c lighting
//!
//! # Create or update a user with a photo
//! bazaar admin -e admin@example.com save-user -e ada@example.com -n "Ada" --photo ada.png
//! ```
//!
//! # Environment Variables
//!
//! - `BAZAAR_ADMIN_PASSWORD` - Password used when `--password` is omitted

use std::path::Path;

use bazaar_core::forms::{ProductDraft, UserDraft};
use bazaar_storefront::error::Result;
use bazaar_storefront::services::auth::ProfilePhoto;
use bazaar_storefront::{AppError, AppState, Store};
use secrecy::SecretString;

use super::print_products;

/// Sign in and return a store holding the admin session.
pub async fn sign_in(state: &AppState, email: &str, password: String) -> Result<Store> {
    let mut store = state.new_store();
    let password = SecretString::from(password);
    state.auth().login(&mut store, email, &password).await?;
    Ok(store)
}

pub async fn list_products(state: &AppState, session: &Store) -> Result<()> {
    let groups = state.admin().grouped_products(session).await?;
    if groups.is_empty() {
        println!("No products yet.");
    }
    for group in groups {
        println!("{} ({})", group.category, group.products.len());
        print_products(&group.products);
        println!();
    }
    Ok(())
}

pub async fn add_product(state: &AppState, session: &Store, draft: ProductDraft) -> Result<()> {
    let product = state.admin().create_product(session, &draft).await?;
    println!("Added product {}", product.id);
    Ok(())
}

pub async fn update_product(
    state: &AppState,
    session: &Store,
    id: &str,
    draft: ProductDraft,
) -> Result<()> {
    let product = state.admin().update_product(session, id, &draft).await?;
    println!("Updated product {}", product.id);
    Ok(())
}

pub async fn delete_product(state: &AppState, session: &Store, id: &str) -> Result<()> {
    state.admin().delete_product(session, id).await?;
    println!("Deleted product {id}");
    Ok(())
}

pub async fn list_users(state: &AppState, session: &Store) -> Result<()> {
    let users = state.admin().list_users(session).await?;
    if users.is_empty() {
        println!("No users yet.");
    }
    for user in users {
        let name = user.display_name.as_deref().unwrap_or("");
        let photo = if user.photo.as_deref().is_some_and(|p| !p.is_empty()) {
            "  [photo]"
        } else {
            ""
        };
        println!("{}  {name}{photo}", user.email);
    }
    Ok(())
}

/// Create or update a user, reading the photo from a file.
pub async fn save_user(
    state: &AppState,
    session: &Store,
    email: String,
    display_name: String,
    photo: Option<&Path>,
) -> Result<()> {
    let photo = match photo {
        Some(path) => read_photo(path).await?.into_inner(),
        None => String::new(),
    };
    let draft = UserDraft {
        email,
        display_name,
        photo,
    };
    let profile = state.admin().save_user(session, &draft).await?;
    println!("Saved user {}", profile.email);
    Ok(())
}

pub async fn delete_user(state: &AppState, session: &Store, email: &str) -> Result<()> {
    state.admin().delete_user(session, email).await?;
    println!("Deleted user {email}");
    Ok(())
}

/// Read an image file as a profile photo.
pub async fn read_photo(path: &Path) -> Result<ProfilePhoto> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| AppError::BadRequest(format!("cannot read {}: {e}", path.display())))?;
    Ok(ProfilePhoto::from_bytes(
        ProfilePhoto::content_type_for(path),
        &bytes,
    )?)
}
