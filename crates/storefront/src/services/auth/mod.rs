//! Authentication service.
//!
//! Email/password accounts through an [`IdentityProvider`], with a profile
//! document per user in the `users` collection keyed by email.

mod error;
mod photo;

pub use error::AuthError;
pub use photo::{MAX_PHOTO_BYTES, ProfilePhoto};

use bazaar_core::forms::RegistrationForm;
use bazaar_core::{AuthUser, Email, UserProfile};
use chrono::Utc;
use secrecy::SecretString;
use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::backend::{Document, DocumentStore, Fields, IdentityProvider, USERS_COLLECTION};
use crate::error::{clear_sentry_user, set_sentry_user};
use crate::store::Store;

/// Fields a shopper can change on their own profile.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub display_name: String,
    /// New photo; `None` removes the current one.
    pub photo: Option<ProfilePhoto>,
}

/// Authentication service.
///
/// Handles registration, sign-in and the signed-in user's profile. Every
/// operation records its outcome in the [`Store`]'s auth state.
pub struct AuthService<'a> {
    identity: &'a dyn IdentityProvider,
    documents: &'a dyn DocumentStore,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(identity: &'a dyn IdentityProvider, documents: &'a dyn DocumentStore) -> Self {
        Self {
            identity,
            documents,
        }
    }

    // =========================================================================
    // Sign-up / sign-in
    // =========================================================================

    /// Register a new account and sign it in.
    ///
    /// Writes the registration fields to the user's profile document.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` for an invalid form.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    #[instrument(skip(self, store, form), fields(email = %form.email))]
    pub async fn register(
        &self,
        store: &mut Store,
        form: &RegistrationForm,
    ) -> Result<AuthUser, AuthError> {
        let email = form.validate()?;
        store.set_auth_loading(true);

        let result = async {
            let password = SecretString::from(form.password.clone());
            let session = self.identity.create_account(&email, &password).await?;

            let first_name = form.first_name.trim().to_string();
            let last_name = form.last_name.trim().to_string();
            let mut profile = UserProfile::new(session.email.clone());
            profile.uid = Some(session.uid.clone());
            profile.display_name = Some(format!("{first_name} {last_name}"));
            profile.first_name = Some(first_name);
            profile.last_name = Some(last_name);
            profile.gender = non_blank(&form.gender);
            profile.dob = non_blank(&form.dob);
            profile.updated_at = Some(Utc::now());

            self.documents
                .set(USERS_COLLECTION, session.email.as_str(), profile_fields(&profile)?, true)
                .await?;

            Ok::<_, AuthError>((session, profile))
        }
        .await;

        match result {
            Ok((session, profile)) => {
                let user = user_from_profile(session.uid.clone(), &profile);
                info!(uid = %user.uid, "Account registered");
                set_sentry_user(&user.uid, Some(user.email.as_str()));
                store.set_user(user.clone(), Some(session));
                Ok(user)
            }
            Err(e) => {
                store.set_auth_error(e.to_string());
                Err(e)
            }
        }
    }

    /// Sign in with email and password.
    ///
    /// The user's display name and photo come from their profile document
    /// when one exists.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` for an unknown email or wrong password.
    #[instrument(skip(self, store, password))]
    pub async fn login(
        &self,
        store: &mut Store,
        email: &str,
        password: &SecretString,
    ) -> Result<AuthUser, AuthError> {
        let email = Email::parse(email)?;
        store.set_auth_loading(true);

        let result = async {
            let session = self.identity.sign_in(&email, password).await?;
            let profile = self.fetch_profile(&session.email).await?;
            Ok::<_, AuthError>((session, profile))
        }
        .await;

        match result {
            Ok((session, profile)) => {
                let user = match profile {
                    Some(profile) => user_from_profile(session.uid.clone(), &profile),
                    None => AuthUser {
                        uid: session.uid.clone(),
                        email: session.email.clone(),
                        display_name: None,
                        photo: None,
                    },
                };
                info!(uid = %user.uid, "User signed in");
                set_sentry_user(&user.uid, Some(user.email.as_str()));
                store.set_user(user.clone(), Some(session));
                Ok(user)
            }
            Err(e) => {
                warn!(error = %e, "Sign-in failed");
                store.set_auth_error(e.to_string());
                Err(e)
            }
        }
    }

    /// Sign out. Cart and wishlist are kept.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider rejects the sign-out; the local
    /// auth state is cleared regardless.
    #[instrument(skip(self, store))]
    pub async fn logout(&self, store: &mut Store) -> Result<(), AuthError> {
        let session = store.auth().session().cloned();
        store.logout();
        clear_sentry_user();

        if let Some(session) = session {
            self.identity.sign_out(&session).await?;
        }
        Ok(())
    }

    // =========================================================================
    // Profile
    // =========================================================================

    /// Load the signed-in user's profile. A user without a profile document
    /// gets an empty one.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotSignedIn` without a signed-in user.
    #[instrument(skip(self, store))]
    pub async fn load_profile(&self, store: &Store) -> Result<UserProfile, AuthError> {
        let user = store.auth().user().ok_or(AuthError::NotSignedIn)?;
        let profile = self.fetch_profile(&user.email).await?.unwrap_or_else(|| {
            let mut profile = UserProfile::new(user.email.clone());
            profile.uid = Some(user.uid.clone());
            profile
        });
        Ok(profile)
    }

    /// Update the signed-in user's display name and photo.
    ///
    /// Merges into the profile document, leaving registration fields as they
    /// were, then refreshes the user in the store.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotSignedIn` without a signed-in user.
    #[instrument(skip(self, store, update))]
    pub async fn update_profile(
        &self,
        store: &mut Store,
        update: ProfileUpdate,
    ) -> Result<UserProfile, AuthError> {
        let user = store.auth().user().cloned().ok_or(AuthError::NotSignedIn)?;

        let photo = update.photo.map(ProfilePhoto::into_inner);
        let mut fields = Fields::new();
        fields.insert(
            "displayName".to_string(),
            Value::String(update.display_name.trim().to_string()),
        );
        fields.insert(
            "photo".to_string(),
            photo.clone().map_or(Value::Null, Value::String),
        );
        fields.insert("email".to_string(), Value::String(user.email.to_string()));
        fields.insert("uid".to_string(), Value::String(user.uid.clone()));
        fields.insert(
            "updatedAt".to_string(),
            Value::String(Utc::now().to_rfc3339()),
        );

        let doc = self
            .documents
            .set(USERS_COLLECTION, user.email.as_str(), fields, true)
            .await?;
        let profile = profile_from_document(doc)?;

        store.set_user(user_from_profile(user.uid, &profile), None);
        info!("Profile updated");
        Ok(profile)
    }

    async fn fetch_profile(&self, email: &Email) -> Result<Option<UserProfile>, AuthError> {
        self.documents
            .get(USERS_COLLECTION, email.as_str())
            .await?
            .map(profile_from_document)
            .transpose()
    }
}

fn non_blank(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

fn user_from_profile(uid: String, profile: &UserProfile) -> AuthUser {
    AuthUser {
        uid,
        email: profile.email.clone(),
        display_name: profile.display_name.clone().filter(|n| !n.is_empty()),
        photo: profile.photo.clone().filter(|p| !p.is_empty()),
    }
}

/// Encode a profile as document fields.
pub(crate) fn profile_fields(profile: &UserProfile) -> Result<Fields, AuthError> {
    match serde_json::to_value(profile)? {
        Value::Object(fields) => Ok(fields),
        _ => Ok(Fields::new()),
    }
}

/// Decode a `users` document. The document id stands in for a missing
/// `email` field.
pub(crate) fn profile_from_document(doc: Document) -> Result<UserProfile, AuthError> {
    let mut fields = doc.fields;
    fields
        .entry("email")
        .or_insert_with(|| Value::String(doc.id.clone()));
    Ok(serde_json::from_value(Value::Object(fields))?)
}
