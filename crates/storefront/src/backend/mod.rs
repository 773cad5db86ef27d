//! Identity and document store backends.
//!
//! The storefront talks to its backend-as-a-service through two ports:
//!
//! - [`IdentityProvider`] - email/password accounts
//! - [`DocumentStore`] - JSON documents grouped in collections
//!
//! # Adapters
//!
//! - [`FirebaseClient`] - Firebase Auth (Identity Toolkit) and Firestore over REST
//! - [`MemoryBackend`] - in-process maps, for offline use and tests
//!
//! Cart and wishlist state never goes through these ports; only user
//! profiles and admin-managed products and users are stored.

mod firebase;
mod firestore_value;
mod memory;

pub use firebase::FirebaseClient;
pub use memory::MemoryBackend;

use async_trait::async_trait;
use bazaar_core::Email;
use secrecy::SecretString;
use thiserror::Error;

/// Document fields: a JSON object.
pub type Fields = serde_json::Map<String, serde_json::Value>;

/// Collection holding user profiles, keyed by email.
pub const USERS_COLLECTION: &str = "users";
/// Collection holding admin-managed products, keyed by generated id.
pub const PRODUCTS_COLLECTION: &str = "products";

/// Errors that can occur when talking to a backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Sign-up with an email that already has an account.
    #[error("An account with this email already exists")]
    AccountExists,

    /// Unknown email or wrong password.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Password rejected by the provider.
    #[error("Weak password: {0}")]
    WeakPassword(String),

    /// The request needs a signed-in user.
    #[error("Not signed in")]
    Unauthenticated,

    /// Security rules refused the request.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Document or collection not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A document could not be encoded or decoded.
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// Any other error reported by the backend.
    #[error("Backend returned HTTP {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Provider error code or message.
        message: String,
    },

    /// A configured URL cannot have paths appended.
    #[error("Invalid backend URL: {0}")]
    InvalidUrl(String),
}

/// A signed-in account.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone)]
pub struct AuthSession {
    /// Provider account id.
    pub uid: String,
    /// Account email.
    pub email: Email,
    /// Bearer token for document requests.
    pub id_token: SecretString,
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("uid", &self.uid)
            .field("email", &self.email)
            .field("id_token", &"[REDACTED]")
            .finish()
    }
}

/// A stored document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Document id within its collection.
    pub id: String,
    pub fields: Fields,
}

/// Email/password account management.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create an account and sign it in.
    async fn create_account(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<AuthSession, BackendError>;

    /// Sign in to an existing account.
    async fn sign_in(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<AuthSession, BackendError>;

    /// End the session. Later document requests are anonymous.
    async fn sign_out(&self, session: &AuthSession) -> Result<(), BackendError>;
}

/// Keyed JSON documents grouped in collections.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch one document; `None` if it does not exist.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, BackendError>;

    /// Every document in a collection, ordered by id.
    async fn list(&self, collection: &str) -> Result<Vec<Document>, BackendError>;

    /// Store a new document under a backend-assigned id.
    async fn create(&self, collection: &str, fields: Fields) -> Result<Document, BackendError>;

    /// Write a document under `id`, creating it if needed. With `merge`,
    /// only the given fields are overwritten; otherwise the document is
    /// replaced.
    async fn set(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
        merge: bool,
    ) -> Result<Document, BackendError>;

    /// Delete a document. Deleting a missing document is not an error.
    async fn delete(&self, collection: &str, id: &str) -> Result<(), BackendError>;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_display() {
        assert_eq!(
            BackendError::InvalidCredentials.to_string(),
            "Invalid email or password"
        );
        let err = BackendError::Api {
            status: 500,
            message: "INTERNAL".to_string(),
        };
        assert_eq!(err.to_string(), "Backend returned HTTP 500: INTERNAL");
    }

    #[test]
    fn test_session_debug_redacts_token() {
        let session = AuthSession {
            uid: "u1".to_string(),
            email: Email::parse("a@b.co").unwrap(),
            id_token: SecretString::from("eyJhbGciOi.secret"),
        };
        let debug = format!("{session:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("secret"));
    }
}
