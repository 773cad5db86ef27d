//! Authentication error types.

use bazaar_core::EmailError;
use bazaar_core::forms::FieldErrors;
use thiserror::Error;

use crate::backend::BackendError;

/// Errors that can occur during authentication and profile operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Form fields failed validation.
    #[error("{0}")]
    Validation(#[from] FieldErrors),

    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Invalid credentials (wrong password or unknown email).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// User already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// The operation needs a signed-in user.
    #[error("not signed in")]
    NotSignedIn,

    /// Profile photo over the size limit.
    #[error("photo is {size} bytes; the limit is {max} bytes")]
    PhotoTooLarge { size: usize, max: usize },

    /// Profile photo is not an image.
    #[error("unsupported photo type: {0}")]
    UnsupportedPhoto(String),

    /// Stored profile document does not decode.
    #[error("invalid profile document: {0}")]
    Profile(#[from] serde_json::Error),

    /// Backend request failed.
    #[error("backend error: {0}")]
    Backend(BackendError),
}

impl From<BackendError> for AuthError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::AccountExists => Self::UserAlreadyExists,
            BackendError::InvalidCredentials => Self::InvalidCredentials,
            BackendError::WeakPassword(detail) => Self::WeakPassword(detail),
            BackendError::Unauthenticated => Self::NotSignedIn,
            other => Self::Backend(other),
        }
    }
}
