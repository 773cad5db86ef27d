//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type for consumers of the storefront. Call
//! [`AppError::report`] where an error ends its journey: it logs the error
//! and sends failures of the storefront itself (as opposed to shopper
//! mistakes) to Sentry.

use thiserror::Error;

use crate::backend::BackendError;
use crate::catalog::CatalogError;
use crate::config::ConfigError;
use crate::services::admin::AdminError;
use crate::services::auth::AuthError;
use crate::services::checkout::CheckoutError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Catalog service request failed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Identity or document store request failed.
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Checkout was refused.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Admin operation failed.
    #[error("Admin error: {0}")]
    Admin(#[from] AdminError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad input from the user.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether this error is a fault of the storefront or its services
    /// rather than of the shopper's input.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        match self {
            Self::Config(_) | Self::Internal(_) => true,
            Self::Catalog(err) => !matches!(err, CatalogError::NotFound(_)),
            Self::Backend(err)
            | Self::Auth(AuthError::Backend(err))
            | Self::Admin(AdminError::Backend(err)) => is_backend_fault(err),
            Self::Auth(AuthError::Profile(_)) | Self::Admin(AdminError::InvalidDocument { .. }) => {
                true
            }
            Self::Auth(_)
            | Self::Checkout(_)
            | Self::Admin(_)
            | Self::NotFound(_)
            | Self::BadRequest(_) => false,
        }
    }

    /// Log the error, capturing server-side errors to Sentry.
    pub fn report(&self) {
        if self.is_server_error() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Storefront error"
            );
        } else {
            tracing::warn!(error = %self, "Request refused");
        }
    }

    /// A message safe to show the shopper.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Config(_) | Self::Internal(_) => "Internal error".to_string(),
            Self::Catalog(CatalogError::NotFound(msg)) => msg.clone(),
            Self::Catalog(_) => "The catalog is unavailable, please try again".to_string(),
            Self::Backend(_) => "External service error".to_string(),
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => "Invalid email or password".to_string(),
                AuthError::UserAlreadyExists => {
                    "An account with this email already exists".to_string()
                }
                AuthError::WeakPassword(msg) => msg.clone(),
                AuthError::InvalidEmail(_) => "Invalid email address".to_string(),
                AuthError::NotSignedIn => "Please sign in first".to_string(),
                AuthError::Backend(_) | AuthError::Profile(_) => {
                    "Authentication error".to_string()
                }
                other => other.to_string(),
            },
            Self::Admin(AdminError::Backend(_) | AdminError::InvalidDocument { .. }) => {
                "External service error".to_string()
            }
            Self::Checkout(err) => err.to_string(),
            Self::Admin(err) => err.to_string(),
            Self::NotFound(_) | Self::BadRequest(_) => self.to_string(),
        }
    }
}

const fn is_backend_fault(err: &BackendError) -> bool {
    !matches!(
        err,
        BackendError::AccountExists
            | BackendError::InvalidCredentials
            | BackendError::WeakPassword(_)
            | BackendError::Unauthenticated
            | BackendError::NotFound(_)
    )
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added to cart", Some(&[("product_id", "3")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
