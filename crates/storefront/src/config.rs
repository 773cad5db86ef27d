//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `BAZAAR_CATALOG_URL` - Catalog service base URL (default: <https://fakestoreapi.com>)
//! - `BAZAAR_CATALOG_CACHE_TTL_SECS` - Catalog response cache TTL (default: 300)
//! - `BAZAAR_CATALOG_CACHE_CAPACITY` - Max cached catalog responses (default: 1000)
//! - `BAZAAR_EVENT_CAPACITY` - Store event channel buffer per subscriber (default: 64)
//! - `BAZAAR_ADMIN_EMAIL` - Account allowed into the admin panel (default: admin@example.com)
//! - `FIREBASE_API_KEY` - Firebase web API key; enables the Firebase backend
//! - `FIREBASE_PROJECT_ID` - Firebase project id (required with `FIREBASE_API_KEY`)
//! - `FIREBASE_AUTH_URL` - Identity Toolkit base URL (default: Google's; set for the emulator)
//! - `FIRESTORE_URL` - Firestore REST base URL (default: Google's; set for the emulator)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//!
//! Without `FIREBASE_API_KEY` the storefront runs against the in-memory
//! backend.

use std::collections::HashMap;
use std::time::Duration;

use bazaar_core::Email;
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_CATALOG_URL: &str = "https://fakestoreapi.com";
const DEFAULT_AUTH_URL: &str = "https://identitytoolkit.googleapis.com/v1";
const DEFAULT_FIRESTORE_URL: &str = "https://firestore.googleapis.com/v1";
const DEFAULT_ADMIN_EMAIL: &str = "admin@example.com";
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "insert",
    "put-your",
    "api-key",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Catalog service configuration
    pub catalog: CatalogConfig,
    /// Firebase backend; `None` selects the in-memory backend
    pub firebase: Option<FirebaseConfig>,
    /// The one account allowed into the admin panel
    pub admin_email: Email,
    /// Buffered store events per subscriber before it starts lagging
    pub event_capacity: usize,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Catalog service configuration.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Base URL; paths such as `/products` are appended to it
    pub base_url: Url,
    /// How long a fetched response is served from cache
    pub cache_ttl: Duration,
    /// Maximum number of cached responses
    pub cache_capacity: u64,
}

impl CatalogConfig {
    /// Catalog configuration with default cache settings.
    #[must_use]
    pub const fn new(base_url: Url) -> Self {
        Self {
            base_url,
            cache_ttl: Duration::from_secs(300),
            cache_capacity: 1000,
        }
    }
}

/// Firebase Auth + Firestore configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct FirebaseConfig {
    /// Web API key, passed as `?key=` to Identity Toolkit
    pub api_key: SecretString,
    /// Project id, part of every Firestore document path
    pub project_id: String,
    /// Identity Toolkit base URL
    pub auth_url: Url,
    /// Firestore REST base URL
    pub firestore_url: Url,
}

impl std::fmt::Debug for FirebaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirebaseConfig")
            .field("api_key", &"[REDACTED]")
            .field("project_id", &self.project_id)
            .field("auth_url", &self.auth_url.as_str())
            .field("firestore_url", &self.firestore_url.as_str())
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is invalid, if only half of the
    /// Firebase pair is set, or if the API key looks like a placeholder.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// See [`StorefrontConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(&lookup);

        let catalog = CatalogConfig {
            base_url: env.url("BAZAAR_CATALOG_URL", DEFAULT_CATALOG_URL)?,
            cache_ttl: Duration::from_secs(env.parsed("BAZAAR_CATALOG_CACHE_TTL_SECS", 300)?),
            cache_capacity: env.parsed("BAZAAR_CATALOG_CACHE_CAPACITY", 1000)?,
        };

        let firebase = match (env.optional("FIREBASE_API_KEY"), env.optional("FIREBASE_PROJECT_ID")) {
            (Some(api_key), Some(project_id)) => {
                validate_secret_strength(&api_key, "FIREBASE_API_KEY")?;
                Some(FirebaseConfig {
                    api_key: SecretString::from(api_key),
                    project_id,
                    auth_url: env.url("FIREBASE_AUTH_URL", DEFAULT_AUTH_URL)?,
                    firestore_url: env.url("FIRESTORE_URL", DEFAULT_FIRESTORE_URL)?,
                })
            }
            (Some(_), None) => {
                return Err(ConfigError::MissingEnvVar("FIREBASE_PROJECT_ID".to_string()));
            }
            (None, Some(_)) => {
                return Err(ConfigError::MissingEnvVar("FIREBASE_API_KEY".to_string()));
            }
            (None, None) => None,
        };

        let admin_email = env.or_default("BAZAAR_ADMIN_EMAIL", DEFAULT_ADMIN_EMAIL);
        let admin_email = Email::parse(&admin_email).map_err(|e| {
            ConfigError::InvalidEnvVar("BAZAAR_ADMIN_EMAIL".to_string(), e.to_string())
        })?;

        let event_capacity: usize = env.parsed("BAZAAR_EVENT_CAPACITY", 64)?;
        if event_capacity == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "BAZAAR_EVENT_CAPACITY".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            catalog,
            firebase,
            admin_email,
            event_capacity,
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
        })
    }

    /// Configuration pointing at `catalog_url` with every other setting at
    /// its default and the in-memory backend.
    #[must_use]
    pub fn with_catalog(catalog_url: Url) -> Self {
        Self {
            catalog: CatalogConfig::new(catalog_url),
            firebase: None,
            admin_email: default_admin_email(),
            event_capacity: 64,
            sentry_dsn: None,
            sentry_environment: None,
        }
    }
}

#[allow(clippy::expect_used)] // Constant input
fn default_admin_email() -> Email {
    Email::parse(DEFAULT_ADMIN_EMAIL).expect("default admin email is valid")
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Typed access to a variable source.
struct Env<'a, F: Fn(&str) -> Option<String>>(&'a F);

impl<F: Fn(&str) -> Option<String>> Env<'_, F> {
    /// Get an optional variable; blank values count as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    /// Parse a variable, falling back to `default` when unset.
    fn parsed<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        self.optional(key).map_or(Ok(default), |value| {
            value
                .trim()
                .parse()
                .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
    }

    /// Parse a URL variable, falling back to `default` when unset.
    fn url(&self, key: &str, default: &str) -> Result<Url, ConfigError> {
        let value = self.or_default(key, default);
        Url::parse(value.trim_end_matches('/'))
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    }
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("appears to be a placeholder (contains '{pattern}')"),
        ));
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1})"
            ),
        ));
    }

    Ok(())
}
