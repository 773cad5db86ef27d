//! Firebase Auth and Firestore over REST.

use std::sync::Arc;

use async_trait::async_trait;
use bazaar_core::Email;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};
use url::Url;

use super::firestore_value::{decode_fields, encode_fields};
use super::{AuthSession, BackendError, Document, DocumentStore, Fields, IdentityProvider};
use crate::config::FirebaseConfig;

/// Firestore page size for collection listings.
const LIST_PAGE_SIZE: &str = "300";

/// Client for a Firebase project.
///
/// Implements both [`IdentityProvider`] and [`DocumentStore`]. The token of
/// the most recent sign-in is attached to Firestore requests until
/// sign-out. Cheap to clone; clones share the session.
#[derive(Clone)]
pub struct FirebaseClient {
    inner: Arc<FirebaseClientInner>,
}

struct FirebaseClientInner {
    client: reqwest::Client,
    config: FirebaseConfig,
    id_token: RwLock<Option<SecretString>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthResponse {
    local_id: String,
    email: String,
    id_token: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FirestoreDocument {
    name: String,
    #[serde(default)]
    fields: serde_json::Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    #[serde(default)]
    documents: Vec<FirestoreDocument>,
    next_page_token: Option<String>,
}

impl FirebaseClient {
    /// Create a client for the configured project.
    #[must_use]
    pub fn new(config: FirebaseConfig) -> Self {
        Self {
            inner: Arc::new(FirebaseClientInner {
                client: reqwest::Client::new(),
                config,
                id_token: RwLock::new(None),
            }),
        }
    }

    // =========================================================================
    // URLs
    // =========================================================================

    /// `{auth_url}/accounts:{action}?key={api_key}`
    fn auth_url(&self, action: &str) -> Result<Url, BackendError> {
        let base = &self.inner.config.auth_url;
        let mut url = base.clone();
        url.path_segments_mut()
            .map_err(|()| BackendError::InvalidUrl(base.to_string()))?
            .pop_if_empty()
            .push(&format!("accounts:{action}"));
        url.query_pairs_mut()
            .append_pair("key", self.inner.config.api_key.expose_secret());
        Ok(url)
    }

    /// `{firestore_url}/projects/{project}/databases/(default)/documents/{path...}`
    fn document_url(&self, path: &[&str]) -> Result<Url, BackendError> {
        let base = &self.inner.config.firestore_url;
        let mut url = base.clone();
        url.path_segments_mut()
            .map_err(|()| BackendError::InvalidUrl(base.to_string()))?
            .pop_if_empty()
            .extend([
                "projects",
                self.inner.config.project_id.as_str(),
                "databases",
                "(default)",
                "documents",
            ])
            .extend(path);
        Ok(url)
    }

    // =========================================================================
    // Requests
    // =========================================================================

    async fn authorized(&self, method: Method, url: Url) -> RequestBuilder {
        let request = self.inner.client.request(method, url);
        match self.inner.id_token.read().await.as_ref() {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        }
    }

    /// Turn a non-success response into a [`BackendError`].
    async fn error_from(response: Response) -> BackendError {
        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return BackendError::Http(e),
        };
        let error = serde_json::from_str::<ErrorEnvelope>(&body).map_or_else(
            |_| ErrorBody {
                message: body.chars().take(200).collect(),
                status: None,
            },
            |envelope| envelope.error,
        );
        map_error(status, error)
    }

    async fn authenticate(
        &self,
        action: &str,
        email: &Email,
        password: &SecretString,
    ) -> Result<AuthSession, BackendError> {
        let url = self.auth_url(action)?;
        let response = self
            .inner
            .client
            .post(url)
            .json(&json!({
                "email": email.as_str(),
                "password": password.expose_secret(),
                "returnSecureToken": true,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        let auth: AuthResponse = response.json().await?;
        let email = Email::parse(&auth.email)
            .map_err(|e| BackendError::InvalidDocument(format!("account email: {e}")))?;
        let id_token = SecretString::from(auth.id_token);

        *self.inner.id_token.write().await = Some(id_token.clone());

        Ok(AuthSession {
            uid: auth.local_id,
            email,
            id_token,
        })
    }

    async fn write_document(
        &self,
        method: Method,
        url: Url,
        fields: &Fields,
    ) -> Result<Document, BackendError> {
        let response = self
            .authorized(method, url)
            .await
            .json(&json!({ "fields": encode_fields(fields) }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        let doc: FirestoreDocument = response.json().await?;
        into_document(doc)
    }
}

/// Map a provider error code to a [`BackendError`].
///
/// Identity Toolkit puts its code in `message`, optionally followed by
/// `" : detail"`. Firestore uses canonical codes in `status`.
fn map_error(status: StatusCode, error: ErrorBody) -> BackendError {
    let (code, detail) = error
        .message
        .split_once(" : ")
        .unwrap_or((error.message.as_str(), ""));

    match code {
        "EMAIL_EXISTS" => return BackendError::AccountExists,
        "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" | "USER_DISABLED" => {
            return BackendError::InvalidCredentials;
        }
        "WEAK_PASSWORD" => return BackendError::WeakPassword(detail.to_string()),
        _ => {}
    }

    match error.status.as_deref() {
        Some("PERMISSION_DENIED") => BackendError::PermissionDenied(error.message),
        Some("UNAUTHENTICATED") => BackendError::Unauthenticated,
        Some("NOT_FOUND") => BackendError::NotFound(error.message),
        _ => BackendError::Api {
            status: status.as_u16(),
            message: error.message,
        },
    }
}

fn into_document(doc: FirestoreDocument) -> Result<Document, BackendError> {
    let id = doc
        .name
        .rsplit('/')
        .next()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| BackendError::InvalidDocument(format!("document name: {}", doc.name)))?
        .to_string();
    Ok(Document {
        id,
        fields: decode_fields(&doc.fields)?,
    })
}

#[async_trait]
impl IdentityProvider for FirebaseClient {
    #[instrument(skip(self, password), fields(email = %email))]
    async fn create_account(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<AuthSession, BackendError> {
        self.authenticate("signUp", email, password).await
    }

    #[instrument(skip(self, password), fields(email = %email))]
    async fn sign_in(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<AuthSession, BackendError> {
        self.authenticate("signInWithPassword", email, password).await
    }

    #[instrument(skip(self, session), fields(uid = %session.uid))]
    async fn sign_out(&self, session: &AuthSession) -> Result<(), BackendError> {
        // ID tokens are stateless; dropping ours is the whole sign-out
        *self.inner.id_token.write().await = None;
        debug!("Cleared Firebase session");
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for FirebaseClient {
    #[instrument(skip(self))]
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, BackendError> {
        let url = self.document_url(&[collection, id])?;
        let response = self.authorized(Method::GET, url).await.send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        let doc: FirestoreDocument = response.json().await?;
        into_document(doc).map(Some)
    }

    #[instrument(skip(self))]
    async fn list(&self, collection: &str) -> Result<Vec<Document>, BackendError> {
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = self.document_url(&[collection])?;
            {
                let mut query = url.query_pairs_mut();
                query.append_pair("pageSize", LIST_PAGE_SIZE);
                if let Some(token) = &page_token {
                    query.append_pair("pageToken", token);
                }
            }

            let response = self.authorized(Method::GET, url).await.send().await?;
            if !response.status().is_success() {
                return Err(Self::error_from(response).await);
            }

            let page: ListResponse = response.json().await?;
            for doc in page.documents {
                documents.push(into_document(doc)?);
            }

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        debug!(count = documents.len(), "Listed documents");
        Ok(documents)
    }

    #[instrument(skip(self, fields))]
    async fn create(&self, collection: &str, fields: Fields) -> Result<Document, BackendError> {
        let url = self.document_url(&[collection])?;
        self.write_document(Method::POST, url, &fields).await
    }

    #[instrument(skip(self, fields))]
    async fn set(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
        merge: bool,
    ) -> Result<Document, BackendError> {
        let mut url = self.document_url(&[collection, id])?;
        if merge {
            let mut query = url.query_pairs_mut();
            for key in fields.keys() {
                query.append_pair("updateMask.fieldPaths", key);
            }
        }
        self.write_document(Method::PATCH, url, &fields).await
    }

    #[instrument(skip(self))]
    async fn delete(&self, collection: &str, id: &str) -> Result<(), BackendError> {
        let url = self.document_url(&[collection, id])?;
        let response = self.authorized(Method::DELETE, url).await.send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            warn!("Deleted document did not exist");
            return Ok(());
        }
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client() -> FirebaseClient {
        FirebaseClient::new(FirebaseConfig {
            api_key: SecretString::from("AIzaSyD-k3yForT3sting0nly"),
            project_id: "bazaar-demo".to_string(),
            auth_url: Url::parse("https://identitytoolkit.googleapis.com/v1").unwrap(),
            firestore_url: Url::parse("https://firestore.googleapis.com/v1").unwrap(),
        })
    }

    fn body(message: &str, status: Option<&str>) -> ErrorBody {
        ErrorBody {
            message: message.to_string(),
            status: status.map(str::to_string),
        }
    }

    #[test]
    fn test_auth_url() {
        let url = client().auth_url("signInWithPassword").unwrap();
        assert_eq!(
            url.as_str(),
            "https://identitytoolkit.googleapis.com/v1/accounts:signInWithPassword?key=AIzaSyD-k3yForT3sting0nly"
        );
    }

    #[test]
    fn test_document_url() {
        let url = client().document_url(&["users", "ada@example.com"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://firestore.googleapis.com/v1/projects/bazaar-demo/databases/(default)/documents/users/ada@example.com"
        );
    }

    #[test]
    fn test_map_identity_errors() {
        assert!(matches!(
            map_error(StatusCode::BAD_REQUEST, body("EMAIL_EXISTS", None)),
            BackendError::AccountExists
        ));
        assert!(matches!(
            map_error(StatusCode::BAD_REQUEST, body("INVALID_LOGIN_CREDENTIALS", None)),
            BackendError::InvalidCredentials
        ));
        let weak = map_error(
            StatusCode::BAD_REQUEST,
            body("WEAK_PASSWORD : Password should be at least 6 characters", None),
        );
        assert!(
            matches!(weak, BackendError::WeakPassword(ref d) if d == "Password should be at least 6 characters")
        );
    }

    #[test]
    fn test_map_firestore_errors() {
        assert!(matches!(
            map_error(
                StatusCode::FORBIDDEN,
                body("Missing or insufficient permissions.", Some("PERMISSION_DENIED"))
            ),
            BackendError::PermissionDenied(_)
        ));
        assert!(matches!(
            map_error(StatusCode::INTERNAL_SERVER_ERROR, body("boom", Some("INTERNAL"))),
            BackendError::Api { status: 500, .. }
        ));
    }

    #[test]
    fn test_into_document_takes_last_path_segment() {
        let doc = FirestoreDocument {
            name: "projects/p/databases/(default)/documents/products/abc123".to_string(),
            fields: serde_json::from_value(json!({ "title": { "stringValue": "Lamp" } })).unwrap(),
        };
        let doc = into_document(doc).unwrap();
        assert_eq!(doc.id, "abc123");
        assert_eq!(doc.fields["title"], "Lamp");
    }
}
