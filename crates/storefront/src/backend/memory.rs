//! In-process backend.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use bazaar_core::Email;
use bazaar_core::forms::MIN_PASSWORD_LENGTH;
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::Mutex;
use tracing::{debug, instrument};
use uuid::Uuid;

use super::{AuthSession, BackendError, Document, DocumentStore, Fields, IdentityProvider};

/// Accounts and documents held in memory.
///
/// Used when no Firebase project is configured, and by tests. Data lives
/// as long as the last clone.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    state: Arc<Mutex<MemoryState>>,
}

#[derive(Default)]
struct MemoryState {
    accounts: HashMap<Email, Account>,
    collections: HashMap<String, BTreeMap<String, Fields>>,
}

struct Account {
    uid: String,
    password: SecretString,
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in a collection.
    pub async fn document_count(&self, collection: &str) -> usize {
        self.state
            .lock()
            .await
            .collections
            .get(collection)
            .map_or(0, BTreeMap::len)
    }
}

fn session(uid: &str, email: &Email) -> AuthSession {
    AuthSession {
        uid: uid.to_string(),
        email: email.clone(),
        id_token: SecretString::from(Uuid::new_v4().simple().to_string()),
    }
}

#[async_trait]
impl IdentityProvider for MemoryBackend {
    #[instrument(skip(self, password), fields(email = %email))]
    async fn create_account(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<AuthSession, BackendError> {
        if password.expose_secret().chars().count() < MIN_PASSWORD_LENGTH {
            return Err(BackendError::WeakPassword(format!(
                "Password should be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }

        let mut state = self.state.lock().await;
        if state.accounts.contains_key(email) {
            return Err(BackendError::AccountExists);
        }

        let uid = Uuid::new_v4().simple().to_string();
        state.accounts.insert(
            email.clone(),
            Account {
                uid: uid.clone(),
                password: password.clone(),
            },
        );
        debug!(uid = %uid, "Created account");
        Ok(session(&uid, email))
    }

    #[instrument(skip(self, password), fields(email = %email))]
    async fn sign_in(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<AuthSession, BackendError> {
        let state = self.state.lock().await;
        let account = state
            .accounts
            .get(email)
            .filter(|account| account.password.expose_secret() == password.expose_secret())
            .ok_or(BackendError::InvalidCredentials)?;
        Ok(session(&account.uid, email))
    }

    async fn sign_out(&self, _session: &AuthSession) -> Result<(), BackendError> {
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryBackend {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, BackendError> {
        let state = self.state.lock().await;
        Ok(state
            .collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|fields| Document {
                id: id.to_string(),
                fields: fields.clone(),
            }))
    }

    async fn list(&self, collection: &str) -> Result<Vec<Document>, BackendError> {
        let state = self.state.lock().await;
        Ok(state
            .collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, fields)| Document {
                        id: id.clone(),
                        fields: fields.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn create(&self, collection: &str, fields: Fields) -> Result<Document, BackendError> {
        let id = Uuid::new_v4().simple().to_string();
        self.state
            .lock()
            .await
            .collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), fields.clone());
        Ok(Document { id, fields })
    }

    async fn set(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
        merge: bool,
    ) -> Result<Document, BackendError> {
        let mut state = self.state.lock().await;
        let stored = state
            .collections
            .entry(collection.to_string())
            .or_default()
            .entry(id.to_string())
            .or_default();

        if merge {
            stored.extend(fields);
        } else {
            *stored = fields;
        }

        Ok(Document {
            id: id.to_string(),
            fields: stored.clone(),
        })
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), BackendError> {
        if let Some(docs) = self.state.lock().await.collections.get_mut(collection) {
            docs.remove(id);
        }
        Ok(())
    }
}
