//! Integration tests for Bazaar.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p bazaar-integration-tests
//! ```
//!
//! Every test runs against in-process mock services bound to ephemeral
//! ports, so no network access or credentials are needed.
//!
//! # Test Categories
//!
//! - `catalog_client` - Catalog REST client and its cache
//! - `firebase_backend` - Firebase adapter against a mock Identity Toolkit and Firestore
//! - `storefront_flow` - Browse, cart, sign-up, checkout and admin end to end

use std::collections::{BTreeMap, HashMap};
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use axum::Router;
use axum::extract::{Path, RawQuery, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Json;
use bazaar_storefront::config::{CatalogConfig, FirebaseConfig, StorefrontConfig};
use secrecy::SecretString;
use serde_json::{Map, Value, json};
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use url::Url;

/// Bind `router` to an ephemeral localhost port and serve it in the
/// background.
///
/// # Panics
///
/// Panics if the listener cannot be bound.
#[allow(clippy::expect_used)]
pub async fn serve(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Failed to read local address");
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    addr
}

#[allow(clippy::expect_used)]
fn base_url(addr: SocketAddr, path: &str) -> Url {
    Url::parse(&format!("http://{addr}{path}")).expect("Failed to build mock URL")
}

// =============================================================================
// Mock catalog
// =============================================================================

/// Products served by [`MockCatalog`].
#[must_use]
pub fn fixture_products() -> Value {
    json!([
        {
            "id": 1,
            "title": "Fjallraven Foldsack No. 1 Backpack",
            "price": 109.95,
            "description": "Fits 15 inch laptops",
            "category": "men's clothing",
            "image": "https://img.example/1.jpg",
            "rating": { "rate": 3.9, "count": 120 }
        },
        {
            "id": 2,
            "title": "Mens Casual Premium Slim Fit T-Shirts",
            "price": 22.3,
            "description": "Slim-fitting style",
            "category": "men's clothing",
            "image": "https://img.example/2.jpg"
        },
        {
            "id": 5,
            "title": "Dragon Station Chain Bracelet",
            "price": 695,
            "description": "Sterling silver",
            "category": "jewelery",
            "image": "https://img.example/5.jpg"
        },
        {
            "id": 9,
            "title": "WD 2TB Elements Portable Hard Drive",
            "price": 64,
            "description": "USB 3.0",
            "category": "electronics",
            "image": "https://img.example/9.jpg"
        },
        {
            "id": 12,
            "title": "WD 4TB Gaming Drive",
            "price": 114,
            "description": "Expand your PS4 gaming experience",
            "category": "electronics",
            "image": "https://img.example/12.jpg"
        }
    ])
}

#[derive(Default)]
struct CatalogState {
    requests: AtomicUsize,
    failing: AtomicBool,
}

/// An in-process stand-in for the catalog service.
///
/// Like the real service, unknown product ids answer 200 with an empty body.
pub struct MockCatalog {
    addr: SocketAddr,
    state: Arc<CatalogState>,
}

impl MockCatalog {
    pub async fn start() -> Self {
        let state = Arc::new(CatalogState::default());
        let router = Router::new()
            .route("/products", get(catalog_products))
            .route("/products/categories", get(catalog_categories))
            .route("/products/category/{category}", get(catalog_category))
            .route("/products/{id}", get(catalog_product))
            .with_state(Arc::clone(&state));
        let addr = serve(router).await;
        Self { addr, state }
    }

    #[must_use]
    pub fn url(&self) -> Url {
        base_url(self.addr, "/")
    }

    /// Storefront configuration pointing at this catalog.
    #[must_use]
    pub fn config(&self) -> StorefrontConfig {
        StorefrontConfig::with_catalog(self.url())
    }

    #[must_use]
    pub fn catalog_config(&self) -> CatalogConfig {
        CatalogConfig::new(self.url())
    }

    /// Requests served so far.
    #[must_use]
    pub fn requests(&self) -> usize {
        self.state.requests.load(Ordering::SeqCst)
    }

    /// Answer every request from now on with HTTP 500.
    pub fn fail(&self) {
        self.state.failing.store(true, Ordering::SeqCst);
    }
}

fn catalog_response(state: &CatalogState, body: impl FnOnce() -> Response) -> Response {
    state.requests.fetch_add(1, Ordering::SeqCst);
    if state.failing.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").into_response();
    }
    body()
}

fn fixtures() -> Vec<Value> {
    fixture_products().as_array().cloned().unwrap_or_default()
}

async fn catalog_products(State(state): State<Arc<CatalogState>>) -> Response {
    catalog_response(&state, || Json(fixture_products()).into_response())
}

async fn catalog_categories(State(state): State<Arc<CatalogState>>) -> Response {
    catalog_response(&state, || {
        let mut categories: Vec<Value> = Vec::new();
        for product in fixtures() {
            let category = product["category"].clone();
            if !categories.contains(&category) {
                categories.push(category);
            }
        }
        Json(categories).into_response()
    })
}

async fn catalog_category(
    State(state): State<Arc<CatalogState>>,
    Path(category): Path<String>,
) -> Response {
    catalog_response(&state, || {
        let products: Vec<Value> = fixtures()
            .into_iter()
            .filter(|p| p["category"] == category.as_str())
            .collect();
        Json(products).into_response()
    })
}

async fn catalog_product(State(state): State<Arc<CatalogState>>, Path(id): Path<String>) -> Response {
    catalog_response(&state, || {
        fixtures()
            .into_iter()
            .find(|p| p["id"].to_string() == id)
            .map_or_else(|| StatusCode::OK.into_response(), |p| Json(p).into_response())
    })
}

// =============================================================================
// Mock Firebase
// =============================================================================

/// Project id used by [`MockFirebase`].
pub const MOCK_PROJECT_ID: &str = "bazaar-test";

#[derive(Default)]
struct FirebaseState {
    /// email -> (uid, password)
    accounts: Mutex<HashMap<String, (String, String)>>,
    /// collection -> id -> typed fields
    documents: Mutex<HashMap<String, BTreeMap<String, Map<String, Value>>>>,
    next_id: AtomicUsize,
    bearer_requests: AtomicUsize,
    anonymous_requests: AtomicUsize,
}

/// An in-process stand-in for Identity Toolkit and Firestore REST.
///
/// Stores Firestore's typed field encoding as received, so tests exercise
/// the adapter's wire format.
pub struct MockFirebase {
    addr: SocketAddr,
    state: Arc<FirebaseState>,
}

impl MockFirebase {
    pub async fn start() -> Self {
        let state = Arc::new(FirebaseState::default());
        let router = Router::new()
            .route("/v1/{action}", post(identity_action))
            .route(
                "/v1/projects/{project}/databases/{database}/documents/{collection}",
                get(list_documents).post(create_document),
            )
            .route(
                "/v1/projects/{project}/databases/{database}/documents/{collection}/{id}",
                get(get_document).patch(patch_document).delete(delete_document),
            )
            .with_state(Arc::clone(&state));
        let addr = serve(router).await;
        Self { addr, state }
    }

    /// Firebase configuration pointing at this mock.
    #[must_use]
    pub fn config(&self) -> FirebaseConfig {
        FirebaseConfig {
            api_key: SecretString::from("AIzaSyMockK3yForIntegrat1onTests"),
            project_id: MOCK_PROJECT_ID.to_string(),
            auth_url: base_url(self.addr, "/v1"),
            firestore_url: base_url(self.addr, "/v1"),
        }
    }

    /// Firestore requests that carried a bearer token.
    #[must_use]
    pub fn bearer_requests(&self) -> usize {
        self.state.bearer_requests.load(Ordering::SeqCst)
    }

    /// Firestore requests without a bearer token.
    #[must_use]
    pub fn anonymous_requests(&self) -> usize {
        self.state.anonymous_requests.load(Ordering::SeqCst)
    }

    /// Store a document directly. `fields` must already be in Firestore's
    /// typed encoding.
    pub async fn seed(&self, collection: &str, id: &str, fields: Map<String, Value>) {
        self.state
            .documents
            .lock()
            .await
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), fields);
    }

    /// The raw typed fields of a stored document.
    pub async fn raw_document(&self, collection: &str, id: &str) -> Option<Map<String, Value>> {
        self.state
            .documents
            .lock()
            .await
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned()
    }
}

fn firebase_error(status: StatusCode, message: &str, code: Option<&str>) -> Response {
    let mut error = json!({ "code": status.as_u16(), "message": message });
    if let (Some(code), Some(obj)) = (code, error.as_object_mut()) {
        obj.insert("status".to_string(), Value::String(code.to_string()));
    }
    (status, Json(json!({ "error": error }))).into_response()
}

async fn identity_action(
    State(state): State<Arc<FirebaseState>>,
    Path(action): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let email = body["email"].as_str().unwrap_or_default().to_lowercase();
    let password = body["password"].as_str().unwrap_or_default().to_string();
    let mut accounts = state.accounts.lock().await;

    let uid = match action.as_str() {
        "accounts:signUp" => {
            if accounts.contains_key(&email) {
                return firebase_error(StatusCode::BAD_REQUEST, "EMAIL_EXISTS", None);
            }
            if password.len() < 6 {
                return firebase_error(
                    StatusCode::BAD_REQUEST,
                    "WEAK_PASSWORD : Password should be at least 6 characters",
                    None,
                );
            }
            let uid = format!("uid{}", state.next_id.fetch_add(1, Ordering::SeqCst));
            accounts.insert(email.clone(), (uid.clone(), password));
            uid
        }
        "accounts:signInWithPassword" => match accounts.get(&email) {
            Some((uid, stored)) if *stored == password => uid.clone(),
            _ => {
                return firebase_error(StatusCode::BAD_REQUEST, "INVALID_LOGIN_CREDENTIALS", None);
            }
        },
        _ => return firebase_error(StatusCode::NOT_FOUND, "Unknown action", Some("NOT_FOUND")),
    };

    Json(json!({
        "localId": uid,
        "email": email,
        "idToken": format!("token-{uid}"),
        "refreshToken": "refresh",
        "expiresIn": "3600"
    }))
    .into_response()
}

fn count_auth(state: &FirebaseState, headers: &HeaderMap) {
    let bearer = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("Bearer "));
    if bearer {
        state.bearer_requests.fetch_add(1, Ordering::SeqCst);
    } else {
        state.anonymous_requests.fetch_add(1, Ordering::SeqCst);
    }
}

fn document_json(project: &str, collection: &str, id: &str, fields: &Map<String, Value>) -> Value {
    json!({
        "name": format!("projects/{project}/databases/(default)/documents/{collection}/{id}"),
        "fields": fields,
        "createTime": "2025-01-01T00:00:00Z",
        "updateTime": "2025-01-01T00:00:00Z"
    })
}

fn not_found() -> Response {
    firebase_error(StatusCode::NOT_FOUND, "Document not found", Some("NOT_FOUND"))
}

fn request_fields(body: &Value) -> Map<String, Value> {
    body.get("fields")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default()
}

async fn list_documents(
    State(state): State<Arc<FirebaseState>>,
    headers: HeaderMap,
    Path((project, _database, collection)): Path<(String, String, String)>,
    RawQuery(query): RawQuery,
) -> Response {
    count_auth(&state, &headers);
    let mut page_size = usize::MAX;
    let mut offset = 0;
    for (key, value) in url::form_urlencoded::parse(query.unwrap_or_default().as_bytes()) {
        match key.as_ref() {
            "pageSize" => page_size = value.parse().unwrap_or(page_size),
            "pageToken" => offset = value.parse().unwrap_or(0),
            _ => {}
        }
    }

    let documents = state.documents.lock().await;
    let all: Vec<(&String, &Map<String, Value>)> = documents
        .get(&collection)
        .map(|docs| docs.iter().collect())
        .unwrap_or_default();
    let page: Vec<Value> = all
        .iter()
        .skip(offset)
        .take(page_size)
        .map(|(id, fields)| document_json(&project, &collection, id, fields))
        .collect();

    let mut body = Map::new();
    let next = offset.saturating_add(page.len());
    if !page.is_empty() {
        body.insert("documents".to_string(), Value::Array(page));
    }
    if next < all.len() {
        body.insert("nextPageToken".to_string(), Value::String(next.to_string()));
    }
    Json(Value::Object(body)).into_response()
}

async fn create_document(
    State(state): State<Arc<FirebaseState>>,
    headers: HeaderMap,
    Path((project, _database, collection)): Path<(String, String, String)>,
    Json(body): Json<Value>,
) -> Response {
    count_auth(&state, &headers);
    let id = format!("doc{:04}", state.next_id.fetch_add(1, Ordering::SeqCst));
    let fields = request_fields(&body);
    state
        .documents
        .lock()
        .await
        .entry(collection.clone())
        .or_default()
        .insert(id.clone(), fields.clone());
    Json(document_json(&project, &collection, &id, &fields)).into_response()
}

async fn get_document(
    State(state): State<Arc<FirebaseState>>,
    headers: HeaderMap,
    Path((project, _database, collection, id)): Path<(String, String, String, String)>,
) -> Response {
    count_auth(&state, &headers);
    let documents = state.documents.lock().await;
    documents
        .get(&collection)
        .and_then(|docs| docs.get(&id))
        .map_or_else(not_found, |fields| {
            Json(document_json(&project, &collection, &id, fields)).into_response()
        })
}

async fn patch_document(
    State(state): State<Arc<FirebaseState>>,
    headers: HeaderMap,
    Path((project, _database, collection, id)): Path<(String, String, String, String)>,
    RawQuery(query): RawQuery,
    Json(body): Json<Value>,
) -> Response {
    count_auth(&state, &headers);
    let mask: Vec<String> = url::form_urlencoded::parse(query.unwrap_or_default().as_bytes())
        .filter(|(key, _)| key == "updateMask.fieldPaths")
        .map(|(_, value)| value.into_owned())
        .collect();

    let fields = request_fields(&body);
    let mut documents = state.documents.lock().await;
    let stored = documents
        .entry(collection.clone())
        .or_default()
        .entry(id.clone())
        .or_default();

    if mask.is_empty() {
        *stored = fields;
    } else {
        for path in mask {
            match fields.get(&path) {
                Some(value) => {
                    stored.insert(path, value.clone());
                }
                None => {
                    stored.remove(&path);
                }
            }
        }
    }

    Json(document_json(&project, &collection, &id, stored)).into_response()
}

async fn delete_document(
    State(state): State<Arc<FirebaseState>>,
    headers: HeaderMap,
    Path((_project, _database, collection, id)): Path<(String, String, String, String)>,
) -> Response {
    count_auth(&state, &headers);
    if let Some(docs) = state.documents.lock().await.get_mut(&collection) {
        docs.remove(&id);
    }
    Json(json!({})).into_response()
}
