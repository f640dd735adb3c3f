//! Integration tests for the shop catalog service.
//!
//! # Running Tests
//!
//! ```bash
//! # Router tests (in-memory store, no database needed)
//! cargo test -p shop-catalog-integration-tests
//!
//! # Live tests against a running server backed by PostgreSQL
//! cargo test -p shop-catalog-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `shops_api` - Full router driven with `tower::ServiceExt::oneshot`
//! - `live_server` - HTTP round trips through `reqwest`
//!
//! [`TestApp`] wires the real router to an [`InMemoryCatalogStore`] and keeps
//! a handle on the store so tests can inspect the tables afterwards.

use axum::Router;
use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Method, Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use shop_catalog_core::{Category, NewShop, ShopId};
use shop_catalog_server::db::{CatalogStore, InMemoryCatalogStore};
use shop_catalog_server::routes;
use shop_catalog_server::state::AppState;

/// Largest response body the helpers will buffer.
const MAX_BODY: usize = 1024 * 1024;

/// The router under test plus a shared handle on its store.
pub struct TestApp {
    pub store: InMemoryCatalogStore,
    router: Router,
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

impl TestApp {
    /// Build the application around an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        let store = InMemoryCatalogStore::new();
        let router = routes::app(AppState::new(store.clone()));
        Self { store, router }
    }

    /// Insert categories named `names`, returning them with their ids.
    ///
    /// # Panics
    ///
    /// Panics if the store rejects an insert.
    pub async fn seed_categories(&self, names: &[&str]) -> Vec<Category> {
        let mut created = Vec::with_capacity(names.len());
        for name in names {
            created.push(
                self.store
                    .create_category(name)
                    .await
                    .expect("Failed to seed category"),
            );
        }
        created
    }

    /// Insert `count` shops named "Shop 1".."Shop N" directly into the store.
    ///
    /// # Panics
    ///
    /// Panics if the store rejects an insert.
    pub async fn seed_shops(&self, count: i32) -> Vec<ShopId> {
        let mut created = Vec::new();
        for n in 1..=count {
            created.push(
                self.store
                    .create_shop(&sample_shop(n))
                    .await
                    .expect("Failed to seed shop"),
            );
        }
        created
    }

    /// Send a request with an optional body through the router.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or the body cannot be read.
    pub async fn send(&self, method: Method, uri: &str, body: Option<&str>) -> TestResponse {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(body.map_or_else(Body::empty, |b| Body::from(b.to_owned())))
            .expect("Failed to build request");

        self.call(request).await
    }

    /// Send a prepared request through the router.
    ///
    /// # Panics
    ///
    /// Panics if the body cannot be read.
    pub async fn call(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), MAX_BODY)
            .await
            .expect("Failed to read response body");

        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// Shorthand for a `GET`.
    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(Method::GET, uri, None).await
    }
}

/// A buffered response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    /// The body as UTF-8 text.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// The body parsed as JSON.
    ///
    /// # Panics
    ///
    /// Panics if the body is not JSON.
    #[must_use]
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("Response body is not JSON")
    }
}

/// A shop whose every field is derived from `n`.
#[must_use]
pub fn sample_shop(n: i32) -> NewShop {
    NewShop {
        name: format!("Shop {n}"),
        image: format!("image{n}.jpeg"),
        price: n * 100,
        description: format!("Description {n}"),
    }
}

/// Ids of the shops in a list response, in response order.
///
/// Accepts both the grouped shape (`[{shop, categories}]`) and plain shops.
#[must_use]
pub fn shop_ids(body: &Value) -> Vec<i64> {
    body.as_array()
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| entry.get("shop").unwrap_or(entry).get("id"))
                .filter_map(Value::as_i64)
                .collect()
        })
        .unwrap_or_default()
}
