//! HTTP route handlers for the catalog API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                     - Liveness check
//! GET  /health/ready               - Readiness check (pings the datastore)
//!
//! # API (all JSON reads, plain-text writes)
//! GET    /api/v1/categories        - All categories
//! GET    /api/v1/shop_categories   - All shop/category pairs
//! GET    /api/v1/shops             - Shops with category names (?page, ?limit)
//! GET    /api/v1/shops?category_id - Plain shops in one category
//! POST   /api/v1/shops             - Create (wrapped or bare body)
//! PUT    /api/v1/shops?id          - Full replace
//! PATCH  /api/v1/shops?id          - Partial update
//! DELETE /api/v1/shops?id          - Delete, cascading to links
//! ```
//!
//! Any other method on `/api/v1/shops` answers 405 without reaching the store.

pub mod categories;
pub mod shop_categories;
pub mod shops;

use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware,
    routing::get,
};
use tower_http::trace::TraceLayer;

use crate::middleware::{request_id, request_id_middleware};
use crate::state::AppState;

/// Create the `/api/v1` routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(categories::list))
        .route("/shop_categories", get(shop_categories::list))
        .route(
            "/shops",
            get(shops::list)
                .post(shops::create)
                .put(shops::replace)
                .patch(shops::patch)
                .delete(shops::delete)
                .fallback(shops::method_not_allowed),
        )
}

/// Create all routes for the catalog server.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/api/v1", api_routes())
}

/// Build the complete application with state and middleware applied.
///
/// Sentry layers are left to the binary so tests can drive this router
/// without a Sentry client.
pub fn app(state: AppState) -> Router {
    routes()
        .with_state(state)
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
            let request_id = request_id(request.headers()).unwrap_or_default();

            tracing::info_span!(
                "request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = %request_id,
            )
        }))
        // Outside the trace layer so the span sees the ID
        .layer(middleware::from_fn(request_id_middleware))
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the datastore is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.store().ping().await {
        Ok(()) => StatusCode::OK,
        Err(err) => {
            tracing::warn!(error = %err, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
