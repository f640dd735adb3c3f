//! Request ID middleware for log correlation.
//!
//! Runs outside the `TraceLayer`: the ID is written onto the request headers
//! first, so the request span can pick it up when it is created. Upstream IDs
//! are kept; otherwise a UUID v4 is generated.

use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Read the request ID from headers, if present and valid UTF-8.
#[must_use]
pub fn request_id(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
}

/// Ensure every request and response carries an `x-request-id`.
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let id = match request_id(request.headers()) {
        Some(existing) => existing.to_owned(),
        None => {
            let generated = Uuid::new_v4().to_string();
            if let Ok(value) = HeaderValue::from_str(&generated) {
                request.headers_mut().insert(REQUEST_ID_HEADER, value);
            }
            generated
        }
    };

    sentry::configure_scope(|scope| {
        scope.set_tag("request_id", &id);
    });

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}
