//! HTTP middleware stack for the catalog server.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (added in `main`)
//! 2. Request ID (assign `x-request-id` before the span is created)
//! 3. `TraceLayer` (request span carrying the request ID)

pub mod request_id;

pub use request_id::{REQUEST_ID_HEADER, request_id, request_id_middleware};
