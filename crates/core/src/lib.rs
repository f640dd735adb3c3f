//! Shop Catalog Core - Shared types and pure logic.
//!
//! This crate provides the domain types and the request/read-model logic used
//! by the catalog components:
//! - `server` - HTTP API over shops, categories, and their associations
//! - `cli` - Command-line tools for migrations and sample data
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP handling. Everything here is testable without a datastore.
//!
//! # Modules
//!
//! - [`types`] - Type-safe ids and the shop/category models
//! - [`aggregate`] - Grouping of flat join rows into shops with category names
//! - [`request`] - Normalization of create and patch request bodies
//! - [`pagination`] - Page/limit parameter handling

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod aggregate;
pub mod pagination;
pub mod request;
pub mod types;

pub use aggregate::{JoinRow, ShopGrouper, group_rows};
pub use pagination::Pagination;
pub use request::{
    CreateShopRequest, NormalizeError, PatchShopRequest, ReplaceShopRequest, ShopPatch,
};
pub use types::*;
