//! Datastore gateway for the catalog.
//!
//! # Database
//!
//! ## Tables
//!
//! - `shops` - Shop listings (`id`, `name`, `image`, `price`, `description`)
//! - `categories` - Category tags (`id`, `name`)
//! - `shop_categories` - Associations, cascading on delete of either side
//!
//! # Implementations
//!
//! - [`PgCatalogStore`] - `PostgreSQL` via an sqlx pool
//! - [`InMemoryCatalogStore`] - Mutex-guarded tables for tests and local runs
//!
//! Handlers only see `dyn CatalogStore`, injected through
//! [`AppState`](crate::state::AppState).
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p shop-catalog-cli -- migrate
//! ```

pub mod memory;
pub mod postgres;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use shop_catalog_core::{
    Category, CategoryId, NewShop, Pagination, Shop, ShopCategory, ShopId, ShopPatch,
    ShopWithCategories,
};

pub use memory::InMemoryCatalogStore;
pub use postgres::PgCatalogStore;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// A referenced shop or category does not exist.
    #[error("foreign key violation: {0}")]
    ForeignKey(String),

    /// Constraint violation (e.g., duplicate association).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Operations the HTTP layer needs from a datastore.
///
/// Multi-statement operations document their transactional scope. Anything
/// not marked transactional may leave earlier statements applied on failure.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Check that the datastore answers.
    async fn ping(&self) -> Result<(), RepositoryError>;

    /// All categories, ordered by id.
    async fn list_categories(&self) -> Result<Vec<Category>, RepositoryError>;

    /// Insert a category and return it with its generated id.
    async fn create_category(&self, name: &str) -> Result<Category, RepositoryError>;

    /// All associations, ordered by shop id then category id.
    async fn list_shop_categories(&self) -> Result<Vec<ShopCategory>, RepositoryError>;

    /// One page of shops with their category names.
    ///
    /// Pagination applies to shops, not to join rows.
    async fn list_shops(
        &self,
        page: Pagination,
    ) -> Result<Vec<ShopWithCategories>, RepositoryError>;

    /// One page of the shops associated with `category`.
    async fn list_shops_in_category(
        &self,
        category: CategoryId,
        page: Pagination,
    ) -> Result<Vec<Shop>, RepositoryError>;

    /// Insert a shop and return its generated id.
    async fn create_shop(&self, shop: &NewShop) -> Result<ShopId, RepositoryError>;

    /// Associate a shop with each category.
    ///
    /// Transactional: either every association is inserted or none is.
    async fn add_shop_categories(
        &self,
        shop: ShopId,
        categories: &[CategoryId],
    ) -> Result<(), RepositoryError>;

    /// Replace the complete association set of a shop.
    ///
    /// Transactional: deletes every existing association, then inserts one per
    /// id.
    async fn replace_shop_categories(
        &self,
        shop: ShopId,
        categories: &[CategoryId],
    ) -> Result<(), RepositoryError>;

    /// Overwrite every field of a shop and replace its associations.
    ///
    /// Transactional. Returns [`RepositoryError::NotFound`] when the shop does
    /// not exist.
    async fn replace_shop(
        &self,
        id: ShopId,
        shop: &NewShop,
        categories: &[CategoryId],
    ) -> Result<(), RepositoryError>;

    /// Change the supplied fields of a shop and optionally replace its
    /// associations. Fields are applied before categories.
    ///
    /// Transactional. Returns [`RepositoryError::NotFound`] when the shop does
    /// not exist.
    async fn patch_shop(
        &self,
        id: ShopId,
        patch: Option<&ShopPatch>,
        categories: Option<&[CategoryId]>,
    ) -> Result<(), RepositoryError>;

    /// Delete a shop; its associations cascade.
    ///
    /// Returns [`RepositoryError::NotFound`] when the shop does not exist.
    async fn delete_shop(&self, id: ShopId) -> Result<(), RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
/// * `max_connections` - Upper bound on pooled connections
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(
    database_url: &secrecy::SecretString,
    max_connections: u32,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .min_connections(2.min(max_connections))
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
