//! Subcommand implementations.

pub mod migrate;
pub mod seed;

use shop_catalog_server::config::{CatalogConfig, ConfigError};
use shop_catalog_server::db;
use sqlx::PgPool;
use thiserror::Error;

/// Pool size for one-shot CLI commands.
const CLI_MAX_CONNECTIONS: u32 = 2;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration failed.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A seed insert failed.
    #[error("Seeding failed: {0}")]
    Seed(#[from] db::RepositoryError),
}

/// Load configuration and connect to the catalog database.
async fn connect() -> Result<PgPool, CommandError> {
    let config = CatalogConfig::from_env()?;

    tracing::info!("Connecting to catalog database...");
    let pool = db::create_pool(&config.database_url, CLI_MAX_CONNECTIONS).await?;
    Ok(pool)
}
