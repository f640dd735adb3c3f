//! Seed the catalog database with sample data.
//!
//! # Usage
//!
//! ```bash
//! catalog-cli seed categories   # "Category 1" .. "Category 6"
//! catalog-cli seed shops        # "Shop 1" .. "Shop 6"
//! catalog-cli seed links        # pair the first shops with the first categories
//! catalog-cli seed all          # all of the above
//! ```
//!
//! Inserts go through [`PgCatalogStore`], the same gateway the server uses.

use shop_catalog_core::{Category, NewShop, Pagination, ShopId};
use shop_catalog_server::db::{CatalogStore, PgCatalogStore};

use super::{CommandError, connect};

/// Number of sample rows per table.
const SAMPLE_COUNT: u32 = 6;

/// Names of the sample categories.
fn sample_categories() -> Vec<String> {
    (1..=SAMPLE_COUNT).map(|n| format!("Category {n}")).collect()
}

/// The sample shops, priced 100 apart.
fn sample_shops() -> Vec<NewShop> {
    (1..=SAMPLE_COUNT)
        .map(|n| NewShop {
            name: format!("Shop {n}"),
            image: format!("image{n}.jpeg"),
            price: i32::try_from(n * 100).unwrap_or(i32::MAX),
            description: format!("Description {n}"),
        })
        .collect()
}

async fn store() -> Result<PgCatalogStore, CommandError> {
    Ok(PgCatalogStore::new(connect().await?))
}

async fn insert_categories(store: &PgCatalogStore) -> Result<Vec<Category>, CommandError> {
    let mut created = Vec::new();
    for name in sample_categories() {
        let category = store.create_category(&name).await?;
        tracing::info!(id = %category.id, name = %category.name, "Category created");
        created.push(category);
    }
    Ok(created)
}

async fn insert_shops(store: &PgCatalogStore) -> Result<Vec<ShopId>, CommandError> {
    let mut created = Vec::new();
    for shop in sample_shops() {
        let id = store.create_shop(&shop).await?;
        tracing::info!(id = %id, name = %shop.name, "Shop created");
        created.push(id);
    }
    Ok(created)
}

/// Link each shop to the category at the same position.
///
/// Each shop's existing links are replaced, so re-running leaves exactly one
/// link per shop.
async fn insert_links<S: CatalogStore + ?Sized>(
    store: &S,
    shops: &[ShopId],
    categories: &[Category],
) -> Result<usize, CommandError> {
    let mut linked = 0;
    for (&shop, category) in shops.iter().zip(categories) {
        store.replace_shop_categories(shop, &[category.id]).await?;
        linked += 1;
    }
    tracing::info!(linked, "Shops linked to categories");
    Ok(linked)
}

/// Insert the sample categories.
///
/// # Errors
///
/// Returns an error if the database is unreachable or an insert fails.
pub async fn categories() -> Result<(), CommandError> {
    let store = store().await?;
    insert_categories(&store).await?;
    Ok(())
}

/// Insert the sample shops.
///
/// # Errors
///
/// Returns an error if the database is unreachable or an insert fails.
pub async fn shops() -> Result<(), CommandError> {
    let store = store().await?;
    insert_shops(&store).await?;
    Ok(())
}

/// Link the existing first shops to the existing first categories.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a link cannot be written.
pub async fn links() -> Result<(), CommandError> {
    let store = store().await?;

    let shops: Vec<ShopId> = store
        .list_shops(Pagination::first_page(i64::from(SAMPLE_COUNT)))
        .await?
        .into_iter()
        .map(|entry| entry.shop.id)
        .collect();
    let categories = store.list_categories().await?;

    if shops.is_empty() || categories.is_empty() {
        tracing::warn!("Nothing to link, seed shops and categories first");
        return Ok(());
    }

    insert_links(&store, &shops, &categories).await?;
    Ok(())
}

/// Insert categories, shops and one link per shop.
///
/// # Errors
///
/// Returns an error if the database is unreachable or an insert fails.
pub async fn all() -> Result<(), CommandError> {
    let store = store().await?;

    let categories = insert_categories(&store).await?;
    let shops = insert_shops(&store).await?;
    insert_links(&store, &shops, &categories).await?;

    tracing::info!("Seeding complete!");
    Ok(())
}
