//! `PostgreSQL` implementation of [`CatalogStore`].
//!
//! Queries are built at runtime with `sqlx::query_as` so the crate compiles
//! without a live database. Column names are always fixed in code; client
//! input only ever reaches a query as a bound parameter.

use async_trait::async_trait;
use futures::TryStreamExt;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};

use shop_catalog_core::{
    Category, CategoryId, JoinRow, NewShop, Pagination, Shop, ShopCategory, ShopGrouper, ShopId,
    ShopPatch, ShopWithCategories,
};

use super::{CatalogStore, RepositoryError};

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct ShopRow {
    id: ShopId,
    name: String,
    image: String,
    price: i32,
    description: String,
}

impl From<ShopRow> for Shop {
    fn from(row: ShopRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            image: row.image,
            price: row.price,
            description: row.description,
        }
    }
}

/// One row of the shop/category left join.
#[derive(Debug, sqlx::FromRow)]
struct ShopJoinRow {
    #[sqlx(flatten)]
    shop: ShopRow,
    category_name: Option<String>,
}

impl From<ShopJoinRow> for JoinRow {
    fn from(row: ShopJoinRow) -> Self {
        Self::new(row.shop.into(), row.category_name)
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CategoryRow {
    id: CategoryId,
    name: String,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ShopCategoryRow {
    shop_id: ShopId,
    category_id: CategoryId,
}

impl From<ShopCategoryRow> for ShopCategory {
    fn from(row: ShopCategoryRow) -> Self {
        Self {
            shop_id: row.shop_id,
            category_id: row.category_id,
        }
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Catalog store backed by a `PostgreSQL` pool.
#[derive(Debug, Clone)]
pub struct PgCatalogStore {
    pool: PgPool,
}

impl PgCatalogStore {
    /// Create a store over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn list_categories(&self) -> Result<Vec<Category>, RepositoryError> {
        let rows = sqlx::query_as::<_, CategoryRow>("SELECT id, name FROM categories ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn create_category(&self, name: &str) -> Result<Category, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            "INSERT INTO categories (name) VALUES ($1) RETURNING id, name",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn list_shop_categories(&self) -> Result<Vec<ShopCategory>, RepositoryError> {
        let rows = sqlx::query_as::<_, ShopCategoryRow>(
            "SELECT shop_id, category_id FROM shop_categories ORDER BY shop_id, category_id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_shops(
        &self,
        page: Pagination,
    ) -> Result<Vec<ShopWithCategories>, RepositoryError> {
        // Page over shops first so a page never splits one shop's categories.
        let mut rows = sqlx::query_as::<_, ShopJoinRow>(
            r"
            SELECT s.id, s.name, s.image, s.price, s.description, c.name AS category_name
            FROM (
                SELECT id, name, image, price, description
                FROM shops
                ORDER BY id
                LIMIT $1 OFFSET $2
            ) s
            LEFT JOIN shop_categories sc ON s.id = sc.shop_id
            LEFT JOIN categories c ON sc.category_id = c.id
            ORDER BY s.id, sc.category_id
            ",
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch(&self.pool);

        let mut grouper = ShopGrouper::new();
        while let Some(row) = rows.try_next().await? {
            grouper.push(row.into());
        }

        tracing::debug!(
            shops = grouper.len(),
            page = page.page(),
            limit = page.limit(),
            "Listed shops"
        );
        Ok(grouper.finish())
    }

    async fn list_shops_in_category(
        &self,
        category: CategoryId,
        page: Pagination,
    ) -> Result<Vec<Shop>, RepositoryError> {
        let rows = sqlx::query_as::<_, ShopRow>(
            r"
            SELECT s.id, s.name, s.image, s.price, s.description
            FROM shops s
            JOIN shop_categories sc ON s.id = sc.shop_id
            WHERE sc.category_id = $1
            ORDER BY s.id
            LIMIT $2 OFFSET $3
            ",
        )
        .bind(category)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn create_shop(&self, shop: &NewShop) -> Result<ShopId, RepositoryError> {
        let id: ShopId = sqlx::query_scalar(
            r"
            INSERT INTO shops (name, image, price, description)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            ",
        )
        .bind(&shop.name)
        .bind(&shop.image)
        .bind(shop.price)
        .bind(&shop.description)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn add_shop_categories(
        &self,
        shop: ShopId,
        categories: &[CategoryId],
    ) -> Result<(), RepositoryError> {
        // Dropping the transaction on an early return rolls it back.
        let mut tx = self.pool.begin().await?;
        insert_links(&mut tx, shop, categories).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn replace_shop_categories(
        &self,
        shop: ShopId,
        categories: &[CategoryId],
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;
        replace_links(&mut tx, shop, categories).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn replace_shop(
        &self,
        id: ShopId,
        shop: &NewShop,
        categories: &[CategoryId],
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r"
            UPDATE shops
            SET name = $1, image = $2, price = $3, description = $4
            WHERE id = $5
            ",
        )
        .bind(&shop.name)
        .bind(&shop.image)
        .bind(shop.price)
        .bind(&shop.description)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        replace_links(&mut tx, id, categories).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn patch_shop(
        &self,
        id: ShopId,
        patch: Option<&ShopPatch>,
        categories: Option<&[CategoryId]>,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        match patch.filter(|p| !p.is_empty()) {
            Some(patch) => {
                let result = patch_query(id, patch).build().execute(&mut *tx).await?;
                if result.rows_affected() == 0 {
                    return Err(RepositoryError::NotFound);
                }
            }
            None => {
                if !shop_exists(&mut tx, id).await? {
                    return Err(RepositoryError::NotFound);
                }
            }
        }

        if let Some(categories) = categories {
            replace_links(&mut tx, id, categories).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn delete_shop(&self, id: ShopId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shops WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

// =============================================================================
// Statement Helpers
// =============================================================================

/// Build `UPDATE shops SET ... WHERE id = $n` for the supplied fields only.
///
/// The patch must not be empty.
fn patch_query(id: ShopId, patch: &ShopPatch) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new("UPDATE shops SET ");
    {
        let mut assignments = builder.separated(", ");
        if let Some(name) = &patch.name {
            assignments.push("name = ");
            assignments.push_bind_unseparated(name.clone());
        }
        if let Some(image) = &patch.image {
            assignments.push("image = ");
            assignments.push_bind_unseparated(image.clone());
        }
        if let Some(price) = patch.price {
            assignments.push("price = ");
            assignments.push_bind_unseparated(price);
        }
        if let Some(description) = &patch.description {
            assignments.push("description = ");
            assignments.push_bind_unseparated(description.clone());
        }
    }
    builder.push(" WHERE id = ");
    builder.push_bind(id);
    builder
}

async fn shop_exists(conn: &mut PgConnection, id: ShopId) -> Result<bool, RepositoryError> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM shops WHERE id = $1)")
        .bind(id)
        .fetch_one(conn)
        .await?;
    Ok(exists)
}

/// Delete every association of `shop`, then insert the new set.
async fn replace_links(
    conn: &mut PgConnection,
    shop: ShopId,
    categories: &[CategoryId],
) -> Result<(), RepositoryError> {
    sqlx::query("DELETE FROM shop_categories WHERE shop_id = $1")
        .bind(shop)
        .execute(&mut *conn)
        .await?;

    insert_links(conn, shop, categories).await
}

async fn insert_links(
    conn: &mut PgConnection,
    shop: ShopId,
    categories: &[CategoryId],
) -> Result<(), RepositoryError> {
    for category in categories {
        sqlx::query("INSERT INTO shop_categories (shop_id, category_id) VALUES ($1, $2)")
            .bind(shop)
            .bind(*category)
            .execute(&mut *conn)
            .await
            .map_err(|e| link_error(e, shop, *category))?;
    }
    Ok(())
}

fn link_error(error: sqlx::Error, shop: ShopId, category: CategoryId) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = error {
        if db_err.is_foreign_key_violation() {
            return RepositoryError::ForeignKey(format!(
                "cannot link shop {shop} to category {category}: {db_err}"
            ));
        }
        if db_err.is_unique_violation() {
            return RepositoryError::Conflict(format!(
                "shop {shop} is already linked to category {category}"
            ));
        }
    }
    RepositoryError::Database(error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_query_only_names_supplied_columns() {
        let patch = ShopPatch {
            price: Some(300),
            description: Some("new".to_string()),
            ..ShopPatch::default()
        };

        let builder = patch_query(ShopId::new(7), &patch);
        assert_eq!(
            builder.sql(),
            "UPDATE shops SET price = $1, description = $2 WHERE id = $3"
        );
    }

    #[test]
    fn test_patch_query_all_columns() {
        let patch = ShopPatch {
            name: Some("A".to_string()),
            image: Some("a.png".to_string()),
            price: Some(1),
            description: Some("d".to_string()),
        };

        let builder = patch_query(ShopId::new(1), &patch);
        assert_eq!(
            builder.sql(),
            "UPDATE shops SET name = $1, image = $2, price = $3, description = $4 WHERE id = $5"
        );
    }
}
