//! In-memory implementation of [`CatalogStore`].
//!
//! Emulates the relational rules the handlers depend on: generated ids,
//! foreign keys on both sides of `shop_categories`, the unique
//! `(shop_id, category_id)` pair, cascading deletes, and all-or-nothing
//! transactional operations. Used by the router tests and for running the
//! server without a database.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use shop_catalog_core::{
    Category, CategoryId, JoinRow, NewShop, Pagination, Shop, ShopCategory, ShopId, ShopPatch,
    ShopWithCategories, group_rows,
};

use super::{CatalogStore, RepositoryError};

#[derive(Debug, Clone, Default)]
struct Tables {
    shops: BTreeMap<i32, Shop>,
    categories: BTreeMap<i32, Category>,
    /// Kept sorted by `(shop_id, category_id)`.
    links: Vec<ShopCategory>,
    next_shop_id: i32,
    next_category_id: i32,
}

impl Tables {
    fn insert_links(
        &mut self,
        shop: ShopId,
        categories: &[CategoryId],
    ) -> Result<(), RepositoryError> {
        for &category in categories {
            if !self.shops.contains_key(&shop.as_i32()) {
                return Err(RepositoryError::ForeignKey(format!(
                    "cannot link shop {shop} to category {category}: shop does not exist"
                )));
            }
            if !self.categories.contains_key(&category.as_i32()) {
                return Err(RepositoryError::ForeignKey(format!(
                    "cannot link shop {shop} to category {category}: category does not exist"
                )));
            }

            let link = ShopCategory {
                shop_id: shop,
                category_id: category,
            };
            match self.links.binary_search_by_key(&link_key(&link), link_key) {
                Ok(_) => {
                    return Err(RepositoryError::Conflict(format!(
                        "shop {shop} is already linked to category {category}"
                    )));
                }
                Err(position) => self.links.insert(position, link),
            }
        }
        Ok(())
    }

    fn replace_links(
        &mut self,
        shop: ShopId,
        categories: &[CategoryId],
    ) -> Result<(), RepositoryError> {
        self.links.retain(|link| link.shop_id != shop);
        self.insert_links(shop, categories)
    }

    fn shop_mut(&mut self, id: ShopId) -> Result<&mut Shop, RepositoryError> {
        self.shops
            .get_mut(&id.as_i32())
            .ok_or(RepositoryError::NotFound)
    }

    fn category_names(&self, shop: ShopId) -> impl Iterator<Item = Option<String>> + '_ {
        self.links
            .iter()
            .filter(move |link| link.shop_id == shop)
            .map(|link| {
                self.categories
                    .get(&link.category_id.as_i32())
                    .map(|category| category.name.clone())
            })
    }
}

const fn link_key(link: &ShopCategory) -> (i32, i32) {
    (link.shop_id.as_i32(), link.category_id.as_i32())
}

/// Catalog store holding its tables in process memory.
///
/// Cheap to clone; clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalogStore {
    tables: Arc<Mutex<Tables>>,
    calls: Arc<AtomicUsize>,
}

impl InMemoryCatalogStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of store operations invoked so far.
    ///
    /// Useful for asserting that a request never reached the datastore.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Snapshot of every shop, ordered by id.
    #[must_use]
    pub fn shops(&self) -> Vec<Shop> {
        self.lock().shops.values().cloned().collect()
    }

    /// Snapshot of every association, ordered by shop then category.
    #[must_use]
    pub fn links(&self) -> Vec<ShopCategory> {
        self.lock().links.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Lock the tables and count the call.
    fn begin(&self) -> MutexGuard<'_, Tables> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.lock()
    }

    /// Run `op` against a copy of the tables and keep the copy only on success.
    fn transaction<T>(
        &self,
        op: impl FnOnce(&mut Tables) -> Result<T, RepositoryError>,
    ) -> Result<T, RepositoryError> {
        let mut tables = self.begin();
        let mut working = tables.clone();
        let value = op(&mut working)?;
        *tables = working;
        Ok(value)
    }
}

fn page_bounds(page: Pagination) -> (usize, usize) {
    let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
    let limit = usize::try_from(page.limit()).unwrap_or(usize::MAX);
    (offset, limit)
}

#[async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        drop(self.begin());
        Ok(())
    }

    async fn list_categories(&self) -> Result<Vec<Category>, RepositoryError> {
        Ok(self.begin().categories.values().cloned().collect())
    }

    async fn create_category(&self, name: &str) -> Result<Category, RepositoryError> {
        let mut tables = self.begin();
        tables.next_category_id += 1;
        let category = Category {
            id: CategoryId::new(tables.next_category_id),
            name: name.to_string(),
        };
        tables
            .categories
            .insert(category.id.as_i32(), category.clone());
        Ok(category)
    }

    async fn list_shop_categories(&self) -> Result<Vec<ShopCategory>, RepositoryError> {
        Ok(self.begin().links.clone())
    }

    async fn list_shops(
        &self,
        page: Pagination,
    ) -> Result<Vec<ShopWithCategories>, RepositoryError> {
        let tables = self.begin();
        let (offset, limit) = page_bounds(page);

        // Produce the same flat rows the left join would, then group them.
        let mut rows = Vec::new();
        for shop in tables.shops.values().skip(offset).take(limit) {
            let mut names = tables.category_names(shop.id).peekable();
            if names.peek().is_none() {
                rows.push(Ok::<_, RepositoryError>(JoinRow::new(shop.clone(), None)));
            }
            for name in names {
                rows.push(Ok(JoinRow::new(shop.clone(), name)));
            }
        }

        group_rows(rows)
    }

    async fn list_shops_in_category(
        &self,
        category: CategoryId,
        page: Pagination,
    ) -> Result<Vec<Shop>, RepositoryError> {
        let tables = self.begin();
        let (offset, limit) = page_bounds(page);

        Ok(tables
            .shops
            .values()
            .filter(|shop| {
                tables
                    .links
                    .iter()
                    .any(|link| link.shop_id == shop.id && link.category_id == category)
            })
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn create_shop(&self, shop: &NewShop) -> Result<ShopId, RepositoryError> {
        let mut tables = self.begin();
        tables.next_shop_id += 1;
        let id = ShopId::new(tables.next_shop_id);
        tables.shops.insert(id.as_i32(), shop.clone().with_id(id));
        Ok(id)
    }

    async fn add_shop_categories(
        &self,
        shop: ShopId,
        categories: &[CategoryId],
    ) -> Result<(), RepositoryError> {
        self.transaction(|tables| tables.insert_links(shop, categories))
    }

    async fn replace_shop_categories(
        &self,
        shop: ShopId,
        categories: &[CategoryId],
    ) -> Result<(), RepositoryError> {
        self.transaction(|tables| tables.replace_links(shop, categories))
    }

    async fn replace_shop(
        &self,
        id: ShopId,
        shop: &NewShop,
        categories: &[CategoryId],
    ) -> Result<(), RepositoryError> {
        self.transaction(|tables| {
            *tables.shop_mut(id)? = shop.clone().with_id(id);
            tables.replace_links(id, categories)
        })
    }

    async fn patch_shop(
        &self,
        id: ShopId,
        patch: Option<&ShopPatch>,
        categories: Option<&[CategoryId]>,
    ) -> Result<(), RepositoryError> {
        self.transaction(|tables| {
            let stored = tables.shop_mut(id)?;
            if let Some(patch) = patch {
                if let Some(name) = &patch.name {
                    stored.name.clone_from(name);
                }
                if let Some(image) = &patch.image {
                    stored.image.clone_from(image);
                }
                if let Some(price) = patch.price {
                    stored.price = price;
                }
                if let Some(description) = &patch.description {
                    stored.description.clone_from(description);
                }
            }

            match categories {
                Some(categories) => tables.replace_links(id, categories),
                None => Ok(()),
            }
        })
    }

    async fn delete_shop(&self, id: ShopId) -> Result<(), RepositoryError> {
        let mut tables = self.begin();
        if tables.shops.remove(&id.as_i32()).is_none() {
            return Err(RepositoryError::NotFound);
        }
        tables.links.retain(|link| link.shop_id != id);
        Ok(())
    }
}
