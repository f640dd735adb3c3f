//! Grouping of shop/category join rows into [`ShopWithCategories`].
//!
//! The listing query left-joins `shops` with `shop_categories` and
//! `categories`, so a shop appears once per category (or once with a `NULL`
//! category name when it has none). [`ShopGrouper`] collapses those rows back
//! into one entry per shop id.
//!
//! ## Guarantees
//!
//! - Exactly one entry per distinct shop id, in the order ids are first seen
//! - Category names keep datastore row order; duplicates are kept as-is
//! - A shop with only `NULL` category rows gets an empty list
//!
//! ## Example
//!
//! ```
//! use shop_catalog_core::{JoinRow, Shop, ShopGrouper, ShopId};
//!
//! let shop = Shop {
//!     id: ShopId::new(1),
//!     name: "Shop 1".to_string(),
//!     image: "image1.jpeg".to_string(),
//!     price: 100,
//!     description: "Description 1".to_string(),
//! };
//!
//! let mut grouper = ShopGrouper::new();
//! grouper.push(JoinRow::new(shop.clone(), Some("Books".to_string())));
//! grouper.push(JoinRow::new(shop, Some("Music".to_string())));
//!
//! let grouped = grouper.finish();
//! assert_eq!(grouped.len(), 1);
//! assert_eq!(grouped[0].categories, vec!["Books", "Music"]);
//! ```

use std::collections::HashMap;

use crate::types::{Shop, ShopId, ShopWithCategories};

/// One flat row of the shop/category left join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinRow {
    pub shop: Shop,
    /// `None` when the shop has no association on this row.
    pub category: Option<String>,
}

impl JoinRow {
    #[must_use]
    pub const fn new(shop: Shop, category: Option<String>) -> Self {
        Self { shop, category }
    }
}

/// Incremental accumulator for join rows.
///
/// Rows can be pushed as they arrive from a stream; nothing is emitted until
/// [`ShopGrouper::finish`].
#[derive(Debug, Default)]
pub struct ShopGrouper {
    positions: HashMap<ShopId, usize>,
    entries: Vec<ShopWithCategories>,
}

impl ShopGrouper {
    /// Create an empty grouper.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one join row into its shop's entry.
    pub fn push(&mut self, row: JoinRow) {
        let JoinRow { shop, category } = row;

        let position = match self.positions.get(&shop.id) {
            Some(&position) => position,
            None => {
                let position = self.entries.len();
                self.positions.insert(shop.id, position);
                self.entries.push(ShopWithCategories::new(shop));
                position
            }
        };

        if let Some(name) = category
            && let Some(entry) = self.entries.get_mut(position)
        {
            entry.categories.push(name);
        }
    }

    /// Number of distinct shops seen so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no rows have been pushed yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Emit the grouped entries in first-seen order.
    #[must_use]
    pub fn finish(self) -> Vec<ShopWithCategories> {
        self.entries
    }
}

/// Group a sequence of fallible rows.
///
/// Stops at the first failed row and returns its error; no partial result is
/// produced.
///
/// # Errors
///
/// Returns the first row error encountered.
pub fn group_rows<I, E>(rows: I) -> Result<Vec<ShopWithCategories>, E>
where
    I: IntoIterator<Item = Result<JoinRow, E>>,
{
    let mut grouper = ShopGrouper::new();
    for row in rows {
        grouper.push(row?);
    }
    Ok(grouper.finish())
}
