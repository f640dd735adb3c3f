//! Shop and category models.
//!
//! These mirror the `shops`, `categories` and `shop_categories` tables, plus the
//! [`ShopWithCategories`] read-model which is assembled at query time and never
//! persisted.

use serde::{Deserialize, Serialize};

use super::id::{CategoryId, ShopId};

/// A persisted shop listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shop {
    pub id: ShopId,
    pub name: String,
    pub image: String,
    pub price: i32,
    pub description: String,
}

/// Shop fields supplied by a client when creating or fully replacing a shop.
///
/// Missing fields decode to their zero value (`""` or `0`). Only a field of
/// the wrong type makes the body malformed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewShop {
    pub name: String,
    pub image: String,
    pub price: i32,
    pub description: String,
}

impl NewShop {
    /// Attach a generated id, producing the persisted shape.
    #[must_use]
    pub fn with_id(self, id: ShopId) -> Shop {
        Shop {
            id,
            name: self.name,
            image: self.image,
            price: self.price,
            description: self.description,
        }
    }
}

/// A named category tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

/// A (shop, category) membership row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShopCategory {
    pub shop_id: ShopId,
    pub category_id: CategoryId,
}

/// A shop enriched with the names of its categories.
///
/// Serialized as `{"shop": {...}, "categories": ["name", ...]}`. A shop without
/// associations carries an empty list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopWithCategories {
    pub shop: Shop,
    pub categories: Vec<String>,
}

impl ShopWithCategories {
    /// Start a read-model entry with no categories yet.
    #[must_use]
    pub const fn new(shop: Shop) -> Self {
        Self {
            shop,
            categories: Vec::new(),
        }
    }
}
