//! Normalization of shop request bodies.
//!
//! # Creation
//!
//! `POST /api/v1/shops` accepts two shapes:
//!
//! ```text
//! {"shop": {"name": ..., "image": ..., "price": ..., "description": ...}, "categories": [1, 2]}
//! {"name": ..., "image": ..., "price": ..., "description": ...}
//! ```
//!
//! The wrapped shape is selected structurally: a JSON object with a `"shop"`
//! key. Field values never influence which shape is chosen.
//!
//! # Patching
//!
//! `PATCH` bodies carry an optional `shop` object of fields to change and an
//! optional `categories` array that replaces the whole association set.
//! Patchable fields are a fixed set ([`ShopPatch`]); unknown keys are rejected.

use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::types::{CategoryId, NewShop};

/// Errors produced while normalizing a request body.
#[derive(Debug, Error)]
pub enum NormalizeError {
    /// The body is not valid JSON.
    #[error("malformed JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    /// The body is JSON but matches none of the accepted shapes.
    #[error("invalid shop payload: {0}")]
    InvalidShape(#[source] serde_json::Error),

    /// The body must be a JSON object.
    #[error("request body must be a JSON object")]
    NotAnObject,

    /// The `shop` object of a patch contains an unknown or mistyped field.
    #[error("invalid shop fields: {0}")]
    InvalidPatch(#[source] serde_json::Error),
}

/// Canonical form of a shop creation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateShopRequest {
    pub shop: NewShop,
    /// Categories to associate; empty for the bare shape.
    pub categories: Vec<CategoryId>,
}

/// Wrapped body shared by creation and full replacement.
#[derive(Debug, Deserialize)]
struct WrappedShop {
    shop: NewShop,
    #[serde(default)]
    categories: Vec<CategoryId>,
}

impl CreateShopRequest {
    /// Parse a creation body in either accepted shape.
    ///
    /// # Errors
    ///
    /// Returns [`NormalizeError::InvalidJson`] if the body is not JSON, or
    /// [`NormalizeError::InvalidShape`] if it matches neither shape. Missing
    /// shop fields are not an error; they take their zero value.
    pub fn parse(body: &[u8]) -> Result<Self, NormalizeError> {
        let value: Value = serde_json::from_slice(body).map_err(NormalizeError::InvalidJson)?;

        if is_wrapped(&value) {
            let wrapped: WrappedShop =
                serde_json::from_value(value).map_err(NormalizeError::InvalidShape)?;
            return Ok(Self {
                shop: wrapped.shop,
                categories: wrapped.categories,
            });
        }

        let shop: NewShop = serde_json::from_value(value).map_err(NormalizeError::InvalidShape)?;
        Ok(Self {
            shop,
            categories: Vec::new(),
        })
    }
}

fn is_wrapped(value: &Value) -> bool {
    value.as_object().is_some_and(|map| map.contains_key("shop"))
}

/// Canonical form of a full replacement (`PUT`) request.
///
/// Only the wrapped shape is accepted. A missing `categories` field clears
/// every association of the shop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplaceShopRequest {
    pub shop: NewShop,
    pub categories: Vec<CategoryId>,
}

impl ReplaceShopRequest {
    /// Parse a replacement body.
    ///
    /// # Errors
    ///
    /// Returns [`NormalizeError::InvalidJson`] if the body is not JSON, or
    /// [`NormalizeError::InvalidShape`] if it lacks a `shop` object or a field
    /// has the wrong type.
    pub fn parse(body: &[u8]) -> Result<Self, NormalizeError> {
        let value: Value = serde_json::from_slice(body).map_err(NormalizeError::InvalidJson)?;
        let wrapped: WrappedShop =
            serde_json::from_value(value).map_err(NormalizeError::InvalidShape)?;
        Ok(Self {
            shop: wrapped.shop,
            categories: wrapped.categories,
        })
    }
}

/// Fields of a shop that a patch may change.
///
/// `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShopPatch {
    pub name: Option<String>,
    pub image: Option<String>,
    pub price: Option<i32>,
    pub description: Option<String>,
}

impl ShopPatch {
    /// Whether the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.image.is_none()
            && self.price.is_none()
            && self.description.is_none()
    }
}

/// Canonical form of a partial update (`PATCH`) request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchShopRequest {
    /// Field changes, when the body had a `shop` object.
    pub shop: Option<ShopPatch>,
    /// New complete association set, when the body had a `categories` array.
    pub categories: Option<Vec<CategoryId>>,
}

impl PatchShopRequest {
    /// Parse a patch body.
    ///
    /// A `shop` value that is not an object and a `categories` value that is
    /// not an array are ignored. Category elements that are not numbers are
    /// skipped; fractional numbers are truncated.
    ///
    /// # Errors
    ///
    /// Returns [`NormalizeError::InvalidJson`] if the body is not JSON,
    /// [`NormalizeError::NotAnObject`] if it is not an object, or
    /// [`NormalizeError::InvalidPatch`] if the `shop` object has unknown or
    /// mistyped fields.
    pub fn parse(body: &[u8]) -> Result<Self, NormalizeError> {
        let value: Value = serde_json::from_slice(body).map_err(NormalizeError::InvalidJson)?;
        let Value::Object(mut fields) = value else {
            return Err(NormalizeError::NotAnObject);
        };

        let shop = take_object(&mut fields, "shop")
            .map(|object| serde_json::from_value::<ShopPatch>(Value::Object(object)))
            .transpose()
            .map_err(NormalizeError::InvalidPatch)?;

        let categories = match fields.remove("categories") {
            Some(Value::Array(items)) => Some(items.iter().filter_map(coerce_category_id).collect()),
            _ => None,
        };

        Ok(Self { shop, categories })
    }

    /// Whether the patch neither changes fields nor replaces categories.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.shop.as_ref().is_none_or(ShopPatch::is_empty) && self.categories.is_none()
    }
}

fn take_object(fields: &mut Map<String, Value>, key: &str) -> Option<Map<String, Value>> {
    match fields.remove(key) {
        Some(Value::Object(object)) => Some(object),
        _ => None,
    }
}

/// Coerce a JSON array element into a category id.
///
/// Integral numbers are used directly, fractional numbers are truncated toward
/// zero. Anything else, or a value outside the `i32` range, yields `None`.
fn coerce_category_id(value: &Value) -> Option<CategoryId> {
    let Value::Number(number) = value else {
        return None;
    };

    if let Some(integer) = number.as_i64() {
        return i32::try_from(integer).ok().map(CategoryId::new);
    }

    let float = number.as_f64()?.trunc();
    if float.is_finite() && float >= f64::from(i32::MIN) && float <= f64::from(i32::MAX) {
        #[allow(clippy::cast_possible_truncation)] // Range checked above
        return Some(CategoryId::new(float as i32));
    }
    None
}
