//! Core types for the shop catalog.
//!
//! This module provides type-safe ids and the persisted/read models.

pub mod id;
pub mod shop;

pub use id::*;
pub use shop::{Category, NewShop, Shop, ShopCategory, ShopWithCategories};
