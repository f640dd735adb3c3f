//! Shop-category association handlers.

use axum::{Json, extract::State};

use shop_catalog_core::ShopCategory;

use crate::error::Result;
use crate::state::AppState;

/// List every `(shop_id, category_id)` pair, ordered by shop then category.
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<ShopCategory>>> {
    let links = state.store().list_shop_categories().await?;
    tracing::debug!(count = links.len(), "Listed shop categories");
    Ok(Json(links))
}
