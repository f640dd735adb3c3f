//! Category route handlers.

use axum::{Json, extract::State};

use shop_catalog_core::Category;

use crate::error::Result;
use crate::state::AppState;

/// List every category, ordered by id.
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Category>>> {
    let categories = state.store().list_categories().await?;
    tracing::debug!(count = categories.len(), "Listed categories");
    Ok(Json(categories))
}
