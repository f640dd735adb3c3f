//! Shop route handlers.
//!
//! Every method on `/api/v1/shops` is served by one handler here; anything
//! else falls through to [`method_not_allowed`] without touching the store.

use axum::{
    Json,
    body::Bytes,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use shop_catalog_core::{
    CategoryId, CreateShopRequest, Pagination, PatchShopRequest, ReplaceShopRequest, ShopId,
};

use crate::db::RepositoryError;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Query parameters accepted on `/shops`.
///
/// Kept as raw strings so malformed values can fall back to defaults
/// (pagination) or produce a precise 400 (`id`, `category_id`).
#[derive(Debug, Default, Deserialize)]
pub struct ShopsQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub category_id: Option<String>,
    pub id: Option<String>,
}

impl ShopsQuery {
    fn pagination(&self) -> Pagination {
        Pagination::from_params(self.page.as_deref(), self.limit.as_deref())
    }

    /// The category filter, if one was given. An empty value counts as absent.
    fn category(&self) -> Result<Option<CategoryId>> {
        match self.category_id.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => raw
                .parse()
                .map(Some)
                .map_err(|_| AppError::BadRequest(format!("invalid category_id '{raw}'"))),
        }
    }

    /// The target shop for PUT, PATCH and DELETE.
    fn shop_id(&self) -> Result<ShopId> {
        let raw = self
            .id
            .as_deref()
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .ok_or_else(|| AppError::BadRequest("shop id is required".to_string()))?;

        raw.parse()
            .map_err(|_| AppError::BadRequest(format!("invalid shop id '{raw}'")))
    }
}

/// Map a missing shop to a 404 naming it.
fn for_shop(id: ShopId) -> impl FnOnce(RepositoryError) -> AppError {
    move |err| match err {
        RepositoryError::NotFound => AppError::NotFound(format!("shop {id} does not exist")),
        other => AppError::Database(other),
    }
}

/// List shops, or the shops in one category when `category_id` is given.
#[instrument(skip(state))]
pub async fn list(State(state): State<AppState>, Query(query): Query<ShopsQuery>) -> Result<Response> {
    let page = query.pagination();

    match query.category()? {
        Some(category) => {
            let shops = state.store().list_shops_in_category(category, page).await?;
            tracing::debug!(%category, count = shops.len(), "Listed shops in category");
            Ok(Json(shops).into_response())
        }
        None => {
            let shops = state.store().list_shops(page).await?;
            tracing::debug!(count = shops.len(), "Listed shops");
            Ok(Json(shops).into_response())
        }
    }
}

/// Create a shop from either the wrapped or the bare body shape.
///
/// The shop insert commits on its own. If linking categories then fails, the
/// shop stays and the response is a 500.
#[instrument(skip(state, body))]
pub async fn create(State(state): State<AppState>, body: Bytes) -> Result<String> {
    let request = CreateShopRequest::parse(&body)?;

    let id = state.store().create_shop(&request.shop).await?;
    tracing::info!(shop_id = %id, name = %request.shop.name, "Shop created");

    if !request.categories.is_empty() {
        state
            .store()
            .add_shop_categories(id, &request.categories)
            .await
            .inspect_err(|err| {
                tracing::warn!(
                    shop_id = %id,
                    error = %err,
                    "Linking categories failed, shop row kept without categories"
                );
            })?;
        tracing::info!(
            shop_id = %id,
            categories = request.categories.len(),
            "Shop linked to categories"
        );
    }

    Ok(format!("shop created with id {id}"))
}

/// Overwrite every field of a shop and replace its categories.
#[instrument(skip(state, body))]
pub async fn replace(
    State(state): State<AppState>,
    Query(query): Query<ShopsQuery>,
    body: Bytes,
) -> Result<String> {
    let id = query.shop_id()?;
    let request = ReplaceShopRequest::parse(&body)?;

    state
        .store()
        .replace_shop(id, &request.shop, &request.categories)
        .await
        .map_err(for_shop(id))?;

    tracing::info!(
        shop_id = %id,
        categories = request.categories.len(),
        "Shop replaced"
    );
    Ok(format!("shop {id} and its categories updated"))
}

/// Change the supplied fields of a shop and optionally replace its categories.
#[instrument(skip(state, body))]
pub async fn patch(
    State(state): State<AppState>,
    Query(query): Query<ShopsQuery>,
    body: Bytes,
) -> Result<String> {
    let id = query.shop_id()?;
    let request = PatchShopRequest::parse(&body)?;

    if request.is_noop() {
        tracing::debug!(shop_id = %id, "Patch changes nothing");
    }

    state
        .store()
        .patch_shop(id, request.shop.as_ref(), request.categories.as_deref())
        .await
        .map_err(for_shop(id))?;

    tracing::info!(
        shop_id = %id,
        fields = request.shop.is_some(),
        categories = request.categories.as_ref().map(Vec::len),
        "Shop patched"
    );
    Ok(format!("shop {id} updated"))
}

/// Delete a shop; its category links go with it.
#[instrument(skip(state))]
pub async fn delete(State(state): State<AppState>, Query(query): Query<ShopsQuery>) -> Result<String> {
    let id = query.shop_id()?;

    state.store().delete_shop(id).await.map_err(for_shop(id))?;

    tracing::info!(shop_id = %id, "Shop deleted");
    Ok(format!("shop {id} deleted"))
}

/// Any method not served on `/shops`.
pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
