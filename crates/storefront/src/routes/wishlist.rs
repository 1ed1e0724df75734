//! Wishlist handlers.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;

use bazaar_core::ProductId;

use super::extract::{ApiJson, ApiQuery};
use crate::db::RepositoryError;
use crate::db::products::ProductRepository;
use crate::db::wishlist::WishlistRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::cart::WishlistItem;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistRequest {
    pub product_id: ProductId,
}

/// The session user's wishlist, newest first.
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<WishlistItem>>> {
    let items = WishlistRepository::new(state.pool()).list(user.id).await?;
    Ok(Json(items))
}

pub async fn add(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiJson(request): ApiJson<WishlistRequest>,
) -> Result<(StatusCode, Json<Vec<WishlistItem>>)> {
    let product_id = request.product_id;
    if ProductRepository::new(state.pool())
        .get(product_id)
        .await?
        .is_none()
    {
        return Err(AppError::NotFound(format!(
            "product not found: {product_id}"
        )));
    }

    let wishlist = WishlistRepository::new(state.pool());
    wishlist.add(user.id, product_id).await?;
    let items = wishlist.list(user.id).await?;
    Ok((StatusCode::CREATED, Json(items)))
}

pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiQuery(query): ApiQuery<WishlistRequest>,
) -> Result<StatusCode> {
    WishlistRepository::new(state.pool())
        .remove(user.id, query.product_id)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => {
                AppError::NotFound("item not in wishlist".to_string())
            }
            other => other.into(),
        })?;
    Ok(StatusCode::NO_CONTENT)
}
