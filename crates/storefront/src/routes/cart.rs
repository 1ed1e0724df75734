//! Cart handlers.
//!
//! Carts hold no stock reservation. Each change is checked against the stock
//! level read at that moment; order placement re-checks atomically.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use tracing::instrument;

use bazaar_core::{ProductId, check_cart_add, check_cart_update};

use super::extract::{ApiJson, ApiQuery};
use crate::db::RepositoryError;
use crate::db::cart::CartRepository;
use crate::db::products::ProductRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::cart::{CartLine, CartLineInput, CartSummary};
use crate::models::product::Product;
use crate::services::checkout::CheckoutService;
use crate::state::AppState;

/// The session user's cart lines.
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<CartLine>>> {
    let items = CartRepository::new(state.pool()).list(user.id).await?;
    Ok(Json(items.into_iter().map(CartLine::from).collect()))
}

/// Line count, item count and checkout totals.
pub async fn summary(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<CartSummary>> {
    let summary = CheckoutService::new(&state).cart_summary(&user).await?;
    Ok(Json(summary))
}

/// Add units of a product, merging with an existing line.
#[instrument(skip(state, user, input), fields(user_id = %user.id, product_id = %input.product_id))]
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiJson(input): ApiJson<CartLineInput>,
) -> Result<(StatusCode, Json<Vec<CartLine>>)> {
    let product = find_product(&state, input.product_id).await?;
    let cart = CartRepository::new(state.pool());

    let existing = cart
        .quantity_of(user.id, product.id)
        .await?
        .unwrap_or_default();
    let quantity = check_cart_add(existing, input.quantity, product.quantity)
        .map_err(|e| AppError::from_stock(e, &product.name))?;

    cart.upsert(user.id, product.id, quantity).await?;
    tracing::debug!(quantity, "Cart line added");

    let items = cart.list(user.id).await?;
    Ok((
        StatusCode::CREATED,
        Json(items.into_iter().map(CartLine::from).collect()),
    ))
}

/// Replace the quantity of an existing line.
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiJson(input): ApiJson<CartLineInput>,
) -> Result<Json<Vec<CartLine>>> {
    let product = find_product(&state, input.product_id).await?;
    let quantity = check_cart_update(input.quantity, product.quantity)
        .map_err(|e| AppError::from_stock(e, &product.name))?;

    let cart = CartRepository::new(state.pool());
    cart.set_quantity(user.id, product.id, quantity)
        .await
        .map_err(not_in_cart)?;

    let items = cart.list(user.id).await?;
    Ok(Json(items.into_iter().map(CartLine::from).collect()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveQuery {
    pub product_id: Option<ProductId>,
}

/// Remove one line, or clear the cart when no product is given.
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiQuery(query): ApiQuery<RemoveQuery>,
) -> Result<StatusCode> {
    let cart = CartRepository::new(state.pool());
    match query.product_id {
        Some(product_id) => cart.remove(user.id, product_id).await.map_err(not_in_cart)?,
        None => {
            let removed = cart.clear(user.id).await?;
            tracing::debug!(user_id = %user.id, removed, "Cart cleared");
        }
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn find_product(state: &AppState, id: ProductId) -> Result<Product> {
    ProductRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product not found: {id}")))
}

fn not_in_cart(err: RepositoryError) -> AppError {
    match err {
        RepositoryError::NotFound => AppError::NotFound("item not in cart".to_string()),
        other => other.into(),
    }
}
