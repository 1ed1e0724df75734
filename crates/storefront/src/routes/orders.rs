//! Order handlers.
//!
//! An order is visible to the customer who placed it and to the owner of any
//! shop with items in it. Everyone else sees a 404.

use axum::{Json, extract::State, http::StatusCode};
use tracing::instrument;

use bazaar_core::OrderId;

use super::extract::{ApiJson, ApiPath};
use crate::db::orders::OrderRepository;
use crate::db::shops::ShopRepository;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::RequireAuth;
use crate::models::CurrentUser;
use crate::models::order::{Order, OrderActor, PlaceOrder, StatusUpdate};
use crate::services::checkout::CheckoutService;
use crate::state::AppState;

/// The session user's orders, newest first.
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<Order>>> {
    let orders = OrderRepository::new(state.pool())
        .list_by_user(user.id)
        .await?;
    Ok(Json(orders))
}

/// Place an order.
#[instrument(skip(state, user, request), fields(user_id = %user.id, method = ?request.payment_method))]
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiJson(request): ApiJson<PlaceOrder>,
) -> Result<(StatusCode, Json<Order>)> {
    add_breadcrumb("checkout", "Placing order", None);
    let order = CheckoutService::new(&state)
        .place_order(&user, &request)
        .await?;
    Ok((StatusCode::CREATED, Json(order)))
}

pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiPath(id): ApiPath<OrderId>,
) -> Result<Json<Order>> {
    let order = find(&state, id).await?;
    if actor_for(&state, &order, &user).await?.is_none() {
        return Err(not_found());
    }
    Ok(Json(order))
}

/// Move an order to a new status and record a tracking event.
#[instrument(skip(state, user, update), fields(user_id = %user.id, order_id = %id, status = %update.status))]
pub async fn update_status(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiPath(id): ApiPath<OrderId>,
    ApiJson(update): ApiJson<StatusUpdate>,
) -> Result<Json<Order>> {
    let order = find(&state, id).await?;
    let actor = actor_for(&state, &order, &user)
        .await?
        .ok_or_else(|| AppError::Forbidden("you may not update this order".to_string()))?;

    let order = OrderRepository::new(state.pool())
        .transition(id, update.status, &update.description(), actor)
        .await?;

    tracing::info!(?actor, "Order status updated");
    Ok(Json(order))
}

async fn find(state: &AppState, id: OrderId) -> Result<Order> {
    OrderRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(not_found)
}

/// How the user relates to the order, if at all.
///
/// A user who both placed the order and sells items in it acts as the seller.
async fn actor_for(
    state: &AppState,
    order: &Order,
    user: &CurrentUser,
) -> Result<Option<OrderActor>> {
    let shop_ids = ShopRepository::new(state.pool())
        .ids_by_owner(user.id)
        .await?;
    if order.involves_any_shop(&shop_ids) {
        return Ok(Some(OrderActor::Seller));
    }
    Ok((order.user_id == user.id).then_some(OrderActor::Buyer))
}

fn not_found() -> AppError {
    AppError::NotFound("order not found".to_string())
}
