//! Shop and seller dashboard handlers.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::Utc;
use serde::Deserialize;
use sqlx::PgPool;
use tower_sessions::Session;
use tracing::instrument;

use bazaar_core::{AnalyticsRange, ShopId};

use super::extract::{ApiJson, ApiPath, ApiQuery};
use crate::db::analytics::AnalyticsRepository;
use crate::db::orders::OrderRepository;
use crate::db::products::ProductRepository;
use crate::db::shops::ShopRepository;
use crate::db::users::UserRepository;
use crate::error::{AppError, Result};
use crate::middleware::{RequireAuth, refresh_current_user};
use crate::models::CurrentUser;
use crate::models::analytics::ShopStats;
use crate::models::order::Order;
use crate::models::product::Product;
use crate::models::shop::{NewShop, Shop, ShopUpdate};
use crate::state::AppState;

/// Default low-stock threshold.
const DEFAULT_LOW_STOCK_THRESHOLD: i32 = 5;

/// Load a shop and check the user owns it.
///
/// # Errors
///
/// Returns 404 if the shop doesn't exist and 403 if another user owns it.
pub(crate) async fn require_owned_shop(
    pool: &PgPool,
    shop_id: ShopId,
    user: &CurrentUser,
) -> Result<Shop> {
    let shop = ShopRepository::new(pool)
        .get(shop_id)
        .await?
        .ok_or_else(|| AppError::NotFound("shop not found".to_string()))?;

    if shop.owner.user_id != user.id {
        return Err(AppError::Forbidden(
            "you do not own this shop".to_string(),
        ));
    }
    Ok(shop)
}

/// Shops owned by the session user.
pub async fn list_mine(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<Shop>>> {
    let shops = ShopRepository::new(state.pool())
        .list_by_owner(user.id)
        .await?;
    Ok(Json(shops))
}

/// Create a shop; the creator becomes a seller.
#[instrument(skip(state, session, user, input), fields(user_id = %user.id))]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    ApiJson(input): ApiJson<NewShop>,
) -> Result<impl IntoResponse> {
    input.validate().map_err(AppError::BadRequest)?;

    let users = UserRepository::new(state.pool());
    let owner = users
        .get_by_id(user.id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;

    let shop = ShopRepository::new(state.pool())
        .create(&owner, &input)
        .await?;

    // Role changed in the same transaction; reflect it in the session
    let mut current = CurrentUser::from(&owner);
    current.role = bazaar_core::UserRole::Seller;
    refresh_current_user(&session, &current).await?;

    tracing::info!(shop_id = %shop.id, "Shop created");
    Ok((StatusCode::CREATED, Json(shop)))
}

/// Public shop profile.
pub async fn show(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ShopId>,
) -> Result<Json<Shop>> {
    let shop = ShopRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("shop not found".to_string()))?;
    Ok(Json(shop))
}

/// Update a shop the user owns.
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiPath(id): ApiPath<ShopId>,
    ApiJson(update): ApiJson<ShopUpdate>,
) -> Result<Json<Shop>> {
    update.validate().map_err(AppError::BadRequest)?;
    require_owned_shop(state.pool(), id, &user).await?;

    let shop = ShopRepository::new(state.pool()).update(id, &update).await?;
    Ok(Json(shop))
}

#[derive(Debug, Deserialize)]
pub struct AnalyticsQuery {
    #[serde(default)]
    pub range: AnalyticsRange,
}

/// Revenue and volume for a shop over a reporting window.
pub async fn analytics(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiPath(id): ApiPath<ShopId>,
    ApiQuery(query): ApiQuery<AnalyticsQuery>,
) -> Result<Json<ShopStats>> {
    require_owned_shop(state.pool(), id, &user).await?;

    let since = query.range.start(Utc::now());
    let aggregates = AnalyticsRepository::new(state.pool())
        .shop_aggregates(id, since)
        .await?;

    Ok(Json(ShopStats::new(
        id,
        query.range,
        since,
        aggregates.revenue,
        aggregates.order_count,
        aggregates.items_sold,
    )))
}

/// Orders containing the shop's items, newest first.
pub async fn orders(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiPath(id): ApiPath<ShopId>,
) -> Result<Json<Vec<Order>>> {
    require_owned_shop(state.pool(), id, &user).await?;
    let orders = OrderRepository::new(state.pool()).list_by_shop(id).await?;
    Ok(Json(orders))
}

#[derive(Debug, Deserialize)]
pub struct LowStockQuery {
    pub threshold: Option<i32>,
}

/// The shop's products at or below the stock threshold.
pub async fn low_stock(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiPath(id): ApiPath<ShopId>,
    ApiQuery(query): ApiQuery<LowStockQuery>,
) -> Result<Json<Vec<Product>>> {
    let threshold = query.threshold.unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD);
    if threshold < 0 {
        return Err(AppError::BadRequest(
            "threshold must not be negative".to_string(),
        ));
    }
    require_owned_shop(state.pool(), id, &user).await?;

    let products = ProductRepository::new(state.pool())
        .low_stock(id, threshold)
        .await?;
    Ok(Json(products))
}
