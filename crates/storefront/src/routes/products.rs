//! Catalog handlers.
//!
//! Listing and detail are public; writes require owning the product's shop.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;
use tracing::instrument;

use bazaar_core::{PageRequest, ProductId, ShopId};

use super::extract::{ApiJson, ApiPath, ApiQuery};
use super::shop::require_owned_shop;
use crate::db::products::ProductRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::CurrentUser;
use crate::models::product::{
    NewProduct, Product, ProductFilter, ProductPage, ProductUpdate, StockUpdate,
};
use crate::state::AppState;

/// Query parameters for `GET /api/product`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub category: Option<String>,
    pub shop_id: Option<ShopId>,
    pub featured: Option<bool>,
    pub search: Option<String>,
}

impl ListQuery {
    fn into_parts(self) -> (ProductFilter, PageRequest) {
        (
            ProductFilter {
                category: self.category,
                shop_id: self.shop_id,
                featured: self.featured,
                search: self.search,
            },
            PageRequest::new(self.page, self.limit),
        )
    }
}

/// One page of the catalog.
pub async fn list(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> Result<Json<ProductPage>> {
    let (filter, page) = query.into_parts();
    let products = ProductRepository::new(state.pool())
        .list(&filter, page)
        .await?;
    Ok(Json(products))
}

/// Product detail.
pub async fn show(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<ProductId>,
) -> Result<Json<Product>> {
    let product = find(&state, id).await?;
    Ok(Json(product))
}

/// Add a product to a shop the user owns.
#[instrument(skip(state, user, input), fields(user_id = %user.id, shop_id = %input.shop_id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiJson(input): ApiJson<NewProduct>,
) -> Result<impl IntoResponse> {
    input.validate().map_err(AppError::BadRequest)?;
    require_owned_shop(state.pool(), input.shop_id, &user).await?;

    let product = ProductRepository::new(state.pool()).create(&input).await?;
    tracing::info!(product_id = %product.id, "Product created");
    Ok((StatusCode::CREATED, Json(product)))
}

/// Partially update a product.
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiPath(id): ApiPath<ProductId>,
    ApiJson(update): ApiJson<ProductUpdate>,
) -> Result<Json<Product>> {
    update.validate().map_err(AppError::BadRequest)?;
    require_owned_product(&state, id, &user).await?;

    let product = ProductRepository::new(state.pool()).update(id, &update).await?;
    Ok(Json(product))
}

/// Set a product's absolute stock level.
#[instrument(skip(state, user, stock), fields(user_id = %user.id))]
pub async fn update_stock(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiPath(id): ApiPath<ProductId>,
    ApiJson(stock): ApiJson<StockUpdate>,
) -> Result<Json<Product>> {
    stock.validate().map_err(AppError::BadRequest)?;
    require_owned_product(&state, id, &user).await?;

    let product = ProductRepository::new(state.pool())
        .set_stock(id, stock.quantity)
        .await?;
    tracing::info!(product_id = %id, quantity = stock.quantity, "Stock level set");
    Ok(Json(product))
}

/// Delete a product.
pub async fn delete(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiPath(id): ApiPath<ProductId>,
) -> Result<StatusCode> {
    require_owned_product(&state, id, &user).await?;
    ProductRepository::new(state.pool()).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn find(state: &AppState, id: ProductId) -> Result<Product> {
    ProductRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product not found: {id}")))
}

async fn require_owned_product(
    state: &AppState,
    id: ProductId,
    user: &CurrentUser,
) -> Result<Product> {
    let product = find(state, id).await?;
    require_owned_shop(state.pool(), product.shop_id, user).await?;
    Ok(product)
}
