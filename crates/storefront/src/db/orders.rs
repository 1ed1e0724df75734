//! Order repository.
//!
//! Placement and status changes each run in a single transaction. Stock is
//! decremented with a conditional update, so concurrent placements for the
//! last unit cannot both succeed and stock never goes negative.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use sqlx::types::Json;
use thiserror::Error;

use bazaar_core::{
    CheckoutRates, OrderId, OrderNumber, OrderStatus, OrderTotals, PaymentMethod, PaymentStatus,
    ProductId, ShopId, UserId, effective_unit_price,
};

use super::RepositoryError;
use crate::models::order::{Order, OrderActor, OrderItem, ShippingInfo, Tracking, TrackingEvent};

/// Why an order could not be placed.
#[derive(Debug, Error)]
pub enum PlaceOrderError {
    #[error("product not found: {0}")]
    ProductNotFound(ProductId),

    #[error("insufficient stock for {name}")]
    InsufficientStock {
        product_id: ProductId,
        name: String,
        available: i32,
    },

    /// Total does not fit the order's money columns.
    #[error("order total {total} is out of range")]
    TotalOutOfRange { total: Decimal },

    /// Prices moved between payment authorization and placement.
    #[error("order total changed from {authorized} to {current}")]
    TotalChanged { authorized: Decimal, current: Decimal },

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<sqlx::Error> for PlaceOrderError {
    fn from(err: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(err))
    }
}

/// Why a status change was refused.
#[derive(Debug, Error)]
pub enum TransitionError {
    #[error("order not found")]
    NotFound,

    #[error("cannot change order status from {from} to {to}")]
    Invalid { from: OrderStatus, to: OrderStatus },

    #[error("not allowed to change order status from {from} to {to}")]
    Forbidden { from: OrderStatus, to: OrderStatus },

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<sqlx::Error> for TransitionError {
    fn from(err: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(err))
    }
}

/// Everything needed to place an order.
#[derive(Debug)]
pub struct NewOrder<'r> {
    pub user_id: UserId,
    /// Merged lines, ordered by product id.
    pub lines: &'r [(ProductId, i32)],
    pub shipping_info: &'r ShippingInfo,
    pub payment_method: PaymentMethod,
    /// Payment-intent id for card orders.
    pub payment_reference: Option<&'r str>,
    /// Total the payment intent was verified against, if any.
    pub authorized_total: Option<Decimal>,
    pub rates: &'r CheckoutRates,
}

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i32,
    order_number: String,
    user_id: i32,
    shipping_info: Json<ShippingInfo>,
    payment_method: PaymentMethod,
    payment_status: PaymentStatus,
    subtotal: Decimal,
    shipping: Decimal,
    tax: Decimal,
    total: Decimal,
    status: OrderStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    order_id: i32,
    product_id: i32,
    shop_id: i32,
    name: String,
    unit_price: Decimal,
    quantity: i32,
    image_url: Option<String>,
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        Self {
            product_id: ProductId::new(row.product_id),
            shop_id: ShopId::new(row.shop_id),
            name: row.name,
            unit_price: row.unit_price,
            quantity: row.quantity,
            image_url: row.image_url,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct TrackingEventRow {
    order_id: i32,
    status: OrderStatus,
    description: String,
    created_at: DateTime<Utc>,
}

impl From<TrackingEventRow> for TrackingEvent {
    fn from(row: TrackingEventRow) -> Self {
        Self {
            status: row.status,
            timestamp: row.created_at,
            description: row.description,
        }
    }
}

/// Product fields captured by the stock decrement.
#[derive(Debug, sqlx::FromRow)]
struct ReservedRow {
    shop_id: i32,
    name: String,
    price: Decimal,
    sale_price: Option<Decimal>,
    image_url: Option<String>,
}

const ORDER_COLUMNS: &str = "id, order_number, user_id, shipping_info, payment_method, \
     payment_status, subtotal, shipping, tax, total, status, created_at, updated_at";

fn assemble(
    row: OrderRow,
    items: Vec<OrderItem>,
    history: Vec<TrackingEvent>,
) -> Result<Order, RepositoryError> {
    let order_number = OrderNumber::parse(&row.order_number).map_err(|e| {
        RepositoryError::DataCorruption(format!("invalid order number for order {}: {e}", row.id))
    })?;

    Ok(Order {
        id: OrderId::new(row.id),
        order_number,
        user_id: UserId::new(row.user_id),
        items,
        shipping_info: row.shipping_info.0,
        payment_method: row.payment_method,
        payment_status: row.payment_status,
        totals: OrderTotals {
            subtotal: row.subtotal,
            shipping: row.shipping,
            tax: row.tax,
            total: row.total,
        },
        status: row.status,
        tracking: Tracking {
            current_status: row.status,
            history,
        },
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Place an order: decrement stock, insert the order with its item
    /// snapshots, first tracking event and payment record, then clear the
    /// buyer's cart. Nothing is written unless every step succeeds.
    ///
    /// # Errors
    ///
    /// Returns `PlaceOrderError::ProductNotFound` or
    /// `PlaceOrderError::InsufficientStock` for the first line that cannot be
    /// filled, `PlaceOrderError::TotalOutOfRange` if the total cannot be
    /// stored, `PlaceOrderError::TotalChanged` if the computed total differs
    /// from `authorized_total`, and `RepositoryError::Conflict` if the payment
    /// reference is already attached to another order.
    pub async fn place(&self, order: NewOrder<'_>) -> Result<Order, PlaceOrderError> {
        let mut tx = self.pool.begin().await?;

        let mut items = Vec::with_capacity(order.lines.len());
        for &(product_id, quantity) in order.lines {
            let reserved = sqlx::query_as::<_, ReservedRow>(
                "UPDATE products
                 SET quantity = quantity - $2, updated_at = now()
                 WHERE id = $1 AND quantity >= $2
                 RETURNING shop_id, name, price, sale_price, image_url",
            )
            .bind(product_id)
            .bind(quantity)
            .fetch_optional(&mut *tx)
            .await?;

            let Some(row) = reserved else {
                let current = sqlx::query_as::<_, (String, i32)>(
                    "SELECT name, quantity FROM products WHERE id = $1",
                )
                .bind(product_id)
                .fetch_optional(&mut *tx)
                .await?;

                return Err(match current {
                    None => PlaceOrderError::ProductNotFound(product_id),
                    Some((name, available)) => PlaceOrderError::InsufficientStock {
                        product_id,
                        name,
                        available,
                    },
                });
            };

            items.push(OrderItem {
                product_id,
                shop_id: ShopId::new(row.shop_id),
                name: row.name,
                unit_price: effective_unit_price(row.price, row.sale_price),
                quantity,
                image_url: row.image_url,
            });
        }

        let totals = OrderTotals::from_lines(
            items.iter().map(|item| (item.unit_price, item.quantity)),
            order.rates,
        );
        if !totals.is_storable() {
            return Err(PlaceOrderError::TotalOutOfRange {
                total: totals.total,
            });
        }
        if let Some(authorized) = order.authorized_total
            && authorized != totals.total
        {
            return Err(PlaceOrderError::TotalChanged {
                authorized,
                current: totals.total,
            });
        }

        let sequence = sqlx::query_scalar::<_, i64>("SELECT nextval('order_number_seq')")
            .fetch_one(&mut *tx)
            .await?;
        let order_number = OrderNumber::from_sequence(sequence);
        let payment_status = order.payment_method.initial_status();

        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "INSERT INTO orders
                 (order_number, user_id, shipping_info, payment_method, payment_status,
                  subtotal, shipping, tax, total, status)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 'pending')
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(&order_number)
        .bind(order.user_id)
        .bind(Json(order.shipping_info))
        .bind(order.payment_method)
        .bind(payment_status)
        .bind(totals.subtotal)
        .bind(totals.shipping)
        .bind(totals.tax)
        .bind(totals.total)
        .fetch_one(&mut *tx)
        .await?;

        for item in &items {
            sqlx::query(
                "INSERT INTO order_items
                     (order_id, product_id, shop_id, name, unit_price, quantity, image_url)
                 VALUES ($1, $2, $3, $4, $5, $6, $7)",
            )
            .bind(row.id)
            .bind(item.product_id)
            .bind(item.shop_id)
            .bind(&item.name)
            .bind(item.unit_price)
            .bind(item.quantity)
            .bind(&item.image_url)
            .execute(&mut *tx)
            .await?;
        }

        let placed = sqlx::query_as::<_, TrackingEventRow>(
            "INSERT INTO order_tracking_events (order_id, status, description)
             VALUES ($1, 'pending', $2)
             RETURNING order_id, status, description, created_at",
        )
        .bind(row.id)
        .bind(OrderStatus::Pending.default_description())
        .fetch_one(&mut *tx)
        .await?;

        // A single-line order records its product on the payment.
        let payment_product = match items.as_slice() {
            [only] => Some(only.product_id),
            _ => None,
        };
        sqlx::query(
            "INSERT INTO payments
                 (user_id, order_id, product_id, amount, method, status, provider_reference)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(order.user_id)
        .bind(row.id)
        .bind(payment_product)
        .bind(totals.total)
        .bind(order.payment_method)
        .bind(payment_status)
        .bind(order.payment_reference)
        .execute(&mut *tx)
        .await
        .map_err(|e| RepositoryError::unique_or_database(e, "payment intent already used"))?;

        sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
            .bind(order.user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        assemble(row, items, vec![placed.into()]).map_err(Into::into)
    }

    /// Get an order with its items and tracking history.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored order number is invalid.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(row) => Ok(self.with_children(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    /// A customer's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders
             WHERE user_id = $1
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        self.with_children(rows).await
    }

    /// Orders containing at least one item sold by a shop, newest first.
    ///
    /// Items from other shops in the same order are included.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_by_shop(&self, shop_id: ShopId) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders
             WHERE id IN (SELECT order_id FROM order_items WHERE shop_id = $1)
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(shop_id)
        .fetch_all(self.pool)
        .await?;

        self.with_children(rows).await
    }

    /// Move an order to `next`, appending a tracking event.
    ///
    /// The order row is locked while the transition is checked. Cancelling
    /// returns every item's quantity to stock; products deleted since the
    /// order was placed are skipped.
    ///
    /// # Errors
    ///
    /// Returns `TransitionError::NotFound` if the order doesn't exist,
    /// `TransitionError::Invalid` if the status table forbids the move and
    /// `TransitionError::Forbidden` if `actor` may not apply it.
    pub async fn transition(
        &self,
        id: OrderId,
        next: OrderStatus,
        description: &str,
        actor: OrderActor,
    ) -> Result<Order, TransitionError> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_scalar::<_, OrderStatus>(
            "SELECT status FROM orders WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(TransitionError::NotFound)?;

        if !current.can_transition_to(next) {
            return Err(TransitionError::Invalid {
                from: current,
                to: next,
            });
        }
        if !actor.may_apply(current, next) {
            return Err(TransitionError::Forbidden {
                from: current,
                to: next,
            });
        }

        sqlx::query("UPDATE orders SET status = $2, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(next)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO order_tracking_events (order_id, status, description)
             VALUES ($1, $2, $3)",
        )
        .bind(id)
        .bind(next)
        .bind(description)
        .execute(&mut *tx)
        .await?;

        if next == OrderStatus::Cancelled {
            let restocked = sqlx::query(
                "UPDATE products p
                 SET quantity = p.quantity + oi.quantity, updated_at = now()
                 FROM order_items oi
                 WHERE oi.order_id = $1 AND p.id = oi.product_id",
            )
            .bind(id)
            .execute(&mut *tx)
            .await?;
            tracing::debug!(order_id = %id, products = restocked.rows_affected(), "Restocked cancelled order");
        }

        tx.commit().await?;

        self.get(id).await?.ok_or(TransitionError::NotFound)
    }

    async fn with_children(&self, rows: Vec<OrderRow>) -> Result<Vec<Order>, RepositoryError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<i32> = rows.iter().map(|row| row.id).collect();

        let item_rows = sqlx::query_as::<_, OrderItemRow>(
            "SELECT order_id, product_id, shop_id, name, unit_price, quantity, image_url
             FROM order_items
             WHERE order_id = ANY($1)
             ORDER BY order_id, id",
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        let event_rows = sqlx::query_as::<_, TrackingEventRow>(
            "SELECT order_id, status, description, created_at
             FROM order_tracking_events
             WHERE order_id = ANY($1)
             ORDER BY order_id, id",
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        let mut items: HashMap<i32, Vec<OrderItem>> = HashMap::new();
        for row in item_rows {
            items.entry(row.order_id).or_default().push(row.into());
        }
        let mut events: HashMap<i32, Vec<TrackingEvent>> = HashMap::new();
        for row in event_rows {
            events.entry(row.order_id).or_default().push(row.into());
        }

        rows.into_iter()
            .map(|row| {
                let order_items = items.remove(&row.id).unwrap_or_default();
                let history = events.remove(&row.id).unwrap_or_default();
                assemble(row, order_items, history)
            })
            .collect()
    }
}
