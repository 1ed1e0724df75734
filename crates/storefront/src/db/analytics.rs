//! Seller analytics queries. Read-only.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use bazaar_core::ShopId;

use super::RepositoryError;

/// Raw aggregates for one shop since a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow)]
pub struct ShopAggregates {
    /// Sum of the shop's line totals.
    pub revenue: Decimal,
    /// Distinct orders containing the shop's items.
    pub order_count: i64,
    /// Units of the shop's products sold.
    pub items_sold: i64,
}

/// Repository for seller analytics.
pub struct AnalyticsRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AnalyticsRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Aggregate a shop's sales since `since`, excluding cancelled orders.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn shop_aggregates(
        &self,
        shop_id: ShopId,
        since: DateTime<Utc>,
    ) -> Result<ShopAggregates, RepositoryError> {
        let aggregates = sqlx::query_as::<_, ShopAggregates>(
            "SELECT COALESCE(SUM(oi.unit_price * oi.quantity), 0) AS revenue,
                    COUNT(DISTINCT o.id) AS order_count,
                    COALESCE(SUM(oi.quantity), 0)::bigint AS items_sold
             FROM order_items oi
             JOIN orders o ON o.id = oi.order_id
             WHERE oi.shop_id = $1
               AND o.status <> 'cancelled'
               AND o.created_at >= $2",
        )
        .bind(shop_id)
        .bind(since)
        .fetch_one(self.pool)
        .await?;

        Ok(aggregates)
    }
}
