//! Seller dashboard aggregates.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use bazaar_core::{AnalyticsRange, ShopId};

/// Revenue and volume for one shop over a reporting window.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopStats {
    pub shop_id: ShopId,
    pub range: AnalyticsRange,
    pub since: DateTime<Utc>,
    /// Sum of this shop's line totals, excluding cancelled orders.
    pub revenue: Decimal,
    pub order_count: i64,
    pub items_sold: i64,
    pub average_order_value: Decimal,
}

impl ShopStats {
    /// Build stats from raw aggregates, deriving the average order value.
    #[must_use]
    pub fn new(
        shop_id: ShopId,
        range: AnalyticsRange,
        since: DateTime<Utc>,
        revenue: Decimal,
        order_count: i64,
        items_sold: i64,
    ) -> Self {
        let average_order_value = if order_count > 0 {
            (revenue / Decimal::from(order_count))
                .round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
        } else {
            Decimal::ZERO
        };
        Self {
            shop_id,
            range,
            since,
            revenue,
            order_count,
            items_sold,
            average_order_value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_of_no_orders_is_zero() {
        let stats = ShopStats::new(
            ShopId::new(1),
            AnalyticsRange::Today,
            Utc::now(),
            Decimal::ZERO,
            0,
            0,
        );
        assert_eq!(stats.average_order_value, Decimal::ZERO);
    }

    #[test]
    fn test_average_rounds_to_cents() {
        let stats = ShopStats::new(
            ShopId::new(1),
            AnalyticsRange::Week,
            Utc::now(),
            Decimal::new(1000, 2),
            3,
            5,
        );
        assert_eq!(stats.average_order_value, Decimal::new(333, 2));
    }
}
