//! Cart and wishlist domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use bazaar_core::{
    CartItemId, CheckoutRates, OrderTotals, ProductId, UserId, WishlistItemId, line_total,
};

use super::product::Product;

/// A cart line with the live product it references.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: CartItemId,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
    pub product: Product,
}

impl CartItem {
    /// Current price of this line.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        line_total(self.product.unit_price(), self.quantity)
    }
}

/// A cart line as returned by the API, with its current line total.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    #[serde(flatten)]
    pub item: CartItem,
    pub line_total: Decimal,
}

impl From<CartItem> for CartLine {
    fn from(item: CartItem) -> Self {
        Self {
            line_total: item.line_total(),
            item,
        }
    }
}

/// Cart totals as they would be charged at checkout right now.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSummary {
    /// Number of distinct lines.
    pub line_count: usize,
    /// Sum of quantities across lines.
    pub item_count: i64,
    pub totals: OrderTotals,
}

impl CartSummary {
    /// Summarize cart lines with the configured rates.
    #[must_use]
    pub fn from_items(items: &[CartItem], rates: &CheckoutRates) -> Self {
        Self {
            line_count: items.len(),
            item_count: items.iter().map(|item| i64::from(item.quantity)).sum(),
            totals: OrderTotals::from_lines(
                items
                    .iter()
                    .map(|item| (item.product.unit_price(), item.quantity)),
                rates,
            ),
        }
    }
}

/// Body for adding to or updating the cart.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineInput {
    pub product_id: ProductId,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

const fn default_quantity() -> i32 {
    1
}

/// A wishlist entry with the product it references.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistItem {
    pub id: WishlistItemId,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub created_at: DateTime<Utc>,
    pub product: Product,
}

#[cfg(test)]
mod tests {
    use bazaar_core::ShopId;

    use super::*;

    fn product(price_cents: i64) -> Product {
        let now = Utc::now();
        Product {
            id: ProductId::new(1),
            shop_id: ShopId::new(1),
            name: "Mug".to_string(),
            description: String::new(),
            category: "kitchen".to_string(),
            price: Decimal::new(price_cents, 2),
            sale_price: None,
            quantity: 10,
            sku: "MUG".to_string(),
            image_url: None,
            featured: false,
            created_at: now,
            updated_at: now,
        }
    }

    fn line(quantity: i32, price_cents: i64) -> CartItem {
        CartItem {
            id: CartItemId::new(1),
            user_id: UserId::new(1),
            product_id: ProductId::new(1),
            quantity,
            created_at: Utc::now(),
            product: product(price_cents),
        }
    }

    #[test]
    fn test_empty_cart_summary() {
        let summary = CartSummary::from_items(&[], &CheckoutRates::default());
        assert_eq!(summary.line_count, 0);
        assert_eq!(summary.item_count, 0);
        assert_eq!(summary.totals.total, Decimal::ZERO);
    }

    #[test]
    fn test_summary_for_two_ten_dollar_units() {
        let summary = CartSummary::from_items(&[line(2, 1000)], &CheckoutRates::default());
        assert_eq!(summary.item_count, 2);
        assert_eq!(summary.totals.subtotal, Decimal::new(2000, 2));
        assert_eq!(summary.totals.total, Decimal::new(2699, 2));
    }

    #[test]
    fn test_line_total_uses_sale_price() {
        let mut item = line(3, 1000);
        item.product.sale_price = Some(Decimal::new(500, 2));
        assert_eq!(item.line_total(), Decimal::new(1500, 2));
    }

    #[test]
    fn test_cart_line_serializes_flat_with_line_total() {
        let json = serde_json::to_value(CartLine::from(line(2, 1000))).expect("serialize");
        assert_eq!(json["quantity"], 2);
        assert_eq!(json["productId"], 1);
        assert_eq!(json["lineTotal"], "20.00");
        assert_eq!(json["product"]["name"], "Mug");
    }

    #[test]
    fn test_line_input_defaults_quantity_to_one() {
        let input: CartLineInput = serde_json::from_str(r#"{"productId": 4}"#).expect("deserialize");
        assert_eq!(input.product_id, ProductId::new(4));
        assert_eq!(input.quantity, 1);
    }
}
