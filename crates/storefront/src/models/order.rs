//! Order domain types.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use bazaar_core::{
    OrderId, OrderNumber, OrderStatus, OrderTotals, PaymentMethod, PaymentStatus, ProductId,
    ShopId, UserId, line_total,
};

/// A placed order with its item snapshots and tracking history.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub order_number: OrderNumber,
    pub user_id: UserId,
    pub items: Vec<OrderItem>,
    pub shipping_info: ShippingInfo,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    #[serde(flatten)]
    pub totals: OrderTotals,
    pub status: OrderStatus,
    pub tracking: Tracking,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Whether any item in this order was sold by `shop_ids`.
    #[must_use]
    pub fn involves_any_shop(&self, shop_ids: &[ShopId]) -> bool {
        self.items.iter().any(|item| shop_ids.contains(&item.shop_id))
    }
}

/// Product snapshot taken when the order was placed. Never updated.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: ProductId,
    pub shop_id: ShopId,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: i32,
    pub image_url: Option<String>,
}

impl OrderItem {
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        line_total(self.unit_price, self.quantity)
    }
}

/// Delivery address and contact details.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ShippingInfo {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
}

impl ShippingInfo {
    /// Check every field is present.
    ///
    /// # Errors
    ///
    /// Returns a client-facing message naming the first blank field.
    pub fn validate(&self) -> Result<(), String> {
        let fields = [
            ("fullName", &self.full_name),
            ("email", &self.email),
            ("phone", &self.phone),
            ("address", &self.address),
            ("city", &self.city),
            ("state", &self.state),
            ("zipCode", &self.zip_code),
            ("country", &self.country),
        ];
        for (name, value) in fields {
            if value.trim().is_empty() {
                return Err(format!("shippingInfo.{name} is required"));
            }
        }
        if bazaar_core::Email::parse(&self.email).is_err() {
            return Err("shippingInfo.email is invalid".to_string());
        }
        Ok(())
    }
}

/// Current status and append-only history of an order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tracking {
    pub current_status: OrderStatus,
    pub history: Vec<TrackingEvent>,
}

/// One entry in an order's tracking history.
#[derive(Debug, Clone, Serialize)]
pub struct TrackingEvent {
    pub status: OrderStatus,
    pub timestamp: DateTime<Utc>,
    pub description: String,
}

/// A requested order line.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineInput {
    pub product_id: ProductId,
    pub quantity: i32,
}

/// Body of `POST /api/orders`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrder {
    pub items: Vec<OrderLineInput>,
    pub shipping_info: ShippingInfo,
    pub payment_method: PaymentMethod,
    pub payment_intent_id: Option<String>,
}

impl PlaceOrder {
    /// Validate the request and merge duplicate product lines.
    ///
    /// Lines come back ordered by product id so concurrent placements lock
    /// rows in the same order.
    ///
    /// # Errors
    ///
    /// Returns a client-facing message for an empty or invalid request.
    pub fn merged_lines(&self) -> Result<Vec<(ProductId, i32)>, String> {
        if self.items.is_empty() {
            return Err("order must contain at least one item".to_string());
        }
        self.shipping_info.validate()?;
        if self.payment_method == PaymentMethod::Card
            && self
                .payment_intent_id
                .as_deref()
                .is_none_or(|id| id.trim().is_empty())
        {
            return Err("paymentIntentId is required for card payments".to_string());
        }

        let mut merged: BTreeMap<ProductId, i32> = BTreeMap::new();
        for line in &self.items {
            if line.quantity < 1 {
                return Err(format!(
                    "quantity for product {} must be at least 1",
                    line.product_id
                ));
            }
            let entry = merged.entry(line.product_id).or_insert(0);
            *entry = entry
                .checked_add(line.quantity)
                .ok_or_else(|| format!("quantity for product {} is too large", line.product_id))?;
        }
        Ok(merged.into_iter().collect())
    }
}

/// Body of `PUT /api/orders/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusUpdate {
    pub status: OrderStatus,
    pub description: Option<String>,
}

impl StatusUpdate {
    /// Description recorded in the tracking history.
    #[must_use]
    pub fn description(&self) -> String {
        self.description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map_or_else(
                || self.status.default_description().to_string(),
                ToString::to_string,
            )
    }
}

/// Who is changing an order's status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderActor {
    /// The customer who placed the order.
    Buyer,
    /// The owner of a shop with items in the order.
    Seller,
}

impl OrderActor {
    /// Whether this actor may move an order from `from` to `to`.
    ///
    /// Sellers may apply any transition the status table allows; buyers may
    /// only cancel an order nobody has started processing.
    #[must_use]
    pub fn may_apply(self, from: OrderStatus, to: OrderStatus) -> bool {
        match self {
            Self::Seller => true,
            Self::Buyer => from == OrderStatus::Pending && to == OrderStatus::Cancelled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shipping() -> ShippingInfo {
        ShippingInfo {
            full_name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            phone: "555-0100".to_string(),
            address: "1 Analytical Way".to_string(),
            city: "London".to_string(),
            state: "LDN".to_string(),
            zip_code: "N1".to_string(),
            country: "UK".to_string(),
        }
    }

    fn request(items: Vec<(i32, i32)>, method: PaymentMethod) -> PlaceOrder {
        PlaceOrder {
            items: items
                .into_iter()
                .map(|(id, quantity)| OrderLineInput {
                    product_id: ProductId::new(id),
                    quantity,
                })
                .collect(),
            shipping_info: shipping(),
            payment_method: method,
            payment_intent_id: None,
        }
    }

    #[test]
    fn test_merges_and_sorts_lines() {
        let lines = request(vec![(7, 1), (2, 2), (7, 3)], PaymentMethod::Cash)
            .merged_lines()
            .expect("valid");
        assert_eq!(lines, vec![(ProductId::new(2), 2), (ProductId::new(7), 4)]);
    }

    #[test]
    fn test_rejects_empty_order() {
        assert!(request(vec![], PaymentMethod::Cash).merged_lines().is_err());
    }

    #[test]
    fn test_rejects_zero_quantity() {
        assert!(
            request(vec![(1, 0)], PaymentMethod::Cash)
                .merged_lines()
                .is_err()
        );
    }

    #[test]
    fn test_card_requires_payment_intent() {
        let mut order = request(vec![(1, 1)], PaymentMethod::Card);
        assert_eq!(
            order.merged_lines(),
            Err("paymentIntentId is required for card payments".to_string())
        );
        order.payment_intent_id = Some("pi_123".to_string());
        assert!(order.merged_lines().is_ok());
    }

    #[test]
    fn test_blank_shipping_field_rejected() {
        let mut info = shipping();
        info.zip_code = "  ".to_string();
        assert_eq!(
            info.validate(),
            Err("shippingInfo.zipCode is required".to_string())
        );
    }

    #[test]
    fn test_status_update_default_description() {
        let update: StatusUpdate =
            serde_json::from_str(r#"{"status": "shipped"}"#).expect("deserialize");
        assert_eq!(update.description(), "Order has been shipped");

        let custom: StatusUpdate =
            serde_json::from_str(r#"{"status": "shipped", "description": "Via courier"}"#)
                .expect("deserialize");
        assert_eq!(custom.description(), "Via courier");
    }

    #[test]
    fn test_buyer_may_only_cancel_pending() {
        assert!(OrderActor::Buyer.may_apply(OrderStatus::Pending, OrderStatus::Cancelled));
        assert!(!OrderActor::Buyer.may_apply(OrderStatus::Processing, OrderStatus::Cancelled));
        assert!(!OrderActor::Buyer.may_apply(OrderStatus::Pending, OrderStatus::Processing));
        assert!(OrderActor::Seller.may_apply(OrderStatus::Shipped, OrderStatus::Delivered));
    }

    #[test]
    fn test_place_order_deserializes_camel_case() {
        let body = r#"{
            "items": [{"productId": 1, "quantity": 2}],
            "shippingInfo": {
                "fullName": "A", "email": "a@b.co", "phone": "1", "address": "x",
                "city": "y", "state": "z", "zipCode": "1", "country": "US"
            },
            "paymentMethod": "cash"
        }"#;
        let order: PlaceOrder = serde_json::from_str(body).expect("deserialize");
        assert_eq!(order.payment_method, PaymentMethod::Cash);
        assert_eq!(order.items.len(), 1);
    }
}
