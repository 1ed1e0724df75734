//! Payment records and payment-intent responses.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use bazaar_core::{OrderId, PaymentId, PaymentMethod, PaymentStatus, ProductId, UserId};

/// A recorded payment for an order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: PaymentId,
    pub user_id: UserId,
    pub order_id: OrderId,
    pub product_id: Option<ProductId>,
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    /// Payment-intent id for card payments.
    pub provider_reference: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Response of `POST /api/create-payment-intent`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentResponse {
    pub client_secret: String,
    pub payment_intent_id: String,
    /// Amount in minor units (cents).
    pub amount: i64,
    pub currency: String,
}
