//! Payment record repository.
//!
//! Payment rows are written by order placement in [`super::orders`]; this
//! module only reads them.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use bazaar_core::{OrderId, PaymentId, PaymentMethod, PaymentStatus, ProductId, UserId};

use super::RepositoryError;
use crate::models::payment::Payment;

#[derive(Debug, sqlx::FromRow)]
struct PaymentRow {
    id: i32,
    user_id: i32,
    order_id: i32,
    product_id: Option<i32>,
    amount: Decimal,
    method: PaymentMethod,
    status: PaymentStatus,
    provider_reference: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<PaymentRow> for Payment {
    fn from(row: PaymentRow) -> Self {
        Self {
            id: PaymentId::new(row.id),
            user_id: UserId::new(row.user_id),
            order_id: OrderId::new(row.order_id),
            product_id: row.product_id.map(ProductId::new),
            amount: row.amount,
            method: row.method,
            status: row.status,
            provider_reference: row.provider_reference,
            created_at: row.created_at,
        }
    }
}

/// Repository for payment records.
pub struct PaymentRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PaymentRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// A user's payments, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Payment>, RepositoryError> {
        let rows = sqlx::query_as::<_, PaymentRow>(
            "SELECT id, user_id, order_id, product_id, amount, method, status,
                    provider_reference, created_at
             FROM payments
             WHERE user_id = $1
             ORDER BY created_at DESC, id DESC",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Whether a payment intent is already attached to an order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn reference_exists(&self, reference: &str) -> Result<bool, RepositoryError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM payments WHERE provider_reference = $1)",
        )
        .bind(reference)
        .fetch_one(self.pool)
        .await?;

        Ok(exists)
    }
}
