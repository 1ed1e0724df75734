//! Wishlist repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use bazaar_core::{ProductId, UserId, WishlistItemId};

use super::RepositoryError;
use super::products::{JOINED_PRODUCT_COLUMNS, ProductRow};
use crate::models::cart::WishlistItem;

#[derive(Debug, sqlx::FromRow)]
struct WishlistItemRow {
    entry_id: i32,
    entry_user_id: i32,
    entry_created_at: DateTime<Utc>,
    #[sqlx(flatten)]
    product: ProductRow,
}

impl From<WishlistItemRow> for WishlistItem {
    fn from(row: WishlistItemRow) -> Self {
        let product: crate::models::product::Product = row.product.into();
        Self {
            id: WishlistItemId::new(row.entry_id),
            user_id: UserId::new(row.entry_user_id),
            product_id: product.id,
            created_at: row.entry_created_at,
            product,
        }
    }
}

/// Repository for wishlist database operations.
pub struct WishlistRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> WishlistRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// A user's wishlist with product data, most recently added first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, user_id: UserId) -> Result<Vec<WishlistItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, WishlistItemRow>(&format!(
            "SELECT w.id AS entry_id, w.user_id AS entry_user_id,
                    w.created_at AS entry_created_at, {JOINED_PRODUCT_COLUMNS}
             FROM wishlist_items w
             JOIN products p ON p.id = w.product_id
             WHERE w.user_id = $1
             ORDER BY w.created_at DESC, w.id DESC"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Add a product to a user's wishlist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the product is already listed.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn add(&self, user_id: UserId, product_id: ProductId) -> Result<(), RepositoryError> {
        sqlx::query("INSERT INTO wishlist_items (user_id, product_id) VALUES ($1, $2)")
            .bind(user_id)
            .bind(product_id)
            .execute(self.pool)
            .await
            .map_err(|e| RepositoryError::unique_or_database(e, "product already in wishlist"))?;

        Ok(())
    }

    /// Remove a product from a user's wishlist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product is not listed.
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn remove(&self, user_id: UserId, product_id: ProductId) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("DELETE FROM wishlist_items WHERE user_id = $1 AND product_id = $2")
                .bind(user_id)
                .bind(product_id)
                .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
