//! Product repository.
//!
//! Stock is only decremented by order placement (see [`super::orders`]);
//! sellers set absolute levels through [`ProductRepository::set_stock`].

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use bazaar_core::{PageRequest, ProductId, ShopId};

use super::RepositoryError;
use crate::models::product::{NewProduct, Product, ProductFilter, ProductPage, ProductUpdate};

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
pub(super) struct ProductRow {
    id: i32,
    shop_id: i32,
    name: String,
    description: String,
    category: String,
    price: Decimal,
    sale_price: Option<Decimal>,
    quantity: i32,
    sku: String,
    image_url: Option<String>,
    featured: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: ProductId::new(row.id),
            shop_id: ShopId::new(row.shop_id),
            name: row.name,
            description: row.description,
            category: row.category,
            price: row.price,
            sale_price: row.sale_price,
            quantity: row.quantity,
            sku: row.sku,
            image_url: row.image_url,
            featured: row.featured,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

pub(super) const PRODUCT_COLUMNS: &str = "id, shop_id, name, description, category, price, \
     sale_price, quantity, sku, image_url, featured, created_at, updated_at";

/// Product columns qualified with the `p` alias, for joins.
pub(super) const JOINED_PRODUCT_COLUMNS: &str = "p.id, p.shop_id, p.name, p.description, \
     p.category, p.price, p.sale_price, p.quantity, p.sku, p.image_url, p.featured, \
     p.created_at, p.updated_at";

/// Shared filter clause; parameters `$1..=$4` are category, shop, featured
/// and search pattern, each ignored when NULL.
const FILTER_CLAUSE: &str = "($1::text IS NULL OR category = $1)
       AND ($2::integer IS NULL OR shop_id = $2)
       AND ($3::boolean IS NULL OR featured = $3)
       AND ($4::text IS NULL OR name ILIKE $4 OR description ILIKE $4)";

/// Build an `ILIKE` pattern matching `term` anywhere, with wildcards escaped.
fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List one page of products matching `filter`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        filter: &ProductFilter,
        page: PageRequest,
    ) -> Result<ProductPage, RepositoryError> {
        let category = filter
            .category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty());
        let search = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(contains_pattern);

        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM products WHERE {FILTER_CLAUSE}"
        ))
        .bind(category)
        .bind(filter.shop_id)
        .bind(filter.featured)
        .bind(search.as_deref())
        .fetch_one(self.pool)
        .await?;

        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products
             WHERE {FILTER_CLAUSE}
             ORDER BY created_at DESC, id DESC
             LIMIT $5 OFFSET $6"
        ))
        .bind(category)
        .bind(filter.shop_id)
        .bind(filter.featured)
        .bind(search.as_deref())
        .bind(i64::from(page.limit()))
        .bind(page.offset())
        .fetch_all(self.pool)
        .await?;

        Ok(ProductPage {
            products: rows.into_iter().map(Into::into).collect(),
            pagination: page.info(total),
        })
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, input: &NewProduct) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "INSERT INTO products
                 (shop_id, name, description, category, price, sale_price,
                  quantity, sku, image_url, featured)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(input.shop_id)
        .bind(input.name.trim())
        .bind(&input.description)
        .bind(&input.category)
        .bind(input.price)
        .bind(input.sale_price)
        .bind(input.quantity)
        .bind(input.sku.trim())
        .bind(&input.image_url)
        .bind(input.featured)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn update(
        &self,
        id: ProductId,
        update: &ProductUpdate,
    ) -> Result<Product, RepositoryError> {
        // $7 says whether sale_price was sent at all; $6 may then be NULL to clear it.
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "UPDATE products SET
                 name = COALESCE($2, name),
                 description = COALESCE($3, description),
                 category = COALESCE($4, category),
                 price = COALESCE($5, price),
                 sale_price = CASE WHEN $7 THEN $6 ELSE sale_price END,
                 quantity = COALESCE($8, quantity),
                 sku = COALESCE($9, sku),
                 image_url = COALESCE($10, image_url),
                 featured = COALESCE($11, featured),
                 updated_at = now()
             WHERE id = $1
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(id)
        .bind(update.name.as_deref().map(str::trim))
        .bind(&update.description)
        .bind(&update.category)
        .bind(update.price)
        .bind(update.sale_price.flatten())
        .bind(update.sale_price.is_some())
        .bind(update.quantity)
        .bind(update.sku.as_deref().map(str::trim))
        .bind(&update.image_url)
        .bind(update.featured)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// Set the absolute stock level.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn set_stock(
        &self,
        id: ProductId,
        quantity: i32,
    ) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "UPDATE products SET quantity = $2, updated_at = now()
             WHERE id = $1
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(id)
        .bind(quantity)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// Delete a product. Cart and wishlist lines cascade; order snapshots remain.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Products of a shop with `quantity <= threshold`, lowest stock first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn low_stock(
        &self,
        shop_id: ShopId,
        threshold: i32,
    ) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products
             WHERE shop_id = $1 AND quantity <= $2
             ORDER BY quantity ASC, name ASC"
        ))
        .bind(shop_id)
        .bind(threshold)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
