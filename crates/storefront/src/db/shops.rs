//! Shop repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use bazaar_core::{Email, ShopId, UserId};

use super::RepositoryError;
use crate::models::shop::{NewShop, Shop, ShopOwner, ShopUpdate};
use crate::models::user::User;

const DUPLICATE_NAME: &str = "a shop with this name already exists";

#[derive(Debug, sqlx::FromRow)]
struct ShopRow {
    id: i32,
    name: String,
    description: String,
    category: String,
    image_url: Option<String>,
    owner_user_id: i32,
    owner_name: String,
    owner_email: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ShopRow> for Shop {
    type Error = RepositoryError;

    fn try_from(row: ShopRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.owner_email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid owner email for shop {}: {e}", row.id))
        })?;

        Ok(Self {
            id: ShopId::new(row.id),
            name: row.name,
            description: row.description,
            category: row.category,
            image_url: row.image_url,
            owner: ShopOwner {
                user_id: UserId::new(row.owner_user_id),
                name: row.owner_name,
                email,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const SHOP_COLUMNS: &str = "id, name, description, category, image_url, \
     owner_user_id, owner_name, owner_email, created_at, updated_at";

/// Repository for shop database operations.
pub struct ShopRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ShopRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a shop owned by `owner` and grant the owner the seller role.
    ///
    /// Both writes happen in one transaction; a duplicate name leaves the
    /// owner's role untouched.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the name is taken (case-insensitive).
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, owner: &User, input: &NewShop) -> Result<Shop, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, ShopRow>(&format!(
            "INSERT INTO shops
                 (name, description, category, image_url, owner_user_id, owner_name, owner_email)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {SHOP_COLUMNS}"
        ))
        .bind(input.name.trim())
        .bind(&input.description)
        .bind(&input.category)
        .bind(&input.image_url)
        .bind(owner.id)
        .bind(&owner.name)
        .bind(owner.email.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::unique_or_database(e, DUPLICATE_NAME))?;

        sqlx::query("UPDATE users SET role = 'seller', updated_at = now() WHERE id = $1")
            .bind(owner.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Shop::try_from(row)
    }

    /// Get a shop by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ShopId) -> Result<Option<Shop>, RepositoryError> {
        let row = sqlx::query_as::<_, ShopRow>(&format!(
            "SELECT {SHOP_COLUMNS} FROM shops WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(Shop::try_from).transpose()
    }

    /// Shops owned by a user, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_owner(&self, owner: UserId) -> Result<Vec<Shop>, RepositoryError> {
        let rows = sqlx::query_as::<_, ShopRow>(&format!(
            "SELECT {SHOP_COLUMNS} FROM shops WHERE owner_user_id = $1 ORDER BY id"
        ))
        .bind(owner)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Shop::try_from).collect()
    }

    /// IDs of the shops owned by a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn ids_by_owner(&self, owner: UserId) -> Result<Vec<ShopId>, RepositoryError> {
        let ids = sqlx::query_scalar::<_, ShopId>("SELECT id FROM shops WHERE owner_user_id = $1")
            .bind(owner)
            .fetch_all(self.pool)
            .await?;

        Ok(ids)
    }

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the shop doesn't exist.
    /// Returns `RepositoryError::Conflict` if a rename clashes with another shop.
    pub async fn update(&self, id: ShopId, update: &ShopUpdate) -> Result<Shop, RepositoryError> {
        let row = sqlx::query_as::<_, ShopRow>(&format!(
            "UPDATE shops SET
                 name = COALESCE($2, name),
                 description = COALESCE($3, description),
                 category = COALESCE($4, category),
                 image_url = COALESCE($5, image_url),
                 updated_at = now()
             WHERE id = $1
             RETURNING {SHOP_COLUMNS}"
        ))
        .bind(id)
        .bind(update.name.as_deref().map(str::trim))
        .bind(&update.description)
        .bind(&update.category)
        .bind(&update.image_url)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::unique_or_database(e, DUPLICATE_NAME))?
        .ok_or(RepositoryError::NotFound)?;

        Shop::try_from(row)
    }
}
