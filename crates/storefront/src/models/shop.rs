//! Shop domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bazaar_core::{Email, ShopId, UserId};

/// A seller-owned storefront grouping products.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Shop {
    pub id: ShopId,
    /// Unique regardless of case.
    pub name: String,
    pub description: String,
    pub category: String,
    pub image_url: Option<String>,
    pub owner: ShopOwner,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Owner snapshot taken when the shop was created.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopOwner {
    pub user_id: UserId,
    pub name: String,
    pub email: Email,
}

/// Input for creating a shop.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewShop {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    pub image_url: Option<String>,
}

impl NewShop {
    /// Maximum length of a shop name.
    pub const MAX_NAME_LENGTH: usize = 100;

    /// Check required fields.
    ///
    /// # Errors
    ///
    /// Returns a client-facing message describing the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        validate_name(&self.name)
    }
}

/// Partial update of a shop; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub image_url: Option<String>,
}

impl ShopUpdate {
    /// Check the fields that are present.
    ///
    /// # Errors
    ///
    /// Returns a client-facing message describing the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        self.name.as_deref().map_or(Ok(()), validate_name)
    }
}

fn validate_name(name: &str) -> Result<(), String> {
    let name = name.trim();
    if name.is_empty() {
        return Err("shop name is required".to_string());
    }
    if name.chars().count() > NewShop::MAX_NAME_LENGTH {
        return Err(format!(
            "shop name must be at most {} characters",
            NewShop::MAX_NAME_LENGTH
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_shop_requires_name() {
        let shop = NewShop {
            name: "   ".to_string(),
            description: String::new(),
            category: String::new(),
            image_url: None,
        };
        assert_eq!(shop.validate(), Err("shop name is required".to_string()));
    }

    #[test]
    fn test_new_shop_rejects_long_name() {
        let shop = NewShop {
            name: "x".repeat(NewShop::MAX_NAME_LENGTH + 1),
            description: String::new(),
            category: String::new(),
            image_url: None,
        };
        assert!(shop.validate().is_err());
    }

    #[test]
    fn test_update_without_name_is_valid() {
        assert!(ShopUpdate::default().validate().is_ok());
    }
}
