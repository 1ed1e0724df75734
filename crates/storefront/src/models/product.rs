//! Product domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use bazaar_core::{PageInfo, ProductId, ShopId, check_storable, effective_unit_price};

/// A catalog entry belonging to one shop.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub shop_id: ShopId,
    pub name: String,
    pub description: String,
    pub category: String,
    /// List price, always positive.
    pub price: Decimal,
    pub sale_price: Option<Decimal>,
    /// Units in stock, never negative.
    pub quantity: i32,
    pub sku: String,
    pub image_url: Option<String>,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Price charged per unit at checkout.
    #[must_use]
    pub fn unit_price(&self) -> Decimal {
        effective_unit_price(self.price, self.sale_price)
    }
}

/// One page of products.
#[derive(Debug, Clone, Serialize)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub pagination: PageInfo,
}

/// Catalog filters for listing products.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFilter {
    pub category: Option<String>,
    pub shop_id: Option<ShopId>,
    pub featured: Option<bool>,
    /// Case-insensitive substring match on name or description.
    pub search: Option<String>,
}

/// Input for creating a product.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub shop_id: ShopId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    pub price: Decimal,
    pub sale_price: Option<Decimal>,
    pub quantity: i32,
    pub sku: String,
    pub image_url: Option<String>,
    #[serde(default)]
    pub featured: bool,
}

impl NewProduct {
    /// Check field constraints.
    ///
    /// # Errors
    ///
    /// Returns a client-facing message describing the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        require_text("name", &self.name)?;
        require_text("sku", &self.sku)?;
        validate_price(self.price)?;
        validate_sale_price(self.sale_price)?;
        validate_stock(self.quantity)
    }
}

/// Partial update of a product; absent fields are left unchanged.
///
/// `sale_price` distinguishes "absent" (`None`) from "clear it"
/// (`Some(None)`, sent as JSON `null`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: Option<Decimal>,
    #[serde(default, deserialize_with = "double_option")]
    pub sale_price: Option<Option<Decimal>>,
    pub quantity: Option<i32>,
    pub sku: Option<String>,
    pub image_url: Option<String>,
    pub featured: Option<bool>,
}

impl ProductUpdate {
    /// Check the fields that are present.
    ///
    /// # Errors
    ///
    /// Returns a client-facing message describing the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(name) = &self.name {
            require_text("name", name)?;
        }
        if let Some(sku) = &self.sku {
            require_text("sku", sku)?;
        }
        if let Some(price) = self.price {
            validate_price(price)?;
        }
        if let Some(sale_price) = self.sale_price {
            validate_sale_price(sale_price)?;
        }
        if let Some(quantity) = self.quantity {
            validate_stock(quantity)?;
        }
        Ok(())
    }
}

/// Absolute stock level for a product.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct StockUpdate {
    pub quantity: i32,
}

impl StockUpdate {
    /// Check the stock level is not negative.
    ///
    /// # Errors
    ///
    /// Returns a client-facing message if `quantity` is negative.
    pub fn validate(&self) -> Result<(), String> {
        validate_stock(self.quantity)
    }
}

fn double_option<'de, D>(deserializer: D) -> Result<Option<Option<Decimal>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<Decimal>::deserialize(deserializer).map(Some)
}

fn require_text(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{field} is required"));
    }
    Ok(())
}

fn validate_price(price: Decimal) -> Result<(), String> {
    validate_amount("price", price)
}

fn validate_sale_price(sale_price: Option<Decimal>) -> Result<(), String> {
    sale_price.map_or(Ok(()), |sale| validate_amount("salePrice", sale))
}

/// Positive and exactly representable in the catalog's money columns.
fn validate_amount(field: &str, amount: Decimal) -> Result<(), String> {
    if amount <= Decimal::ZERO {
        return Err(format!("{field} must be greater than 0"));
    }
    check_storable(amount).map_err(|e| format!("{field} {e}"))
}

fn validate_stock(quantity: i32) -> Result<(), String> {
    if quantity < 0 {
        return Err("quantity must not be negative".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_product() -> NewProduct {
        NewProduct {
            shop_id: ShopId::new(1),
            name: "Walnut Desk".to_string(),
            description: String::new(),
            category: "furniture".to_string(),
            price: Decimal::new(19_900, 2),
            sale_price: None,
            quantity: 3,
            sku: "WD-01".to_string(),
            image_url: None,
            featured: false,
        }
    }

    #[test]
    fn test_valid_product() {
        assert!(new_product().validate().is_ok());
    }

    #[test]
    fn test_price_must_be_positive() {
        let mut product = new_product();
        product.price = Decimal::ZERO;
        assert_eq!(
            product.validate(),
            Err("price must be greater than 0".to_string())
        );
    }

    #[test]
    fn test_sub_cent_price_rejected() {
        let mut product = new_product();
        product.price = Decimal::new(1, 3);
        assert_eq!(
            product.validate(),
            Err("price must have at most 2 decimal places".to_string())
        );

        product.price = Decimal::new(12_500, 3);
        assert!(product.validate().is_ok());

        product.sale_price = Some(Decimal::new(9_999, 3));
        assert_eq!(
            product.validate(),
            Err("salePrice must have at most 2 decimal places".to_string())
        );
    }

    #[test]
    fn test_price_must_fit_money_column() {
        let mut product = new_product();
        product.price = Decimal::new(999_999_999_999, 2);
        assert!(product.validate().is_ok());

        product.price = Decimal::new(99_999_999_999, 0);
        assert_eq!(
            product.validate(),
            Err("price must be at most 9999999999.99".to_string())
        );
    }

    #[test]
    fn test_quantity_may_be_zero_but_not_negative() {
        let mut product = new_product();
        product.quantity = 0;
        assert!(product.validate().is_ok());
        product.quantity = -1;
        assert!(product.validate().is_err());
    }

    #[test]
    fn test_blank_sku_rejected() {
        let mut product = new_product();
        product.sku = " ".to_string();
        assert_eq!(product.validate(), Err("sku is required".to_string()));
    }

    #[test]
    fn test_update_distinguishes_null_sale_price_from_absent() {
        let cleared: ProductUpdate =
            serde_json::from_str(r#"{"salePrice": null}"#).expect("deserialize");
        assert_eq!(cleared.sale_price, Some(None));

        let untouched: ProductUpdate = serde_json::from_str("{}").expect("deserialize");
        assert_eq!(untouched.sale_price, None);

        let set: ProductUpdate =
            serde_json::from_str(r#"{"salePrice": "5.50"}"#).expect("deserialize");
        assert_eq!(set.sale_price, Some(Some(Decimal::new(550, 2))));
    }

    #[test]
    fn test_update_validates_present_fields_only() {
        assert!(ProductUpdate::default().validate().is_ok());
        let update = ProductUpdate {
            price: Some(Decimal::new(-1, 0)),
            ..ProductUpdate::default()
        };
        assert!(update.validate().is_err());

        let update: ProductUpdate =
            serde_json::from_str(r#"{"price": "0.001"}"#).expect("deserialize");
        assert_eq!(
            update.validate(),
            Err("price must have at most 2 decimal places".to_string())
        );
    }

    #[test]
    fn test_stock_update_rejects_negative() {
        assert!(StockUpdate { quantity: 0 }.validate().is_ok());
        assert!(StockUpdate { quantity: -3 }.validate().is_err());
    }
}
