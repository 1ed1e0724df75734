//! Seed the storefront database with users, shops and products from YAML.
//!
//! The file is validated before connecting to the database. Seeding can be
//! re-run: existing users are reused, and shops whose name is taken are
//! skipped together with their products.
//!
//! ```yaml
//! users:
//!   - name: Ada Lovelace
//!     email: ada@example.com
//!     password: correct horse battery
//! shops:
//!   - name: Analytical Goods
//!     owner: ada@example.com
//!     category: stationery
//! products:
//!   - shop: Analytical Goods
//!     name: Punch Card Notebook
//!     sku: PCN-01
//!     price: "12.50"
//!     quantity: 40
//! ```

use std::collections::{HashMap, HashSet};
use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{error, info, warn};

use bazaar_core::{Email, ShopId};
use bazaar_storefront::db::RepositoryError;
use bazaar_storefront::db::products::ProductRepository;
use bazaar_storefront::db::shops::ShopRepository;
use bazaar_storefront::db::users::UserRepository;
use bazaar_storefront::models::product::NewProduct;
use bazaar_storefront::models::shop::NewShop;
use bazaar_storefront::models::user::User;
use bazaar_storefront::services::auth::{AuthError, AuthService, validate_registration};

use super::connect;

/// Top-level seed file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedFile {
    #[serde(default)]
    pub users: Vec<SeedUser>,
    #[serde(default)]
    pub shops: Vec<SeedShop>,
    #[serde(default)]
    pub products: Vec<SeedProduct>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedShop {
    pub name: String,
    /// Email of a user in the same file.
    pub owner: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedProduct {
    /// Name of a shop in the same file.
    pub shop: String,
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

impl SeedShop {
    fn to_new_shop(&self) -> NewShop {
        NewShop {
            name: self.name.clone(),
            description: self.description.clone(),
            category: self.category.clone(),
            image_url: self.image_url.clone(),
        }
    }
}

impl SeedProduct {
    fn to_new_product(&self, shop_id: ShopId) -> NewProduct {
        NewProduct {
            shop_id,
            name: self.name.clone(),
            description: self.description.clone(),
            category: self.category.clone(),
            price: self.price,
            sale_price: self.sale_price,
            quantity: self.quantity,
            sku: self.sku.clone(),
            image_url: self.image_url.clone(),
            featured: self.featured,
        }
    }
}

/// Counts reported after seeding.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedResult {
    pub users_created: usize,
    pub users_existing: usize,
    pub shops_created: usize,
    pub shops_skipped: usize,
    pub products_created: usize,
}

/// Check a seed file for problems that would only surface halfway through.
///
/// Returns every problem found; an empty list means the file is valid.
#[must_use]
pub fn validate(seed: &SeedFile) -> Vec<String> {
    let mut errors = Vec::new();

    let mut emails = HashSet::new();
    for user in &seed.users {
        match validate_registration(&user.name, &user.email, &user.password) {
            Ok((_, email)) => {
                if !emails.insert(email.clone()) {
                    errors.push(format!("duplicate user email: {email}"));
                }
            }
            Err(e) => errors.push(format!("user {}: {e}", user.email)),
        }
    }

    let mut shop_names = HashSet::new();
    for shop in &seed.shops {
        if let Err(e) = shop.to_new_shop().validate() {
            errors.push(format!("shop {}: {e}", shop.name));
        }
        if !shop_names.insert(shop.name.trim().to_lowercase()) {
            errors.push(format!("duplicate shop name: {}", shop.name));
        }
        let owner_known = Email::parse(&shop.owner).is_ok_and(|email| emails.contains(&email));
        if !owner_known {
            errors.push(format!(
                "shop {}: owner {} is not a user in this file",
                shop.name, shop.owner
            ));
        }
    }

    for product in &seed.products {
        if !shop_names.contains(&product.shop.trim().to_lowercase()) {
            errors.push(format!(
                "product {}: shop {} is not in this file",
                product.sku, product.shop
            ));
        }
        if let Err(e) = product.to_new_product(ShopId::new(0)).validate() {
            errors.push(format!("product {}: {e}", product.sku));
        }
    }

    errors
}

/// Seed from a YAML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, fails validation,
/// or a database operation fails.
pub async fn from_file(file_path: &str) -> Result<SeedResult, Box<dyn std::error::Error>> {
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading seed data from file");

    // Read and validate YAML before connecting to database
    let content = tokio::fs::read_to_string(path).await?;
    let seed: SeedFile = serde_yaml::from_str(&content)?;

    let errors = validate(&seed);
    if !errors.is_empty() {
        error!("Seed file validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(format!("{} validation errors found", errors.len()).into());
    }

    info!(
        users = seed.users.len(),
        shops = seed.shops.len(),
        products = seed.products.len(),
        "Seed file validated"
    );

    let pool = connect().await?;
    let mut result = SeedResult::default();

    let auth = AuthService::new(&pool);
    let users = UserRepository::new(&pool);
    let mut owners: HashMap<Email, User> = HashMap::new();
    for seed_user in &seed.users {
        let user = match auth
            .register(&seed_user.name, &seed_user.email, &seed_user.password)
            .await
        {
            Ok(user) => {
                result.users_created += 1;
                user
            }
            Err(AuthError::UserAlreadyExists) => {
                let email = Email::parse(&seed_user.email)?;
                let (user, _) = users
                    .get_with_password_hash(&email)
                    .await?
                    .ok_or_else(|| format!("user {email} vanished during seeding"))?;
                result.users_existing += 1;
                user
            }
            Err(e) => return Err(e.into()),
        };
        owners.insert(user.email.clone(), user);
    }

    let shops = ShopRepository::new(&pool);
    let mut shop_ids: HashMap<String, ShopId> = HashMap::new();
    for seed_shop in &seed.shops {
        let owner_email = Email::parse(&seed_shop.owner)?;
        let owner = owners
            .get(&owner_email)
            .ok_or_else(|| format!("owner {owner_email} was not seeded"))?;

        match shops.create(owner, &seed_shop.to_new_shop()).await {
            Ok(shop) => {
                result.shops_created += 1;
                shop_ids.insert(seed_shop.name.trim().to_lowercase(), shop.id);
            }
            Err(RepositoryError::Conflict(_)) => {
                warn!(shop = %seed_shop.name, "Shop already exists, skipping it and its products");
                result.shops_skipped += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    let products = ProductRepository::new(&pool);
    for seed_product in &seed.products {
        let Some(&shop_id) = shop_ids.get(&seed_product.shop.trim().to_lowercase()) else {
            continue;
        };
        products
            .create(&seed_product.to_new_product(shop_id))
            .await?;
        result.products_created += 1;
    }

    info!("Seeding complete!");
    info!(
        "  Users created: {} (existing: {})",
        result.users_created, result.users_existing
    );
    info!(
        "  Shops created: {} (skipped: {})",
        result.shops_created, result.shops_skipped
    );
    info!("  Products created: {}", result.products_created);

    Ok(result)
}
