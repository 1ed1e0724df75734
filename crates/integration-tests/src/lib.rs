//! Integration tests for Bazaar.
//!
//! # Running Tests
//!
//! ```bash
//! # Migrate and start the storefront against a scratch database
//! cargo run -p bazaar-cli -- migrate
//! cargo run -p bazaar-storefront
//!
//! # Run the ignored live-server tests
//! BAZAAR_TEST_URL=http://127.0.0.1:3000 cargo test -p bazaar-integration-tests -- --ignored
//! ```
//!
//! Every [`TestClient`] registers its own uniquely named user and sends its own
//! `x-forwarded-for` address, so tests run in parallel without sharing
//! sessions or rate-limit buckets.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Response, StatusCode};
use rust_decimal::Decimal;
use serde_json::{Value, json};
use uuid::Uuid;

/// Base URL of the running storefront.
#[must_use]
pub fn base_url() -> String {
    dotenvy::dotenv().ok();
    std::env::var("BAZAAR_TEST_URL").unwrap_or_else(|_| "http://127.0.0.1:3000".to_string())
}

/// A short random token for unique names.
#[must_use]
pub fn unique_token() -> String {
    Uuid::new_v4().simple().to_string()[..12].to_string()
}

/// Parse a decimal amount from a JSON string field.
#[must_use]
pub fn decimal(value: &Value) -> Decimal {
    value
        .as_str()
        .unwrap_or_else(|| panic!("expected a decimal string, got {value}"))
        .parse()
        .unwrap()
}

/// An HTTP client with its own cookie jar and client address.
pub struct TestClient {
    client: Client,
    base_url: String,
    pub email: String,
    pub password: String,
}

impl TestClient {
    /// A client that is not logged in.
    #[must_use]
    pub fn anonymous() -> Self {
        let id = Uuid::new_v4();
        let bytes = id.as_bytes();
        let forwarded = format!("10.{}.{}.{}", bytes[0], bytes[1], bytes[2]);

        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_str(&forwarded).unwrap(),
        );

        let client = Client::builder()
            .cookie_store(true)
            .default_headers(headers)
            .build()
            .unwrap();

        let token = unique_token();
        Self {
            client,
            base_url: base_url(),
            email: format!("user-{token}@example.com"),
            password: format!("password-{token}"),
        }
    }

    /// A client with a freshly registered, logged-in user.
    pub async fn registered() -> Self {
        let client = Self::anonymous();
        let response = client.register("Test User").await;
        assert_eq!(response.status(), StatusCode::CREATED);
        client
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub async fn get(&self, path: &str) -> Response {
        self.client.get(self.url(path)).send().await.unwrap()
    }

    pub async fn post(&self, path: &str, body: &Value) -> Response {
        self.client.post(self.url(path)).json(body).send().await.unwrap()
    }

    pub async fn put(&self, path: &str, body: &Value) -> Response {
        self.client.put(self.url(path)).json(body).send().await.unwrap()
    }

    pub async fn delete(&self, path: &str) -> Response {
        self.client.delete(self.url(path)).send().await.unwrap()
    }

    pub async fn register(&self, name: &str) -> Response {
        self.post(
            "/api/auth/register",
            &json!({"name": name, "email": self.email, "password": self.password}),
        )
        .await
    }

    pub async fn login(&self, password: &str) -> Response {
        self.post(
            "/api/auth/login",
            &json!({"email": self.email, "password": password}),
        )
        .await
    }

    /// Create a shop with a unique name and return its JSON.
    pub async fn create_shop(&self) -> Value {
        let response = self
            .post(
                "/api/shop",
                &json!({"name": format!("Shop {}", unique_token()), "category": "general"}),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        response.json().await.unwrap()
    }

    /// Create a product in `shop_id` and return its JSON.
    pub async fn create_product(&self, shop_id: i64, price: &str, quantity: i32) -> Value {
        let response = self
            .post(
                "/api/product",
                &json!({
                    "shopId": shop_id,
                    "name": format!("Product {}", unique_token()),
                    "category": "general",
                    "price": price,
                    "quantity": quantity,
                    "sku": format!("SKU-{}", unique_token()),
                }),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        response.json().await.unwrap()
    }

    /// Place a cash order for the given `(product_id, quantity)` lines.
    pub async fn place_cash_order(&self, lines: &[(i64, i32)]) -> Response {
        let items: Vec<Value> = lines
            .iter()
            .map(|(product_id, quantity)| json!({"productId": product_id, "quantity": quantity}))
            .collect();
        self.post(
            "/api/orders",
            &json!({
                "items": items,
                "shippingInfo": shipping_info(&self.email),
                "paymentMethod": "cash",
            }),
        )
        .await
    }
}

/// A complete shipping address.
#[must_use]
pub fn shipping_info(email: &str) -> Value {
    json!({
        "fullName": "Test User",
        "email": email,
        "phone": "555-0100",
        "address": "1 Test Street",
        "city": "Springfield",
        "state": "IL",
        "zipCode": "62701",
        "country": "US",
    })
}
