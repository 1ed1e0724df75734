//! Shop, order status and analytics tests against a running storefront.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use bazaar_integration_tests::{TestClient, decimal};
use reqwest::StatusCode;
use rust_decimal::Decimal;
use serde_json::{Value, json};

#[tokio::test]
#[ignore = "requires a running storefront"]
async fn test_creating_shop_promotes_to_seller() {
    let seller = TestClient::registered().await;
    let shop = seller.create_shop().await;

    let me: Value = seller.get("/api/auth/me").await.json().await.unwrap();
    assert_eq!(me["role"], "seller");
    assert_eq!(shop["owner"]["email"], seller.email.as_str());

    // Names are unique regardless of case
    let other = TestClient::registered().await;
    let name = shop["name"].as_str().unwrap().to_uppercase();
    let response = other.post("/api/shop", &json!({"name": name})).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let me: Value = other.get("/api/auth/me").await.json().await.unwrap();
    assert_eq!(me["role"], "user");
}

#[tokio::test]
#[ignore = "requires a running storefront"]
async fn test_unstorable_prices_are_rejected() {
    let seller = TestClient::registered().await;
    let shop = seller.create_shop().await;

    for (price, error) in [
        ("0.001", "price must have at most 2 decimal places"),
        ("99999999999", "price must be at most 9999999999.99"),
    ] {
        let response = seller
            .post(
                "/api/product",
                &json!({
                    "shopId": shop["id"],
                    "name": "Odd Price",
                    "price": price,
                    "quantity": 1,
                    "sku": "ODD-1",
                }),
            )
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{price}");
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["error"], error);
    }

    let product = seller
        .create_product(shop["id"].as_i64().unwrap(), "5.00", 1)
        .await;
    let response = seller
        .put(
            &format!("/api/product/{}", product["id"]),
            &json!({"salePrice": "4.999"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "requires a running storefront"]
async fn test_only_owner_may_edit_products() {
    let seller = TestClient::registered().await;
    let shop = seller.create_shop().await;
    let product = seller
        .create_product(shop["id"].as_i64().unwrap(), "9.99", 4)
        .await;
    let path = format!("/api/product/{}/stock", product["id"]);

    let stranger = TestClient::registered().await;
    assert_eq!(
        stranger.put(&path, &json!({"quantity": 100})).await.status(),
        StatusCode::FORBIDDEN
    );

    let response = seller.put(&path, &json!({"quantity": 2})).await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated: Value = response.json().await.unwrap();
    assert_eq!(updated["quantity"], 2);

    let low: Value = seller
        .get(&format!("/api/shop/{}/low-stock?threshold=2", shop["id"]))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(low[0]["id"], product["id"]);
}

#[tokio::test]
#[ignore = "requires a running storefront"]
async fn test_status_transitions_and_cancel_restock() {
    let seller = TestClient::registered().await;
    let shop = seller.create_shop().await;
    let product = seller
        .create_product(shop["id"].as_i64().unwrap(), "6.00", 3)
        .await;
    let product_id = product["id"].as_i64().unwrap();

    let buyer = TestClient::registered().await;
    let order: Value = buyer
        .place_cash_order(&[(product_id, 2)])
        .await
        .json()
        .await
        .unwrap();
    let path = format!("/api/orders/{}", order["id"]);

    // Sellers see orders containing their items
    assert_eq!(seller.get(&path).await.status(), StatusCode::OK);
    let stranger = TestClient::registered().await;
    assert_eq!(stranger.get(&path).await.status(), StatusCode::NOT_FOUND);

    let response = seller.put(&path, &json!({"status": "processing"})).await;
    assert_eq!(response.status(), StatusCode::OK);

    // Buyers may only cancel pending orders
    let response = buyer.put(&path, &json!({"status": "cancelled"})).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // No going back
    let response = seller.put(&path, &json!({"status": "pending"})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = seller
        .put(&path, &json!({"status": "cancelled", "description": "Out of wrapping paper"}))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let cancelled: Value = response.json().await.unwrap();
    let history = cancelled["tracking"]["history"].as_array().unwrap();
    assert_eq!(history.len(), 3);
    assert_eq!(history[2]["description"], "Out of wrapping paper");

    let restocked: Value = buyer
        .get(&format!("/api/product/{product_id}"))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(restocked["quantity"], 3);

    // Terminal
    let response = seller.put(&path, &json!({"status": "processing"})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "requires a running storefront"]
async fn test_analytics_counts_only_this_shop() {
    let seller = TestClient::registered().await;
    let shop = seller.create_shop().await;
    let shop_id = shop["id"].as_i64().unwrap();
    let product = seller.create_product(shop_id, "12.50", 10).await;

    let other_seller = TestClient::registered().await;
    let other_shop = other_seller.create_shop().await;
    let other_product = other_seller
        .create_product(other_shop["id"].as_i64().unwrap(), "99.00", 10)
        .await;

    let buyer = TestClient::registered().await;
    let response = buyer
        .place_cash_order(&[
            (product["id"].as_i64().unwrap(), 2),
            (other_product["id"].as_i64().unwrap(), 1),
        ])
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let stats: Value = seller
        .get(&format!("/api/shop/{shop_id}/analytics?range=today"))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(decimal(&stats["revenue"]), Decimal::new(2500, 2));
    assert_eq!(stats["orderCount"], 1);
    assert_eq!(stats["itemsSold"], 2);
    assert_eq!(decimal(&stats["averageOrderValue"]), Decimal::new(2500, 2));

    let orders: Value = seller
        .get(&format!("/api/shop/{shop_id}/orders"))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(orders.as_array().unwrap().len(), 1);

    assert_eq!(
        other_seller
            .get(&format!("/api/shop/{shop_id}/analytics"))
            .await
            .status(),
        StatusCode::FORBIDDEN
    );
}
