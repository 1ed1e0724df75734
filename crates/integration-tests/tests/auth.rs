//! Account and session tests against a running storefront.

#![allow(clippy::unwrap_used)]

use bazaar_integration_tests::{TestClient, base_url};
use reqwest::StatusCode;
use serde_json::Value;

#[tokio::test]
#[ignore = "requires a running storefront"]
async fn test_health() {
    let response = reqwest::get(format!("{}/health", base_url())).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
#[ignore = "requires a running storefront"]
async fn test_register_login_me_logout() {
    let client = TestClient::anonymous();

    let response = client.register("Grace Hopper").await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let user: Value = response.json().await.unwrap();
    assert_eq!(user["email"], client.email.as_str());
    assert_eq!(user["role"], "user");
    assert!(user.get("passwordHash").is_none());

    let me: Value = client.get("/api/auth/me").await.json().await.unwrap();
    assert_eq!(me["id"], user["id"]);

    assert_eq!(
        client.post("/api/auth/logout", &Value::Null).await.status(),
        StatusCode::NO_CONTENT
    );
    assert_eq!(
        client.get("/api/auth/me").await.status(),
        StatusCode::UNAUTHORIZED
    );

    assert_eq!(
        client.login(&client.password).await.status(),
        StatusCode::OK
    );
    assert_eq!(client.get("/api/auth/me").await.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "requires a running storefront"]
async fn test_duplicate_email_is_conflict() {
    let client = TestClient::registered().await;
    let response = client.register("Someone Else").await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore = "requires a running storefront"]
async fn test_wrong_password_is_unauthorized() {
    let client = TestClient::registered().await;
    client.post("/api/auth/logout", &Value::Null).await;

    let response = client.login("definitely wrong").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Invalid credentials");
}
