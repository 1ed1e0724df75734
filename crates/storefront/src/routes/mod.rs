//! HTTP route handlers for the storefront API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                       - Liveness
//! GET  /health/ready                 - Readiness (database ping)
//!
//! # Auth (register/login rate limited per client IP)
//! POST /api/auth/register            - Create account and log in
//! POST /api/auth/login               - Log in
//! POST /api/auth/logout              - Log out
//! GET  /api/auth/me                  - Current user
//!
//! # Catalog
//! GET  /api/product                  - Paginated, filtered listing
//! POST /api/product                  - Create (shop owner)
//! GET  /api/product/{id}             - Detail
//! PUT  /api/product/{id}             - Partial update (owner)
//! DELETE /api/product/{id}           - Delete (owner)
//! PUT  /api/product/{id}/stock       - Set stock level (owner)
//!
//! # Shops
//! GET  /api/shop                     - The user's shops
//! POST /api/shop                     - Create (promotes user to seller)
//! GET  /api/shop/{id}                - Public profile
//! PUT  /api/shop/{id}                - Update (owner)
//! GET  /api/shop/{id}/analytics      - Revenue and volume (owner)
//! GET  /api/shop/{id}/orders         - Orders with the shop's items (owner)
//! GET  /api/shop/{id}/low-stock      - Products at or below a threshold (owner)
//!
//! # Cart and wishlist
//! GET|POST|PUT|DELETE /api/cart      - Cart lines
//! GET  /api/cart/summary             - Counts and checkout totals
//! GET|POST|DELETE /api/wishlist      - Wishlist entries
//!
//! # Orders and payments
//! GET|POST /api/orders               - List / place
//! GET|PUT  /api/orders/{id}          - Detail / status transition
//! POST /api/create-payment-intent    - Card payment for the cart total
//! GET  /api/payments                 - Payment records
//! ```

pub mod auth;
pub mod cart;
pub mod extract;
pub mod orders;
pub mod payments;
pub mod products;
pub mod shop;
pub mod wishlist;

use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::from_fn,
    routing::{get, post, put},
};
use tower_http::trace::TraceLayer;
use tower_sessions::{SessionManagerLayer, SessionStore};

use crate::middleware::{
    api_rate_limiter, auth_rate_limiter, request_id_middleware, security_headers_middleware,
};
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        // Only the credential endpoints above are rate limited
        .layer(auth_rate_limiter())
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::list).post(products::create))
        .route(
            "/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::delete),
        )
        .route("/{id}/stock", put(products::update_stock))
}

/// Create the shop routes router.
pub fn shop_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(shop::list_mine).post(shop::create))
        .route("/{id}", get(shop::show).put(shop::update))
        .route("/{id}/analytics", get(shop::analytics))
        .route("/{id}/orders", get(shop::orders))
        .route("/{id}/low-stock", get(shop::low_stock))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(cart::list)
                .post(cart::add)
                .put(cart::update)
                .delete(cart::remove),
        )
        .route("/summary", get(cart::summary))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::list).post(orders::create))
        .route("/{id}", get(orders::show).put(orders::update_status))
}

/// Create all `/api` routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .nest("/product", product_routes())
        .nest("/shop", shop_routes())
        .nest("/cart", cart_routes())
        .route(
            "/wishlist",
            get(wishlist::list)
                .post(wishlist::add)
                .delete(wishlist::remove),
        )
        .nest("/orders", order_routes())
        .route("/create-payment-intent", post(payments::create_intent))
        .route("/payments", get(payments::list))
        .layer(api_rate_limiter())
}

/// Build the full application with its middleware stack.
///
/// The session store is a parameter so tests can run against an in-memory
/// store. Serve the result with
/// `into_make_service_with_connect_info::<SocketAddr>()`; the rate limiters
/// fall back to the peer address when no proxy header is present.
pub fn app<Store>(state: AppState, session_layer: SessionManagerLayer<Store>) -> Router
where
    Store: SessionStore + Clone,
{
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/api", api_routes())
        .layer(session_layer)
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::net::SocketAddr;
    use std::time::Duration;

    use axum::body::{Body, to_bytes};
    use axum::extract::ConnectInfo;
    use axum::http::{Method, header};
    use secrecy::SecretString;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;
    use tower_sessions::MemoryStore;

    use super::*;
    use crate::config::{CheckoutConfig, SentryConfig, StorefrontConfig};
    use crate::middleware::session_layer;
    use crate::middleware::request_id::REQUEST_ID_HEADER;

    // Nothing listens on port 1; handlers that reach the database fail fast.
    const UNREACHABLE_DATABASE: &str = "postgres://bazaar@127.0.0.1:1/bazaar_test";

    fn test_app() -> Router {
        let config = StorefrontConfig {
            database_url: SecretString::from(UNREACHABLE_DATABASE),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            checkout: CheckoutConfig::default(),
            payments: None,
            sentry: SentryConfig::default(),
        };
        let pool = PgPoolOptions::new()
            .acquire_timeout(Duration::from_millis(250))
            .connect_lazy(UNREACHABLE_DATABASE)
            .unwrap();

        app(
            AppState::new(config, pool).unwrap(),
            session_layer(MemoryStore::default(), false),
        )
    }

    fn request(method: Method, uri: &str) -> axum::http::request::Builder {
        let peer: SocketAddr = "203.0.113.7:40000".parse().unwrap();
        Request::builder()
            .method(method)
            .uri(uri)
            .extension(ConnectInfo(peer))
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_is_ok_with_headers() {
        let response = test_app()
            .oneshot(request(Method::GET, "/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(REQUEST_ID_HEADER));
        assert_eq!(
            response.headers().get(header::X_CONTENT_TYPE_OPTIONS).unwrap(),
            "nosniff"
        );
    }

    #[tokio::test]
    async fn test_upstream_request_id_is_echoed() {
        let response = test_app()
            .oneshot(
                request(Method::GET, "/health")
                    .header(REQUEST_ID_HEADER, "edge-1234")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response.headers().get(REQUEST_ID_HEADER).unwrap(),
            "edge-1234"
        );
    }

    #[tokio::test]
    async fn test_readiness_reports_unreachable_database() {
        let response = test_app()
            .oneshot(request(Method::GET, "/health/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_protected_routes_require_session() {
        for (method, uri) in [
            (Method::GET, "/api/cart"),
            (Method::GET, "/api/cart/summary"),
            (Method::GET, "/api/wishlist"),
            (Method::GET, "/api/orders"),
            (Method::GET, "/api/payments"),
            (Method::GET, "/api/shop"),
            (Method::GET, "/api/auth/me"),
            (Method::POST, "/api/create-payment-intent"),
        ] {
            let response = test_app()
                .oneshot(request(method.clone(), uri).body(Body::empty()).unwrap())
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{method} {uri}");
            let body = json_body(response).await;
            assert_eq!(body["error"], "Authentication required");
        }
    }

    #[tokio::test]
    async fn test_register_rejects_invalid_email_before_database() {
        let response = test_app()
            .oneshot(
                request(Method::POST, "/api/auth/register")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        r#"{"name":"Ada","email":"not-an-email","password":"long enough"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"], "Invalid email address");
    }

    #[tokio::test]
    async fn test_malformed_json_is_a_json_400() {
        let response = test_app()
            .oneshot(
                request(Method::POST, "/api/auth/login")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let response = test_app()
            .oneshot(request(Method::GET, "/api/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
