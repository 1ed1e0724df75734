//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers return `Result<T, AppError>`
//! and every error reaches the client as `{"error": "..."}`.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use bazaar_core::StockError;

use crate::db::RepositoryError;
use crate::db::orders::{PlaceOrderError, TransitionError};
use crate::services::auth::AuthError;
use crate::services::checkout::CheckoutError;
use crate::services::payments::PaymentError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Payment provider call or intent verification failed.
    #[error("Payment error: {0}")]
    Payment(#[from] PaymentError),

    /// Card payments requested but no provider is configured.
    #[error("Card payments are not available")]
    PaymentsNotConfigured,

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// User may not act on this resource.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Request conflicts with existing state.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Requested more units than are in stock.
    #[error("Insufficient stock for {name}")]
    InsufficientStock { name: String, available: i32 },

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    available: Option<i32>,
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Database(err) => match err {
                RepositoryError::NotFound => StatusCode::NOT_FOUND,
                RepositoryError::Conflict(_) => StatusCode::CONFLICT,
                RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AuthError::UserAlreadyExists => StatusCode::CONFLICT,
                AuthError::WeakPassword(_)
                | AuthError::InvalidEmail(_)
                | AuthError::InvalidName(_) => StatusCode::BAD_REQUEST,
                AuthError::Repository(_) | AuthError::PasswordHash => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Payment(err) if err.is_provider_failure() => StatusCode::BAD_GATEWAY,
            Self::Payment(_) | Self::BadRequest(_) | Self::InsufficientStock { .. } => {
                StatusCode::BAD_REQUEST
            }
            Self::PaymentsNotConfigured => StatusCode::SERVICE_UNAVAILABLE,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    // Don't expose internal error details to clients
    fn message(&self) -> String {
        match self {
            Self::Database(err) => match err {
                RepositoryError::NotFound => "Not found".to_string(),
                RepositoryError::Conflict(msg) => msg.clone(),
                RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => {
                    "Internal server error".to_string()
                }
            },
            Self::Internal(_) => "Internal server error".to_string(),
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => "Invalid credentials".to_string(),
                AuthError::UserAlreadyExists => {
                    "An account with this email already exists".to_string()
                }
                AuthError::WeakPassword(msg) | AuthError::InvalidName(msg) => msg.clone(),
                AuthError::InvalidEmail(_) => "Invalid email address".to_string(),
                AuthError::Repository(_) | AuthError::PasswordHash => {
                    "Internal server error".to_string()
                }
            },
            Self::Payment(err) if err.is_provider_failure() => {
                "Payment provider error".to_string()
            }
            Self::Payment(err) => format!("Payment not accepted: {err}"),
            Self::PaymentsNotConfigured => "Card payments are not available".to_string(),
            Self::InsufficientStock { name, .. } => format!("Insufficient stock for {name}"),
            Self::NotFound(msg)
            | Self::Unauthorized(msg)
            | Self::Forbidden(msg)
            | Self::BadRequest(msg)
            | Self::Conflict(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if matches!(
            status,
            StatusCode::INTERNAL_SERVER_ERROR | StatusCode::BAD_GATEWAY
        ) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let available = match &self {
            Self::InsufficientStock { available, .. } => Some(*available),
            _ => None,
        };
        let body = ErrorBody {
            error: self.message(),
            available,
        };

        (status, Json(body)).into_response()
    }
}

impl AppError {
    /// Map a cart stock check failure for the named product.
    #[must_use]
    pub fn from_stock(err: StockError, product_name: &str) -> Self {
        match err {
            StockError::InvalidQuantity(_) => {
                Self::BadRequest("quantity must be at least 1".to_string())
            }
            StockError::Insufficient { available, .. } => Self::InsufficientStock {
                name: product_name.to_string(),
                available,
            },
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<tower_sessions::session::Error> for AppError {
    fn from(err: tower_sessions::session::Error) -> Self {
        Self::Internal(format!("session error: {err}"))
    }
}

impl From<PlaceOrderError> for AppError {
    fn from(err: PlaceOrderError) -> Self {
        match err {
            PlaceOrderError::ProductNotFound(id) => Self::NotFound(format!("product not found: {id}")),
            PlaceOrderError::InsufficientStock {
                name, available, ..
            } => Self::InsufficientStock { name, available },
            PlaceOrderError::TotalOutOfRange { .. } => {
                Self::BadRequest("order total is out of range".to_string())
            }
            PlaceOrderError::TotalChanged { .. } => Self::Conflict(
                "prices changed since payment was authorized; please check out again".to_string(),
            ),
            PlaceOrderError::Repository(err) => Self::Database(err),
        }
    }
}

impl From<TransitionError> for AppError {
    fn from(err: TransitionError) -> Self {
        match err {
            TransitionError::NotFound => Self::NotFound("order not found".to_string()),
            TransitionError::Invalid { .. } => Self::BadRequest(err.to_string()),
            TransitionError::Forbidden { .. } => Self::Forbidden(err.to_string()),
            TransitionError::Repository(err) => Self::Database(err),
        }
    }
}

impl From<CheckoutError> for AppError {
    fn from(err: CheckoutError) -> Self {
        match err {
            CheckoutError::Invalid(msg) => Self::BadRequest(msg),
            CheckoutError::EmptyCart => Self::BadRequest("cart is empty".to_string()),
            CheckoutError::PaymentsNotConfigured => Self::PaymentsNotConfigured,
            CheckoutError::PaymentIntentUsed => {
                Self::Conflict("payment intent already used".to_string())
            }
            CheckoutError::ProductNotFound(id) => Self::NotFound(format!("product not found: {id}")),
            CheckoutError::AmountOutOfRange => {
                Self::BadRequest("order total is out of range".to_string())
            }
            CheckoutError::Payment(err) => Self::Payment(err),
            CheckoutError::Place(err) => err.into(),
            CheckoutError::Repository(err) => Self::Database(err),
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;
    use bazaar_core::ProductId;

    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    async fn body_json(err: AppError) -> serde_json::Value {
        let response = err.into_response();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product-123".to_string());
        assert_eq!(err.to_string(), "Not found: product-123");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Unauthorized("test".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Forbidden("test".to_string())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Conflict("test".to_string())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::PaymentsNotConfigured),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_repository_errors_map_to_client_statuses() {
        assert_eq!(
            get_status(RepositoryError::NotFound.into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(RepositoryError::Conflict("taken".to_string()).into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(RepositoryError::DataCorruption("bad".to_string()).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_payment_errors_split_by_fault() {
        assert_eq!(
            get_status(PaymentError::Request("timeout".to_string()).into()),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            get_status(PaymentError::NotSucceeded("canceled".to_string()).into()),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_order_errors() {
        assert_eq!(
            get_status(PlaceOrderError::ProductNotFound(ProductId::new(9)).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(
                PlaceOrderError::TotalOutOfRange {
                    total: bazaar_core::MAX_AMOUNT * rust_decimal::Decimal::TWO,
                }
                .into()
            ),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(
                TransitionError::Invalid {
                    from: bazaar_core::OrderStatus::Delivered,
                    to: bazaar_core::OrderStatus::Pending,
                }
                .into()
            ),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(
                TransitionError::Forbidden {
                    from: bazaar_core::OrderStatus::Processing,
                    to: bazaar_core::OrderStatus::Cancelled,
                }
                .into()
            ),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_stock_errors() {
        let err = AppError::from_stock(
            StockError::Insufficient {
                available: 3,
                requested: 4,
            },
            "Mug",
        );
        assert!(matches!(
            err,
            AppError::InsufficientStock { ref name, available: 3 } if name == "Mug"
        ));
        assert_eq!(
            get_status(AppError::from_stock(StockError::InvalidQuantity(0), "Mug")),
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn test_insufficient_stock_body_carries_available() {
        let body = body_json(AppError::InsufficientStock {
            name: "Walnut Desk".to_string(),
            available: 2,
        })
        .await;
        assert_eq!(body["error"], "Insufficient stock for Walnut Desk");
        assert_eq!(body["available"], 2);
    }

    #[tokio::test]
    async fn test_internal_details_are_hidden() {
        let body = body_json(AppError::Internal("connection reset by peer".to_string())).await;
        assert_eq!(body["error"], "Internal server error");
        assert!(body.get("available").is_none());
    }
}
