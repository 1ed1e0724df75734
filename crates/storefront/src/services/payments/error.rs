//! Payment provider errors.

use thiserror::Error;

/// Errors that can occur when talking to the payment provider.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// HTTP request failed.
    #[error("payment provider request failed: {0}")]
    Request(String),

    /// Failed to parse response.
    #[error("payment provider response error: {0}")]
    Response(String),

    /// Provider returned an error status.
    #[error("payment provider error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Intent id is not a provider identifier.
    #[error("invalid payment intent id")]
    InvalidIntentId,

    /// Intent exists but has not been paid.
    #[error("payment intent status is {0}")]
    NotSucceeded(String),

    /// Intent was paid for a different amount.
    #[error("payment intent amount {actual} does not match order total {expected}")]
    AmountMismatch { expected: i64, actual: i64 },

    /// Intent was paid in a different currency.
    #[error("payment intent currency {actual} does not match {expected}")]
    CurrencyMismatch { expected: String, actual: String },
}

impl PaymentError {
    /// Whether the provider is at fault rather than the client's intent.
    #[must_use]
    pub const fn is_provider_failure(&self) -> bool {
        match self {
            Self::Request(_) | Self::Response(_) => true,
            Self::Api { status, .. } => *status != 404,
            Self::InvalidIntentId
            | Self::NotSucceeded(_)
            | Self::AmountMismatch { .. }
            | Self::CurrencyMismatch { .. } => false,
        }
    }
}
