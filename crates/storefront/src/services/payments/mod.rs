//! Payment provider client.
//!
//! Talks to a Stripe-compatible payment-intents REST API: intents are created
//! for the cart total before checkout and verified when the order is placed.

mod error;

pub use error::PaymentError;

use std::time::Duration;

use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use bazaar_core::UserId;

use crate::config::PaymentsConfig;

/// Provider status of a paid intent.
const SUCCEEDED: &str = "succeeded";

/// Upper bound on one provider round trip; checkout waits on it.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// A payment intent as returned by the provider.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    /// Amount in minor units.
    pub amount: i64,
    pub currency: String,
    pub status: String,
    pub client_secret: Option<String>,
}

impl PaymentIntent {
    /// Check the intent paid exactly `expected_amount` minor units in `currency`.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::NotSucceeded`, `PaymentError::AmountMismatch`
    /// or `PaymentError::CurrencyMismatch`.
    pub fn verify(&self, expected_amount: i64, currency: &str) -> Result<(), PaymentError> {
        if self.status != SUCCEEDED {
            return Err(PaymentError::NotSucceeded(self.status.clone()));
        }
        if !self.currency.eq_ignore_ascii_case(currency) {
            return Err(PaymentError::CurrencyMismatch {
                expected: currency.to_string(),
                actual: self.currency.clone(),
            });
        }
        if self.amount != expected_amount {
            return Err(PaymentError::AmountMismatch {
                expected: expected_amount,
                actual: self.amount,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Payment provider API client.
#[derive(Clone)]
pub struct PaymentClient {
    client: Client,
    secret_key: SecretString,
    api_base: String,
}

impl std::fmt::Debug for PaymentClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentClient")
            .field("secret_key", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .finish_non_exhaustive()
    }
}

impl PaymentClient {
    /// Create a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::Request` if the HTTP client fails to build.
    pub fn new(config: &PaymentsConfig) -> Result<Self, PaymentError> {
        Self::with_timeout(config, REQUEST_TIMEOUT)
    }

    fn with_timeout(config: &PaymentsConfig, timeout: Duration) -> Result<Self, PaymentError> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT.min(timeout))
            .timeout(timeout)
            .build()
            .map_err(|e| PaymentError::Request(e.to_string()))?;

        Ok(Self {
            client,
            secret_key: config.secret_key.clone(),
            api_base: config.api_base.as_str().trim_end_matches('/').to_string(),
        })
    }

    /// Create a payment intent.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the provider rejects it.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn create_intent(
        &self,
        amount: i64,
        currency: &str,
        user_id: UserId,
    ) -> Result<PaymentIntent, PaymentError> {
        let amount = amount.to_string();
        let user_id = user_id.to_string();
        let form = [
            ("amount", amount.as_str()),
            ("currency", currency),
            ("metadata[user_id]", user_id.as_str()),
            ("automatic_payment_methods[enabled]", "true"),
        ];

        let response = self
            .client
            .post(format!("{}/v1/payment_intents", self.api_base))
            .bearer_auth(self.secret_key.expose_secret())
            .form(&form)
            .send()
            .await
            .map_err(|e| PaymentError::Request(e.to_string()))?;

        let intent = Self::parse(response).await?;
        debug!(payment_intent_id = %intent.id, "Payment intent created");
        Ok(intent)
    }

    /// Fetch a payment intent by id.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::InvalidIntentId` for a malformed id, or an error
    /// if the request fails or the provider rejects it.
    #[instrument(skip(self))]
    pub async fn retrieve_intent(&self, id: &str) -> Result<PaymentIntent, PaymentError> {
        if !is_valid_intent_id(id) {
            return Err(PaymentError::InvalidIntentId);
        }

        let response = self
            .client
            .get(format!("{}/v1/payment_intents/{id}", self.api_base))
            .bearer_auth(self.secret_key.expose_secret())
            .send()
            .await
            .map_err(|e| PaymentError::Request(e.to_string()))?;

        Self::parse(response).await
    }

    async fn parse(response: reqwest::Response) -> Result<PaymentIntent, PaymentError> {
        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorEnvelope>()
                .await
                .ok()
                .and_then(|envelope| envelope.error.message)
                .unwrap_or_else(|| "unknown error".to_string());
            warn!(status = status.as_u16(), %message, "Payment provider returned an error");
            return Err(PaymentError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| PaymentError::Response(e.to_string()))
    }
}

/// Provider ids are ASCII alphanumerics and underscores.
fn is_valid_intent_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= 255
        && id.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn intent(status: &str, amount: i64) -> PaymentIntent {
        PaymentIntent {
            id: "pi_123".to_string(),
            amount,
            currency: "usd".to_string(),
            status: status.to_string(),
            client_secret: None,
        }
    }

    #[test]
    fn test_verify_accepts_matching_intent() {
        assert!(intent("succeeded", 2699).verify(2699, "usd").is_ok());
        assert!(intent("succeeded", 2699).verify(2699, "USD").is_ok());
    }

    #[test]
    fn test_verify_rejects_unpaid_intent() {
        assert!(matches!(
            intent("requires_payment_method", 2699).verify(2699, "usd"),
            Err(PaymentError::NotSucceeded(_))
        ));
    }

    #[test]
    fn test_verify_rejects_wrong_amount() {
        assert!(matches!(
            intent("succeeded", 100).verify(2699, "usd"),
            Err(PaymentError::AmountMismatch {
                expected: 2699,
                actual: 100
            })
        ));
    }

    #[test]
    fn test_verify_rejects_wrong_currency() {
        assert!(matches!(
            intent("succeeded", 2699).verify(2699, "eur"),
            Err(PaymentError::CurrencyMismatch { .. })
        ));
    }

    #[test]
    fn test_intent_id_validation() {
        assert!(is_valid_intent_id("pi_3Mtw5xLkdIwHu7ix28a3tqPa"));
        assert!(!is_valid_intent_id(""));
        assert!(!is_valid_intent_id("../v1/customers"));
        assert!(!is_valid_intent_id("pi_1?expand=x"));
    }

    #[test]
    fn test_provider_failure_classification() {
        assert!(PaymentError::Request("timeout".to_string()).is_provider_failure());
        assert!(
            PaymentError::Api {
                status: 500,
                message: String::new()
            }
            .is_provider_failure()
        );
        assert!(
            !PaymentError::Api {
                status: 404,
                message: String::new()
            }
            .is_provider_failure()
        );
        assert!(!PaymentError::InvalidIntentId.is_provider_failure());
    }

    #[tokio::test]
    async fn test_silent_provider_times_out_as_provider_failure() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        // Accept connections and never answer
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let config = PaymentsConfig {
            secret_key: SecretString::from("sk_test_silent"),
            api_base: format!("http://{addr}").parse().unwrap(),
        };
        let client = PaymentClient::with_timeout(&config, Duration::from_millis(200)).unwrap();

        let started = std::time::Instant::now();
        let err = client.retrieve_intent("pi_123").await.unwrap_err();

        assert!(matches!(err, PaymentError::Request(_)), "{err:?}");
        assert!(err.is_provider_failure());
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
