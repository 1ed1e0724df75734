//! Shared handler state.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::StorefrontConfig;
use crate::services::payments::{PaymentClient, PaymentError};

/// Everything a handler may need, behind one `Arc` so cloning per request
/// is a refcount bump.
#[derive(Clone)]
pub struct AppState(Arc<Shared>);

struct Shared {
    config: StorefrontConfig,
    pool: PgPool,
    payments: Option<PaymentClient>,
}

impl AppState {
    /// Build state from loaded config and an open pool.
    ///
    /// Card payments stay disabled unless `config.payments` is set.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError` if the payment HTTP client cannot be built.
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Result<Self, PaymentError> {
        let payments = config
            .payments
            .as_ref()
            .map(PaymentClient::new)
            .transpose()?;
        Ok(Self(Arc::new(Shared {
            config,
            pool,
            payments,
        })))
    }

    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.0.config
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.0.pool
    }

    /// `None` when no payment provider is configured.
    #[must_use]
    pub fn payments(&self) -> Option<&PaymentClient> {
        self.0.payments.as_ref()
    }
}
