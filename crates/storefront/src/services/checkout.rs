//! Checkout: cart totals, payment intents and order placement.

use rust_decimal::Decimal;
use thiserror::Error;

use bazaar_core::{OrderTotals, PaymentMethod, ProductId, check_storable, to_minor_units};

use crate::db::RepositoryError;
use crate::db::cart::CartRepository;
use crate::db::orders::{NewOrder, OrderRepository, PlaceOrderError};
use crate::db::payments::PaymentRepository;
use crate::db::products::ProductRepository;
use crate::models::CurrentUser;
use crate::models::cart::CartSummary;
use crate::models::order::{Order, PlaceOrder};
use crate::models::payment::PaymentIntentResponse;
use crate::services::payments::{PaymentClient, PaymentError};
use crate::state::AppState;

/// Errors from checkout operations.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("{0}")]
    Invalid(String),

    #[error("cart is empty")]
    EmptyCart,

    #[error("card payments are not configured")]
    PaymentsNotConfigured,

    #[error("payment intent already used")]
    PaymentIntentUsed,

    #[error("product not found: {0}")]
    ProductNotFound(ProductId),

    #[error("order total cannot be expressed in minor units")]
    AmountOutOfRange,

    #[error(transparent)]
    Payment(#[from] PaymentError),

    #[error(transparent)]
    Place(#[from] PlaceOrderError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Checkout service.
pub struct CheckoutService<'a> {
    state: &'a AppState,
}

impl<'a> CheckoutService<'a> {
    #[must_use]
    pub const fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    /// Totals for the user's current cart.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::Repository` if the cart cannot be read.
    pub async fn cart_summary(&self, user: &CurrentUser) -> Result<CartSummary, CheckoutError> {
        let items = CartRepository::new(self.state.pool()).list(user.id).await?;
        Ok(CartSummary::from_items(
            &items,
            &self.state.config().checkout.rates,
        ))
    }

    /// Create a payment intent for the checkout total of the user's cart.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::PaymentsNotConfigured` without a provider,
    /// `CheckoutError::EmptyCart` for an empty cart, or the provider error.
    pub async fn create_payment_intent(
        &self,
        user: &CurrentUser,
    ) -> Result<PaymentIntentResponse, CheckoutError> {
        let payments = self.payments()?;
        let summary = self.cart_summary(user).await?;
        if summary.line_count == 0 {
            return Err(CheckoutError::EmptyCart);
        }

        let amount = minor_units(summary.totals.total)?;
        let currency = &self.state.config().checkout.currency;
        let intent = payments.create_intent(amount, currency, user.id).await?;
        let client_secret = intent.client_secret.ok_or_else(|| {
            PaymentError::Response("payment intent has no client secret".to_string())
        })?;

        tracing::info!(
            user_id = %user.id,
            payment_intent_id = %intent.id,
            amount,
            "Payment intent created"
        );

        Ok(PaymentIntentResponse {
            client_secret,
            payment_intent_id: intent.id,
            amount: intent.amount,
            currency: intent.currency,
        })
    }

    /// Place an order for the session user.
    ///
    /// Card orders are verified against the payment provider before any
    /// write; the placement transaction then re-checks that the total it
    /// computes matches the verified amount.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError` for invalid input, payment problems, missing
    /// products or insufficient stock.
    pub async fn place_order(
        &self,
        user: &CurrentUser,
        request: &PlaceOrder,
    ) -> Result<Order, CheckoutError> {
        let lines = request.merged_lines().map_err(CheckoutError::Invalid)?;
        let rates = &self.state.config().checkout.rates;

        let (payment_reference, authorized_total) = match request.payment_method {
            PaymentMethod::Cash => (None, None),
            PaymentMethod::Card => {
                let payments = self.payments()?;
                let intent_id = request
                    .payment_intent_id
                    .as_deref()
                    .map(str::trim)
                    .ok_or_else(|| {
                        CheckoutError::Invalid(
                            "paymentIntentId is required for card payments".to_string(),
                        )
                    })?;
                let total = self.verify_intent(payments, intent_id, &lines).await?;
                (Some(intent_id), Some(total))
            }
        };

        let order = OrderRepository::new(self.state.pool())
            .place(NewOrder {
                user_id: user.id,
                lines: &lines,
                shipping_info: &request.shipping_info,
                payment_method: request.payment_method,
                payment_reference,
                authorized_total,
                rates,
            })
            .await
            .map_err(|e| match e {
                PlaceOrderError::Repository(RepositoryError::Conflict(_)) => {
                    CheckoutError::PaymentIntentUsed
                }
                other => CheckoutError::Place(other),
            })?;

        tracing::info!(
            order_id = %order.id,
            order_number = %order.order_number,
            user_id = %user.id,
            total = %order.totals.total,
            "Order placed"
        );

        Ok(order)
    }

    /// Verify a paid intent covers the current total of `lines`.
    async fn verify_intent(
        &self,
        payments: &PaymentClient,
        intent_id: &str,
        lines: &[(ProductId, i32)],
    ) -> Result<Decimal, CheckoutError> {
        if PaymentRepository::new(self.state.pool())
            .reference_exists(intent_id)
            .await?
        {
            return Err(CheckoutError::PaymentIntentUsed);
        }

        let products = ProductRepository::new(self.state.pool());
        let mut priced = Vec::with_capacity(lines.len());
        for &(product_id, quantity) in lines {
            let product = products
                .get(product_id)
                .await?
                .ok_or(CheckoutError::ProductNotFound(product_id))?;
            priced.push((product.unit_price(), quantity));
        }
        let totals = OrderTotals::from_lines(priced, &self.state.config().checkout.rates);

        let intent = payments.retrieve_intent(intent_id).await?;
        intent.verify(
            minor_units(totals.total)?,
            &self.state.config().checkout.currency,
        )?;

        Ok(totals.total)
    }

    fn payments(&self) -> Result<&'a PaymentClient, CheckoutError> {
        self.state
            .payments()
            .ok_or(CheckoutError::PaymentsNotConfigured)
    }
}

fn minor_units(amount: Decimal) -> Result<i64, CheckoutError> {
    check_storable(amount).map_err(|_| CheckoutError::AmountOutOfRange)?;
    to_minor_units(amount).ok_or(CheckoutError::AmountOutOfRange)
}
