//! Payment handlers.

use axum::{Json, extract::State};
use tracing::instrument;

use crate::db::payments::PaymentRepository;
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::payment::{Payment, PaymentIntentResponse};
use crate::services::checkout::CheckoutService;
use crate::state::AppState;

/// Start a card payment for the session user's cart total.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn create_intent(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<PaymentIntentResponse>> {
    let intent = CheckoutService::new(&state)
        .create_payment_intent(&user)
        .await?;
    Ok(Json(intent))
}

/// The session user's payment records, newest first.
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<Payment>>> {
    let payments = PaymentRepository::new(state.pool())
        .list_by_user(user.id)
        .await?;
    Ok(Json(payments))
}
