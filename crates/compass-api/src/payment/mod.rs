pub mod routes;

use compass_db::{
    models::{Payment, PaymentStatus},
    repositories::payment as payment_repo,
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::ApiError;

pub use routes::routes;

/// Move a payment to `next`, refusing anything outside the payment lifecycle.
pub async fn update_status(
    pool: &PgPool,
    payment_id: Uuid,
    next: PaymentStatus,
) -> Result<Payment, ApiError> {
    let current = payment_repo::find_by_id(pool, payment_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Payment not found".to_string()))?;

    if !current.status.can_transition_to(next) {
        return Err(ApiError::Conflict(format!(
            "Cannot move payment from {} to {next}",
            current.status
        )));
    }

    let updated = payment_repo::transition_status(pool, payment_id, current.status, next)
        .await?
        .ok_or_else(|| ApiError::Conflict("Payment was changed concurrently".to_string()))?;

    tracing::info!(
        payment_id = %updated.id,
        from = %current.status,
        to = %updated.status,
        "Payment status changed"
    );

    Ok(updated)
}
