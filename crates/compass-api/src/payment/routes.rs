use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};
use compass_db::{
    models::{Payment, PaymentPlan, Role},
    repositories::payment as payment_repo,
};
use serde::Deserialize;

use crate::{
    ApiState,
    auth::AuthUser,
    error::ApiError,
    middleware::rate_limit,
    validation::{self, JsonBody},
};

pub fn routes() -> Router<ApiState> {
    use crate::make_rate_limit_layer;

    Router::new()
        .route("/payments", get(list_payments).post(create_payment))
        .layer(make_rate_limit_layer!(
            rate_limit::GENERAL_REPLENISH_MS,
            rate_limit::GENERAL_BURST_SIZE
        ))
}

#[derive(Debug, Deserialize)]
pub struct CreatePaymentRequest {
    pub plan: PaymentPlan,
    pub amount_minor: i64,
    pub currency: String,
    pub provider_reference: Option<String>,
}

/// Validated payment fields
#[derive(Debug, PartialEq, Eq)]
pub struct NewPayment {
    pub plan: PaymentPlan,
    pub amount_minor: i64,
    pub currency: String,
    pub provider_reference: Option<String>,
}

impl CreatePaymentRequest {
    pub fn validate(self) -> Result<NewPayment, ApiError> {
        if self.amount_minor <= 0 {
            return Err(ApiError::Validation(
                "Amount must be greater than zero".to_string(),
            ));
        }

        let currency = validation::normalize_currency(&self.currency)?;

        let provider_reference = validation::non_empty(self.provider_reference);
        if let Some(reference) = &provider_reference {
            validation::validate_text("Provider reference", reference, 1, 200)?;
        }

        Ok(NewPayment {
            plan: self.plan,
            amount_minor: self.amount_minor,
            currency,
            provider_reference,
        })
    }
}

async fn create_payment(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    JsonBody(payload): JsonBody<CreatePaymentRequest>,
) -> Result<(StatusCode, Json<Payment>), ApiError> {
    auth_user.require_role(Role::Student)?;

    let payment = payload.validate()?;

    let payment = payment_repo::create_payment(
        &state.pool,
        auth_user.user_id,
        payment.plan,
        payment.amount_minor,
        &payment.currency,
        payment.provider_reference.as_deref(),
    )
    .await?;

    tracing::info!(
        payment_id = %payment.id,
        user_id = %auth_user.user_id,
        amount_minor = payment.amount_minor,
        currency = %payment.currency,
        "Payment recorded"
    );

    Ok((StatusCode::CREATED, Json(payment)))
}

async fn list_payments(
    auth_user: AuthUser,
    State(state): State<ApiState>,
) -> Result<Json<Vec<Payment>>, ApiError> {
    auth_user.require_role(Role::Student)?;

    let payments = payment_repo::list_for_student(&state.pool, auth_user.user_id).await?;
    Ok(Json(payments))
}
