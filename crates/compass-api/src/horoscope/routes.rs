use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::Utc;
use compass_db::{
    models::{Horoscope, HoroscopeStatus, Role},
    repositories::{
        horoscope as horoscope_repo, student as student_repo, test as test_repo,
    },
};
use serde_json::json;

use super::{client::GenerationRequest, service};
use crate::{ApiState, auth::AuthUser, error::ApiError, metrics, middleware::rate_limit};

pub fn routes() -> Router<ApiState> {
    use crate::make_rate_limit_layer;

    // Triggering is expensive upstream, so it shares the stricter budget
    let trigger_routes = Router::new()
        .route("/horoscope/generate", post(generate))
        .layer(make_rate_limit_layer!(
            rate_limit::AUTH_REPLENISH_MS,
            rate_limit::AUTH_BURST_SIZE
        ));

    let poll_routes = Router::new()
        .route("/horoscope", get(get_horoscope))
        .layer(make_rate_limit_layer!(
            rate_limit::GENERAL_REPLENISH_MS,
            rate_limit::GENERAL_BURST_SIZE
        ));

    Router::new().merge(trigger_routes).merge(poll_routes)
}

/// Polling view of a horoscope row.
pub fn horoscope_response(horoscope: Horoscope) -> Response {
    match horoscope.status {
        HoroscopeStatus::Pending => (
            StatusCode::ACCEPTED,
            Json(json!({
                "status": horoscope.status,
                "requested_at": horoscope.requested_at,
            })),
        )
            .into_response(),
        HoroscopeStatus::Ready => Json(json!({
            "status": horoscope.status,
            "report": horoscope.report,
            "completed_at": horoscope.completed_at,
        }))
        .into_response(),
        HoroscopeStatus::Failed => Json(json!({
            "status": horoscope.status,
            "error": horoscope.error,
        }))
        .into_response(),
    }
}

async fn generate(auth_user: AuthUser, State(state): State<ApiState>) -> Result<Response, ApiError> {
    auth_user.require_role(Role::Student)?;

    let client = state.horoscope_client.clone().ok_or_else(|| {
        ApiError::ServiceUnavailable("Report generation is not available".to_string())
    })?;

    let student = student_repo::find_profile(&state.pool, auth_user.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Student profile not found".to_string()))?;

    if !student.onboarding_completed() {
        return Err(ApiError::Validation(
            "Complete onboarding before generating a report".to_string(),
        ));
    }

    let latest_result = test_repo::latest_result_for_student(&state.pool, auth_user.user_id)
        .await?
        .ok_or_else(|| {
            ApiError::Validation("Take a psychometric test before generating a report".to_string())
        })?;

    let stale_before = service::stale_before(Utc::now(), state.horoscope_stale_minutes);
    let horoscope = horoscope_repo::begin_generation(&state.pool, auth_user.user_id, stale_before)
        .await?
        .ok_or_else(|| ApiError::Conflict("A report is already being generated".to_string()))?;

    service::spawn_generation(
        state.pool.clone(),
        client,
        auth_user.user_id,
        horoscope.requested_at,
        GenerationRequest {
            student,
            latest_result,
        },
    );

    metrics::record_horoscope_generation("requested");
    tracing::info!(user_id = %auth_user.user_id, "Horoscope generation requested");

    Ok(horoscope_response(horoscope))
}

async fn get_horoscope(
    auth_user: AuthUser,
    State(state): State<ApiState>,
) -> Result<Response, ApiError> {
    auth_user.require_role(Role::Student)?;

    let horoscope = horoscope_repo::find_for_student(&state.pool, auth_user.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("No report has been requested".to_string()))?;

    Ok(horoscope_response(horoscope))
}
