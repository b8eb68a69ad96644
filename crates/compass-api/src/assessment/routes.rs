use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use compass_db::{
    models::{Role, Test, TestResult, TestSummary},
    repositories::test as test_repo,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::scoring::{self, AnswerInput};
use crate::{ApiState, auth::AuthUser, error::ApiError, middleware::rate_limit, validation::JsonBody};

pub fn routes() -> Router<ApiState> {
    use crate::make_rate_limit_layer;

    Router::new()
        .route("/tests", get(list_tests))
        .route("/tests/results", get(list_results))
        .route("/tests/results/{id}", get(get_result))
        .route("/tests/{id}", get(get_test))
        .route("/tests/{id}/submit", post(submit_test))
        .layer(make_rate_limit_layer!(
            rate_limit::GENERAL_REPLENISH_MS,
            rate_limit::GENERAL_BURST_SIZE
        ))
}

/// Question as shown to a test taker, without its scoring key
#[derive(Debug, Serialize)]
pub struct PublicQuestion {
    pub id: Uuid,
    pub position: i32,
    pub prompt: String,
}

#[derive(Debug, Serialize)]
pub struct TestDetail {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub questions: Vec<PublicQuestion>,
}

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub answers: Vec<AnswerInput>,
}

/// Load a test students may take. Inactive tests are reported as missing.
async fn find_active_test<'e, E>(executor: E, test_id: Uuid) -> Result<Test, ApiError>
where
    E: sqlx::Executor<'e, Database = sqlx::Postgres>,
{
    test_repo::find_test(executor, test_id)
        .await?
        .filter(|test| test.is_active)
        .ok_or_else(|| ApiError::NotFound("Test not found".to_string()))
}

async fn list_tests(
    _auth_user: AuthUser,
    State(state): State<ApiState>,
) -> Result<Json<Vec<TestSummary>>, ApiError> {
    let tests = test_repo::list_active_tests(&state.pool).await?;
    Ok(Json(tests))
}

async fn get_test(
    _auth_user: AuthUser,
    State(state): State<ApiState>,
    Path(test_id): Path<Uuid>,
) -> Result<Json<TestDetail>, ApiError> {
    let test = find_active_test(&state.pool, test_id).await?;
    let questions = test_repo::find_questions(&state.pool, test_id).await?;

    Ok(Json(TestDetail {
        id: test.id,
        slug: test.slug,
        title: test.title,
        description: test.description,
        questions: questions
            .into_iter()
            .map(|q| PublicQuestion {
                id: q.id,
                position: q.position,
                prompt: q.prompt,
            })
            .collect(),
    }))
}

async fn submit_test(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Path(test_id): Path<Uuid>,
    JsonBody(payload): JsonBody<SubmitRequest>,
) -> Result<(StatusCode, Json<TestResult>), ApiError> {
    auth_user.require_role(Role::Student)?;

    let mut tx = state.pool.begin().await?;

    find_active_test(&mut *tx, test_id).await?;
    let questions = test_repo::find_questions(&mut *tx, test_id).await?;

    let (scored, sheet) = scoring::match_answers(&questions, &payload.answers)?;
    let profile = compass_assess::score(&scored)
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let answers_json = serde_json::to_value(&sheet)
        .map_err(|e| ApiError::Internal(format!("Failed to encode answers: {e}")))?;
    let scores_json = serde_json::to_value(&profile.scores)
        .map_err(|e| ApiError::Internal(format!("Failed to encode scores: {e}")))?;

    let result = test_repo::insert_result(
        &mut *tx,
        auth_user.user_id,
        test_id,
        &answers_json,
        &scores_json,
        &profile.holland_code,
    )
    .await?;

    tx.commit().await?;

    tracing::info!(
        user_id = %auth_user.user_id,
        test_id = %test_id,
        holland_code = %result.holland_code,
        "Test submitted"
    );

    Ok((StatusCode::CREATED, Json(result)))
}

async fn list_results(
    auth_user: AuthUser,
    State(state): State<ApiState>,
) -> Result<Json<Vec<TestResult>>, ApiError> {
    auth_user.require_role(Role::Student)?;

    let results = test_repo::list_results_for_student(&state.pool, auth_user.user_id).await?;
    Ok(Json(results))
}

async fn get_result(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Path(result_id): Path<Uuid>,
) -> Result<Json<TestResult>, ApiError> {
    auth_user.require_role(Role::Student)?;

    let result = test_repo::find_result_for_student(&state.pool, result_id, auth_user.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Test result not found".to_string()))?;

    Ok(Json(result))
}
