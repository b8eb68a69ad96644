use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, patch, put},
};
use compass_db::{
    models::{Assignment, AssignmentStatus, MentorAssignment, MentorOnboarding, MentorProfile, Role},
    repositories::{assignment as assignment_repo, mentor as mentor_repo},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    ApiState,
    assignment::{self, Actor},
    auth::AuthUser,
    error::ApiError,
    middleware::rate_limit,
    validation::{self, JsonBody},
};

pub fn routes() -> Router<ApiState> {
    use crate::make_rate_limit_layer;

    Router::new()
        .route("/mentors/me", get(get_profile))
        .route("/mentors/me/onboarding", put(update_onboarding))
        .route("/mentors/me/assignments", get(list_assignments))
        .route("/mentors/me/assignments/{id}", patch(update_assignment))
        .layer(make_rate_limit_layer!(
            rate_limit::GENERAL_REPLENISH_MS,
            rate_limit::GENERAL_BURST_SIZE
        ))
}

#[derive(Debug, Deserialize)]
pub struct OnboardingRequest {
    pub expertise: Vec<String>,
    pub bio: String,
    pub years_experience: i32,
    pub qualification: String,
    #[serde(default)]
    pub languages: Vec<String>,
}

impl OnboardingRequest {
    pub fn into_onboarding(self) -> Result<MentorOnboarding, ApiError> {
        let expertise = validation::normalize_tags("expertise", &self.expertise, 1, 10, 50)?;
        let languages = validation::normalize_tags("languages", &self.languages, 0, 10, 50)?;

        let bio = self.bio.trim().to_string();
        validation::validate_text("Bio", &bio, 20, 2000)?;

        if !(0..=60).contains(&self.years_experience) {
            return Err(ApiError::Validation(
                "Years of experience must be between 0 and 60".to_string(),
            ));
        }

        let qualification = self.qualification.trim().to_string();
        validation::validate_text("Qualification", &qualification, 2, 200)?;

        Ok(MentorOnboarding {
            expertise,
            bio,
            years_experience: self.years_experience,
            qualification,
            languages,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusFilter {
    pub status: Option<AssignmentStatus>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateAssignmentRequest {
    pub status: AssignmentStatus,
    pub notes: Option<String>,
}

async fn get_profile(
    auth_user: AuthUser,
    State(state): State<ApiState>,
) -> Result<Json<MentorProfile>, ApiError> {
    auth_user.require_role(Role::Mentor)?;

    let profile = mentor_repo::find_profile(&state.pool, auth_user.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Mentor profile not found".to_string()))?;

    Ok(Json(profile))
}

async fn update_onboarding(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    JsonBody(payload): JsonBody<OnboardingRequest>,
) -> Result<Json<MentorProfile>, ApiError> {
    auth_user.require_role(Role::Mentor)?;

    let form = payload.into_onboarding()?;

    let profile = mentor_repo::update_onboarding(&state.pool, auth_user.user_id, &form)
        .await?
        .ok_or_else(|| ApiError::NotFound("Mentor profile not found".to_string()))?;

    tracing::info!(user_id = %auth_user.user_id, "Mentor onboarding saved");

    Ok(Json(profile))
}

async fn list_assignments(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Query(filter): Query<StatusFilter>,
) -> Result<Json<Vec<MentorAssignment>>, ApiError> {
    auth_user.require_role(Role::Mentor)?;

    let assignments =
        assignment_repo::list_for_mentor(&state.pool, auth_user.user_id, filter.status).await?;

    Ok(Json(assignments))
}

async fn update_assignment(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Path(assignment_id): Path<Uuid>,
    JsonBody(payload): JsonBody<UpdateAssignmentRequest>,
) -> Result<Json<Assignment>, ApiError> {
    auth_user.require_role(Role::Mentor)?;

    let current = assignment::load(&state.pool, assignment_id).await?;

    // Someone else's assignment is indistinguishable from a missing one
    if current.mentor_id != auth_user.user_id {
        return Err(ApiError::NotFound("Assignment not found".to_string()));
    }

    let notes = validation::non_empty(payload.notes);
    let updated = assignment::apply_transition(
        &state.pool,
        Actor::Mentor,
        &current,
        payload.status,
        notes.as_deref(),
    )
    .await?;

    Ok(Json(updated))
}
