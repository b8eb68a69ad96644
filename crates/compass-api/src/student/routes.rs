use axum::{
    Json, Router,
    extract::State,
    routing::{get, put},
};
use chrono::{NaiveDate, Utc};
use compass_db::{
    models::{Role, StudentAssignment, StudentOnboarding, StudentProfile},
    repositories::{assignment as assignment_repo, student as student_repo},
};
use serde::{Deserialize, Serialize};

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
        .route("/students/me", get(get_profile))
        .route("/students/me/onboarding", put(update_onboarding))
        .route("/students/me/mentor", get(get_mentor))
        .layer(make_rate_limit_layer!(
            rate_limit::GENERAL_REPLENISH_MS,
            rate_limit::GENERAL_BURST_SIZE
        ))
}

#[derive(Debug, Serialize)]
pub struct StudentProfileResponse {
    #[serde(flatten)]
    pub profile: StudentProfile,
    pub onboarding_completed: bool,
}

impl From<StudentProfile> for StudentProfileResponse {
    fn from(profile: StudentProfile) -> Self {
        Self {
            onboarding_completed: profile.onboarding_completed(),
            profile,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct OnboardingRequest {
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub city: Option<String>,
    pub education_level: String,
    pub institution: Option<String>,
    pub stream: Option<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    pub career_goals: Option<String>,
}

impl OnboardingRequest {
    /// Validate and normalize into the form the repository stores.
    pub fn into_onboarding(self, today: NaiveDate) -> Result<StudentOnboarding, ApiError> {
        let education_level = self.education_level.trim().to_string();
        validation::validate_education_level(&education_level)?;

        if let Some(date_of_birth) = self.date_of_birth {
            validation::validate_date_of_birth(date_of_birth, today)?;
        }

        let phone = validation::non_empty(self.phone)
            .map(|phone| validation::normalize_phone(&phone))
            .transpose()?;

        let city = validation::non_empty(self.city);
        let institution = validation::non_empty(self.institution);
        let stream = validation::non_empty(self.stream);
        let career_goals = validation::non_empty(self.career_goals);

        for (field, value, max) in [
            ("City", &city, 100),
            ("Institution", &institution, 200),
            ("Stream", &stream, 100),
            ("Career goals", &career_goals, 2000),
        ] {
            if let Some(value) = value {
                validation::validate_text(field, value, 1, max)?;
            }
        }

        let interests = validation::normalize_tags("interests", &self.interests, 0, 10, 50)?;

        Ok(StudentOnboarding {
            phone,
            date_of_birth: self.date_of_birth,
            city,
            education_level,
            institution,
            stream,
            interests,
            career_goals,
        })
    }
}

async fn get_profile(
    auth_user: AuthUser,
    State(state): State<ApiState>,
) -> Result<Json<StudentProfileResponse>, ApiError> {
    auth_user.require_role(Role::Student)?;

    let profile = student_repo::find_profile(&state.pool, auth_user.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Student profile not found".to_string()))?;

    Ok(Json(profile.into()))
}

async fn update_onboarding(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    JsonBody(payload): JsonBody<OnboardingRequest>,
) -> Result<Json<StudentProfileResponse>, ApiError> {
    auth_user.require_role(Role::Student)?;

    let form = payload.into_onboarding(Utc::now().date_naive())?;

    let profile = student_repo::update_onboarding(&state.pool, auth_user.user_id, &form)
        .await?
        .ok_or_else(|| ApiError::NotFound("Student profile not found".to_string()))?;

    tracing::info!(user_id = %auth_user.user_id, "Student onboarding saved");

    Ok(Json(profile.into()))
}

async fn get_mentor(
    auth_user: AuthUser,
    State(state): State<ApiState>,
) -> Result<Json<StudentAssignment>, ApiError> {
    auth_user.require_role(Role::Student)?;

    let assignment =
        assignment_repo::find_live_for_student_with_mentor(&state.pool, auth_user.user_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("No mentor assigned".to_string()))?;

    Ok(Json(assignment))
}
