use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch, post},
};
use compass_assess::Dimension;
use compass_db::{
    models::{
        Assignment, AssignmentOverview, AssignmentStatus, MentorApproval, MentorListItem,
        MentorProfile, Payment, PaymentStatus, PlatformStats, Role, StudentListItem, Test, User,
    },
    repositories::{
        admin as admin_repo, assignment as assignment_repo, mentor as mentor_repo,
        payment as payment_repo, student as student_repo, test as test_repo, user as user_repo,
    },
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    ApiState,
    assignment::{self, Actor},
    auth::{
        AdminUser,
        service::{self, NewAccount},
        validation as auth_validation,
    },
    error::ApiError,
    middleware::rate_limit,
    payment,
    validation::{self, JsonBody},
};

pub fn routes() -> Router<ApiState> {
    use crate::make_rate_limit_layer;

    Router::new()
        .route("/admin/stats", get(stats))
        .route("/admin/students", get(list_students))
        .route("/admin/mentors", get(list_mentors))
        .route("/admin/mentors/{id}/approval", patch(set_mentor_approval))
        .route(
            "/admin/assignments",
            get(list_assignments).post(create_assignment),
        )
        .route("/admin/assignments/{id}", patch(update_assignment))
        .route("/admin/payments", get(list_payments))
        .route("/admin/payments/{id}", patch(update_payment))
        .route("/admin/tests", get(list_tests).post(create_test))
        .route("/admin/tests/{id}", patch(update_test))
        .route("/admin/admins", post(create_admin))
        .layer(make_rate_limit_layer!(
            rate_limit::GENERAL_REPLENISH_MS,
            rate_limit::GENERAL_BURST_SIZE
        ))
}

// --- Request bodies ---

#[derive(Debug, Deserialize)]
pub struct ApprovalFilter {
    pub approval_status: Option<MentorApproval>,
}

#[derive(Debug, Deserialize)]
pub struct ApprovalRequest {
    pub status: MentorApproval,
}

#[derive(Debug, Deserialize)]
pub struct AssignmentStatusFilter {
    pub status: Option<AssignmentStatus>,
}

#[derive(Debug, Deserialize)]
pub struct CreateAssignmentRequest {
    pub student_id: Uuid,
    pub mentor_id: Uuid,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateAssignmentRequest {
    pub status: AssignmentStatus,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PaymentStatusFilter {
    pub status: Option<PaymentStatus>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePaymentRequest {
    pub status: PaymentStatus,
}

#[derive(Debug, Deserialize)]
pub struct QuestionRequest {
    pub prompt: String,
    pub dimension: String,
    #[serde(default)]
    pub reverse_scored: bool,
}

#[derive(Debug, Deserialize)]
pub struct CreateTestRequest {
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub questions: Vec<QuestionRequest>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTestRequest {
    pub is_active: bool,
}

#[derive(Debug, Deserialize)]
pub struct CreateAdminRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

/// Validated question: prompt plus the RIASEC letter it measures
#[derive(Debug, PartialEq, Eq)]
pub struct QuestionDraft {
    pub prompt: String,
    pub dimension: char,
    pub reverse_scored: bool,
}

#[derive(Debug, PartialEq, Eq)]
pub struct TestDraft {
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub questions: Vec<QuestionDraft>,
}

impl CreateTestRequest {
    pub fn into_draft(self) -> Result<TestDraft, ApiError> {
        let slug = self.slug.trim().to_string();
        validation::validate_slug(&slug)?;

        let title = self.title.trim().to_string();
        validation::validate_text("Title", &title, 3, 200)?;

        let description = validation::non_empty(self.description);
        if let Some(description) = &description {
            validation::validate_text("Description", description, 1, 2000)?;
        }

        if self.questions.is_empty() || self.questions.len() > 200 {
            return Err(ApiError::Validation(
                "A test must have between 1 and 200 questions".to_string(),
            ));
        }

        let questions = self
            .questions
            .into_iter()
            .map(|q| {
                let prompt = q.prompt.trim().to_string();
                validation::validate_text("Question prompt", &prompt, 5, 500)?;
                let dimension: Dimension = q
                    .dimension
                    .parse()
                    .map_err(|e: compass_assess::ScoreError| ApiError::Validation(e.to_string()))?;
                Ok(QuestionDraft {
                    prompt,
                    dimension: dimension.letter(),
                    reverse_scored: q.reverse_scored,
                })
            })
            .collect::<Result<Vec<_>, ApiError>>()?;

        Ok(TestDraft {
            slug,
            title,
            description,
            questions,
        })
    }
}

// --- Overview ---

async fn stats(
    _admin: AdminUser,
    State(state): State<ApiState>,
) -> Result<Json<PlatformStats>, ApiError> {
    let mut stats = admin_repo::platform_stats(&state.pool).await?;
    stats.completed_payments = admin_repo::completed_payment_volume(&state.pool).await?;
    Ok(Json(stats))
}

async fn list_students(
    _admin: AdminUser,
    State(state): State<ApiState>,
) -> Result<Json<Vec<StudentListItem>>, ApiError> {
    Ok(Json(admin_repo::list_students(&state.pool).await?))
}

// --- Mentors ---

async fn list_mentors(
    _admin: AdminUser,
    State(state): State<ApiState>,
    Query(filter): Query<ApprovalFilter>,
) -> Result<Json<Vec<MentorListItem>>, ApiError> {
    let mentors = mentor_repo::list_mentors(&state.pool, filter.approval_status).await?;
    Ok(Json(mentors))
}

async fn set_mentor_approval(
    AdminUser(admin): AdminUser,
    State(state): State<ApiState>,
    Path(mentor_id): Path<Uuid>,
    JsonBody(payload): JsonBody<ApprovalRequest>,
) -> Result<Json<MentorProfile>, ApiError> {
    if payload.status == MentorApproval::Pending {
        return Err(ApiError::Validation(
            "Approval status must be approved or rejected".to_string(),
        ));
    }

    if !mentor_repo::set_approval_status(&state.pool, mentor_id, payload.status).await? {
        return Err(ApiError::NotFound("Mentor not found".to_string()));
    }

    let profile = mentor_repo::find_profile(&state.pool, mentor_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Mentor not found".to_string()))?;

    tracing::info!(
        mentor_id = %mentor_id,
        admin_id = %admin.user_id,
        status = ?payload.status,
        "Mentor approval updated"
    );

    Ok(Json(profile))
}

// --- Assignments ---

async fn create_assignment(
    AdminUser(admin): AdminUser,
    State(state): State<ApiState>,
    JsonBody(payload): JsonBody<CreateAssignmentRequest>,
) -> Result<(StatusCode, Json<Assignment>), ApiError> {
    let notes = validation::non_empty(payload.notes);
    if let Some(notes) = &notes {
        validation::validate_text("Notes", notes, 1, 2000)?;
    }

    let mut tx = state.pool.begin().await?;

    if !student_repo::student_exists(&mut *tx, payload.student_id).await? {
        return Err(ApiError::Validation("Student not found".to_string()));
    }

    match mentor_repo::find_approval_status(&mut *tx, payload.mentor_id).await? {
        Some(MentorApproval::Approved) => {}
        Some(_) => {
            return Err(ApiError::Validation(
                "Mentor is not approved".to_string(),
            ));
        }
        None => return Err(ApiError::Validation("Mentor not found".to_string())),
    }

    if assignment_repo::find_live_for_student_for_update(&mut *tx, payload.student_id)
        .await?
        .is_some()
    {
        return Err(ApiError::Conflict(
            "Student already has a live mentor assignment".to_string(),
        ));
    }

    let assignment = assignment_repo::create_assignment(
        &mut *tx,
        payload.student_id,
        payload.mentor_id,
        admin.user_id,
        notes.as_deref(),
    )
    .await
    .map_err(|e| {
        // Lost a race with another assignment for the same student
        if compass_db::is_unique_violation(&e) {
            ApiError::Conflict("Student already has a live mentor assignment".to_string())
        } else {
            ApiError::from(e)
        }
    })?;

    tx.commit().await?;

    tracing::info!(
        assignment_id = %assignment.id,
        student_id = %assignment.student_id,
        mentor_id = %assignment.mentor_id,
        admin_id = %admin.user_id,
        "Mentor assigned"
    );

    Ok((StatusCode::CREATED, Json(assignment)))
}

async fn list_assignments(
    _admin: AdminUser,
    State(state): State<ApiState>,
    Query(filter): Query<AssignmentStatusFilter>,
) -> Result<Json<Vec<AssignmentOverview>>, ApiError> {
    let assignments = assignment_repo::list_all(&state.pool, filter.status).await?;
    Ok(Json(assignments))
}

async fn update_assignment(
    _admin: AdminUser,
    State(state): State<ApiState>,
    Path(assignment_id): Path<Uuid>,
    JsonBody(payload): JsonBody<UpdateAssignmentRequest>,
) -> Result<Json<Assignment>, ApiError> {
    let current = assignment::load(&state.pool, assignment_id).await?;
    let notes = validation::non_empty(payload.notes);

    let updated = assignment::apply_transition(
        &state.pool,
        Actor::Admin,
        &current,
        payload.status,
        notes.as_deref(),
    )
    .await?;

    Ok(Json(updated))
}

// --- Payments ---

async fn list_payments(
    _admin: AdminUser,
    State(state): State<ApiState>,
    Query(filter): Query<PaymentStatusFilter>,
) -> Result<Json<Vec<Payment>>, ApiError> {
    Ok(Json(payment_repo::list_all(&state.pool, filter.status).await?))
}

async fn update_payment(
    _admin: AdminUser,
    State(state): State<ApiState>,
    Path(payment_id): Path<Uuid>,
    JsonBody(payload): JsonBody<UpdatePaymentRequest>,
) -> Result<Json<Payment>, ApiError> {
    let payment = payment::update_status(&state.pool, payment_id, payload.status).await?;
    Ok(Json(payment))
}

// --- Tests ---

async fn list_tests(
    _admin: AdminUser,
    State(state): State<ApiState>,
) -> Result<Json<Vec<Test>>, ApiError> {
    Ok(Json(test_repo::list_all_tests(&state.pool).await?))
}

async fn create_test(
    AdminUser(admin): AdminUser,
    State(state): State<ApiState>,
    JsonBody(payload): JsonBody<CreateTestRequest>,
) -> Result<(StatusCode, Json<Test>), ApiError> {
    let draft = payload.into_draft()?;

    let mut tx = state.pool.begin().await?;

    let test = test_repo::create_test(
        &mut *tx,
        &draft.slug,
        &draft.title,
        draft.description.as_deref(),
    )
    .await
    .map_err(|e| {
        if compass_db::is_unique_violation(&e) {
            ApiError::Conflict(format!("A test with slug '{}' already exists", draft.slug))
        } else {
            ApiError::from(e)
        }
    })?;

    for (position, question) in (1..).zip(&draft.questions) {
        test_repo::insert_question(
            &mut *tx,
            test.id,
            position,
            &question.prompt,
            question.dimension,
            question.reverse_scored,
        )
        .await?;
    }

    tx.commit().await?;

    tracing::info!(
        test_id = %test.id,
        slug = %test.slug,
        questions = draft.questions.len(),
        admin_id = %admin.user_id,
        "Test created"
    );

    Ok((StatusCode::CREATED, Json(test)))
}

async fn update_test(
    _admin: AdminUser,
    State(state): State<ApiState>,
    Path(test_id): Path<Uuid>,
    JsonBody(payload): JsonBody<UpdateTestRequest>,
) -> Result<Json<Test>, ApiError> {
    let test = test_repo::set_test_active(&state.pool, test_id, payload.is_active)
        .await?
        .ok_or_else(|| ApiError::NotFound("Test not found".to_string()))?;

    tracing::info!(test_id = %test.id, is_active = test.is_active, "Test visibility changed");

    Ok(Json(test))
}

// --- Admin accounts ---

async fn create_admin(
    AdminUser(admin): AdminUser,
    State(state): State<ApiState>,
    JsonBody(payload): JsonBody<CreateAdminRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let email = auth_validation::normalize_email(&payload.email);
    let full_name = payload.full_name.trim();
    auth_validation::validate_email(&email)?;
    auth_validation::validate_password(&payload.password)?;
    auth_validation::validate_full_name(full_name)?;

    if user_repo::email_exists(&state.pool, &email).await? {
        return Err(ApiError::Conflict("Email already registered".to_string()));
    }

    let password_hash = service::hash_password(payload.password, state.bcrypt_cost).await?;
    let user = service::create_account(
        &state.pool,
        NewAccount {
            email: &email,
            password_hash: &password_hash,
            full_name,
            role: Role::Admin,
            created_by: Some(admin.user_id),
        },
    )
    .await?;

    tracing::info!(user_id = %user.id, created_by = %admin.user_id, "Admin account created");

    Ok((StatusCode::CREATED, Json(user)))
}
