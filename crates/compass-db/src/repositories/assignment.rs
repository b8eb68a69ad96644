use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::models::{
    Assignment, AssignmentOverview, AssignmentStatus, MentorAssignment, StudentAssignment,
};

/// Lock and return the student's live (pending or active) assignment, if any.
pub async fn find_live_for_student_for_update<'e, E>(
    executor: E,
    student_id: Uuid,
) -> Result<Option<Assignment>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, student_id, mentor_id, status, assigned_by, notes, created_at, updated_at
            FROM assigned_mentor
            WHERE student_id = $1 AND status = ANY($2)
            FOR UPDATE
        "#,
    )
    .bind(student_id)
    .bind(AssignmentStatus::LIVE)
    .fetch_optional(executor)
    .await
}

pub async fn create_assignment<'e, E>(
    executor: E,
    student_id: Uuid,
    mentor_id: Uuid,
    assigned_by: Uuid,
    notes: Option<&str>,
) -> Result<Assignment, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            INSERT INTO assigned_mentor (student_id, mentor_id, status, assigned_by, notes)
            VALUES ($1, $2, 'pending', $3, $4)
            RETURNING id, student_id, mentor_id, status, assigned_by, notes, created_at, updated_at
        "#,
    )
    .bind(student_id)
    .bind(mentor_id)
    .bind(assigned_by)
    .bind(notes)
    .fetch_one(executor)
    .await
}

pub async fn find_by_id<'e, E>(
    executor: E,
    assignment_id: Uuid,
) -> Result<Option<Assignment>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, student_id, mentor_id, status, assigned_by, notes, created_at, updated_at
            FROM assigned_mentor
            WHERE id = $1
        "#,
    )
    .bind(assignment_id)
    .fetch_optional(executor)
    .await
}

/// Move an assignment from `expected` to `next`.
///
/// Returns `None` when the row no longer has status `expected`, meaning a concurrent
/// update won the race.
pub async fn transition_status<'e, E>(
    executor: E,
    assignment_id: Uuid,
    expected: AssignmentStatus,
    next: AssignmentStatus,
    notes: Option<&str>,
) -> Result<Option<Assignment>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            UPDATE assigned_mentor
            SET status = $3,
                notes = COALESCE($4, notes),
                updated_at = NOW()
            WHERE id = $1 AND status = $2
            RETURNING id, student_id, mentor_id, status, assigned_by, notes, created_at, updated_at
        "#,
    )
    .bind(assignment_id)
    .bind(expected)
    .bind(next)
    .bind(notes)
    .fetch_optional(executor)
    .await
}

pub async fn find_live_for_student_with_mentor<'e, E>(
    executor: E,
    student_id: Uuid,
) -> Result<Option<StudentAssignment>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT
                a.id, a.status, a.mentor_id, u.full_name AS mentor_name,
                m.expertise, m.bio, m.years_experience, m.qualification, m.languages,
                a.created_at
            FROM assigned_mentor a
            JOIN mentors m ON m.user_id = a.mentor_id
            JOIN users u ON u.id = a.mentor_id
            WHERE a.student_id = $1 AND a.status = ANY($2)
        "#,
    )
    .bind(student_id)
    .bind(AssignmentStatus::LIVE)
    .fetch_optional(executor)
    .await
}

pub async fn list_for_mentor<'e, E>(
    executor: E,
    mentor_id: Uuid,
    status: Option<AssignmentStatus>,
) -> Result<Vec<MentorAssignment>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT
                a.id, a.status, a.notes, a.student_id,
                u.full_name AS student_name, u.email AS student_email,
                s.education_level, s.interests,
                a.created_at, a.updated_at
            FROM assigned_mentor a
            JOIN students s ON s.user_id = a.student_id
            JOIN users u ON u.id = a.student_id
            WHERE a.mentor_id = $1
              AND ($2::assignment_status IS NULL OR a.status = $2)
            ORDER BY a.created_at DESC
        "#,
    )
    .bind(mentor_id)
    .bind(status)
    .fetch_all(executor)
    .await
}

pub async fn list_all<'e, E>(
    executor: E,
    status: Option<AssignmentStatus>,
) -> Result<Vec<AssignmentOverview>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT
                a.id, a.status,
                a.student_id, su.full_name AS student_name,
                a.mentor_id, mu.full_name AS mentor_name,
                a.notes, a.created_at, a.updated_at
            FROM assigned_mentor a
            JOIN users su ON su.id = a.student_id
            JOIN users mu ON mu.id = a.mentor_id
            WHERE ($1::assignment_status IS NULL OR a.status = $1)
            ORDER BY a.created_at DESC
        "#,
    )
    .bind(status)
    .fetch_all(executor)
    .await
}
