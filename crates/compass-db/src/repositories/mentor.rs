use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::models::{
    AssignmentStatus, MentorApproval, MentorListItem, MentorOnboarding, MentorProfile,
};

pub async fn create_mentor<'e, E>(executor: E, user_id: Uuid) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(
        // language=PostgreSQL
        r#"
            INSERT INTO mentors (user_id)
            VALUES ($1)
        "#,
    )
    .bind(user_id)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn find_profile<'e, E>(
    executor: E,
    user_id: Uuid,
) -> Result<Option<MentorProfile>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT
                m.user_id, u.email, u.full_name, m.expertise, m.bio, m.years_experience,
                m.qualification, m.languages, m.approval_status, m.onboarding_completed_at,
                m.created_at
            FROM mentors m
            JOIN users u ON u.id = m.user_id
            WHERE m.user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(executor)
    .await
}

pub async fn find_approval_status<'e, E>(
    executor: E,
    user_id: Uuid,
) -> Result<Option<MentorApproval>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar(
        // language=PostgreSQL
        r#"
            SELECT approval_status FROM mentors WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(executor)
    .await
}

pub async fn update_onboarding<'e, E>(
    executor: E,
    user_id: Uuid,
    form: &MentorOnboarding,
) -> Result<Option<MentorProfile>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            WITH updated AS (
                UPDATE mentors
                SET expertise = $2,
                    bio = $3,
                    years_experience = $4,
                    qualification = $5,
                    languages = $6,
                    onboarding_completed_at = COALESCE(onboarding_completed_at, NOW()),
                    updated_at = NOW()
                WHERE user_id = $1
                RETURNING *
            )
            SELECT
                m.user_id, u.email, u.full_name, m.expertise, m.bio, m.years_experience,
                m.qualification, m.languages, m.approval_status, m.onboarding_completed_at,
                m.created_at
            FROM updated m
            JOIN users u ON u.id = m.user_id
        "#,
    )
    .bind(user_id)
    .bind(&form.expertise)
    .bind(&form.bio)
    .bind(form.years_experience)
    .bind(&form.qualification)
    .bind(&form.languages)
    .fetch_optional(executor)
    .await
}

pub async fn set_approval_status<'e, E>(
    executor: E,
    user_id: Uuid,
    status: MentorApproval,
) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        // language=PostgreSQL
        r#"
            UPDATE mentors
            SET approval_status = $2, updated_at = NOW()
            WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .bind(status)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn list_mentors<'e, E>(
    executor: E,
    approval_status: Option<MentorApproval>,
) -> Result<Vec<MentorListItem>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT
                m.user_id, u.email, u.full_name, m.expertise, m.years_experience,
                m.approval_status,
                (
                    SELECT COUNT(*) FROM assigned_mentor a
                    WHERE a.mentor_id = m.user_id AND a.status = ANY($2)
                ) AS live_students,
                m.created_at
            FROM mentors m
            JOIN users u ON u.id = m.user_id
            WHERE ($1::mentor_approval IS NULL OR m.approval_status = $1)
            ORDER BY m.created_at DESC
        "#,
    )
    .bind(approval_status)
    .bind(AssignmentStatus::LIVE)
    .fetch_all(executor)
    .await
}
