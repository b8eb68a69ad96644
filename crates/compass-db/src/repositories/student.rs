use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::models::{StudentOnboarding, StudentProfile};

pub async fn create_student<'e, E>(executor: E, user_id: Uuid) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(
        // language=PostgreSQL
        r#"
            INSERT INTO students (user_id)
            VALUES ($1)
        "#,
    )
    .bind(user_id)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn student_exists<'e, E>(executor: E, user_id: Uuid) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar(
        // language=PostgreSQL
        r#"
            SELECT EXISTS(SELECT 1 FROM students WHERE user_id = $1)
        "#,
    )
    .bind(user_id)
    .fetch_one(executor)
    .await
}

pub async fn find_profile<'e, E>(
    executor: E,
    user_id: Uuid,
) -> Result<Option<StudentProfile>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT
                s.user_id, u.email, u.full_name, s.phone, s.date_of_birth, s.city,
                s.education_level, s.institution, s.stream, s.interests, s.career_goals,
                s.onboarding_completed_at, s.created_at
            FROM students s
            JOIN users u ON u.id = s.user_id
            WHERE s.user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(executor)
    .await
}

/// Save the onboarding form. The completion timestamp is only set the first time.
pub async fn update_onboarding<'e, E>(
    executor: E,
    user_id: Uuid,
    form: &StudentOnboarding,
) -> Result<Option<StudentProfile>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            WITH updated AS (
                UPDATE students
                SET phone = $2,
                    date_of_birth = $3,
                    city = $4,
                    education_level = $5,
                    institution = $6,
                    stream = $7,
                    interests = $8,
                    career_goals = $9,
                    onboarding_completed_at = COALESCE(onboarding_completed_at, NOW()),
                    updated_at = NOW()
                WHERE user_id = $1
                RETURNING *
            )
            SELECT
                s.user_id, u.email, u.full_name, s.phone, s.date_of_birth, s.city,
                s.education_level, s.institution, s.stream, s.interests, s.career_goals,
                s.onboarding_completed_at, s.created_at
            FROM updated s
            JOIN users u ON u.id = s.user_id
        "#,
    )
    .bind(user_id)
    .bind(form.phone.as_deref())
    .bind(form.date_of_birth)
    .bind(form.city.as_deref())
    .bind(&form.education_level)
    .bind(form.institution.as_deref())
    .bind(form.stream.as_deref())
    .bind(&form.interests)
    .bind(form.career_goals.as_deref())
    .fetch_optional(executor)
    .await
}
