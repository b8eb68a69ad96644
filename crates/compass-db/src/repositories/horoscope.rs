use chrono::{DateTime, Utc};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::models::Horoscope;

pub async fn find_for_student<'e, E>(
    executor: E,
    student_id: Uuid,
) -> Result<Option<Horoscope>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT student_id, status, report, error, requested_at, completed_at
            FROM ai_horoscope
            WHERE student_id = $1
        "#,
    )
    .bind(student_id)
    .fetch_optional(executor)
    .await
}

/// Reset the student's horoscope to a fresh `pending` request.
///
/// Returns `None` when a pending request newer than `stale_before` already exists,
/// leaving that row untouched.
pub async fn begin_generation<'e, E>(
    executor: E,
    student_id: Uuid,
    stale_before: DateTime<Utc>,
) -> Result<Option<Horoscope>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            INSERT INTO ai_horoscope (student_id, status, requested_at)
            VALUES ($1, 'pending', NOW())
            ON CONFLICT (student_id) DO UPDATE
            SET status = 'pending',
                report = NULL,
                error = NULL,
                requested_at = NOW(),
                completed_at = NULL
            WHERE ai_horoscope.status <> 'pending'
               OR ai_horoscope.requested_at < $2
            RETURNING student_id, status, report, error, requested_at, completed_at
        "#,
    )
    .bind(student_id)
    .bind(stale_before)
    .fetch_optional(executor)
    .await
}

/// Store the report, but only for the request identified by `requested_at`.
pub async fn mark_ready<'e, E>(
    executor: E,
    student_id: Uuid,
    requested_at: DateTime<Utc>,
    report: &serde_json::Value,
) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        // language=PostgreSQL
        r#"
            UPDATE ai_horoscope
            SET status = 'ready', report = $3, error = NULL, completed_at = NOW()
            WHERE student_id = $1 AND requested_at = $2 AND status = 'pending'
        "#,
    )
    .bind(student_id)
    .bind(requested_at)
    .bind(report)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn mark_failed<'e, E>(
    executor: E,
    student_id: Uuid,
    requested_at: DateTime<Utc>,
    error: &str,
) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        // language=PostgreSQL
        r#"
            UPDATE ai_horoscope
            SET status = 'failed', error = $3, completed_at = NOW()
            WHERE student_id = $1 AND requested_at = $2 AND status = 'pending'
        "#,
    )
    .bind(student_id)
    .bind(requested_at)
    .bind(error)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn expire_stale<'e, E>(executor: E, stale_before: DateTime<Utc>) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        // language=PostgreSQL
        r#"
            UPDATE ai_horoscope
            SET status = 'failed', error = 'generation timed out', completed_at = NOW()
            WHERE status = 'pending' AND requested_at < $1
        "#,
    )
    .bind(stale_before)
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}
