use sqlx::{Executor, Postgres};

use crate::models::{AssignmentStatus, CurrencyVolume, PlatformStats, StudentListItem};

/// Headline counts. `completed_payments` is left empty, see [`completed_payment_volume`].
pub async fn platform_stats<'e, E>(executor: E) -> Result<PlatformStats, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT
                (SELECT COUNT(*) FROM students) AS students,
                (SELECT COUNT(*) FROM students WHERE onboarding_completed_at IS NOT NULL)
                    AS onboarded_students,
                (SELECT COUNT(*) FROM mentors WHERE approval_status = 'pending') AS mentors_pending,
                (SELECT COUNT(*) FROM mentors WHERE approval_status = 'approved') AS mentors_approved,
                (SELECT COUNT(*) FROM mentors WHERE approval_status = 'rejected') AS mentors_rejected,
                (SELECT COUNT(*) FROM assigned_mentor WHERE status = ANY($1))
                    AS live_assignments,
                (SELECT COUNT(*) FROM test_results) AS test_results,
                (SELECT COUNT(*) FROM ai_horoscope WHERE status = 'ready') AS ready_horoscopes
        "#,
    )
    .bind(AssignmentStatus::LIVE)
    .fetch_one(executor)
    .await
}

/// Completed payment totals, one row per currency.
pub async fn completed_payment_volume<'e, E>(executor: E) -> Result<Vec<CurrencyVolume>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT currency, SUM(amount_minor)::BIGINT AS amount_minor
            FROM payments
            WHERE status = 'completed'
            GROUP BY currency
            ORDER BY currency
        "#,
    )
    .fetch_all(executor)
    .await
}

pub async fn list_students<'e, E>(executor: E) -> Result<Vec<StudentListItem>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT
                s.user_id, u.email, u.full_name, s.education_level,
                s.onboarding_completed_at IS NOT NULL AS onboarding_completed,
                a.mentor_id AS live_mentor_id,
                s.created_at
            FROM students s
            JOIN users u ON u.id = s.user_id
            LEFT JOIN assigned_mentor a
                ON a.student_id = s.user_id AND a.status = ANY($1)
            ORDER BY s.created_at DESC
        "#,
    )
    .bind(AssignmentStatus::LIVE)
    .fetch_all(executor)
    .await
}
