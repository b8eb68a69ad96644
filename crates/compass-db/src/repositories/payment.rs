use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::models::{Payment, PaymentPlan, PaymentStatus};

pub async fn create_payment<'e, E>(
    executor: E,
    student_id: Uuid,
    plan: PaymentPlan,
    amount_minor: i64,
    currency: &str,
    provider_reference: Option<&str>,
) -> Result<Payment, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            INSERT INTO payments (student_id, plan, amount_minor, currency, provider_reference)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, student_id, plan, amount_minor, currency, provider_reference, status,
                      created_at, updated_at
        "#,
    )
    .bind(student_id)
    .bind(plan)
    .bind(amount_minor)
    .bind(currency)
    .bind(provider_reference)
    .fetch_one(executor)
    .await
}

pub async fn list_for_student<'e, E>(
    executor: E,
    student_id: Uuid,
) -> Result<Vec<Payment>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, student_id, plan, amount_minor, currency, provider_reference, status,
                   created_at, updated_at
            FROM payments
            WHERE student_id = $1
            ORDER BY created_at DESC
        "#,
    )
    .bind(student_id)
    .fetch_all(executor)
    .await
}

pub async fn list_all<'e, E>(
    executor: E,
    status: Option<PaymentStatus>,
) -> Result<Vec<Payment>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, student_id, plan, amount_minor, currency, provider_reference, status,
                   created_at, updated_at
            FROM payments
            WHERE ($1::payment_status IS NULL OR status = $1)
            ORDER BY created_at DESC
        "#,
    )
    .bind(status)
    .fetch_all(executor)
    .await
}

pub async fn find_by_id<'e, E>(executor: E, payment_id: Uuid) -> Result<Option<Payment>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, student_id, plan, amount_minor, currency, provider_reference, status,
                   created_at, updated_at
            FROM payments
            WHERE id = $1
        "#,
    )
    .bind(payment_id)
    .fetch_optional(executor)
    .await
}

/// Conditional status change; `None` when the payment is no longer in `expected`.
pub async fn transition_status<'e, E>(
    executor: E,
    payment_id: Uuid,
    expected: PaymentStatus,
    next: PaymentStatus,
) -> Result<Option<Payment>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            UPDATE payments
            SET status = $3, updated_at = NOW()
            WHERE id = $1 AND status = $2
            RETURNING id, student_id, plan, amount_minor, currency, provider_reference, status,
                      created_at, updated_at
        "#,
    )
    .bind(payment_id)
    .bind(expected)
    .bind(next)
    .fetch_optional(executor)
    .await
}
