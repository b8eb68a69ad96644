use chrono::{DateTime, Duration, Utc};
use compass_db::repositories::horoscope as horoscope_repo;
use sqlx::PgPool;
use tracing::Instrument;
use uuid::Uuid;

use super::client::{GenerationRequest, HoroscopeClient};
use crate::metrics;

/// Rows still pending after this window are treated as abandoned.
pub fn stale_before(now: DateTime<Utc>, stale_minutes: i64) -> DateTime<Utc> {
    now - Duration::minutes(stale_minutes)
}

/// Run one generation in the background and record its outcome.
///
/// The outcome is written only while the row still belongs to the request made
/// at `requested_at`. A newer trigger or the stale-expiry job wins over a late
/// response.
pub fn spawn_generation(
    pool: PgPool,
    client: HoroscopeClient,
    student_id: Uuid,
    requested_at: DateTime<Utc>,
    request: GenerationRequest,
) -> tokio::task::JoinHandle<()> {
    let span = tracing::info_span!(
        "horoscope_generation",
        %student_id,
        endpoint = %client.endpoint()
    );

    tokio::spawn(
        async move {
            let outcome = client.generate(&request).await;

            let recorded = match outcome {
                Ok(report) => {
                    metrics::record_horoscope_generation("ready");
                    horoscope_repo::mark_ready(&pool, student_id, requested_at, &report).await
                }
                Err(e) => {
                    tracing::error!("Horoscope generation failed: {e}");
                    metrics::record_horoscope_generation("failed");
                    horoscope_repo::mark_failed(&pool, student_id, requested_at, &e.to_string())
                        .await
                }
            };

            match recorded {
                Ok(true) => tracing::info!("Horoscope generation finished"),
                Ok(false) => tracing::warn!("Horoscope request was superseded, result discarded"),
                Err(e) => tracing::error!("Failed to store horoscope outcome: {e}"),
            }
        }
        .instrument(span),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stale_before() {
        let now = Utc::now();
        assert_eq!(stale_before(now, 15), now - Duration::minutes(15));
        assert_eq!(stale_before(now, 0), now);
    }
}
