//! Periodic maintenance running alongside the server.

use std::time::Duration;

use chrono::Utc;
use compass_db::repositories::horoscope as horoscope_repo;
use sqlx::PgPool;
use tokio::time::interval;

use crate::{auth::refresh_token, error::ApiError, horoscope::service};

const TOKEN_CLEANUP_PERIOD: Duration = Duration::from_secs(6 * 60 * 60);
const HOROSCOPE_EXPIRY_PERIOD: Duration = Duration::from_secs(5 * 60);

/// Start all background jobs
///
/// Returns the join handles so the caller can abort them on shutdown.
pub fn start_background_jobs(pool: PgPool, stale_minutes: i64) -> Vec<tokio::task::JoinHandle<()>> {
    vec![
        tokio::spawn(periodic_token_cleanup_job(pool.clone())),
        tokio::spawn(periodic_horoscope_expiry_job(pool, stale_minutes)),
    ]
}

async fn periodic_token_cleanup_job(pool: PgPool) {
    let mut interval = interval(TOKEN_CLEANUP_PERIOD);

    loop {
        interval.tick().await;

        match refresh_token::cleanup_expired_tokens(&pool).await {
            Ok(deleted) if deleted > 0 => {
                tracing::info!("Token cleanup complete: {deleted} expired refresh tokens removed");
            }
            Ok(_) => tracing::debug!("Token cleanup complete: no expired tokens found"),
            Err(e) => tracing::error!("Failed to run periodic token cleanup: {e}"),
        }
    }
}

/// Mark pending generations older than `stale_minutes` as failed.
pub async fn expire_stale_horoscopes(pool: &PgPool, stale_minutes: i64) -> Result<u64, ApiError> {
    let stale_before = service::stale_before(Utc::now(), stale_minutes);
    Ok(horoscope_repo::expire_stale(pool, stale_before).await?)
}

/// Fail generations that never reported back within the stale window
async fn periodic_horoscope_expiry_job(pool: PgPool, stale_minutes: i64) {
    let mut interval = interval(HOROSCOPE_EXPIRY_PERIOD);

    loop {
        interval.tick().await;

        match expire_stale_horoscopes(&pool, stale_minutes).await {
            Ok(expired) if expired > 0 => {
                tracing::info!("Expired {expired} stale horoscope generations");
            }
            Ok(_) => tracing::debug!("No stale horoscope generations"),
            Err(e) => tracing::error!("Failed to expire stale horoscope generations: {e}"),
        }
    }
}
