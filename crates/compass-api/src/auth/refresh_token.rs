use base64::Engine;
use chrono::Utc;
use compass_db::repositories::auth as auth_repo;
use rand::Rng;
use sha2::{Digest, Sha256};
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::error::ApiError;

/// A fresh random token (sent to the client) and its SHA-256 hex digest (stored).
pub fn generate_refresh_token() -> (String, String) {
    let mut token_bytes = [0u8; 32];
    rand::thread_rng().fill(&mut token_bytes);

    let token = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(token_bytes);
    let token_hash = hash_refresh_token(&token);

    (token, token_hash)
}

pub fn hash_refresh_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

pub async fn store_refresh_token<'e, E>(
    executor: E,
    user_id: Uuid,
    token_hash: &str,
    expiry_days: i64,
) -> Result<Uuid, ApiError>
where
    E: Executor<'e, Database = Postgres>,
{
    let expires_at = Utc::now() + chrono::Duration::days(expiry_days);
    let token_id =
        auth_repo::store_refresh_token(executor, user_id, token_hash, expires_at).await?;
    Ok(token_id)
}

/// Consume `token` and issue a replacement in one transaction.
///
/// Returns the owning user id and the new plain-text token.
pub async fn verify_and_rotate_refresh_token(
    pool: &PgPool,
    token: &str,
    expiry_days: i64,
) -> Result<(Uuid, String), ApiError> {
    let token_hash = hash_refresh_token(token);

    let mut tx = pool.begin().await?;

    let record = auth_repo::find_refresh_token_by_hash(&mut *tx, &token_hash)
        .await?
        .ok_or_else(|| ApiError::Auth("Invalid refresh token".to_string()))?;

    auth_repo::delete_refresh_token(&mut *tx, record.id).await?;

    if record.expires_at < Utc::now() {
        tx.commit().await?;
        return Err(ApiError::Auth("Refresh token expired".to_string()));
    }

    let (new_token, new_token_hash) = generate_refresh_token();
    store_refresh_token(&mut *tx, record.user_id, &new_token_hash, expiry_days).await?;

    tx.commit().await?;

    Ok((record.user_id, new_token))
}

/// Returns whether a stored token was removed.
pub async fn revoke_refresh_token(pool: &PgPool, token: &str) -> Result<bool, ApiError> {
    let rows = auth_repo::delete_refresh_token_by_hash(pool, &hash_refresh_token(token)).await?;
    Ok(rows > 0)
}

pub async fn cleanup_expired_tokens(pool: &PgPool) -> Result<u64, ApiError> {
    Ok(auth_repo::cleanup_expired_refresh_tokens(pool).await?)
}
