use compass_db::{
    models::{Role, User, UserCredentials},
    repositories::{mentor as mentor_repo, student as student_repo, user as user_repo},
};
use sqlx::PgPool;
use uuid::Uuid;

use super::validation;
use crate::{config::ApiConfig, error::ApiError};

/// bcrypt runs on the blocking pool so it never stalls the async workers.
pub async fn hash_password(password: String, cost: u32) -> Result<String, ApiError> {
    let hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost)).await??;
    Ok(hash)
}

pub async fn verify_password(password: String, hash: String) -> Result<bool, ApiError> {
    let valid = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash)).await??;
    Ok(valid)
}

pub struct NewAccount<'a> {
    pub email: &'a str,
    pub password_hash: &'a str,
    pub full_name: &'a str,
    pub role: Role,
    /// Admin creating the account, for admin accounts
    pub created_by: Option<Uuid>,
}

/// Create the user row and its role profile row in one transaction.
pub async fn create_account(pool: &PgPool, account: NewAccount<'_>) -> Result<User, ApiError> {
    let mut tx = pool.begin().await?;

    let user = user_repo::create_user(
        &mut *tx,
        account.email,
        account.password_hash,
        account.full_name,
        account.role,
    )
    .await
    .map_err(|e| {
        if compass_db::is_unique_violation(&e) {
            ApiError::Conflict("Email already registered".to_string())
        } else {
            ApiError::from(e)
        }
    })?;

    match account.role {
        Role::Student => student_repo::create_student(&mut *tx, user.id).await?,
        Role::Mentor => mentor_repo::create_mentor(&mut *tx, user.id).await?,
        Role::Admin => user_repo::create_admin_profile(&mut *tx, user.id, account.created_by).await?,
    }

    tx.commit().await?;

    Ok(user)
}

/// Check credentials. Unknown email and wrong password are indistinguishable to the caller.
pub async fn authenticate(
    pool: &PgPool,
    email: &str,
    password: String,
) -> Result<User, ApiError> {
    let invalid = || ApiError::Auth("Invalid email or password".to_string());

    let credentials: UserCredentials = user_repo::find_credentials_by_email(pool, email)
        .await?
        .ok_or_else(invalid)?;

    if !verify_password(password, credentials.password_hash.clone()).await? {
        return Err(invalid());
    }

    Ok(credentials.into())
}

/// Create the configured bootstrap admin, unless that email is already taken.
pub async fn bootstrap_admin(pool: &PgPool, config: &ApiConfig) -> Result<(), ApiError> {
    let Some((email, password)) = config.bootstrap_admin() else {
        return Ok(());
    };

    let email = validation::normalize_email(email);
    validation::validate_email(&email)?;
    validation::validate_password(password)?;

    if user_repo::email_exists(pool, &email).await? {
        tracing::debug!(email = %email, "Bootstrap admin already exists");
        return Ok(());
    }

    let password_hash = hash_password(password.to_string(), config.bcrypt_cost).await?;
    let user = create_account(
        pool,
        NewAccount {
            email: &email,
            password_hash: &password_hash,
            full_name: "Administrator",
            role: Role::Admin,
            created_by: None,
        },
    )
    .await?;

    tracing::info!(user_id = %user.id, email = %user.email, "Bootstrap admin created");
    Ok(())
}
