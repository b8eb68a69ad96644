use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use axum_extra::extract::PrivateCookieJar;
use compass_db::{
    models::{Role, User},
    repositories::user as user_repo,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{
    cookies::{self, AUTH_COOKIE, REFRESH_COOKIE},
    jwt,
    middleware::AuthUser,
    refresh_token as rt,
    service::{self, NewAccount},
    validation,
};
use crate::{ApiState, error::ApiError, metrics, middleware::rate_limit, validation::JsonBody};

pub fn routes() -> Router<ApiState> {
    use crate::make_rate_limit_layer;

    // Credential endpoints are the brute-force target
    let credential_routes = Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .layer(make_rate_limit_layer!(
            rate_limit::AUTH_REPLENISH_MS,
            rate_limit::AUTH_BURST_SIZE
        ));

    let session_routes = Router::new()
        .route("/auth/me", get(me))
        .route("/auth/logout", post(logout))
        .layer(make_rate_limit_layer!(
            rate_limit::GENERAL_REPLENISH_MS,
            rate_limit::GENERAL_BURST_SIZE
        ));

    Router::new().merge(credential_routes).merge(session_routes)
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub role: Role,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

impl RefreshRequest {
    /// An empty body means no token was sent.
    fn from_body(body: &[u8]) -> Result<Self, ApiError> {
        if body.is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_slice(body)
            .map_err(|_| ApiError::Validation("Invalid request body".to_string()))
    }
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub refresh_token: String,
    pub user: User,
}

/// Issue an access token and a stored refresh token, and set both cookies.
async fn start_session(
    state: &ApiState,
    jar: PrivateCookieJar,
    user: User,
) -> Result<(PrivateCookieJar, AuthResponse), ApiError> {
    let token = jwt::generate_jwt_token(
        user.id,
        user.email.clone(),
        user.role,
        &state.jwt_secret,
        state.jwt_expiry_hours,
    )?;

    let (refresh_token, refresh_token_hash) = rt::generate_refresh_token();
    rt::store_refresh_token(
        &state.pool,
        user.id,
        &refresh_token_hash,
        state.refresh_token_expiry_days,
    )
    .await?;

    let jar = jar
        .add(cookies::create_auth_cookie(
            token.clone(),
            &state.environment,
            state.jwt_expiry_hours,
            &state.cookie_domain,
        ))
        .add(cookies::create_refresh_token_cookie(
            refresh_token.clone(),
            &state.environment,
            state.refresh_token_expiry_days,
            &state.cookie_domain,
        ));

    Ok((
        jar,
        AuthResponse {
            token,
            refresh_token,
            user,
        },
    ))
}

async fn register(
    State(state): State<ApiState>,
    jar: PrivateCookieJar,
    JsonBody(payload): JsonBody<RegisterRequest>,
) -> Result<(StatusCode, PrivateCookieJar, Json<AuthResponse>), ApiError> {
    if payload.role == Role::Admin {
        return Err(ApiError::Validation(
            "Admin accounts cannot be self-registered".to_string(),
        ));
    }

    let email = validation::normalize_email(&payload.email);
    let full_name = payload.full_name.trim();
    validation::validate_email(&email)?;
    validation::validate_password(&payload.password)?;
    validation::validate_full_name(full_name)?;

    if user_repo::email_exists(&state.pool, &email).await? {
        metrics::record_auth_event("register", false);
        return Err(ApiError::Conflict("Email already registered".to_string()));
    }

    let password_hash = service::hash_password(payload.password, state.bcrypt_cost).await?;
    let user = service::create_account(
        &state.pool,
        NewAccount {
            email: &email,
            password_hash: &password_hash,
            full_name,
            role: payload.role,
            created_by: None,
        },
    )
    .await?;

    tracing::info!(user_id = %user.id, role = %user.role, "User registered");
    metrics::record_auth_event("register", true);

    let (jar, response) = start_session(&state, jar, user).await?;
    Ok((StatusCode::CREATED, jar, Json(response)))
}

async fn login(
    State(state): State<ApiState>,
    jar: PrivateCookieJar,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> Result<(PrivateCookieJar, Json<AuthResponse>), ApiError> {
    let email = validation::normalize_email(&payload.email);

    let user = match service::authenticate(&state.pool, &email, payload.password).await {
        Ok(user) => user,
        Err(e) => {
            metrics::record_auth_event("login", false);
            return Err(e);
        }
    };

    tracing::info!(user_id = %user.id, "User logged in");
    metrics::record_auth_event("login", true);

    let (jar, response) = start_session(&state, jar, user).await?;
    Ok((jar, Json(response)))
}

/// Rotate the refresh token taken from the cookie, or from the JSON body.
async fn refresh(
    State(state): State<ApiState>,
    jar: PrivateCookieJar,
    body: Bytes,
) -> Result<(PrivateCookieJar, Json<serde_json::Value>), ApiError> {
    let from_body = RefreshRequest::from_body(&body)?;

    let presented = jar
        .get(REFRESH_COOKIE)
        .map(|cookie| cookie.value().to_owned())
        .or(from_body.refresh_token)
        .ok_or_else(|| ApiError::Auth("No refresh token found".to_string()))?;

    let (user_id, new_refresh_token) = match rt::verify_and_rotate_refresh_token(
        &state.pool,
        &presented,
        state.refresh_token_expiry_days,
    )
    .await
    {
        Ok(rotated) => rotated,
        Err(e) => {
            metrics::record_auth_event("refresh", false);
            return Err(e);
        }
    };

    let user = user_repo::find_by_id(&state.pool, user_id)
        .await?
        .ok_or_else(|| ApiError::Auth("User not found".to_string()))?;

    let token = jwt::generate_jwt_token(
        user.id,
        user.email,
        user.role,
        &state.jwt_secret,
        state.jwt_expiry_hours,
    )?;

    let jar = jar
        .add(cookies::create_auth_cookie(
            token.clone(),
            &state.environment,
            state.jwt_expiry_hours,
            &state.cookie_domain,
        ))
        .add(cookies::create_refresh_token_cookie(
            new_refresh_token.clone(),
            &state.environment,
            state.refresh_token_expiry_days,
            &state.cookie_domain,
        ));

    metrics::record_auth_event("refresh", true);

    Ok((
        jar,
        Json(json!({
            "token": token,
            "refresh_token": new_refresh_token,
        })),
    ))
}

/// Revoke the refresh token from the cookie, or from the JSON body for
/// clients that keep tokens themselves. Always succeeds.
async fn logout(
    State(state): State<ApiState>,
    jar: PrivateCookieJar,
    body: Bytes,
) -> (PrivateCookieJar, Json<serde_json::Value>) {
    // A malformed body only means there is no body token to revoke
    let from_body = RefreshRequest::from_body(&body).unwrap_or_default();

    let presented = jar
        .get(REFRESH_COOKIE)
        .map(|cookie| cookie.value().to_owned())
        .or(from_body.refresh_token);

    if let Some(token) = presented {
        if let Err(e) = rt::revoke_refresh_token(&state.pool, &token).await {
            tracing::warn!("Failed to revoke refresh token on logout: {e}");
        }
    }

    let jar = jar
        .remove(cookies::removal_cookie(AUTH_COOKIE, &state.cookie_domain))
        .remove(cookies::removal_cookie(REFRESH_COOKIE, &state.cookie_domain));

    metrics::record_auth_event("logout", true);

    (
        jar,
        Json(json!({ "message": "Logged out successfully" })),
    )
}

async fn me(auth_user: AuthUser, State(state): State<ApiState>) -> Result<Json<User>, ApiError> {
    let user = user_repo::find_by_id(&state.pool, auth_user.user_id)
        .await?
        .ok_or_else(|| ApiError::Auth("User not found".to_string()))?;

    Ok(Json(user))
}
