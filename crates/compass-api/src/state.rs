use std::time::Duration;

use anyhow::Context;
use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use sqlx::PgPool;

use crate::{ApiConfig, config::Environment, horoscope::client::HoroscopeClient};

#[derive(Clone)]
pub struct ApiState {
    pub pool: PgPool,
    pub jwt_secret: String,
    pub jwt_expiry_hours: i64,
    pub refresh_token_expiry_days: i64,
    pub cookie_key: Key,
    pub cookie_domain: String,
    pub environment: Environment,
    pub bcrypt_cost: u32,
    pub frontend_url: String,
    /// `None` when no AI service is configured
    pub horoscope_client: Option<HoroscopeClient>,
    pub horoscope_stale_minutes: i64,
}

impl ApiState {
    pub fn new(config: &ApiConfig, pool: PgPool) -> anyhow::Result<Self> {
        let cookie_key = Key::try_from(config.cookie_secret.as_bytes())
            .context("COOKIE_SECRET is too short for a private cookie key")?;

        let horoscope_client = match config.ai_service_url.as_deref() {
            Some(url) if !url.is_empty() => Some(
                HoroscopeClient::new(
                    url,
                    config.ai_service_api_key.clone(),
                    Duration::from_secs(config.ai_request_timeout_secs),
                )
                .context("failed to build AI service client")?,
            ),
            _ => {
                tracing::warn!("AI service not configured (AI_SERVICE_URL unset), report generation disabled");
                None
            }
        };

        Ok(Self {
            pool,
            jwt_secret: config.jwt_secret.clone(),
            jwt_expiry_hours: config.jwt_expiry_hours,
            refresh_token_expiry_days: config.refresh_token_expiry_days,
            cookie_key,
            cookie_domain: config.cookie_domain.clone(),
            environment: config.env,
            bcrypt_cost: config.bcrypt_cost,
            frontend_url: config.frontend_url.clone(),
            horoscope_client,
            horoscope_stale_minutes: config.horoscope_stale_minutes,
        })
    }
}

/// Subset of the state needed to authenticate a request
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
}

impl FromRef<ApiState> for AuthConfig {
    fn from_ref(state: &ApiState) -> Self {
        Self {
            jwt_secret: state.jwt_secret.clone(),
        }
    }
}

impl FromRef<ApiState> for Key {
    fn from_ref(state: &ApiState) -> Self {
        state.cookie_key.clone()
    }
}
