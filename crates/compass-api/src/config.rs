use serde::Deserialize;
use thiserror::Error;

/// Minimum length of the HS256 signing secret, in bytes
pub const MIN_JWT_SECRET_LEN: usize = 32;
/// `axum_extra` private cookies need a 64-byte master key
pub const MIN_COOKIE_SECRET_LEN: usize = 64;
/// Upper bounds keep every derived `chrono::Duration` in range
pub const MAX_JWT_EXPIRY_HOURS: i64 = 24 * 30;
pub const MAX_REFRESH_TOKEN_EXPIRY_DAYS: i64 = 365;
pub const MAX_HOROSCOPE_STALE_MINUTES: i64 = 24 * 60;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub const fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    pub const fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read configuration from environment: {0}")]
    Env(#[from] envy::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Server configuration, read from environment variables (upper-case field names).
#[derive(Clone, Debug, Deserialize)]
pub struct ApiConfig {
    #[serde(default)]
    pub env: Environment,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,

    pub database_url: String,
    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,

    pub jwt_secret: String,
    pub cookie_secret: String,
    #[serde(default = "default_jwt_expiry_hours")]
    pub jwt_expiry_hours: i64,
    #[serde(default = "default_refresh_token_expiry_days")]
    pub refresh_token_expiry_days: i64,
    #[serde(default = "default_cookie_domain")]
    pub cookie_domain: String,
    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,

    #[serde(default = "default_frontend_url")]
    pub frontend_url: String,
    /// Comma separated list, falls back to `frontend_url`
    pub allowed_origins: Option<String>,

    /// Report generation is disabled when unset
    pub ai_service_url: Option<String>,
    pub ai_service_api_key: Option<String>,
    #[serde(default = "default_ai_request_timeout_secs")]
    pub ai_request_timeout_secs: u64,
    #[serde(default = "default_horoscope_stale_minutes")]
    pub horoscope_stale_minutes: i64,

    pub bootstrap_admin_email: Option<String>,
    pub bootstrap_admin_password: Option<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

const fn default_db_max_connections() -> u32 {
    10
}

const fn default_jwt_expiry_hours() -> i64 {
    24
}

const fn default_refresh_token_expiry_days() -> i64 {
    30
}

fn default_cookie_domain() -> String {
    "localhost".to_string()
}

const fn default_bcrypt_cost() -> u32 {
    12
}

fn default_frontend_url() -> String {
    "http://localhost:5173".to_string()
}

const fn default_ai_request_timeout_secs() -> u64 {
    60
}

const fn default_horoscope_stale_minutes() -> i64 {
    15
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(envy::from_env::<Self>()?)
    }

    /// Reject configurations the server cannot run safely with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.len() < MIN_JWT_SECRET_LEN {
            return Err(ConfigError::Invalid(format!(
                "JWT_SECRET must be at least {MIN_JWT_SECRET_LEN} bytes"
            )));
        }
        if self.cookie_secret.len() < MIN_COOKIE_SECRET_LEN {
            return Err(ConfigError::Invalid(format!(
                "COOKIE_SECRET must be at least {MIN_COOKIE_SECRET_LEN} bytes"
            )));
        }
        if !(4..=31).contains(&self.bcrypt_cost) {
            return Err(ConfigError::Invalid(
                "BCRYPT_COST must be between 4 and 31".to_string(),
            ));
        }
        if !(1..=MAX_JWT_EXPIRY_HOURS).contains(&self.jwt_expiry_hours) {
            return Err(ConfigError::Invalid(format!(
                "JWT_EXPIRY_HOURS must be between 1 and {MAX_JWT_EXPIRY_HOURS}"
            )));
        }
        if !(1..=MAX_REFRESH_TOKEN_EXPIRY_DAYS).contains(&self.refresh_token_expiry_days) {
            return Err(ConfigError::Invalid(format!(
                "REFRESH_TOKEN_EXPIRY_DAYS must be between 1 and {MAX_REFRESH_TOKEN_EXPIRY_DAYS}"
            )));
        }
        if !(1..=MAX_HOROSCOPE_STALE_MINUTES).contains(&self.horoscope_stale_minutes) {
            return Err(ConfigError::Invalid(format!(
                "HOROSCOPE_STALE_MINUTES must be between 1 and {MAX_HOROSCOPE_STALE_MINUTES}"
            )));
        }
        Ok(())
    }

    pub fn parsed_allowed_origins(&self) -> Vec<String> {
        let origins: Vec<String> = self
            .allowed_origins
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(String::from)
            .collect();

        if origins.is_empty() {
            vec![self.frontend_url.clone()]
        } else {
            origins
        }
    }

    /// Both bootstrap variables, when set and non-empty.
    pub fn bootstrap_admin(&self) -> Option<(&str, &str)> {
        match (
            self.bootstrap_admin_email.as_deref(),
            self.bootstrap_admin_password.as_deref(),
        ) {
            (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => {
                Some((email, password))
            }
            _ => None,
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
