use axum_extra::extract::cookie::{Cookie, SameSite};

use crate::config::Environment;

pub const AUTH_COOKIE: &str = "auth_token";
pub const REFRESH_COOKIE: &str = "refresh_token";

/// HttpOnly, `SameSite=Lax` cookie scoped to `cookie_domain`. Secure everywhere but development.
fn session_cookie(
    name: &'static str,
    value: String,
    environment: &Environment,
    max_age: time::Duration,
    cookie_domain: &str,
) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .max_age(max_age)
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(!environment.is_development())
        .domain(cookie_domain.to_string())
        .build()
}

pub fn create_auth_cookie(
    token: String,
    environment: &Environment,
    expiry_hours: i64,
    cookie_domain: &str,
) -> Cookie<'static> {
    session_cookie(
        AUTH_COOKIE,
        token,
        environment,
        time::Duration::hours(expiry_hours),
        cookie_domain,
    )
}

pub fn create_refresh_token_cookie(
    token: String,
    environment: &Environment,
    expiry_days: i64,
    cookie_domain: &str,
) -> Cookie<'static> {
    session_cookie(
        REFRESH_COOKIE,
        token,
        environment,
        time::Duration::days(expiry_days),
        cookie_domain,
    )
}

/// Cookie matching the one set at login, for use with `PrivateCookieJar::remove`.
pub fn removal_cookie(name: &'static str, cookie_domain: &str) -> Cookie<'static> {
    Cookie::build((name, ""))
        .path("/")
        .domain(cookie_domain.to_string())
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_auth_cookie_development() {
        let cookie = create_auth_cookie(
            "test_token".to_string(),
            &Environment::Development,
            24,
            "localhost",
        );

        assert_eq!(cookie.name(), AUTH_COOKIE);
        assert_eq!(cookie.value(), "test_token");
        assert_eq!(cookie.path(), Some("/"));
        assert!(cookie.http_only().unwrap_or(false));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert!(
            !cookie.secure().unwrap_or(true),
            "Should not be secure in development"
        );
        assert_eq!(cookie.domain(), Some("localhost"));
        assert_eq!(cookie.max_age(), Some(time::Duration::hours(24)));
    }

    #[test]
    fn test_create_auth_cookie_production() {
        let cookie = create_auth_cookie(
            "test_token".to_string(),
            &Environment::Production,
            24,
            "compass.example",
        );

        assert!(cookie.http_only().unwrap_or(false));
        assert!(
            cookie.secure().unwrap_or(false),
            "Should be secure in production"
        );
        assert_eq!(cookie.domain(), Some("compass.example"));
    }

    #[test]
    fn test_create_refresh_token_cookie() {
        let cookie = create_refresh_token_cookie(
            "refresh".to_string(),
            &Environment::Production,
            30,
            "compass.example",
        );

        assert_eq!(cookie.name(), REFRESH_COOKIE);
        assert_eq!(cookie.max_age(), Some(time::Duration::days(30)));
        assert!(cookie.secure().unwrap_or(false));
    }

    #[test]
    fn test_removal_cookie_matches_scope() {
        let cookie = removal_cookie(AUTH_COOKIE, "localhost");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.domain(), Some("localhost"));
    }
}
