//! Router behaviour that never reaches the database.

use axum::http::{Method, StatusCode};
use compass_api::{auth::jwt, config::Environment};
use compass_db::models::Role;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::common::{Auth, JWT_SECRET, TestClient, TestStateBuilder};

fn client() -> TestClient {
    TestClient::new(TestStateBuilder::new().build_without_db())
}

fn token_for(role: Role) -> String {
    jwt::generate_jwt_token(
        Uuid::new_v4(),
        format!("{role}@example.com"),
        role,
        JWT_SECRET,
        24,
    )
    .expect("Failed to generate token")
}

#[tokio::test]
async fn test_health_check() {
    let response = client().get("/health", Auth::None).await;

    response.assert_status(StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_readiness_reports_unreachable_database() {
    let response = client().get("/health/ready", Auth::None).await;
    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let response = client().get("/api/does-not-exist", Auth::None).await;

    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_protected_route_without_token() {
    let response = client().get("/api/auth/me", Auth::None).await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert!(body["error"].is_string(), "Should have error message");
}

#[tokio::test]
async fn test_garbage_token_is_unauthorized() {
    let response = client()
        .get("/api/students/me", Auth::Bearer("not.a.jwt"))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_signed_with_other_secret_is_unauthorized() {
    let token = jwt::generate_jwt_token(
        Uuid::new_v4(),
        "student@example.com".to_string(),
        Role::Student,
        "a_completely_different_secret_of_32_chars",
        24,
    )
    .unwrap();

    let response = client().get("/api/students/me", Auth::Bearer(&token)).await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_role_mismatch_is_forbidden() {
    let client = client();
    let mentor = token_for(Role::Mentor);
    let student = token_for(Role::Student);

    client
        .get("/api/students/me", Auth::Bearer(&mentor))
        .await
        .assert_status(StatusCode::FORBIDDEN);

    client
        .get("/api/mentors/me", Auth::Bearer(&student))
        .await
        .assert_status(StatusCode::FORBIDDEN);

    client
        .post_json(
            "/api/payments",
            &json!({ "plan": "basic", "amount_minor": 49_900, "currency": "INR" }),
            Auth::Bearer(&mentor),
        )
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_routes_reject_other_roles() {
    let client = client();

    for role in [Role::Student, Role::Mentor] {
        let token = token_for(role);
        client
            .get("/api/admin/stats", Auth::Bearer(&token))
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    client
        .get("/api/admin/stats", Auth::None)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_cookie_authentication() {
    let mentor = token_for(Role::Mentor);

    // Authenticated through the cookie, then stopped by the role guard
    let response = client()
        .get("/api/students/me", Auth::Cookie(&mentor))
        .await;
    response.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let response = client().post_raw("/api/auth/login", "{not json").await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_logout_ignores_malformed_body() {
    // No token to revoke, so the unreachable database is never touched
    client()
        .post_raw("/api/auth/logout", "{not json")
        .await
        .assert_status(StatusCode::OK);
}

#[tokio::test]
async fn test_missing_fields_are_bad_request() {
    let response = client()
        .post_json(
            "/api/auth/register",
            &json!({ "email": "someone@example.com" }),
            Auth::None,
        )
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_admin_self_registration_is_rejected() {
    let response = client()
        .post_json(
            "/api/auth/register",
            &json!({
                "email": "boss@example.com",
                "password": "password123",
                "full_name": "Boss",
                "role": "admin"
            }),
            Auth::None,
        )
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_weak_password_is_rejected() {
    let response = client()
        .post_json(
            "/api/auth/register",
            &json!({
                "email": "student@example.com",
                "password": "short",
                "full_name": "Asha Rao",
                "role": "student"
            }),
            Auth::None,
        )
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_invalid_onboarding_is_rejected_before_saving() {
    let student = token_for(Role::Student);

    let response = client()
        .put_json(
            "/api/students/me/onboarding",
            &json!({ "education_level": "kindergarten", "interests": [] }),
            Auth::Bearer(&student),
        )
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_generation_without_ai_service_is_unavailable() {
    let student = token_for(Role::Student);

    let response = client()
        .send(
            Method::POST,
            "/api/horoscope/generate",
            None,
            Auth::Bearer(&student),
        )
        .await;
    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_request_id_is_generated_and_echoed() {
    let client = client();

    let response = client.get("/health", Auth::None).await;
    let generated = response
        .headers
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .expect("Response should carry a request id");
    assert!(Uuid::parse_str(generated).is_ok());

    let request = axum::http::Request::builder()
        .uri("/health")
        .header("x-forwarded-for", "10.0.0.1")
        .header("x-request-id", "trace-me-123")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = client.request(request).await;
    assert_eq!(
        response.headers.get("x-request-id").unwrap(),
        "trace-me-123"
    );
}

#[tokio::test]
async fn test_security_headers() {
    let response = client().get("/health", Auth::None).await;

    assert_eq!(response.headers.get("x-content-type-options").unwrap(), "nosniff");
    assert_eq!(response.headers.get("x-frame-options").unwrap(), "DENY");
    assert!(response.headers.get("strict-transport-security").is_none());

    let production = TestClient::new(
        TestStateBuilder::new()
            .with_environment(Environment::Production)
            .build_without_db(),
    );
    let response = production.get("/health", Auth::None).await;
    assert!(response.headers.get("strict-transport-security").is_some());
}

#[tokio::test]
async fn test_auth_endpoints_are_rate_limited() {
    let client = client().with_client_ip("203.0.113.9");

    let mut statuses = Vec::new();
    for _ in 0..20 {
        let response = client.post_raw("/api/auth/login", "{not json").await;
        statuses.push(response.status);
    }

    assert_eq!(statuses[0], StatusCode::BAD_REQUEST);
    assert!(
        statuses.contains(&StatusCode::TOO_MANY_REQUESTS),
        "Expected a 429 within 20 rapid requests, got {statuses:?}"
    );
}
