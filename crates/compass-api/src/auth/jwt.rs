use chrono::Utc;
use compass_db::models::Role;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub email: String,
    pub role: Role,
    pub iat: usize,
    pub exp: usize,
}

/// Sign an HS256 access token valid for `expiry_hours`.
pub fn generate_jwt_token(
    user_id: Uuid,
    email: String,
    role: Role,
    jwt_secret: &str,
    expiry_hours: i64,
) -> Result<String, ApiError> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        email,
        role,
        iat: now.timestamp() as usize,
        exp: (now + chrono::Duration::hours(expiry_hours)).timestamp() as usize,
    };

    let token = jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_bytes()),
    )?;

    Ok(token)
}

pub fn verify_jwt_token(token: &str, jwt_secret: &str) -> Result<Claims, ApiError> {
    let token_data = jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| ApiError::Auth("Invalid or expired token".to_string()))?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test_jwt_secret_minimum_32_characters_long";

    #[test]
    fn test_generate_and_verify_jwt_token() {
        let user_id = Uuid::new_v4();

        let token = generate_jwt_token(
            user_id,
            "student@example.com".to_string(),
            Role::Student,
            SECRET,
            24,
        )
        .expect("Failed to generate token");
        let claims = verify_jwt_token(&token, SECRET).expect("Failed to verify token");

        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.email, "student@example.com");
        assert_eq!(claims.role, Role::Student);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_verify_jwt_token_with_wrong_secret() {
        let token = generate_jwt_token(
            Uuid::new_v4(),
            "mentor@example.com".to_string(),
            Role::Mentor,
            SECRET,
            24,
        )
        .unwrap();

        let result = verify_jwt_token(&token, "wrong_jwt_secret_minimum_32_characters_long");
        match result {
            Err(ApiError::Auth(msg)) => assert!(msg.contains("Invalid or expired token")),
            other => panic!("Expected Auth error, got {other:?}"),
        }
    }

    #[test]
    fn test_verify_invalid_jwt_token() {
        assert!(matches!(
            verify_jwt_token("invalid.jwt.token", SECRET),
            Err(ApiError::Auth(_))
        ));
    }

    #[test]
    fn test_expired_token_rejected() {
        // Past the default 60s leeway
        let token = generate_jwt_token(
            Uuid::new_v4(),
            "old@example.com".to_string(),
            Role::Admin,
            SECRET,
            -1,
        )
        .unwrap();

        assert!(verify_jwt_token(&token, SECRET).is_err());
    }

    #[test]
    fn test_token_lifetime_follows_expiry_hours() {
        let token = generate_jwt_token(
            Uuid::new_v4(),
            "student@example.com".to_string(),
            Role::Student,
            SECRET,
            2,
        )
        .unwrap();
        let claims = verify_jwt_token(&token, SECRET).unwrap();

        let lifetime = claims.exp - claims.iat;
        assert!(
            (7190..=7210).contains(&lifetime),
            "Token should live about 2 hours, got {lifetime} seconds"
        );
    }

    #[test]
    fn test_claims_serialization() {
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            email: "test@example.com".to_string(),
            role: Role::Mentor,
            iat: 1,
            exp: 2,
        };

        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["role"], "mentor");

        let decoded: Claims = serde_json::from_value(json).unwrap();
        assert_eq!(decoded.sub, claims.sub);
        assert_eq!(decoded.role, Role::Mentor);
    }
}
