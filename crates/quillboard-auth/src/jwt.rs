//! JWT (JSON Web Token) utilities for authentication.
//!
//! Tokens are HS256-signed with `JWT_SECRET` and expire after
//! `JWT_ACCESS_EXPIRY` seconds.

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};

use quillboard_config::JwtConfig;
use quillboard_core::AppError;

use crate::claims::Claims;

pub fn create_access_token(
    user_id: i64,
    email: &str,
    jwt_config: &JwtConfig,
) -> Result<String, AppError> {
    let now = Utc::now().timestamp();
    let exp = now.saturating_add(jwt_config.access_token_expiry).max(0);

    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        exp: exp as usize,
        iat: now as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_config.secret.as_bytes()),
    )
    .map_err(|e| AppError::internal_error(format!("Failed to create token: {}", e)))
}

pub fn verify_token(token: &str, jwt_config: &JwtConfig) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_config.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::unauthorized("Invalid or expired token".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_test_jwt_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret-key-at-least-32-characters-long".to_string(),
            access_token_expiry: 3600,
        }
    }

    #[test]
    fn test_create_and_verify_access_token() {
        let config = get_test_jwt_config();
        let token = create_access_token(42, "editor@example.com", &config).unwrap();

        let claims = verify_token(&token, &config).unwrap();
        assert_eq!(claims.user_id().unwrap(), 42);
        assert_eq!(claims.email, "editor@example.com");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_verify_with_wrong_secret_fails() {
        let config = get_test_jwt_config();
        let token = create_access_token(1, "a@example.com", &config).unwrap();

        let other = JwtConfig {
            secret: "a-completely-different-secret-value".to_string(),
            ..config
        };
        let err = verify_token(&token, &other).unwrap_err();
        assert_eq!(err.status.as_u16(), 401);
    }

    #[test]
    fn test_verify_garbage_token_fails() {
        let config = get_test_jwt_config();
        assert!(verify_token("not.a.token", &config).is_err());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let config = JwtConfig {
            access_token_expiry: -7200,
            ..get_test_jwt_config()
        };
        let token = create_access_token(1, "a@example.com", &config).unwrap();
        assert!(verify_token(&token, &get_test_jwt_config()).is_err());
    }
}
