//! JWT claim structure for access tokens.

use quillboard_core::AppError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Access token claims.
///
/// Only the subject and email travel in the token. Authorization data is
/// looked up per request so revoked grants stop working immediately.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Claims {
    /// User ID (subject claim)
    pub sub: String,
    /// User's email address
    pub email: String,
    /// Token expiration timestamp (Unix timestamp)
    pub exp: usize,
    /// Token issued-at timestamp (Unix timestamp)
    pub iat: usize,
}

impl Claims {
    pub fn user_id(&self) -> Result<i64, AppError> {
        self.sub
            .parse()
            .map_err(|_| AppError::unauthorized("Invalid token subject".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_serialize() {
        let claims = Claims {
            sub: "42".to_string(),
            email: "test@example.com".to_string(),
            exp: 1234567890,
            iat: 1234567800,
        };
        let serialized = serde_json::to_string(&claims).unwrap();
        assert!(serialized.contains(r#""sub":"42""#));
        assert!(serialized.contains(r#""email":"test@example.com""#));
        assert!(!serialized.contains("permissions"));
    }

    #[test]
    fn test_user_id_parses_subject() {
        let json = r#"{"sub":"7","email":"user@test.com","exp":9999999999,"iat":9999999900}"#;
        let claims: Claims = serde_json::from_str(json).unwrap();
        assert_eq!(claims.user_id().unwrap(), 7);
    }

    #[test]
    fn test_user_id_rejects_garbage() {
        let claims = Claims {
            sub: "not-a-number".to_string(),
            email: "x@test.com".to_string(),
            exp: 0,
            iat: 0,
        };
        assert!(claims.user_id().is_err());
    }
}
