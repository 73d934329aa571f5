use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::sea_orm_active_enums::UserRole;
use crate::errors::ServiceResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    #[serde(rename = "sub")]
    pub user_id: Uuid,
    pub email: String,
    pub role: UserRole,
    pub iat: i64,
    pub exp: i64,
}

/// Signs and verifies HS256 session tokens.
#[derive(Clone)]
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtManager {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        let secret = secret.as_ref();
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
        }
    }

    pub fn create_jwt(
        &self,
        user_id: Uuid,
        email: &str,
        role: UserRole,
        expires_in: i64,
    ) -> ServiceResult<String> {
        let now = Utc::now().timestamp();
        let claims = TokenClaims {
            user_id,
            email: email.to_string(),
            role,
            iat: now,
            exp: now + expires_in,
        };

        Ok(encode(&Header::default(), &claims, &self.encoding_key)?)
    }

    pub fn verify_jwt(&self, token: &str) -> ServiceResult<TokenClaims> {
        let mut validation = Validation::default();
        validation.leeway = 0;
        let data = decode::<TokenClaims>(token, &self.decoding_key, &validation)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ServiceError;

    #[test]
    fn round_trips_claims() {
        let manager = JwtManager::new("test-secret");
        let user_id = Uuid::new_v4();

        let token = manager
            .create_jwt(user_id, "teacher@school.test", UserRole::Teacher, 3600)
            .unwrap();
        let claims = manager.verify_jwt(&token).unwrap();

        assert_eq!(claims.user_id, user_id);
        assert_eq!(claims.email, "teacher@school.test");
        assert_eq!(claims.role, UserRole::Teacher);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn rejects_expired_tokens() {
        let manager = JwtManager::new("test-secret");
        let token = manager
            .create_jwt(Uuid::new_v4(), "old@school.test", UserRole::Student, -3600)
            .unwrap();

        assert!(matches!(
            manager.verify_jwt(&token),
            Err(ServiceError::Token(_))
        ));
    }

    #[test]
    fn rejects_tokens_just_past_expiry() {
        let manager = JwtManager::new("test-secret");
        let token = manager
            .create_jwt(Uuid::new_v4(), "late@school.test", UserRole::Teacher, -5)
            .unwrap();

        assert!(matches!(
            manager.verify_jwt(&token),
            Err(ServiceError::Token(_))
        ));
    }

    #[test]
    fn rejects_tokens_signed_with_another_secret() {
        let token = JwtManager::new("one")
            .create_jwt(Uuid::new_v4(), "a@school.test", UserRole::Admin, 3600)
            .unwrap();

        assert!(JwtManager::new("two").verify_jwt(&token).is_err());
    }
}
