use axum::{RequestPartsExt, extract::FromRequestParts, http::request::Parts};
use axum_extra::TypedHeader;
use axum_extra::headers::{Authorization, authorization::Bearer};
use http::StatusCode;

use crate::auth::TokenClaims;
use crate::policy::Actor;
use crate::state::AppState;

/// Verified claims of the bearer token on the request.
#[derive(Debug, Clone)]
pub struct AuthClaims(pub TokenClaims);

impl AuthClaims {
    pub fn actor(&self) -> Actor {
        Actor::from(&self.0)
    }
}

impl FromRequestParts<AppState> for AuthClaims {
    type Rejection = (StatusCode, String);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| {
                (
                    StatusCode::UNAUTHORIZED,
                    "Missing or malformed bearer token".to_string(),
                )
            })?;

        let token = bearer.token();
        let claims = state.jwt.verify_jwt(token).map_err(|e| {
            tracing::debug!("Rejected bearer token: {}", e);
            (
                StatusCode::UNAUTHORIZED,
                "Invalid or expired token".to_string(),
            )
        })?;

        let revoked = state
            .blacklist
            .check_jwt_in_blacklist(&claims.user_id.to_string(), token)
            .await
            .map_err(|e| {
                tracing::error!("Failed to check token blacklist: {}", e);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Session store unavailable".to_string(),
                )
            })?;

        if revoked {
            return Err((
                StatusCode::UNAUTHORIZED,
                "Token has been revoked".to_string(),
            ));
        }

        Ok(AuthClaims(claims))
    }
}
