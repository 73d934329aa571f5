use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use axum_extra::TypedHeader;
use axum_extra::headers::{Authorization, authorization::Bearer};
use chrono::Utc;

use super::dto::{ChangePasswordRequest, SessionResponse, SignInRequest, SignUpRequest};
use crate::auth::{NewAccount, change_password as update_password, create_account, verify_credentials};
use crate::entities::profile;
use crate::entities::sea_orm_active_enums::UserRole;
use crate::errors::{ServiceError, ServiceResult};
use crate::extractor::AuthClaims;
use crate::repositories::ProfileRepository;
use crate::routes::profile::dto::{MessageResponse, ProfileResponse};
use crate::state::AppState;

pub fn create_route() -> Router<AppState> {
    Router::new()
        .route("/api/v1/auth/sign-up", post(sign_up))
        .route("/api/v1/auth/sign-in", post(sign_in))
        .route("/api/v1/auth/sign-out", post(sign_out))
        .route("/api/v1/auth/user", get(current_user))
        .route("/api/v1/auth/change-password", post(change_password))
}

fn issue_session(state: &AppState, profile: profile::Model) -> ServiceResult<SessionResponse> {
    let expires_in = state.config.jwt_expires_in;
    let access_token = state
        .jwt
        .create_jwt(profile.id, &profile.email, profile.role, expires_in)?;

    Ok(SessionResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in,
        user_id: profile.id,
        email: profile.email.clone(),
        role: profile.role,
        user: profile.into(),
    })
}

/// Register a new identity and start a session
#[utoipa::path(
    post,
    path = "/api/v1/auth/sign-up",
    request_body = SignUpRequest,
    responses(
        (status = 201, description = "Account created", body = SessionResponse),
        (status = 400, description = "Invalid email, password or name"),
        (status = 403, description = "Role cannot be self-assigned"),
        (status = 409, description = "Email already registered")
    ),
    tag = "Authentication"
)]
pub async fn sign_up(
    State(state): State<AppState>,
    Json(payload): Json<SignUpRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), (StatusCode, String)> {
    let role = payload.role.unwrap_or(UserRole::Student);
    if role == UserRole::Admin {
        return Err(ServiceError::Forbidden(
            "Admin accounts cannot be created through sign-up".to_string(),
        )
        .into());
    }

    let profile = create_account(
        &state.db,
        NewAccount {
            email: payload.email,
            password: payload.password,
            first_name: payload.first_name,
            last_name: payload.last_name,
            role,
        },
    )
    .await?;

    let session = issue_session(&state, profile)?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// Sign in with email and password - returns JWT token
#[utoipa::path(
    post,
    path = "/api/v1/auth/sign-in",
    request_body = SignInRequest,
    responses(
        (status = 200, description = "Sign-in successful", body = SessionResponse),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "Authentication"
)]
pub async fn sign_in(
    State(state): State<AppState>,
    Json(payload): Json<SignInRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), (StatusCode, String)> {
    let (_, profile) = verify_credentials(&state.db, &payload.email, &payload.password).await?;

    tracing::info!(user_id = %profile.id, role = %profile.role, "User signed in");
    let session = issue_session(&state, profile)?;
    Ok((StatusCode::OK, Json(session)))
}

/// Sign out - blacklists the presented token until it expires
#[utoipa::path(
    post,
    path = "/api/v1/auth/sign-out",
    responses(
        (status = 200, description = "Signed out", body = MessageResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Authentication"
)]
pub async fn sign_out(
    State(state): State<AppState>,
    TypedHeader(Authorization(bearer)): TypedHeader<Authorization<Bearer>>,
    AuthClaims(claims): AuthClaims,
) -> Result<(StatusCode, Json<MessageResponse>), (StatusCode, String)> {
    let remaining = (claims.exp - Utc::now().timestamp()).max(1) as u64;

    state
        .blacklist
        .add_jwt_to_blacklist(&claims.user_id.to_string(), bearer.token(), remaining)
        .await
        .map_err(|e| ServiceError::SessionStore(e.to_string()))?;

    tracing::info!(user_id = %claims.user_id, "User signed out");
    Ok((StatusCode::OK, Json(MessageResponse::new("Signed out"))))
}

/// Get the signed-in user
#[utoipa::path(
    get,
    path = "/api/v1/auth/user",
    responses(
        (status = 200, description = "Current user", body = ProfileResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Authentication"
)]
pub async fn current_user(
    State(state): State<AppState>,
    claims: AuthClaims,
) -> Result<(StatusCode, Json<ProfileResponse>), (StatusCode, String)> {
    let actor = claims.actor();
    let txn = state.scoped(&actor).await?;
    let profile = ProfileRepository::new(&txn)
        .find_by_id(actor.user_id)
        .await?
        .ok_or(ServiceError::NotFound("Profile"))?;
    txn.commit().await.map_err(ServiceError::from)?;

    Ok((StatusCode::OK, Json(profile.into())))
}

/// Change the caller's password
#[utoipa::path(
    post,
    path = "/api/v1/auth/change-password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 400, description = "New password too short"),
        (status = 401, description = "Current password is incorrect")
    ),
    security(("bearer_auth" = [])),
    tag = "Authentication"
)]
pub async fn change_password(
    State(state): State<AppState>,
    AuthClaims(claims): AuthClaims,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), (StatusCode, String)> {
    update_password(
        &state.db,
        claims.user_id,
        &payload.old_password,
        &payload.new_password,
    )
    .await?;

    tracing::info!(user_id = %claims.user_id, "Password changed");
    Ok((StatusCode::OK, Json(MessageResponse::new("Password changed"))))
}
