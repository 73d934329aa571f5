use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use uuid::Uuid;

use super::dto::{MessageResponse, ProfileResponse, UpdateProfileRequest};
use crate::errors::ServiceError;
use crate::extractor::AuthClaims;
use crate::policy::{Operation, Table, ensure};
use crate::repositories::{IdentityRepository, ProfileRepository, ProfileUpdate};
use crate::state::AppState;
use crate::utils::validation::require_non_blank;

pub fn create_route() -> Router<AppState> {
    Router::new()
        .route("/api/v1/profile", get(get_own_profile).put(update_own_profile))
        .route(
            "/api/v1/profiles/{id}",
            get(get_profile_by_id).delete(delete_identity),
        )
}

/// Get the caller's profile
#[utoipa::path(
    get,
    path = "/api/v1/profile",
    responses(
        (status = 200, description = "Profile retrieved", body = ProfileResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Profile not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Profile"
)]
pub async fn get_own_profile(
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

/// Update the caller's profile. The role cannot be changed here.
#[utoipa::path(
    put,
    path = "/api/v1/profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = ProfileResponse),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Profile"
)]
pub async fn update_own_profile(
    State(state): State<AppState>,
    claims: AuthClaims,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<(StatusCode, Json<ProfileResponse>), (StatusCode, String)> {
    let actor = claims.actor();
    ensure(&actor, Table::Profiles, Operation::Update, Some(actor.user_id))?;

    let updates = ProfileUpdate::from(payload);
    validate_names(&updates)?;

    let txn = state.scoped(&actor).await?;
    let profile = ProfileRepository::new(&txn)
        .update(actor.user_id, updates)
        .await?;
    txn.commit().await.map_err(ServiceError::from)?;

    tracing::info!(user_id = %actor.user_id, "Profile updated");
    Ok((StatusCode::OK, Json(profile.into())))
}

/// Get a profile by id (own profile, or any profile for admins)
#[utoipa::path(
    get,
    path = "/api/v1/profiles/{id}",
    params(("id" = Uuid, Path, description = "Profile (identity) id")),
    responses(
        (status = 200, description = "Profile retrieved", body = ProfileResponse),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Profile not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Profile"
)]
pub async fn get_profile_by_id(
    State(state): State<AppState>,
    claims: AuthClaims,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<ProfileResponse>), (StatusCode, String)> {
    let actor = claims.actor();
    ensure(&actor, Table::Profiles, Operation::Select, Some(id))?;

    let txn = state.scoped(&actor).await?;
    let profile = ProfileRepository::new(&txn)
        .find_by_id(id)
        .await?
        .ok_or(ServiceError::NotFound("Profile"))?;
    txn.commit().await.map_err(ServiceError::from)?;

    Ok((StatusCode::OK, Json(profile.into())))
}

/// Delete an identity. Its profile and any student or teacher row go with it.
#[utoipa::path(
    delete,
    path = "/api/v1/profiles/{id}",
    params(("id" = Uuid, Path, description = "Profile (identity) id")),
    responses(
        (status = 200, description = "Identity deleted", body = MessageResponse),
        (status = 400, description = "Cannot delete own account"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Identity not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Profile"
)]
pub async fn delete_identity(
    State(state): State<AppState>,
    claims: AuthClaims,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<MessageResponse>), (StatusCode, String)> {
    let actor = claims.actor();
    ensure(&actor, Table::Profiles, Operation::Delete, Some(id))?;

    if id == actor.user_id {
        return Err(ServiceError::Validation("Cannot delete your own account".to_string()).into());
    }

    let txn = state.scoped(&actor).await?;
    IdentityRepository::new(&txn).delete(id).await?;
    txn.commit().await.map_err(ServiceError::from)?;

    tracing::info!(user_id = %id, deleted_by = %actor.user_id, "Identity deleted");
    Ok((StatusCode::OK, Json(MessageResponse::new("Identity deleted"))))
}

pub(crate) fn validate_names(updates: &ProfileUpdate) -> Result<(), ServiceError> {
    if let Some(first_name) = &updates.first_name {
        require_non_blank("First name", first_name)?;
    }
    if let Some(last_name) = &updates.last_name {
        require_non_blank("Last name", last_name)?;
    }
    Ok(())
}
