use sea_orm::ConnectionTrait;
use serde_json::json;
use uuid::Uuid;

use crate::entities::sea_orm_active_enums::UserRole;
use crate::entities::{auth_identity, profile};
use crate::errors::{ServiceError, ServiceResult};
use crate::repositories::{IdentityRepository, ProfileRepository};
use crate::utils::validation::{normalize_email, require_non_blank, validate_password};

pub struct NewAccount {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
}

/// Hashes a password with the default bcrypt cost on the blocking pool.
pub async fn hash_password(password: &str) -> ServiceResult<String> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || bcrypt::hash(password, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| ServiceError::Internal(format!("Password hashing task failed: {e}")))?
        .map_err(ServiceError::from)
}

async fn verify_password(password: &str, hash: &str) -> ServiceResult<bool> {
    let password = password.to_string();
    let hash = hash.to_string();
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| ServiceError::Internal(format!("Password check task failed: {e}")))?
        .map_err(ServiceError::from)
}

/// Inserts an identity whose metadata carries the names and role. The
/// database trigger turns that metadata into the profile row returned here.
pub async fn create_account<C: ConnectionTrait>(
    db: &C,
    account: NewAccount,
) -> ServiceResult<profile::Model> {
    let email = normalize_email(&account.email)?;
    validate_password(&account.password)?;
    require_non_blank("First name", &account.first_name)?;
    require_non_blank("Last name", &account.last_name)?;

    let encrypted_password = hash_password(&account.password).await?;
    let metadata = json!({
        "first_name": account.first_name.trim(),
        "last_name": account.last_name.trim(),
        "role": account.role.as_str(),
    });

    let identity = IdentityRepository::new(db)
        .create(&email, encrypted_password, metadata)
        .await?;

    tracing::info!(user_id = %identity.id, role = %account.role, "Created account");

    ProfileRepository::new(db)
        .find_by_id(identity.id)
        .await?
        .ok_or(ServiceError::NotFound("Profile"))
}

/// Checks an email/password pair and stamps the sign-in time. Unknown email
/// and wrong password yield the same error.
pub async fn verify_credentials<C: ConnectionTrait>(
    db: &C,
    email: &str,
    password: &str,
) -> ServiceResult<(auth_identity::Model, profile::Model)> {
    let invalid = || ServiceError::Unauthorized("Invalid email or password".to_string());

    let identities = IdentityRepository::new(db);
    let identity = identities.find_by_email(email).await?.ok_or_else(invalid)?;

    if !verify_password(password, &identity.encrypted_password).await? {
        return Err(invalid());
    }

    identities.touch_last_sign_in(identity.id).await?;

    let profile = ProfileRepository::new(db)
        .find_by_id(identity.id)
        .await?
        .ok_or(ServiceError::NotFound("Profile"))?;

    Ok((identity, profile))
}

pub async fn change_password<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    old_password: &str,
    new_password: &str,
) -> ServiceResult<()> {
    validate_password(new_password)?;

    let identities = IdentityRepository::new(db);
    let identity = identities
        .find_by_id(user_id)
        .await?
        .ok_or(ServiceError::NotFound("Identity"))?;

    if !verify_password(old_password, &identity.encrypted_password).await? {
        return Err(ServiceError::Unauthorized(
            "Current password is incorrect".to_string(),
        ));
    }

    let encrypted_password = hash_password(new_password).await?;
    identities.update_password(user_id, encrypted_password).await
}
