use anyhow::{Context, Result};
use sea_orm::DatabaseConnection;

use crate::auth::{NewAccount, create_account};
use crate::config::Config;
use crate::entities::sea_orm_active_enums::UserRole;
use crate::repositories::IdentityRepository;

/// Creates the initial admin identity when `ADMIN_EMAIL` and `ADMIN_PASSWORD`
/// are set and no identity with that email exists yet.
pub async fn initialize_admin_user(db: &DatabaseConnection, config: &Config) -> Result<()> {
    let (Some(admin_email), Some(admin_password)) =
        (config.admin_email.as_deref(), config.admin_password.as_deref())
    else {
        tracing::info!("ADMIN_EMAIL/ADMIN_PASSWORD not set, skipping admin initialization");
        return Ok(());
    };

    let existing_admin = IdentityRepository::new(db)
        .find_by_email(admin_email)
        .await
        .context("Failed to check existing admin")?;

    if existing_admin.is_some() {
        tracing::info!("Admin user already exists, skipping initialization");
        return Ok(());
    }

    tracing::info!("Creating default admin user...");

    let profile = create_account(
        db,
        NewAccount {
            email: admin_email.to_string(),
            password: admin_password.to_string(),
            first_name: "System".to_string(),
            last_name: "Administrator".to_string(),
            role: UserRole::Admin,
        },
    )
    .await
    .context("Failed to create admin user")?;

    tracing::info!(user_id = %profile.id, email = %profile.email, "Admin user created");
    tracing::warn!("Please change the default admin password after first sign-in");

    Ok(())
}
