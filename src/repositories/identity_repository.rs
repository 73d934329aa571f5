use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};
use serde_json::Value;
use uuid::Uuid;

use crate::entities::auth_identity;
use crate::errors::{ServiceError, ServiceResult};

/// Authentication subjects. Inserting one fires the database trigger that
/// creates the matching profile row.
pub struct IdentityRepository<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> IdentityRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    pub async fn find_by_id(&self, identity_id: Uuid) -> ServiceResult<Option<auth_identity::Model>> {
        Ok(auth_identity::Entity::find_by_id(identity_id)
            .one(self.db)
            .await?)
    }

    pub async fn find_by_email(&self, email: &str) -> ServiceResult<Option<auth_identity::Model>> {
        Ok(auth_identity::Entity::find()
            .filter(auth_identity::Column::Email.eq(email.trim().to_lowercase()))
            .one(self.db)
            .await?)
    }

    pub async fn create(
        &self,
        email: &str,
        encrypted_password: String,
        metadata: Value,
    ) -> ServiceResult<auth_identity::Model> {
        let identity = auth_identity::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(email.trim().to_lowercase()),
            encrypted_password: Set(encrypted_password),
            raw_user_meta_data: Set(metadata),
            ..Default::default()
        };

        Ok(identity.insert(self.db).await?)
    }

    pub async fn touch_last_sign_in(&self, identity_id: Uuid) -> ServiceResult<()> {
        let identity = self
            .find_by_id(identity_id)
            .await?
            .ok_or(ServiceError::NotFound("Identity"))?;

        let mut active_model: auth_identity::ActiveModel = identity.into();
        active_model.last_sign_in_at = Set(Some(Utc::now().naive_utc()));
        active_model.update(self.db).await?;
        Ok(())
    }

    pub async fn update_password(&self, identity_id: Uuid, encrypted_password: String) -> ServiceResult<()> {
        let identity = self
            .find_by_id(identity_id)
            .await?
            .ok_or(ServiceError::NotFound("Identity"))?;

        let mut active_model: auth_identity::ActiveModel = identity.into();
        active_model.encrypted_password = Set(encrypted_password);
        active_model.update(self.db).await?;
        Ok(())
    }

    /// Cascades to the profile and any student/teacher row.
    pub async fn delete(&self, identity_id: Uuid) -> ServiceResult<()> {
        let result = auth_identity::Entity::delete_by_id(identity_id)
            .exec(self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound("Identity"));
        }
        Ok(())
    }
}
