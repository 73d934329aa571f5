use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, Set};
use uuid::Uuid;

use crate::entities::profile;
use crate::errors::{ServiceError, ServiceResult};

pub struct ProfileRepository<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> ProfileRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    pub async fn find_by_id(&self, profile_id: Uuid) -> ServiceResult<Option<profile::Model>> {
        Ok(profile::Entity::find_by_id(profile_id).one(self.db).await?)
    }

    pub async fn update(
        &self,
        profile_id: Uuid,
        updates: ProfileUpdate,
    ) -> ServiceResult<profile::Model> {
        let profile = self
            .find_by_id(profile_id)
            .await?
            .ok_or(ServiceError::NotFound("Profile"))?;

        if updates.is_empty() {
            return Ok(profile);
        }

        let mut active_model: profile::ActiveModel = profile.into();

        if let Some(first_name) = updates.first_name {
            active_model.first_name = Set(first_name);
        }
        if let Some(last_name) = updates.last_name {
            active_model.last_name = Set(last_name);
        }
        if let Some(phone) = updates.phone {
            active_model.phone = Set(phone);
        }
        if let Some(address) = updates.address {
            active_model.address = Set(address);
        }
        if let Some(avatar_url) = updates.avatar_url {
            active_model.avatar_url = Set(avatar_url);
        }

        Ok(active_model.update(self.db).await?)
    }
}

#[derive(Debug, Default)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<Option<String>>,
    pub address: Option<Option<String>>,
    pub avatar_url: Option<Option<String>>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.phone.is_none()
            && self.address.is_none()
            && self.avatar_url.is_none()
    }
}
