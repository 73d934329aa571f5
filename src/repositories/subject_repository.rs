use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryOrder, Set};
use uuid::Uuid;

use crate::entities::subject;
use crate::errors::{ServiceError, ServiceResult};

pub struct SubjectRepository<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> SubjectRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    pub async fn find_all(&self) -> ServiceResult<Vec<subject::Model>> {
        Ok(subject::Entity::find()
            .order_by_asc(subject::Column::Name)
            .all(self.db)
            .await?)
    }

    pub async fn count(&self) -> ServiceResult<u64> {
        Ok(subject::Entity::find().count(self.db).await?)
    }

    pub async fn find_by_id(&self, subject_id: Uuid) -> ServiceResult<Option<subject::Model>> {
        Ok(subject::Entity::find_by_id(subject_id).one(self.db).await?)
    }

    pub async fn create(&self, new_subject: NewSubject) -> ServiceResult<subject::Model> {
        let subject_model = subject::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(new_subject.name),
            code: Set(new_subject.code),
            description: Set(new_subject.description),
            ..Default::default()
        };

        Ok(subject_model.insert(self.db).await?)
    }

    pub async fn update(
        &self,
        subject_id: Uuid,
        updates: SubjectUpdate,
    ) -> ServiceResult<subject::Model> {
        let subject = self
            .find_by_id(subject_id)
            .await?
            .ok_or(ServiceError::NotFound("Subject"))?;

        let mut active_model: subject::ActiveModel = subject.into();

        if let Some(name) = updates.name {
            active_model.name = Set(name);
        }
        if let Some(code) = updates.code {
            active_model.code = Set(code);
        }
        if let Some(description) = updates.description {
            active_model.description = Set(description);
        }

        Ok(active_model.update(self.db).await?)
    }

    pub async fn delete(&self, subject_id: Uuid) -> ServiceResult<()> {
        let result = subject::Entity::delete_by_id(subject_id).exec(self.db).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound("Subject"));
        }
        Ok(())
    }
}

pub struct NewSubject {
    pub name: String,
    pub code: String,
    pub description: Option<String>,
}

#[derive(Default)]
pub struct SubjectUpdate {
    pub name: Option<String>,
    pub code: Option<String>,
    pub description: Option<Option<String>>,
}
