use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::entities::storage_object;
use crate::errors::ServiceResult;
use crate::storage::ObjectKey;

/// Metadata rows for objects held in [`crate::storage::FileStorage`].
pub struct StorageObjectRepository<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> StorageObjectRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    pub async fn find(&self, key: &ObjectKey) -> ServiceResult<Option<storage_object::Model>> {
        Ok(storage_object::Entity::find()
            .filter(storage_object::Column::Bucket.eq(key.bucket.as_str()))
            .filter(storage_object::Column::Name.eq(key.name.as_str()))
            .one(self.db)
            .await?)
    }

    /// Inserts the row or, for an existing (bucket, name), refreshes its
    /// content type and size. The owner never changes.
    pub async fn upsert(
        &self,
        key: &ObjectKey,
        owner_id: Uuid,
        content_type: &str,
        size_bytes: i64,
    ) -> ServiceResult<storage_object::Model> {
        let object = storage_object::ActiveModel {
            id: Set(Uuid::new_v4()),
            bucket: Set(key.bucket.clone()),
            name: Set(key.name.clone()),
            owner_id: Set(Some(owner_id)),
            content_type: Set(content_type.to_string()),
            size_bytes: Set(size_bytes),
            ..Default::default()
        };

        let model = storage_object::Entity::insert(object)
            .on_conflict(
                OnConflict::columns([
                    storage_object::Column::Bucket,
                    storage_object::Column::Name,
                ])
                .update_columns([
                    storage_object::Column::ContentType,
                    storage_object::Column::SizeBytes,
                ])
                .to_owned(),
            )
            .exec_with_returning(self.db)
            .await?;

        Ok(model)
    }

    pub async fn delete(&self, key: &ObjectKey) -> ServiceResult<bool> {
        let result = storage_object::Entity::delete_many()
            .filter(storage_object::Column::Bucket.eq(key.bucket.as_str()))
            .filter(storage_object::Column::Name.eq(key.name.as_str()))
            .exec(self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }
}
