use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use crate::entities::{class, student};
use crate::errors::{ServiceError, ServiceResult};

pub struct ClassRepository<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> ClassRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    pub async fn find_all(&self, academic_year: Option<&str>) -> ServiceResult<Vec<class::Model>> {
        let mut query = class::Entity::find();
        if let Some(year) = academic_year {
            query = query.filter(class::Column::AcademicYear.eq(year));
        }

        let classes = query
            .order_by_asc(class::Column::Level)
            .order_by_asc(class::Column::Section)
            .order_by_asc(class::Column::Name)
            .all(self.db)
            .await?;
        Ok(classes)
    }

    pub async fn count(&self) -> ServiceResult<u64> {
        Ok(class::Entity::find().count(self.db).await?)
    }

    pub async fn find_by_id(&self, class_id: Uuid) -> ServiceResult<Option<class::Model>> {
        Ok(class::Entity::find_by_id(class_id).one(self.db).await?)
    }

    pub async fn find_by_ids(&self, class_ids: Vec<Uuid>) -> ServiceResult<Vec<class::Model>> {
        if class_ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(class::Entity::find()
            .filter(class::Column::Id.is_in(class_ids))
            .all(self.db)
            .await?)
    }

    pub async fn count_students(&self, class_id: Uuid) -> ServiceResult<u64> {
        Ok(student::Entity::find()
            .filter(student::Column::ClassId.eq(class_id))
            .count(self.db)
            .await?)
    }

    pub async fn create(&self, new_class: NewClass) -> ServiceResult<class::Model> {
        let class_model = class::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(new_class.name),
            level: Set(new_class.level),
            section: Set(new_class.section),
            academic_year: Set(new_class.academic_year),
            capacity: Set(new_class.capacity),
            room_number: Set(new_class.room_number),
            ..Default::default()
        };

        Ok(class_model.insert(self.db).await?)
    }

    pub async fn update(&self, class_id: Uuid, updates: ClassUpdate) -> ServiceResult<class::Model> {
        let class = self
            .find_by_id(class_id)
            .await?
            .ok_or(ServiceError::NotFound("Class"))?;

        let mut active_model: class::ActiveModel = class.into();

        if let Some(name) = updates.name {
            active_model.name = Set(name);
        }
        if let Some(level) = updates.level {
            active_model.level = Set(level);
        }
        if let Some(section) = updates.section {
            active_model.section = Set(section);
        }
        if let Some(academic_year) = updates.academic_year {
            active_model.academic_year = Set(academic_year);
        }
        if let Some(capacity) = updates.capacity {
            active_model.capacity = Set(capacity);
        }
        if let Some(room_number) = updates.room_number {
            active_model.room_number = Set(room_number);
        }

        Ok(active_model.update(self.db).await?)
    }

    /// Students of the class keep their rows; the foreign key nulls their
    /// `class_id`.
    pub async fn delete(&self, class_id: Uuid) -> ServiceResult<()> {
        let result = class::Entity::delete_by_id(class_id).exec(self.db).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound("Class"));
        }
        Ok(())
    }
}

pub struct NewClass {
    pub name: String,
    pub level: i32,
    pub section: String,
    pub academic_year: String,
    pub capacity: i32,
    pub room_number: Option<String>,
}

#[derive(Default)]
pub struct ClassUpdate {
    pub name: Option<String>,
    pub level: Option<i32>,
    pub section: Option<String>,
    pub academic_year: Option<String>,
    pub capacity: Option<i32>,
    pub room_number: Option<Option<String>>,
}
