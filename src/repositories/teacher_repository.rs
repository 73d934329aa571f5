use chrono::NaiveDate;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use super::student_repository::{like_pattern, profile_search_condition};
use crate::entities::sea_orm_active_enums::EmploymentStatus;
use crate::entities::{profile, teacher};
use crate::errors::{ServiceError, ServiceResult};

#[derive(Debug, Clone)]
pub struct TeacherRecord {
    pub teacher: teacher::Model,
    pub profile: Option<profile::Model>,
}

impl From<(teacher::Model, Option<profile::Model>)> for TeacherRecord {
    fn from((teacher, profile): (teacher::Model, Option<profile::Model>)) -> Self {
        Self { teacher, profile }
    }
}

#[derive(Debug, Default)]
pub struct TeacherFilter {
    pub user_id: Option<Uuid>,
    pub department: Option<String>,
    pub status: Option<EmploymentStatus>,
    pub search: Option<String>,
}

pub struct TeacherRepository<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> TeacherRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    pub async fn find_all(&self, filter: TeacherFilter) -> ServiceResult<Vec<TeacherRecord>> {
        let mut query = teacher::Entity::find().find_also_related(profile::Entity);

        if let Some(user_id) = filter.user_id {
            query = query.filter(teacher::Column::UserId.eq(user_id));
        }
        if let Some(department) = filter.department {
            query = query.filter(teacher::Column::Department.eq(department));
        }
        if let Some(status) = filter.status {
            query = query.filter(teacher::Column::Status.eq(status));
        }
        if let Some(search) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
            let pattern = like_pattern(search);
            query = query.filter(
                profile_search_condition(search).add(
                    Expr::expr(Func::lower(Expr::col((
                        teacher::Entity,
                        teacher::Column::EmployeeNumber,
                    ))))
                    .like(pattern.as_str()),
                ),
            );
        }

        let rows = query
            .order_by_asc(teacher::Column::EmployeeNumber)
            .all(self.db)
            .await?;

        Ok(rows.into_iter().map(TeacherRecord::from).collect())
    }

    pub async fn find_by_id(&self, teacher_id: Uuid) -> ServiceResult<Option<TeacherRecord>> {
        Ok(teacher::Entity::find_by_id(teacher_id)
            .find_also_related(profile::Entity)
            .one(self.db)
            .await?
            .map(TeacherRecord::from))
    }

    pub async fn find_by_user_id(&self, user_id: Uuid) -> ServiceResult<Option<teacher::Model>> {
        Ok(teacher::Entity::find()
            .filter(teacher::Column::UserId.eq(user_id))
            .one(self.db)
            .await?)
    }

    pub async fn create(&self, new_teacher: NewTeacher) -> ServiceResult<teacher::Model> {
        let teacher_model = teacher::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(new_teacher.user_id),
            employee_number: Set(new_teacher.employee_number),
            status: Set(new_teacher.status),
            hire_date: Set(new_teacher.hire_date),
            department: Set(new_teacher.department),
            qualifications: Set(new_teacher.qualifications),
            ..Default::default()
        };

        Ok(teacher_model.insert(self.db).await?)
    }

    pub async fn update(
        &self,
        teacher_id: Uuid,
        updates: TeacherUpdate,
    ) -> ServiceResult<teacher::Model> {
        let teacher = teacher::Entity::find_by_id(teacher_id)
            .one(self.db)
            .await?
            .ok_or(ServiceError::NotFound("Teacher"))?;

        let mut active_model: teacher::ActiveModel = teacher.into();

        if let Some(employee_number) = updates.employee_number {
            active_model.employee_number = Set(employee_number);
        }
        if let Some(status) = updates.status {
            active_model.status = Set(status);
        }
        if let Some(hire_date) = updates.hire_date {
            active_model.hire_date = Set(hire_date);
        }
        if let Some(department) = updates.department {
            active_model.department = Set(department);
        }
        if let Some(qualifications) = updates.qualifications {
            active_model.qualifications = Set(qualifications);
        }

        Ok(active_model.update(self.db).await?)
    }

    /// Removes the teacher row and, through the foreign key, its subject
    /// assignments. The identity and profile stay.
    pub async fn delete(&self, teacher_id: Uuid) -> ServiceResult<()> {
        let result = teacher::Entity::delete_by_id(teacher_id)
            .exec(self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound("Teacher"));
        }
        Ok(())
    }

    pub async fn count(&self) -> ServiceResult<u64> {
        Ok(teacher::Entity::find().count(self.db).await?)
    }
}

pub struct NewTeacher {
    pub user_id: Uuid,
    pub employee_number: String,
    pub status: EmploymentStatus,
    pub hire_date: NaiveDate,
    pub department: Option<String>,
    pub qualifications: Option<String>,
}

#[derive(Default)]
pub struct TeacherUpdate {
    pub employee_number: Option<String>,
    pub status: Option<EmploymentStatus>,
    pub hire_date: Option<NaiveDate>,
    pub department: Option<Option<String>>,
    pub qualifications: Option<Option<String>>,
}
