use chrono::NaiveDate;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use std::collections::HashMap;
use uuid::Uuid;

use super::ClassRepository;
use crate::entities::sea_orm_active_enums::StudentStatus;
use crate::entities::{class, profile, student};
use crate::errors::{ServiceError, ServiceResult};

/// A student row with the profile and class it points at.
#[derive(Debug, Clone)]
pub struct StudentRecord {
    pub student: student::Model,
    pub profile: Option<profile::Model>,
    pub class: Option<class::Model>,
}

#[derive(Debug, Default)]
pub struct StudentFilter {
    /// Restricts the list to the student row of one identity.
    pub user_id: Option<Uuid>,
    pub class_id: Option<Uuid>,
    pub status: Option<StudentStatus>,
    /// Case-insensitive match on name, email or student number.
    pub search: Option<String>,
}

pub struct StudentRepository<'a, C> {
    db: &'a C,
}

pub(crate) fn like_pattern(search: &str) -> String {
    let escaped = search
        .trim()
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

pub(crate) fn profile_search_condition(search: &str) -> Condition {
    let pattern = like_pattern(search);
    Condition::any()
        .add(
            Expr::expr(Func::lower(Expr::col((profile::Entity, profile::Column::FirstName))))
                .like(pattern.as_str()),
        )
        .add(
            Expr::expr(Func::lower(Expr::col((profile::Entity, profile::Column::LastName))))
                .like(pattern.as_str()),
        )
        .add(
            Expr::expr(Func::lower(Expr::col((profile::Entity, profile::Column::Email))))
                .like(pattern.as_str()),
        )
}

impl<'a, C: ConnectionTrait> StudentRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    pub async fn find_all(&self, filter: StudentFilter) -> ServiceResult<Vec<StudentRecord>> {
        let mut query = student::Entity::find().find_also_related(profile::Entity);

        if let Some(user_id) = filter.user_id {
            query = query.filter(student::Column::UserId.eq(user_id));
        }
        if let Some(class_id) = filter.class_id {
            query = query.filter(student::Column::ClassId.eq(class_id));
        }
        if let Some(status) = filter.status {
            query = query.filter(student::Column::Status.eq(status));
        }
        if let Some(search) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
            let pattern = like_pattern(search);
            query = query.filter(
                profile_search_condition(search).add(
                    Expr::expr(Func::lower(Expr::col((
                        student::Entity,
                        student::Column::StudentNumber,
                    ))))
                    .like(pattern.as_str()),
                ),
            );
        }

        let rows = query
            .order_by_asc(student::Column::StudentNumber)
            .all(self.db)
            .await?;

        self.attach_classes(rows).await
    }

    pub async fn find_by_id(&self, student_id: Uuid) -> ServiceResult<Option<StudentRecord>> {
        let row = student::Entity::find_by_id(student_id)
            .find_also_related(profile::Entity)
            .one(self.db)
            .await?;

        match row {
            Some(row) => Ok(self.attach_classes(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    pub async fn find_by_user_id(&self, user_id: Uuid) -> ServiceResult<Option<student::Model>> {
        Ok(student::Entity::find()
            .filter(student::Column::UserId.eq(user_id))
            .one(self.db)
            .await?)
    }

    async fn attach_classes(
        &self,
        rows: Vec<(student::Model, Option<profile::Model>)>,
    ) -> ServiceResult<Vec<StudentRecord>> {
        let mut class_ids: Vec<Uuid> = rows.iter().filter_map(|(s, _)| s.class_id).collect();
        class_ids.sort_unstable();
        class_ids.dedup();

        let classes: HashMap<Uuid, class::Model> = ClassRepository::new(self.db)
            .find_by_ids(class_ids)
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();

        Ok(rows
            .into_iter()
            .map(|(student, profile)| {
                let class = student.class_id.and_then(|id| classes.get(&id).cloned());
                StudentRecord {
                    student,
                    profile,
                    class,
                }
            })
            .collect())
    }

    pub async fn create(&self, new_student: NewStudent) -> ServiceResult<student::Model> {
        let student_model = student::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(new_student.user_id),
            student_number: Set(new_student.student_number),
            class_id: Set(new_student.class_id),
            status: Set(new_student.status),
            admission_date: Set(new_student.admission_date),
            date_of_birth: Set(new_student.date_of_birth),
            gender: Set(new_student.gender),
            guardian_name: Set(new_student.guardian_name),
            guardian_phone: Set(new_student.guardian_phone),
            guardian_email: Set(new_student.guardian_email),
            ..Default::default()
        };

        Ok(student_model.insert(self.db).await?)
    }

    pub async fn update(
        &self,
        student_id: Uuid,
        updates: StudentUpdate,
    ) -> ServiceResult<student::Model> {
        let student = student::Entity::find_by_id(student_id)
            .one(self.db)
            .await?
            .ok_or(ServiceError::NotFound("Student"))?;

        let mut active_model: student::ActiveModel = student.into();

        if let Some(student_number) = updates.student_number {
            active_model.student_number = Set(student_number);
        }
        if let Some(class_id) = updates.class_id {
            active_model.class_id = Set(class_id);
        }
        if let Some(status) = updates.status {
            active_model.status = Set(status);
        }
        if let Some(admission_date) = updates.admission_date {
            active_model.admission_date = Set(admission_date);
        }
        if let Some(date_of_birth) = updates.date_of_birth {
            active_model.date_of_birth = Set(date_of_birth);
        }
        if let Some(gender) = updates.gender {
            active_model.gender = Set(gender);
        }
        if let Some(guardian_name) = updates.guardian_name {
            active_model.guardian_name = Set(guardian_name);
        }
        if let Some(guardian_phone) = updates.guardian_phone {
            active_model.guardian_phone = Set(guardian_phone);
        }
        if let Some(guardian_email) = updates.guardian_email {
            active_model.guardian_email = Set(guardian_email);
        }

        Ok(active_model.update(self.db).await?)
    }

    /// Removes the student row only; the identity and profile stay.
    pub async fn delete(&self, student_id: Uuid) -> ServiceResult<()> {
        let result = student::Entity::delete_by_id(student_id)
            .exec(self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound("Student"));
        }
        Ok(())
    }

    pub async fn count(&self) -> ServiceResult<u64> {
        Ok(student::Entity::find().count(self.db).await?)
    }

    pub async fn count_by_status(&self) -> ServiceResult<Vec<(StudentStatus, i64)>> {
        Ok(student::Entity::find()
            .select_only()
            .column(student::Column::Status)
            .column_as(student::Column::Id.count(), "count")
            .group_by(student::Column::Status)
            .into_tuple::<(StudentStatus, i64)>()
            .all(self.db)
            .await?)
    }
}

pub struct NewStudent {
    pub user_id: Uuid,
    pub student_number: String,
    pub class_id: Option<Uuid>,
    pub status: StudentStatus,
    pub admission_date: NaiveDate,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub guardian_name: Option<String>,
    pub guardian_phone: Option<String>,
    pub guardian_email: Option<String>,
}

#[derive(Default)]
pub struct StudentUpdate {
    pub student_number: Option<String>,
    pub class_id: Option<Option<Uuid>>,
    pub status: Option<StudentStatus>,
    pub admission_date: Option<NaiveDate>,
    pub date_of_birth: Option<Option<NaiveDate>>,
    pub gender: Option<Option<String>>,
    pub guardian_name: Option<Option<String>>,
    pub guardian_phone: Option<Option<String>>,
    pub guardian_email: Option<Option<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("  Ana "), "%ana%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }
}
