use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use std::collections::HashMap;
use uuid::Uuid;

use super::ClassRepository;
use crate::entities::{class, subject, teacher_subject};
use crate::errors::{ServiceError, ServiceResult};

/// An assignment with its subject and class resolved.
#[derive(Debug, Clone)]
pub struct AssignmentRecord {
    pub assignment: teacher_subject::Model,
    pub subject: Option<subject::Model>,
    pub class: Option<class::Model>,
}

#[derive(Debug, Default)]
pub struct AssignmentFilter {
    pub teacher_id: Option<Uuid>,
    pub class_id: Option<Uuid>,
    pub academic_year: Option<String>,
}

pub struct NewAssignment {
    pub teacher_id: Uuid,
    pub subject_id: Uuid,
    pub class_id: Uuid,
    pub academic_year: String,
}

pub struct TeacherSubjectRepository<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> TeacherSubjectRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    pub async fn find_all(&self, filter: AssignmentFilter) -> ServiceResult<Vec<AssignmentRecord>> {
        let mut query = teacher_subject::Entity::find().find_also_related(subject::Entity);

        if let Some(teacher_id) = filter.teacher_id {
            query = query.filter(teacher_subject::Column::TeacherId.eq(teacher_id));
        }
        if let Some(class_id) = filter.class_id {
            query = query.filter(teacher_subject::Column::ClassId.eq(class_id));
        }
        if let Some(academic_year) = filter.academic_year {
            query = query.filter(teacher_subject::Column::AcademicYear.eq(academic_year));
        }

        let rows = query
            .order_by_desc(teacher_subject::Column::AcademicYear)
            .order_by_asc(teacher_subject::Column::CreatedAt)
            .all(self.db)
            .await?;

        self.attach_classes(rows).await
    }

    pub async fn find_record_by_id(&self, assignment_id: Uuid) -> ServiceResult<Option<AssignmentRecord>> {
        let row = teacher_subject::Entity::find_by_id(assignment_id)
            .find_also_related(subject::Entity)
            .one(self.db)
            .await?;

        match row {
            Some(row) => Ok(self.attach_classes(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn attach_classes(
        &self,
        rows: Vec<(teacher_subject::Model, Option<subject::Model>)>,
    ) -> ServiceResult<Vec<AssignmentRecord>> {
        let mut class_ids: Vec<Uuid> = rows.iter().map(|(a, _)| a.class_id).collect();
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
            .map(|(assignment, subject)| {
                let class = classes.get(&assignment.class_id).cloned();
                AssignmentRecord {
                    assignment,
                    subject,
                    class,
                }
            })
            .collect())
    }

    /// A repeated (teacher, subject, class, year) tuple is a conflict.
    pub async fn create(&self, new_assignment: NewAssignment) -> ServiceResult<teacher_subject::Model> {
        let assignment = teacher_subject::ActiveModel {
            id: Set(Uuid::new_v4()),
            teacher_id: Set(new_assignment.teacher_id),
            subject_id: Set(new_assignment.subject_id),
            class_id: Set(new_assignment.class_id),
            academic_year: Set(new_assignment.academic_year),
            ..Default::default()
        };

        Ok(assignment.insert(self.db).await?)
    }

    pub async fn delete(&self, assignment_id: Uuid) -> ServiceResult<()> {
        let result = teacher_subject::Entity::delete_by_id(assignment_id)
            .exec(self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound("Assignment"));
        }
        Ok(())
    }
}
