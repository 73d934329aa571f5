use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::repositories::{AssignmentFilter, AssignmentRecord, NewAssignment};
use crate::routes::classes::dto::ClassResponse;
use crate::routes::subjects::dto::SubjectResponse;

#[derive(Debug, Serialize, ToSchema)]
pub struct AssignmentResponse {
    pub id: Uuid,
    pub teacher_id: Uuid,
    pub subject_id: Uuid,
    pub class_id: Uuid,
    pub academic_year: String,
    pub subject: Option<SubjectResponse>,
    pub class: Option<ClassResponse>,
    pub created_at: NaiveDateTime,
}

impl From<AssignmentRecord> for AssignmentResponse {
    fn from(record: AssignmentRecord) -> Self {
        let assignment = record.assignment;
        Self {
            id: assignment.id,
            teacher_id: assignment.teacher_id,
            subject_id: assignment.subject_id,
            class_id: assignment.class_id,
            academic_year: assignment.academic_year,
            subject: record.subject.map(SubjectResponse::from),
            class: record.class.map(ClassResponse::from),
            created_at: assignment.created_at,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct AssignmentQueryParams {
    pub teacher_id: Option<Uuid>,
    pub class_id: Option<Uuid>,
    pub academic_year: Option<String>,
}

impl From<AssignmentQueryParams> for AssignmentFilter {
    fn from(query: AssignmentQueryParams) -> Self {
        AssignmentFilter {
            teacher_id: query.teacher_id,
            class_id: query.class_id,
            academic_year: query.academic_year,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateAssignmentRequest {
    pub teacher_id: Uuid,
    pub subject_id: Uuid,
    pub class_id: Uuid,
    #[schema(example = "2026-2027")]
    pub academic_year: String,
}

impl From<CreateAssignmentRequest> for NewAssignment {
    fn from(request: CreateAssignmentRequest) -> Self {
        NewAssignment {
            teacher_id: request.teacher_id,
            subject_id: request.subject_id,
            class_id: request.class_id,
            academic_year: request.academic_year.trim().to_string(),
        }
    }
}
