use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::subject;
use crate::repositories::{NewSubject, SubjectUpdate};
use crate::utils::serde_helpers::double_option;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SubjectResponse {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<subject::Model> for SubjectResponse {
    fn from(subject: subject::Model) -> Self {
        Self {
            id: subject.id,
            name: subject.name,
            code: subject.code,
            description: subject.description,
            created_at: subject.created_at,
            updated_at: subject.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSubjectRequest {
    #[schema(example = "Geography")]
    pub name: String,

    /// Stored upper-case.
    #[schema(example = "GEO")]
    pub code: String,

    pub description: Option<String>,
}

impl From<CreateSubjectRequest> for NewSubject {
    fn from(request: CreateSubjectRequest) -> Self {
        NewSubject {
            name: request.name.trim().to_string(),
            code: request.code.trim().to_uppercase(),
            description: request.description,
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateSubjectRequest {
    pub name: Option<String>,
    pub code: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
}

impl From<UpdateSubjectRequest> for SubjectUpdate {
    fn from(request: UpdateSubjectRequest) -> Self {
        SubjectUpdate {
            name: request.name.map(|s| s.trim().to_string()),
            code: request.code.map(|s| s.trim().to_uppercase()),
            description: request.description,
        }
    }
}
