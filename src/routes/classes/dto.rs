use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::entities::class;
use crate::repositories::{ClassUpdate, NewClass};
use crate::utils::serde_helpers::double_option;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ClassResponse {
    pub id: Uuid,
    pub name: String,
    pub level: i32,
    pub section: String,
    pub academic_year: String,
    pub capacity: i32,
    pub room_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_count: Option<u64>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<class::Model> for ClassResponse {
    fn from(class: class::Model) -> Self {
        Self {
            id: class.id,
            name: class.name,
            level: class.level,
            section: class.section,
            academic_year: class.academic_year,
            capacity: class.capacity,
            room_number: class.room_number,
            student_count: None,
            created_at: class.created_at,
            updated_at: class.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ClassQueryParams {
    /// e.g. `2026-2027`
    pub academic_year: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateClassRequest {
    #[schema(example = "Grade 4")]
    pub name: String,

    #[schema(example = 4)]
    pub level: i32,

    #[serde(default = "default_section")]
    #[schema(example = "A")]
    pub section: String,

    #[schema(example = "2026-2027")]
    pub academic_year: String,

    #[serde(default = "default_capacity")]
    #[schema(example = 30)]
    pub capacity: i32,

    #[schema(example = "104")]
    pub room_number: Option<String>,
}

fn default_section() -> String {
    "A".to_string()
}

fn default_capacity() -> i32 {
    30
}

impl From<CreateClassRequest> for NewClass {
    fn from(request: CreateClassRequest) -> Self {
        NewClass {
            name: request.name.trim().to_string(),
            level: request.level,
            section: request.section.trim().to_string(),
            academic_year: request.academic_year.trim().to_string(),
            capacity: request.capacity,
            room_number: request.room_number,
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateClassRequest {
    pub name: Option<String>,
    pub level: Option<i32>,
    pub section: Option<String>,
    pub academic_year: Option<String>,
    pub capacity: Option<i32>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub room_number: Option<Option<String>>,
}

impl From<UpdateClassRequest> for ClassUpdate {
    fn from(request: UpdateClassRequest) -> Self {
        ClassUpdate {
            name: request.name.map(|s| s.trim().to_string()),
            level: request.level,
            section: request.section.map(|s| s.trim().to_string()),
            academic_year: request.academic_year.map(|s| s.trim().to_string()),
            capacity: request.capacity,
            room_number: request.room_number,
        }
    }
}
