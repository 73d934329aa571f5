use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::entities::sea_orm_active_enums::EmploymentStatus;
use crate::repositories::{ProfileUpdate, TeacherRecord, TeacherUpdate};
use crate::routes::profile::dto::ProfileResponse;
use crate::routes::teacher_subjects::dto::AssignmentResponse;
use crate::utils::serde_helpers::double_option;

#[derive(Debug, Serialize, ToSchema)]
pub struct TeacherResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub employee_number: String,
    pub status: EmploymentStatus,
    pub hire_date: NaiveDate,
    pub department: Option<String>,
    pub qualifications: Option<String>,
    pub profile: Option<ProfileResponse>,
    /// Present on single-teacher responses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignments: Option<Vec<AssignmentResponse>>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<TeacherRecord> for TeacherResponse {
    fn from(record: TeacherRecord) -> Self {
        let teacher = record.teacher;
        Self {
            id: teacher.id,
            user_id: teacher.user_id,
            employee_number: teacher.employee_number,
            status: teacher.status,
            hire_date: teacher.hire_date,
            department: teacher.department,
            qualifications: teacher.qualifications,
            profile: record.profile.map(ProfileResponse::from),
            assignments: None,
            created_at: teacher.created_at,
            updated_at: teacher.updated_at,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct TeacherQueryParams {
    pub department: Option<String>,
    pub status: Option<EmploymentStatus>,
    /// Matches first name, last name, email or employee number.
    pub search: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTeacherRequest {
    #[schema(example = "teacher1@school.local")]
    pub email: String,

    #[schema(example = "password123")]
    pub password: String,

    #[schema(example = "Lan")]
    pub first_name: String,

    #[schema(example = "Nguyen")]
    pub last_name: String,

    pub phone: Option<String>,
    pub address: Option<String>,

    /// Generated as `EMP-{year}-{suffix}` when omitted.
    #[schema(example = "EMP-2026-0001")]
    pub employee_number: Option<String>,

    /// Defaults to `active`.
    pub status: Option<EmploymentStatus>,

    /// Defaults to today.
    #[schema(example = "2026-08-15")]
    pub hire_date: Option<NaiveDate>,

    #[schema(example = "Mathematics")]
    pub department: Option<String>,

    pub qualifications: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateTeacherRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub phone: Option<Option<String>>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub address: Option<Option<String>>,

    pub employee_number: Option<String>,
    pub status: Option<EmploymentStatus>,
    pub hire_date: Option<NaiveDate>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub department: Option<Option<String>>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub qualifications: Option<Option<String>>,
}

impl UpdateTeacherRequest {
    pub fn into_updates(self) -> (ProfileUpdate, TeacherUpdate) {
        let profile = ProfileUpdate {
            first_name: self.first_name.map(|s| s.trim().to_string()),
            last_name: self.last_name.map(|s| s.trim().to_string()),
            phone: self.phone,
            address: self.address,
            avatar_url: None,
        };
        let teacher = TeacherUpdate {
            employee_number: self.employee_number.map(|s| s.trim().to_string()),
            status: self.status,
            hire_date: self.hire_date,
            department: self.department,
            qualifications: self.qualifications,
        };
        (profile, teacher)
    }
}
