use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::entities::sea_orm_active_enums::StudentStatus;
use crate::repositories::{ProfileUpdate, StudentRecord, StudentUpdate};
use crate::routes::classes::dto::ClassResponse;
use crate::routes::profile::dto::ProfileResponse;
use crate::utils::serde_helpers::double_option;

#[derive(Debug, Serialize, ToSchema)]
pub struct StudentResponse {
    pub id: Uuid,
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
    pub profile: Option<ProfileResponse>,
    pub class: Option<ClassResponse>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<StudentRecord> for StudentResponse {
    fn from(record: StudentRecord) -> Self {
        let student = record.student;
        Self {
            id: student.id,
            user_id: student.user_id,
            student_number: student.student_number,
            class_id: student.class_id,
            status: student.status,
            admission_date: student.admission_date,
            date_of_birth: student.date_of_birth,
            gender: student.gender,
            guardian_name: student.guardian_name,
            guardian_phone: student.guardian_phone,
            guardian_email: student.guardian_email,
            profile: record.profile.map(ProfileResponse::from),
            class: record.class.map(ClassResponse::from),
            created_at: student.created_at,
            updated_at: student.updated_at,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct StudentQueryParams {
    pub class_id: Option<Uuid>,
    pub status: Option<StudentStatus>,
    /// Matches first name, last name, email or student number.
    pub search: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateStudentRequest {
    #[schema(example = "student1@school.local")]
    pub email: String,

    #[schema(example = "password123")]
    pub password: String,

    #[schema(example = "Minh")]
    pub first_name: String,

    #[schema(example = "Tran")]
    pub last_name: String,

    pub phone: Option<String>,
    pub address: Option<String>,

    /// Generated as `STU-{year}-{suffix}` when omitted.
    #[schema(example = "STU-2026-0001")]
    pub student_number: Option<String>,

    pub class_id: Option<Uuid>,

    /// Defaults to `active`.
    pub status: Option<StudentStatus>,

    /// Defaults to today.
    #[schema(example = "2026-09-01")]
    pub admission_date: Option<NaiveDate>,

    #[schema(example = "2015-04-12")]
    pub date_of_birth: Option<NaiveDate>,

    pub gender: Option<String>,
    pub guardian_name: Option<String>,
    pub guardian_phone: Option<String>,
    pub guardian_email: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateStudentRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub phone: Option<Option<String>>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub address: Option<Option<String>>,

    pub student_number: Option<String>,

    /// `null` removes the student from its class.
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<Uuid>)]
    pub class_id: Option<Option<Uuid>>,

    pub status: Option<StudentStatus>,
    pub admission_date: Option<NaiveDate>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<NaiveDate>)]
    pub date_of_birth: Option<Option<NaiveDate>>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub gender: Option<Option<String>>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub guardian_name: Option<Option<String>>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub guardian_phone: Option<Option<String>>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub guardian_email: Option<Option<String>>,
}

impl UpdateStudentRequest {
    pub fn into_updates(self) -> (ProfileUpdate, StudentUpdate) {
        let profile = ProfileUpdate {
            first_name: self.first_name.map(|s| s.trim().to_string()),
            last_name: self.last_name.map(|s| s.trim().to_string()),
            phone: self.phone,
            address: self.address,
            avatar_url: None,
        };
        let student = StudentUpdate {
            student_number: self.student_number.map(|s| s.trim().to_string()),
            class_id: self.class_id,
            status: self.status,
            admission_date: self.admission_date,
            date_of_birth: self.date_of_birth,
            gender: self.gender,
            guardian_name: self.guardian_name,
            guardian_phone: self.guardian_phone,
            guardian_email: self.guardian_email,
        };
        (profile, student)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_splits_profile_and_student_fields() {
        let request: UpdateStudentRequest = serde_json::from_str(
            r#"{"first_name": " Minh ", "class_id": null, "status": "graduated"}"#,
        )
        .unwrap();
        let (profile, student) = request.into_updates();

        assert_eq!(profile.first_name.as_deref(), Some("Minh"));
        assert!(profile.phone.is_none());
        assert_eq!(student.class_id, Some(None));
        assert_eq!(student.status, Some(StudentStatus::Graduated));
        assert!(student.guardian_email.is_none());
    }
}
