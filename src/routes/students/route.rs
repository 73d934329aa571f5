use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use chrono::Utc;
use uuid::Uuid;

use super::dto::{CreateStudentRequest, StudentQueryParams, StudentResponse, UpdateStudentRequest};
use crate::auth::{NewAccount, create_account};
use crate::entities::sea_orm_active_enums::{StudentStatus, UserRole};
use crate::errors::{ServiceError, ServiceResult};
use crate::extractor::AuthClaims;
use crate::policy::{Operation, Table, ensure};
use crate::repositories::{
    NewStudent, ProfileRepository, ProfileUpdate, StudentFilter, StudentRepository,
};
use crate::routes::profile::dto::MessageResponse;
use crate::routes::profile::route::validate_names;
use crate::state::AppState;
use crate::utils::random::generate_record_number;
use crate::utils::validation::normalize_email;

pub fn create_route() -> Router<AppState> {
    Router::new()
        .route("/api/v1/students", get(list_students).post(create_student))
        .route(
            "/api/v1/students/{id}",
            get(get_student).put(update_student).delete(delete_student),
        )
}

/// Normalizes an optional guardian email; blank counts as absent.
fn guardian_email(email: Option<String>) -> ServiceResult<Option<String>> {
    email
        .filter(|e| !e.trim().is_empty())
        .map(|e| normalize_email(&e))
        .transpose()
}

/// List students. Non-admins only ever see their own student row.
#[utoipa::path(
    get,
    path = "/api/v1/students",
    params(StudentQueryParams),
    responses(
        (status = 200, description = "Students with profile and class", body = Vec<StudentResponse>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Students"
)]
pub async fn list_students(
    State(state): State<AppState>,
    claims: AuthClaims,
    Query(query): Query<StudentQueryParams>,
) -> Result<(StatusCode, Json<Vec<StudentResponse>>), (StatusCode, String)> {
    let actor = claims.actor();
    let user_id = (!actor.is_admin()).then_some(actor.user_id);

    let txn = state.scoped(&actor).await?;
    let students = StudentRepository::new(&txn)
        .find_all(StudentFilter {
            user_id,
            class_id: query.class_id,
            status: query.status,
            search: query.search,
        })
        .await?;
    txn.commit().await.map_err(ServiceError::from)?;

    Ok((
        StatusCode::OK,
        Json(students.into_iter().map(StudentResponse::from).collect()),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/students/{id}",
    params(("id" = Uuid, Path, description = "Student id")),
    responses(
        (status = 200, description = "Student", body = StudentResponse),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Student not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Students"
)]
pub async fn get_student(
    State(state): State<AppState>,
    claims: AuthClaims,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<StudentResponse>), (StatusCode, String)> {
    let actor = claims.actor();

    let txn = state.scoped(&actor).await?;
    let record = StudentRepository::new(&txn)
        .find_by_id(id)
        .await?
        .ok_or(ServiceError::NotFound("Student"))?;
    txn.commit().await.map_err(ServiceError::from)?;

    ensure(&actor, Table::Students, Operation::Select, Some(record.student.user_id))?;
    Ok((StatusCode::OK, Json(record.into())))
}

/// Create a student (admin): identity, profile and student row in one transaction
#[utoipa::path(
    post,
    path = "/api/v1/students",
    request_body = CreateStudentRequest,
    responses(
        (status = 201, description = "Student created", body = StudentResponse),
        (status = 400, description = "Invalid input or unknown class"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Email or student number already used")
    ),
    security(("bearer_auth" = [])),
    tag = "Students"
)]
pub async fn create_student(
    State(state): State<AppState>,
    claims: AuthClaims,
    Json(payload): Json<CreateStudentRequest>,
) -> Result<(StatusCode, Json<StudentResponse>), (StatusCode, String)> {
    let actor = claims.actor();
    ensure(&actor, Table::Students, Operation::Insert, None)?;

    let guardian_email = guardian_email(payload.guardian_email)?;
    let student_number = payload
        .student_number
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| generate_record_number("STU"));

    let txn = state.scoped(&actor).await?;

    let profile = create_account(
        &txn,
        NewAccount {
            email: payload.email,
            password: payload.password,
            first_name: payload.first_name,
            last_name: payload.last_name,
            role: UserRole::Student,
        },
    )
    .await?;

    if payload.phone.is_some() || payload.address.is_some() {
        ProfileRepository::new(&txn)
            .update(
                profile.id,
                ProfileUpdate {
                    phone: payload.phone.map(Some),
                    address: payload.address.map(Some),
                    ..Default::default()
                },
            )
            .await?;
    }

    let students = StudentRepository::new(&txn);
    let student = students
        .create(NewStudent {
            user_id: profile.id,
            student_number,
            class_id: payload.class_id,
            status: payload.status.unwrap_or(StudentStatus::Active),
            admission_date: payload
                .admission_date
                .unwrap_or_else(|| Utc::now().date_naive()),
            date_of_birth: payload.date_of_birth,
            gender: payload.gender,
            guardian_name: payload.guardian_name,
            guardian_phone: payload.guardian_phone,
            guardian_email,
        })
        .await?;

    let record = students
        .find_by_id(student.id)
        .await?
        .ok_or(ServiceError::NotFound("Student"))?;
    txn.commit().await.map_err(ServiceError::from)?;

    tracing::info!(
        student_id = %student.id,
        student_number = %student.student_number,
        "Student created"
    );
    Ok((StatusCode::CREATED, Json(record.into())))
}

/// Update a student and its profile fields (admin)
#[utoipa::path(
    put,
    path = "/api/v1/students/{id}",
    params(("id" = Uuid, Path, description = "Student id")),
    request_body = UpdateStudentRequest,
    responses(
        (status = 200, description = "Student updated", body = StudentResponse),
        (status = 400, description = "Invalid input or unknown class"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Student not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Students"
)]
pub async fn update_student(
    State(state): State<AppState>,
    claims: AuthClaims,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStudentRequest>,
) -> Result<(StatusCode, Json<StudentResponse>), (StatusCode, String)> {
    let actor = claims.actor();
    ensure(&actor, Table::Students, Operation::Update, None)?;

    let (profile_updates, mut student_updates) = payload.into_updates();
    validate_names(&profile_updates)?;
    if let Some(email) = student_updates.guardian_email.take() {
        student_updates.guardian_email = Some(guardian_email(email)?);
    }

    let txn = state.scoped(&actor).await?;
    let students = StudentRepository::new(&txn);
    let student = students.update(id, student_updates).await?;
    if !profile_updates.is_empty() {
        ProfileRepository::new(&txn)
            .update(student.user_id, profile_updates)
            .await?;
    }
    let record = students
        .find_by_id(id)
        .await?
        .ok_or(ServiceError::NotFound("Student"))?;
    txn.commit().await.map_err(ServiceError::from)?;

    Ok((StatusCode::OK, Json(record.into())))
}

/// Delete a student row (admin). The identity and profile are kept.
#[utoipa::path(
    delete,
    path = "/api/v1/students/{id}",
    params(("id" = Uuid, Path, description = "Student id")),
    responses(
        (status = 200, description = "Student deleted", body = MessageResponse),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Student not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Students"
)]
pub async fn delete_student(
    State(state): State<AppState>,
    claims: AuthClaims,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<MessageResponse>), (StatusCode, String)> {
    let actor = claims.actor();
    ensure(&actor, Table::Students, Operation::Delete, None)?;

    let txn = state.scoped(&actor).await?;
    StudentRepository::new(&txn).delete(id).await?;
    txn.commit().await.map_err(ServiceError::from)?;

    tracing::info!(student_id = %id, "Student deleted");
    Ok((StatusCode::OK, Json(MessageResponse::new("Student deleted"))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guardian_email_is_normalized_or_dropped() {
        assert_eq!(
            guardian_email(Some(" Mom@Home.ORG ".to_string())).unwrap(),
            Some("mom@home.org".to_string())
        );
        assert_eq!(guardian_email(Some("  ".to_string())).unwrap(), None);
        assert_eq!(guardian_email(None).unwrap(), None);
        assert!(guardian_email(Some("nope".to_string())).is_err());
    }
}
