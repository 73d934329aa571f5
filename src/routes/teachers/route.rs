use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use chrono::Utc;
use uuid::Uuid;

use super::dto::{CreateTeacherRequest, TeacherQueryParams, TeacherResponse, UpdateTeacherRequest};
use crate::auth::{NewAccount, create_account};
use crate::entities::sea_orm_active_enums::{EmploymentStatus, UserRole};
use crate::errors::ServiceError;
use crate::extractor::AuthClaims;
use crate::policy::{Operation, Table, ensure};
use crate::repositories::{
    AssignmentFilter, NewTeacher, ProfileRepository, ProfileUpdate, TeacherFilter,
    TeacherRepository, TeacherSubjectRepository,
};
use crate::routes::profile::dto::MessageResponse;
use crate::routes::profile::route::validate_names;
use crate::routes::teacher_subjects::dto::AssignmentResponse;
use crate::state::AppState;
use crate::utils::random::generate_record_number;

pub fn create_route() -> Router<AppState> {
    Router::new()
        .route("/api/v1/teachers", get(list_teachers).post(create_teacher))
        .route(
            "/api/v1/teachers/{id}",
            get(get_teacher).put(update_teacher).delete(delete_teacher),
        )
}

/// List teachers. Non-admins only ever see their own teacher row.
#[utoipa::path(
    get,
    path = "/api/v1/teachers",
    params(TeacherQueryParams),
    responses(
        (status = 200, description = "Teachers with profile", body = Vec<TeacherResponse>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Teachers"
)]
pub async fn list_teachers(
    State(state): State<AppState>,
    claims: AuthClaims,
    Query(query): Query<TeacherQueryParams>,
) -> Result<(StatusCode, Json<Vec<TeacherResponse>>), (StatusCode, String)> {
    let actor = claims.actor();
    let user_id = (!actor.is_admin()).then_some(actor.user_id);

    let txn = state.scoped(&actor).await?;
    let teachers = TeacherRepository::new(&txn)
        .find_all(TeacherFilter {
            user_id,
            department: query.department,
            status: query.status,
            search: query.search,
        })
        .await?;
    txn.commit().await.map_err(ServiceError::from)?;

    Ok((
        StatusCode::OK,
        Json(teachers.into_iter().map(TeacherResponse::from).collect()),
    ))
}

/// Get a teacher with its subject assignments
#[utoipa::path(
    get,
    path = "/api/v1/teachers/{id}",
    params(("id" = Uuid, Path, description = "Teacher id")),
    responses(
        (status = 200, description = "Teacher", body = TeacherResponse),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Teacher not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Teachers"
)]
pub async fn get_teacher(
    State(state): State<AppState>,
    claims: AuthClaims,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<TeacherResponse>), (StatusCode, String)> {
    let actor = claims.actor();

    let txn = state.scoped(&actor).await?;
    let record = TeacherRepository::new(&txn)
        .find_by_id(id)
        .await?
        .ok_or(ServiceError::NotFound("Teacher"))?;
    ensure(&actor, Table::Teachers, Operation::Select, Some(record.teacher.user_id))?;

    let assignments = TeacherSubjectRepository::new(&txn)
        .find_all(AssignmentFilter {
            teacher_id: Some(id),
            ..Default::default()
        })
        .await?;
    txn.commit().await.map_err(ServiceError::from)?;

    let mut response = TeacherResponse::from(record);
    response.assignments = Some(assignments.into_iter().map(AssignmentResponse::from).collect());
    Ok((StatusCode::OK, Json(response)))
}

/// Create a teacher (admin): identity, profile and teacher row in one transaction
#[utoipa::path(
    post,
    path = "/api/v1/teachers",
    request_body = CreateTeacherRequest,
    responses(
        (status = 201, description = "Teacher created", body = TeacherResponse),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Email or employee number already used")
    ),
    security(("bearer_auth" = [])),
    tag = "Teachers"
)]
pub async fn create_teacher(
    State(state): State<AppState>,
    claims: AuthClaims,
    Json(payload): Json<CreateTeacherRequest>,
) -> Result<(StatusCode, Json<TeacherResponse>), (StatusCode, String)> {
    let actor = claims.actor();
    ensure(&actor, Table::Teachers, Operation::Insert, None)?;

    let employee_number = payload
        .employee_number
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| generate_record_number("EMP"));

    let txn = state.scoped(&actor).await?;

    let profile = create_account(
        &txn,
        NewAccount {
            email: payload.email,
            password: payload.password,
            first_name: payload.first_name,
            last_name: payload.last_name,
            role: UserRole::Teacher,
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

    let teachers = TeacherRepository::new(&txn);
    let teacher = teachers
        .create(NewTeacher {
            user_id: profile.id,
            employee_number,
            status: payload.status.unwrap_or(EmploymentStatus::Active),
            hire_date: payload.hire_date.unwrap_or_else(|| Utc::now().date_naive()),
            department: payload.department,
            qualifications: payload.qualifications,
        })
        .await?;

    let record = teachers
        .find_by_id(teacher.id)
        .await?
        .ok_or(ServiceError::NotFound("Teacher"))?;
    txn.commit().await.map_err(ServiceError::from)?;

    tracing::info!(
        teacher_id = %teacher.id,
        employee_number = %teacher.employee_number,
        "Teacher created"
    );
    Ok((StatusCode::CREATED, Json(record.into())))
}

/// Update a teacher and its profile fields (admin)
#[utoipa::path(
    put,
    path = "/api/v1/teachers/{id}",
    params(("id" = Uuid, Path, description = "Teacher id")),
    request_body = UpdateTeacherRequest,
    responses(
        (status = 200, description = "Teacher updated", body = TeacherResponse),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Teacher not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Teachers"
)]
pub async fn update_teacher(
    State(state): State<AppState>,
    claims: AuthClaims,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTeacherRequest>,
) -> Result<(StatusCode, Json<TeacherResponse>), (StatusCode, String)> {
    let actor = claims.actor();
    ensure(&actor, Table::Teachers, Operation::Update, None)?;

    let (profile_updates, teacher_updates) = payload.into_updates();
    validate_names(&profile_updates)?;

    let txn = state.scoped(&actor).await?;
    let teachers = TeacherRepository::new(&txn);
    let teacher = teachers.update(id, teacher_updates).await?;
    if !profile_updates.is_empty() {
        ProfileRepository::new(&txn)
            .update(teacher.user_id, profile_updates)
            .await?;
    }
    let record = teachers
        .find_by_id(id)
        .await?
        .ok_or(ServiceError::NotFound("Teacher"))?;
    txn.commit().await.map_err(ServiceError::from)?;

    Ok((StatusCode::OK, Json(record.into())))
}

/// Delete a teacher row and its assignments (admin). The identity and profile are kept.
#[utoipa::path(
    delete,
    path = "/api/v1/teachers/{id}",
    params(("id" = Uuid, Path, description = "Teacher id")),
    responses(
        (status = 200, description = "Teacher deleted", body = MessageResponse),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Teacher not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Teachers"
)]
pub async fn delete_teacher(
    State(state): State<AppState>,
    claims: AuthClaims,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<MessageResponse>), (StatusCode, String)> {
    let actor = claims.actor();
    ensure(&actor, Table::Teachers, Operation::Delete, None)?;

    let txn = state.scoped(&actor).await?;
    TeacherRepository::new(&txn).delete(id).await?;
    txn.commit().await.map_err(ServiceError::from)?;

    tracing::info!(teacher_id = %id, "Teacher deleted");
    Ok((StatusCode::OK, Json(MessageResponse::new("Teacher deleted"))))
}
