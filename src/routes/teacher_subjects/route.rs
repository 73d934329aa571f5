use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get},
};
use uuid::Uuid;

use super::dto::{AssignmentQueryParams, AssignmentResponse, CreateAssignmentRequest};
use crate::errors::ServiceError;
use crate::extractor::AuthClaims;
use crate::policy::{Operation, Table, ensure};
use crate::repositories::{AssignmentFilter, NewAssignment, TeacherSubjectRepository};
use crate::routes::profile::dto::MessageResponse;
use crate::state::AppState;
use crate::utils::validation::validate_academic_year;

pub fn create_route() -> Router<AppState> {
    Router::new()
        .route(
            "/api/v1/teacher-subjects",
            get(list_assignments).post(create_assignment),
        )
        .route("/api/v1/teacher-subjects/{id}", delete(delete_assignment))
}

/// List teacher-subject assignments
#[utoipa::path(
    get,
    path = "/api/v1/teacher-subjects",
    params(AssignmentQueryParams),
    responses(
        (status = 200, description = "Assignments with subject and class", body = Vec<AssignmentResponse>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Teacher Subjects"
)]
pub async fn list_assignments(
    State(state): State<AppState>,
    claims: AuthClaims,
    Query(query): Query<AssignmentQueryParams>,
) -> Result<(StatusCode, Json<Vec<AssignmentResponse>>), (StatusCode, String)> {
    let actor = claims.actor();
    ensure(&actor, Table::TeacherSubjects, Operation::Select, None)?;

    let txn = state.scoped(&actor).await?;
    let assignments = TeacherSubjectRepository::new(&txn)
        .find_all(AssignmentFilter::from(query))
        .await?;
    txn.commit().await.map_err(ServiceError::from)?;

    Ok((
        StatusCode::OK,
        Json(assignments.into_iter().map(AssignmentResponse::from).collect()),
    ))
}

/// Assign a subject in a class to a teacher for an academic year (admin)
#[utoipa::path(
    post,
    path = "/api/v1/teacher-subjects",
    request_body = CreateAssignmentRequest,
    responses(
        (status = 201, description = "Assignment created", body = AssignmentResponse),
        (status = 400, description = "Invalid year or unknown teacher, subject or class"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Assignment already exists")
    ),
    security(("bearer_auth" = [])),
    tag = "Teacher Subjects"
)]
pub async fn create_assignment(
    State(state): State<AppState>,
    claims: AuthClaims,
    Json(payload): Json<CreateAssignmentRequest>,
) -> Result<(StatusCode, Json<AssignmentResponse>), (StatusCode, String)> {
    let actor = claims.actor();
    ensure(&actor, Table::TeacherSubjects, Operation::Insert, None)?;

    let new_assignment = NewAssignment::from(payload);
    validate_academic_year(&new_assignment.academic_year)?;

    let txn = state.scoped(&actor).await?;
    let assignments = TeacherSubjectRepository::new(&txn);
    let assignment = assignments.create(new_assignment).await?;
    let record = assignments
        .find_record_by_id(assignment.id)
        .await?
        .ok_or(ServiceError::NotFound("Assignment"))?;
    txn.commit().await.map_err(ServiceError::from)?;

    tracing::info!(
        assignment_id = %assignment.id,
        teacher_id = %assignment.teacher_id,
        subject_id = %assignment.subject_id,
        "Subject assigned"
    );
    Ok((StatusCode::CREATED, Json(record.into())))
}

/// Remove an assignment (admin)
#[utoipa::path(
    delete,
    path = "/api/v1/teacher-subjects/{id}",
    params(("id" = Uuid, Path, description = "Assignment id")),
    responses(
        (status = 200, description = "Assignment removed", body = MessageResponse),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Assignment not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Teacher Subjects"
)]
pub async fn delete_assignment(
    State(state): State<AppState>,
    claims: AuthClaims,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<MessageResponse>), (StatusCode, String)> {
    let actor = claims.actor();
    ensure(&actor, Table::TeacherSubjects, Operation::Delete, None)?;

    let txn = state.scoped(&actor).await?;
    TeacherSubjectRepository::new(&txn).delete(id).await?;
    txn.commit().await.map_err(ServiceError::from)?;

    tracing::info!(assignment_id = %id, "Assignment removed");
    Ok((StatusCode::OK, Json(MessageResponse::new("Assignment removed"))))
}
