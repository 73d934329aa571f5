use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use uuid::Uuid;

use super::dto::{CreateSubjectRequest, SubjectResponse, UpdateSubjectRequest};
use crate::errors::ServiceError;
use crate::extractor::AuthClaims;
use crate::policy::{Operation, Table, ensure};
use crate::repositories::{NewSubject, SubjectRepository, SubjectUpdate};
use crate::routes::profile::dto::MessageResponse;
use crate::state::AppState;
use crate::utils::validation::require_non_blank;

pub fn create_route() -> Router<AppState> {
    Router::new()
        .route("/api/v1/subjects", get(list_subjects).post(create_subject))
        .route(
            "/api/v1/subjects/{id}",
            get(get_subject).put(update_subject).delete(delete_subject),
        )
}

/// List subjects
#[utoipa::path(
    get,
    path = "/api/v1/subjects",
    responses(
        (status = 200, description = "Subjects", body = Vec<SubjectResponse>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Subjects"
)]
pub async fn list_subjects(
    State(state): State<AppState>,
    claims: AuthClaims,
) -> Result<(StatusCode, Json<Vec<SubjectResponse>>), (StatusCode, String)> {
    let actor = claims.actor();
    ensure(&actor, Table::Subjects, Operation::Select, None)?;

    let txn = state.scoped(&actor).await?;
    let subjects = SubjectRepository::new(&txn).find_all().await?;
    txn.commit().await.map_err(ServiceError::from)?;

    Ok((
        StatusCode::OK,
        Json(subjects.into_iter().map(SubjectResponse::from).collect()),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/subjects/{id}",
    params(("id" = Uuid, Path, description = "Subject id")),
    responses(
        (status = 200, description = "Subject", body = SubjectResponse),
        (status = 404, description = "Subject not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Subjects"
)]
pub async fn get_subject(
    State(state): State<AppState>,
    claims: AuthClaims,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<SubjectResponse>), (StatusCode, String)> {
    let actor = claims.actor();
    ensure(&actor, Table::Subjects, Operation::Select, None)?;

    let txn = state.scoped(&actor).await?;
    let subject = SubjectRepository::new(&txn)
        .find_by_id(id)
        .await?
        .ok_or(ServiceError::NotFound("Subject"))?;
    txn.commit().await.map_err(ServiceError::from)?;

    Ok((StatusCode::OK, Json(subject.into())))
}

/// Create a subject (admin)
#[utoipa::path(
    post,
    path = "/api/v1/subjects",
    request_body = CreateSubjectRequest,
    responses(
        (status = 201, description = "Subject created", body = SubjectResponse),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Subject code already used")
    ),
    security(("bearer_auth" = [])),
    tag = "Subjects"
)]
pub async fn create_subject(
    State(state): State<AppState>,
    claims: AuthClaims,
    Json(payload): Json<CreateSubjectRequest>,
) -> Result<(StatusCode, Json<SubjectResponse>), (StatusCode, String)> {
    let actor = claims.actor();
    ensure(&actor, Table::Subjects, Operation::Insert, None)?;

    let new_subject = NewSubject::from(payload);
    require_non_blank("Name", &new_subject.name)?;
    require_non_blank("Code", &new_subject.code)?;

    let txn = state.scoped(&actor).await?;
    let subject = SubjectRepository::new(&txn).create(new_subject).await?;
    txn.commit().await.map_err(ServiceError::from)?;

    tracing::info!(subject_id = %subject.id, code = %subject.code, "Subject created");
    Ok((StatusCode::CREATED, Json(subject.into())))
}

/// Update a subject (admin)
#[utoipa::path(
    put,
    path = "/api/v1/subjects/{id}",
    params(("id" = Uuid, Path, description = "Subject id")),
    request_body = UpdateSubjectRequest,
    responses(
        (status = 200, description = "Subject updated", body = SubjectResponse),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Subject not found"),
        (status = 409, description = "Subject code already used")
    ),
    security(("bearer_auth" = [])),
    tag = "Subjects"
)]
pub async fn update_subject(
    State(state): State<AppState>,
    claims: AuthClaims,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateSubjectRequest>,
) -> Result<(StatusCode, Json<SubjectResponse>), (StatusCode, String)> {
    let actor = claims.actor();
    ensure(&actor, Table::Subjects, Operation::Update, None)?;

    let updates = SubjectUpdate::from(payload);
    if let Some(name) = &updates.name {
        require_non_blank("Name", name)?;
    }
    if let Some(code) = &updates.code {
        require_non_blank("Code", code)?;
    }

    let txn = state.scoped(&actor).await?;
    let subject = SubjectRepository::new(&txn).update(id, updates).await?;
    txn.commit().await.map_err(ServiceError::from)?;

    Ok((StatusCode::OK, Json(subject.into())))
}

/// Delete a subject (admin). Its teacher assignments go with it.
#[utoipa::path(
    delete,
    path = "/api/v1/subjects/{id}",
    params(("id" = Uuid, Path, description = "Subject id")),
    responses(
        (status = 200, description = "Subject deleted", body = MessageResponse),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Subject not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Subjects"
)]
pub async fn delete_subject(
    State(state): State<AppState>,
    claims: AuthClaims,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<MessageResponse>), (StatusCode, String)> {
    let actor = claims.actor();
    ensure(&actor, Table::Subjects, Operation::Delete, None)?;

    let txn = state.scoped(&actor).await?;
    SubjectRepository::new(&txn).delete(id).await?;
    txn.commit().await.map_err(ServiceError::from)?;

    tracing::info!(subject_id = %id, "Subject deleted");
    Ok((StatusCode::OK, Json(MessageResponse::new("Subject deleted"))))
}
