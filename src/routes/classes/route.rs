use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use uuid::Uuid;

use super::dto::{ClassQueryParams, ClassResponse, CreateClassRequest, UpdateClassRequest};
use crate::errors::{ServiceError, ServiceResult};
use crate::extractor::AuthClaims;
use crate::policy::{Operation, Table, ensure};
use crate::repositories::{ClassRepository, ClassUpdate, NewClass};
use crate::routes::profile::dto::MessageResponse;
use crate::state::AppState;
use crate::utils::validation::{require_non_blank, validate_academic_year};

pub fn create_route() -> Router<AppState> {
    Router::new()
        .route("/api/v1/classes", get(list_classes).post(create_class))
        .route(
            "/api/v1/classes/{id}",
            get(get_class).put(update_class).delete(delete_class),
        )
}

fn validate_new_class(class: &NewClass) -> ServiceResult<()> {
    require_non_blank("Name", &class.name)?;
    require_non_blank("Section", &class.section)?;
    validate_academic_year(&class.academic_year)?;
    validate_sizes(Some(class.level), Some(class.capacity))
}

fn validate_class_update(update: &ClassUpdate) -> ServiceResult<()> {
    if let Some(name) = &update.name {
        require_non_blank("Name", name)?;
    }
    if let Some(section) = &update.section {
        require_non_blank("Section", section)?;
    }
    if let Some(year) = &update.academic_year {
        validate_academic_year(year)?;
    }
    validate_sizes(update.level, update.capacity)
}

fn validate_sizes(level: Option<i32>, capacity: Option<i32>) -> ServiceResult<()> {
    if level.is_some_and(|l| l < 1) {
        return Err(ServiceError::Validation("Level must be positive".to_string()));
    }
    if capacity.is_some_and(|c| c < 1) {
        return Err(ServiceError::Validation("Capacity must be positive".to_string()));
    }
    Ok(())
}

/// List classes
#[utoipa::path(
    get,
    path = "/api/v1/classes",
    params(ClassQueryParams),
    responses(
        (status = 200, description = "Classes", body = Vec<ClassResponse>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Classes"
)]
pub async fn list_classes(
    State(state): State<AppState>,
    claims: AuthClaims,
    Query(query): Query<ClassQueryParams>,
) -> Result<(StatusCode, Json<Vec<ClassResponse>>), (StatusCode, String)> {
    let actor = claims.actor();
    ensure(&actor, Table::Classes, Operation::Select, None)?;

    let txn = state.scoped(&actor).await?;
    let classes = ClassRepository::new(&txn)
        .find_all(query.academic_year.as_deref())
        .await?;
    txn.commit().await.map_err(ServiceError::from)?;

    Ok((
        StatusCode::OK,
        Json(classes.into_iter().map(ClassResponse::from).collect()),
    ))
}

/// Get a class with its student count
#[utoipa::path(
    get,
    path = "/api/v1/classes/{id}",
    params(("id" = Uuid, Path, description = "Class id")),
    responses(
        (status = 200, description = "Class", body = ClassResponse),
        (status = 404, description = "Class not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Classes"
)]
pub async fn get_class(
    State(state): State<AppState>,
    claims: AuthClaims,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<ClassResponse>), (StatusCode, String)> {
    let actor = claims.actor();
    ensure(&actor, Table::Classes, Operation::Select, None)?;

    let txn = state.scoped(&actor).await?;
    let classes = ClassRepository::new(&txn);
    let class = classes
        .find_by_id(id)
        .await?
        .ok_or(ServiceError::NotFound("Class"))?;
    // Non-admins only see their own student row, so the count is admin-only.
    let student_count = if actor.is_admin() {
        Some(classes.count_students(id).await?)
    } else {
        None
    };
    txn.commit().await.map_err(ServiceError::from)?;

    let mut response = ClassResponse::from(class);
    response.student_count = student_count;
    Ok((StatusCode::OK, Json(response)))
}

/// Create a class (admin)
#[utoipa::path(
    post,
    path = "/api/v1/classes",
    request_body = CreateClassRequest,
    responses(
        (status = 201, description = "Class created", body = ClassResponse),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Class already exists for that section and year")
    ),
    security(("bearer_auth" = [])),
    tag = "Classes"
)]
pub async fn create_class(
    State(state): State<AppState>,
    claims: AuthClaims,
    Json(payload): Json<CreateClassRequest>,
) -> Result<(StatusCode, Json<ClassResponse>), (StatusCode, String)> {
    let actor = claims.actor();
    ensure(&actor, Table::Classes, Operation::Insert, None)?;

    let new_class = NewClass::from(payload);
    validate_new_class(&new_class)?;

    let txn = state.scoped(&actor).await?;
    let class = ClassRepository::new(&txn).create(new_class).await?;
    txn.commit().await.map_err(ServiceError::from)?;

    tracing::info!(class_id = %class.id, name = %class.name, "Class created");
    Ok((StatusCode::CREATED, Json(class.into())))
}

/// Update a class (admin)
#[utoipa::path(
    put,
    path = "/api/v1/classes/{id}",
    params(("id" = Uuid, Path, description = "Class id")),
    request_body = UpdateClassRequest,
    responses(
        (status = 200, description = "Class updated", body = ClassResponse),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Class not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Classes"
)]
pub async fn update_class(
    State(state): State<AppState>,
    claims: AuthClaims,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateClassRequest>,
) -> Result<(StatusCode, Json<ClassResponse>), (StatusCode, String)> {
    let actor = claims.actor();
    ensure(&actor, Table::Classes, Operation::Update, None)?;

    let updates = ClassUpdate::from(payload);
    validate_class_update(&updates)?;

    let txn = state.scoped(&actor).await?;
    let class = ClassRepository::new(&txn).update(id, updates).await?;
    txn.commit().await.map_err(ServiceError::from)?;

    Ok((StatusCode::OK, Json(class.into())))
}

/// Delete a class (admin). Its students stay, without a class.
#[utoipa::path(
    delete,
    path = "/api/v1/classes/{id}",
    params(("id" = Uuid, Path, description = "Class id")),
    responses(
        (status = 200, description = "Class deleted", body = MessageResponse),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Class not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Classes"
)]
pub async fn delete_class(
    State(state): State<AppState>,
    claims: AuthClaims,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<MessageResponse>), (StatusCode, String)> {
    let actor = claims.actor();
    ensure(&actor, Table::Classes, Operation::Delete, None)?;

    let txn = state.scoped(&actor).await?;
    ClassRepository::new(&txn).delete(id).await?;
    txn.commit().await.map_err(ServiceError::from)?;

    tracing::info!(class_id = %id, "Class deleted");
    Ok((StatusCode::OK, Json(MessageResponse::new("Class deleted"))))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_class() -> NewClass {
        NewClass {
            name: "Grade 4".to_string(),
            level: 4,
            section: "A".to_string(),
            academic_year: "2026-2027".to_string(),
            capacity: 30,
            room_number: None,
        }
    }

    #[test]
    fn accepts_well_formed_class() {
        assert!(validate_new_class(&new_class()).is_ok());
    }

    #[test]
    fn rejects_bad_year_and_sizes() {
        let mut class = new_class();
        class.academic_year = "2026/27".to_string();
        assert!(validate_new_class(&class).is_err());

        let mut class = new_class();
        class.capacity = 0;
        assert!(validate_new_class(&class).is_err());

        let update = ClassUpdate {
            level: Some(-1),
            ..Default::default()
        };
        assert!(validate_class_update(&update).is_err());
        assert!(validate_class_update(&ClassUpdate::default()).is_ok());
    }
}
