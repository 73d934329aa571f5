use axum::{Json, Router, extract::State, http::StatusCode, routing::get};

use super::dto::{DashboardStatsResponse, status_breakdown};
use crate::errors::ServiceError;
use crate::extractor::AuthClaims;
use crate::repositories::{ClassRepository, StudentRepository, SubjectRepository, TeacherRepository};
use crate::state::AppState;

pub fn create_route() -> Router<AppState> {
    Router::new().route("/api/v1/stats", get(get_dashboard_stats))
}

#[utoipa::path(
    get,
    path = "/api/v1/stats",
    responses(
        (status = 200, description = "Dashboard counts", body = DashboardStatsResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Statistics"
)]
pub async fn get_dashboard_stats(
    State(state): State<AppState>,
    claims: AuthClaims,
) -> Result<(StatusCode, Json<DashboardStatsResponse>), (StatusCode, String)> {
    let actor = claims.actor();
    // Only admin can view school-wide counts
    if !actor.is_admin() {
        return Err((StatusCode::FORBIDDEN, "Forbidden".to_string()));
    }

    let txn = state.scoped(&actor).await?;
    let students = StudentRepository::new(&txn);
    let response = DashboardStatsResponse {
        total_students: students.count().await?,
        total_teachers: TeacherRepository::new(&txn).count().await?,
        total_classes: ClassRepository::new(&txn).count().await?,
        total_subjects: SubjectRepository::new(&txn).count().await?,
        students_by_status: status_breakdown(students.count_by_status().await?),
    };
    txn.commit().await.map_err(ServiceError::from)?;

    Ok((StatusCode::OK, Json(response)))
}
