use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::routes;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some(
                            "Access token from `/api/v1/auth/sign-in` or `/api/v1/auth/sign-up`",
                        ))
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(title = "School Admin API", description = "Students, teachers, classes, subjects and files of a school"),
    paths(
        routes::health::route::health,
        routes::auth::route::sign_up,
        routes::auth::route::sign_in,
        routes::auth::route::sign_out,
        routes::auth::route::current_user,
        routes::auth::route::change_password,
        routes::profile::route::get_own_profile,
        routes::profile::route::update_own_profile,
        routes::profile::route::get_profile_by_id,
        routes::profile::route::delete_identity,
        routes::students::route::list_students,
        routes::students::route::get_student,
        routes::students::route::create_student,
        routes::students::route::update_student,
        routes::students::route::delete_student,
        routes::teachers::route::list_teachers,
        routes::teachers::route::get_teacher,
        routes::teachers::route::create_teacher,
        routes::teachers::route::update_teacher,
        routes::teachers::route::delete_teacher,
        routes::classes::route::list_classes,
        routes::classes::route::get_class,
        routes::classes::route::create_class,
        routes::classes::route::update_class,
        routes::classes::route::delete_class,
        routes::subjects::route::list_subjects,
        routes::subjects::route::get_subject,
        routes::subjects::route::create_subject,
        routes::subjects::route::update_subject,
        routes::subjects::route::delete_subject,
        routes::teacher_subjects::route::list_assignments,
        routes::teacher_subjects::route::create_assignment,
        routes::teacher_subjects::route::delete_assignment,
        routes::stats::route::get_dashboard_stats,
        routes::storage::route::upload_object,
        routes::storage::route::download_object,
        routes::storage::route::download_public_object,
        routes::storage::route::get_public_url,
        routes::storage::route::delete_objects,
    ),
    components(schemas(
        routes::profile::dto::ProfileResponse,
        routes::students::dto::StudentResponse,
        routes::teachers::dto::TeacherResponse,
        routes::classes::dto::ClassResponse,
        routes::subjects::dto::SubjectResponse,
        routes::teacher_subjects::dto::AssignmentResponse,
        routes::storage::dto::StorageObjectResponse,
        routes::stats::dto::DashboardStatsResponse,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness"),
        (name = "Authentication", description = "Sign-up, sign-in and sessions"),
        (name = "Profile", description = "User profiles"),
        (name = "Students", description = "Student records"),
        (name = "Teachers", description = "Teacher records"),
        (name = "Classes", description = "Classes"),
        (name = "Subjects", description = "Curriculum subjects"),
        (name = "Teacher Subjects", description = "Teacher, subject and class assignments"),
        (name = "Statistics", description = "Dashboard counts"),
        (name = "Storage", description = "Bucketed file storage")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_routes_and_bearer_scheme() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/v1/students/{id}"));
        assert!(doc.paths.paths.contains_key("/api/v1/auth/sign-in"));
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
        assert!(components.schemas.contains_key("StudentResponse"));
    }
}
