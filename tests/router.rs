//! Router tests that stop before any database access.

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use clap::Parser;
use http_body_util::BodyExt;
use school_admin::app::create_app;
use school_admin::auth::JwtManager;
use school_admin::config::Config;
use school_admin::entities::sea_orm_active_enums::UserRole;
use school_admin::redis_service::JwtBlacklist;
use school_admin::state::AppState;
use school_admin::storage::FileStorage;
use sea_orm::DatabaseConnection;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;

const SECRET: &str = "router-test-secret";

struct TestApp {
    state: AppState,
    storage_dir: TempDir,
}

fn test_app() -> TestApp {
    let storage_dir = tempfile::tempdir().unwrap();
    let config = Config::try_parse_from([
        "school_admin_api",
        "--database-url",
        "postgres://localhost/unused",
        "--jwt-secret",
        SECRET,
        "--swagger-enabled",
        "false",
    ])
    .unwrap();

    let storage = FileStorage::new(
        storage_dir.path(),
        ["avatars".to_string(), "documents".to_string()],
        ["avatars".to_string()],
        "http://localhost:8080",
    );

    TestApp {
        state: AppState::new(
            DatabaseConnection::Disconnected,
            JwtBlacklist::in_memory(),
            storage,
            config,
        ),
        storage_dir,
    }
}

fn token(role: UserRole) -> (Uuid, String) {
    let user_id = Uuid::new_v4();
    let token = JwtManager::new(SECRET)
        .create_jwt(user_id, "someone@school.test", role, 3600)
        .unwrap();
    (user_id, token)
}

async fn send(app: &TestApp, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = create_app(app.state.clone()).oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, body.to_vec())
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn health_reports_database_down() {
    let app = test_app();

    let (status, body) = send(&app, get("/health", None)).await;

    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "down");
}

#[tokio::test]
async fn protected_routes_require_a_bearer_token() {
    let app = test_app();

    for uri in ["/api/v1/profile", "/api/v1/students", "/api/v1/stats"] {
        let (status, _) = send(&app, get(uri, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
    }

    let (status, _) = send(&app, get("/api/v1/profile", Some("not-a-jwt"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn tokens_signed_with_another_secret_are_rejected() {
    let app = test_app();
    let forged = JwtManager::new("other-secret")
        .create_jwt(Uuid::new_v4(), "x@school.test", UserRole::Admin, 3600)
        .unwrap();

    let (status, _) = send(&app, get("/api/v1/stats", Some(&forged))).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn revoked_tokens_are_rejected() {
    let app = test_app();
    let (user_id, token) = token(UserRole::Admin);

    app.state
        .blacklist
        .add_jwt_to_blacklist(&user_id.to_string(), &token, 60)
        .await
        .unwrap();

    let (status, body) = send(&app, get("/api/v1/stats", Some(&token))).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(String::from_utf8(body).unwrap(), "Token has been revoked");
}

#[tokio::test]
async fn sign_out_revokes_the_presented_token() {
    let app = test_app();
    let (_, token) = token(UserRole::Teacher);

    let sign_out = Request::builder()
        .method("POST")
        .uri("/api/v1/auth/sign-out")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, sign_out).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, get("/api/v1/auth/user", Some(&token))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn dashboard_stats_are_admin_only() {
    let app = test_app();

    for role in [UserRole::Student, UserRole::Teacher, UserRole::Parent] {
        let (_, token) = token(role);
        let (status, _) = send(&app, get("/api/v1/stats", Some(&token))).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{role}");
    }
}

#[tokio::test]
async fn sign_up_cannot_request_admin_role() {
    let app = test_app();
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/auth/sign-up")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({
                "email": "eve@school.test",
                "password": "secret123",
                "first_name": "Eve",
                "last_name": "Mallory",
                "role": "admin"
            })
            .to_string(),
        ))
        .unwrap();

    let (status, _) = send(&app, request).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn public_urls_exist_only_for_public_buckets() {
    let app = test_app();

    let (status, body) = send(&app, get("/api/v1/public-url/avatars/u1/me.png", None)).await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(
        body["public_url"],
        "http://localhost:8080/api/v1/public/avatars/u1/me.png"
    );

    let (status, _) = send(&app, get("/api/v1/public-url/documents/report.pdf", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, get("/api/v1/public/documents/report.pdf", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_buckets_are_not_found() {
    let app = test_app();
    let (_, token) = token(UserRole::Admin);

    let (status, _) = send(&app, get("/api/v1/public-url/payroll/a.pdf", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, get("/api/v1/storage/payroll/a.pdf", Some(&token))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn only_admins_create_students() {
    let app = test_app();
    let (_, token) = token(UserRole::Teacher);
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/students")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({
                "email": "kid@school.test",
                "password": "secret123",
                "first_name": "Kid",
                "last_name": "Student"
            })
            .to_string(),
        ))
        .unwrap();

    let (status, _) = send(&app, request).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn failed_upload_leaves_no_file_behind() {
    let app = test_app();
    let (_, token) = token(UserRole::Admin);
    let boundary = "school-admin-boundary";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"path\"\r\n\r\n\
         reports/term1.txt\r\n\
         --{boundary}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"term1.txt\"\r\n\
         Content-Type: text/plain\r\n\r\n\
         grades\r\n\
         --{boundary}--\r\n"
    );
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/storage/documents")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap();

    // The disconnected database fails the metadata transaction
    let (status, _) = send(&app, request).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let root = app.storage_dir.path();
    assert!(!root.join("documents/reports/term1.txt").exists());
    let staged = std::fs::read_dir(root.join(".staging"))
        .map(|entries| entries.count())
        .unwrap_or(0);
    assert_eq!(staged, 0);
}
