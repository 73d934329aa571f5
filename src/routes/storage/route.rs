use axum::{
    Json, Router,
    extract::{Multipart, Path, State, multipart::MultipartError},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};

use super::dto::{
    DeleteObjectsRequest, DeleteObjectsResponse, PublicUrlResponse, StorageObjectResponse,
};
use crate::errors::ServiceError;
use crate::extractor::AuthClaims;
use crate::policy::{Operation, Table, ensure};
use crate::repositories::StorageObjectRepository;
use crate::state::AppState;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

pub fn create_route() -> Router<AppState> {
    Router::new()
        .route(
            "/api/v1/storage/{bucket}",
            post(upload_object).delete(delete_objects),
        )
        .route("/api/v1/storage/{bucket}/{*path}", get(download_object))
        .route("/api/v1/public/{bucket}/{*path}", get(download_public_object))
        .route("/api/v1/public-url/{bucket}/{*path}", get(get_public_url))
}

fn bad_multipart(e: MultipartError) -> ServiceError {
    ServiceError::Validation(format!("Failed to parse multipart data: {e}"))
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes")
}

struct UploadedFile {
    data: Vec<u8>,
    content_type: String,
    file_name: Option<String>,
}

/// Upload an object. An existing object is replaced only with `upsert=true`
/// and only by its owner or an admin. Whether an object exists is decided by
/// its metadata row.
#[utoipa::path(
    post,
    path = "/api/v1/storage/{bucket}",
    params(("bucket" = String, Path, description = "Bucket name")),
    request_body(content = String, content_type = "multipart/form-data", description = "Multipart form data with fields: path (string, defaults to the file name), upsert (bool), file (binary)"),
    responses(
        (status = 201, description = "Object stored", body = StorageObjectResponse),
        (status = 400, description = "Missing file or invalid path"),
        (status = 403, description = "Object belongs to someone else"),
        (status = 404, description = "Unknown bucket"),
        (status = 409, description = "Object exists and upsert is not set"),
        (status = 413, description = "Payload too large")
    ),
    security(("bearer_auth" = [])),
    tag = "Storage"
)]
pub async fn upload_object(
    State(state): State<AppState>,
    claims: AuthClaims,
    Path(bucket): Path<String>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<StorageObjectResponse>), (StatusCode, String)> {
    let actor = claims.actor();
    ensure(&actor, Table::StorageObjects, Operation::Insert, Some(actor.user_id))?;

    let max_bytes = state.config.max_upload_bytes;
    let mut path: Option<String> = None;
    let mut upsert = false;
    let mut file: Option<UploadedFile> = None;

    while let Some(mut field) = multipart.next_field().await.map_err(bad_multipart)? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "path" => path = Some(field.text().await.map_err(bad_multipart)?),
            "upsert" => upsert = parse_flag(&field.text().await.map_err(bad_multipart)?),
            "file" => {
                let content_type = field
                    .content_type()
                    .unwrap_or(DEFAULT_CONTENT_TYPE)
                    .to_string();
                let file_name = field.file_name().map(str::to_string);

                let mut data = Vec::new();
                while let Some(chunk) = field.chunk().await.map_err(bad_multipart)? {
                    if data.len() + chunk.len() > max_bytes {
                        return Err(ServiceError::PayloadTooLarge(format!(
                            "File exceeds the maximum upload size of {max_bytes} bytes"
                        ))
                        .into());
                    }
                    data.extend_from_slice(&chunk);
                }

                file = Some(UploadedFile {
                    data,
                    content_type,
                    file_name,
                });
            }
            _ => {}
        }
    }

    let file = file.ok_or_else(|| ServiceError::Validation("Missing file field".to_string()))?;
    let path = path
        .filter(|p| !p.trim().is_empty())
        .or_else(|| file.file_name.clone())
        .ok_or_else(|| ServiceError::Validation("Missing path field".to_string()))?;
    let key = state.storage.key(&bucket, &path)?;

    // Dropped, and so removed, unless the metadata row commits
    let staged = state.storage.stage(&key, &file.data).await?;

    let txn = state.scoped(&actor).await?;
    let objects = StorageObjectRepository::new(&txn);
    if let Some(existing) = objects.find(&key).await? {
        if !upsert {
            return Err(ServiceError::Conflict(format!(
                "Object {}/{} already exists",
                key.bucket, key.name
            ))
            .into());
        }
        ensure(&actor, Table::StorageObjects, Operation::Update, existing.owner_id)?;
    }

    let object = objects
        .upsert(&key, actor.user_id, &file.content_type, file.data.len() as i64)
        .await?;
    txn.commit().await.map_err(ServiceError::from)?;
    staged.persist().await.inspect_err(|e| {
        tracing::error!(bucket = %key.bucket, path = %key.name, "Object row committed but file not moved into place: {}", e);
    })?;

    tracing::info!(
        bucket = %key.bucket,
        path = %key.name,
        size = file.data.len(),
        owner_id = %actor.user_id,
        "Object uploaded"
    );

    let public_url = state.storage.public_url(&key);
    Ok((
        StatusCode::CREATED,
        Json(StorageObjectResponse::new(object, public_url)),
    ))
}

/// Download an object with its stored content type
#[utoipa::path(
    get,
    path = "/api/v1/storage/{bucket}/{path}",
    params(
        ("bucket" = String, Path, description = "Bucket name"),
        ("path" = String, Path, description = "Object path")
    ),
    responses(
        (status = 200, description = "Object bytes", content_type = "application/octet-stream"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Unknown bucket or object")
    ),
    security(("bearer_auth" = [])),
    tag = "Storage"
)]
pub async fn download_object(
    State(state): State<AppState>,
    claims: AuthClaims,
    Path((bucket, path)): Path<(String, String)>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let actor = claims.actor();
    ensure(&actor, Table::StorageObjects, Operation::Select, None)?;

    let key = state.storage.key(&bucket, &path)?;

    let txn = state.scoped(&actor).await?;
    let object = StorageObjectRepository::new(&txn)
        .find(&key)
        .await?
        .ok_or(ServiceError::NotFound("Object"))?;
    txn.commit().await.map_err(ServiceError::from)?;

    let data = state.storage.get(&key).await?;
    Ok(([(header::CONTENT_TYPE, object.content_type)], data))
}

/// Download an object from a public bucket without a token
#[utoipa::path(
    get,
    path = "/api/v1/public/{bucket}/{path}",
    params(
        ("bucket" = String, Path, description = "Public bucket name"),
        ("path" = String, Path, description = "Object path")
    ),
    responses(
        (status = 200, description = "Object bytes", content_type = "application/octet-stream"),
        (status = 404, description = "Not a public bucket, or unknown object")
    ),
    tag = "Storage"
)]
pub async fn download_public_object(
    State(state): State<AppState>,
    Path((bucket, path)): Path<(String, String)>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    if !state.storage.is_public(&bucket) {
        return Err(ServiceError::NotFound("Bucket").into());
    }
    let key = state.storage.key(&bucket, &path)?;

    let content_type = StorageObjectRepository::new(&state.db)
        .find(&key)
        .await?
        .map(|object| object.content_type)
        .ok_or(ServiceError::NotFound("Object"))?;

    let data = state.storage.get(&key).await?;
    Ok(([(header::CONTENT_TYPE, content_type)], data))
}

/// Public URL of an object in a public bucket
#[utoipa::path(
    get,
    path = "/api/v1/public-url/{bucket}/{path}",
    params(
        ("bucket" = String, Path, description = "Public bucket name"),
        ("path" = String, Path, description = "Object path")
    ),
    responses(
        (status = 200, description = "Public URL", body = PublicUrlResponse),
        (status = 400, description = "Invalid path"),
        (status = 404, description = "Not a public bucket")
    ),
    tag = "Storage"
)]
pub async fn get_public_url(
    State(state): State<AppState>,
    Path((bucket, path)): Path<(String, String)>,
) -> Result<(StatusCode, Json<PublicUrlResponse>), (StatusCode, String)> {
    let key = state.storage.key(&bucket, &path)?;
    let public_url = state
        .storage
        .public_url(&key)
        .ok_or(ServiceError::NotFound("Public bucket"))?;

    Ok((StatusCode::OK, Json(PublicUrlResponse { public_url })))
}

/// Delete objects by path. Paths that do not exist are skipped.
#[utoipa::path(
    delete,
    path = "/api/v1/storage/{bucket}",
    params(("bucket" = String, Path, description = "Bucket name")),
    request_body = DeleteObjectsRequest,
    responses(
        (status = 200, description = "Objects deleted", body = DeleteObjectsResponse),
        (status = 400, description = "Invalid path"),
        (status = 403, description = "Object belongs to someone else"),
        (status = 404, description = "Unknown bucket")
    ),
    security(("bearer_auth" = [])),
    tag = "Storage"
)]
pub async fn delete_objects(
    State(state): State<AppState>,
    claims: AuthClaims,
    Path(bucket): Path<String>,
    Json(payload): Json<DeleteObjectsRequest>,
) -> Result<(StatusCode, Json<DeleteObjectsResponse>), (StatusCode, String)> {
    let actor = claims.actor();
    if payload.paths.is_empty() {
        return Err(ServiceError::Validation("No paths given".to_string()).into());
    }

    let keys = payload
        .paths
        .iter()
        .map(|path| state.storage.key(&bucket, path))
        .collect::<Result<Vec<_>, _>>()?;

    let txn = state.scoped(&actor).await?;
    let objects = StorageObjectRepository::new(&txn);
    let mut removed = Vec::new();
    for key in keys {
        let Some(object) = objects.find(&key).await? else {
            continue;
        };
        ensure(&actor, Table::StorageObjects, Operation::Delete, object.owner_id)?;
        if objects.delete(&key).await? {
            removed.push(key);
        }
    }
    txn.commit().await.map_err(ServiceError::from)?;

    let mut deleted = Vec::with_capacity(removed.len());
    for key in removed {
        if !state.storage.remove(&key).await? {
            tracing::warn!(bucket = %key.bucket, path = %key.name, "Object metadata had no file");
        }
        deleted.push(key.name);
    }

    tracing::info!(bucket = %bucket, count = deleted.len(), "Objects deleted");
    Ok((StatusCode::OK, Json(DeleteObjectsResponse { deleted })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_flag_parsing() {
        assert!(parse_flag("true"));
        assert!(parse_flag(" TRUE "));
        assert!(parse_flag("1"));
        assert!(!parse_flag("false"));
        assert!(!parse_flag(""));
    }
}
