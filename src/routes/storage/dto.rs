use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::storage_object;

#[derive(Debug, Serialize, ToSchema)]
pub struct StorageObjectResponse {
    pub id: Uuid,
    pub bucket: String,
    pub path: String,
    pub owner_id: Option<Uuid>,
    pub content_type: String,
    pub size_bytes: i64,
    /// Set for objects in public buckets.
    pub public_url: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl StorageObjectResponse {
    pub fn new(object: storage_object::Model, public_url: Option<String>) -> Self {
        Self {
            id: object.id,
            bucket: object.bucket,
            path: object.name,
            owner_id: object.owner_id,
            content_type: object.content_type,
            size_bytes: object.size_bytes,
            public_url,
            created_at: object.created_at,
            updated_at: object.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DeleteObjectsRequest {
    #[schema(example = json!(["students/42/report.pdf"]))]
    pub paths: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteObjectsResponse {
    /// Paths that existed and were removed.
    pub deleted: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PublicUrlResponse {
    pub public_url: String,
}
