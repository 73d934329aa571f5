//! Bucketed object storage on the local filesystem.
//!
//! Objects live at `{root}/{bucket}/{name}`. Names are `/`-separated paths;
//! every segment is checked before it touches the disk. Uploads are written
//! under `{root}/.staging` first and moved into place once their metadata
//! row is committed.

use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::errors::{ServiceError, ServiceResult};

const MAX_NAME_LENGTH: usize = 1024;
const STAGING_DIR: &str = ".staging";

/// A validated bucket/name pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectKey {
    pub bucket: String,
    pub name: String,
}

/// Bytes written to the staging area, not yet visible under their key.
/// Dropping it without [`StagedObject::persist`] removes the staged file.
pub struct StagedObject {
    staged: PathBuf,
    target: PathBuf,
    persisted: bool,
}

impl StagedObject {
    /// Moves the staged file over the object path, replacing whatever file
    /// was there.
    pub async fn persist(mut self) -> ServiceResult<()> {
        if let Some(parent) = self.target.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::rename(&self.staged, &self.target).await?;
        self.persisted = true;
        Ok(())
    }
}

impl Drop for StagedObject {
    fn drop(&mut self) {
        if !self.persisted {
            if let Err(e) = std::fs::remove_file(&self.staged) {
                if e.kind() != ErrorKind::NotFound {
                    tracing::warn!(path = %self.staged.display(), "Failed to remove staged upload: {}", e);
                }
            }
        }
    }
}

pub struct FileStorage {
    root: PathBuf,
    buckets: HashSet<String>,
    public_buckets: HashSet<String>,
    public_base_url: String,
}

fn is_valid_bucket_name(bucket: &str) -> bool {
    !bucket.is_empty()
        && bucket.len() <= 63
        && bucket
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
}

fn has_forbidden_chars(segment: &str) -> bool {
    segment.chars().any(|c| {
        matches!(c, '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|') || c.is_control()
    })
}

/// Normalizes an object name: trims surrounding slashes and rejects empty,
/// relative (`.`/`..`) or unsafe segments.
pub fn normalize_object_name(raw: &str) -> ServiceResult<String> {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        return Err(ServiceError::Validation("Object path is required".to_string()));
    }
    if trimmed.len() > MAX_NAME_LENGTH {
        return Err(ServiceError::Validation("Object path is too long".to_string()));
    }

    let mut segments = Vec::new();
    for segment in trimmed.split('/') {
        if segment.is_empty() || segment == "." || segment == ".." {
            return Err(ServiceError::Validation(format!(
                "Invalid object path: {raw}"
            )));
        }
        if has_forbidden_chars(segment) || segment.trim() != segment {
            return Err(ServiceError::Validation(format!(
                "Invalid character in object path: {raw}"
            )));
        }
        segments.push(segment);
    }

    Ok(segments.join("/"))
}

impl FileStorage {
    pub fn new(
        root: impl Into<PathBuf>,
        buckets: impl IntoIterator<Item = String>,
        public_buckets: impl IntoIterator<Item = String>,
        public_base_url: impl Into<String>,
    ) -> Self {
        let buckets: HashSet<String> = buckets
            .into_iter()
            .map(|b| b.trim().to_string())
            .filter(|b| is_valid_bucket_name(b))
            .collect();
        let public_buckets = public_buckets
            .into_iter()
            .map(|b| b.trim().to_string())
            .filter(|b| buckets.contains(b))
            .collect();

        Self {
            root: root.into(),
            buckets,
            public_buckets,
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Creates the bucket directories.
    pub async fn init(&self) -> std::io::Result<()> {
        for bucket in &self.buckets {
            fs::create_dir_all(self.root.join(bucket)).await?;
        }
        Ok(())
    }

    pub fn is_public(&self, bucket: &str) -> bool {
        self.public_buckets.contains(bucket)
    }

    pub fn key(&self, bucket: &str, name: &str) -> ServiceResult<ObjectKey> {
        if !self.buckets.contains(bucket) {
            return Err(ServiceError::NotFound("Bucket"));
        }
        Ok(ObjectKey {
            bucket: bucket.to_string(),
            name: normalize_object_name(name)?,
        })
    }

    fn path_of(&self, key: &ObjectKey) -> PathBuf {
        key.name
            .split('/')
            .fold(self.root.join(&key.bucket), |path, segment| path.join(segment))
    }

    /// Writes `bytes` to the staging area. Existence of the object is decided
    /// by its metadata row, so a file left at the object path without one is
    /// overwritten when the staged object is persisted.
    pub async fn stage(&self, key: &ObjectKey, bytes: &[u8]) -> ServiceResult<StagedObject> {
        let staging_dir = self.root.join(STAGING_DIR);
        fs::create_dir_all(&staging_dir).await?;

        let staged = StagedObject {
            staged: staging_dir.join(Uuid::new_v4().to_string()),
            target: self.path_of(key),
            persisted: false,
        };

        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&staged.staged)
            .await?;
        file.write_all(bytes).await?;
        file.sync_all().await?;

        tracing::debug!(bucket = %key.bucket, name = %key.name, size = bytes.len(), "Staged object");
        Ok(staged)
    }

    pub async fn get(&self, key: &ObjectKey) -> ServiceResult<Vec<u8>> {
        fs::read(self.path_of(key)).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => ServiceError::NotFound("Object"),
            _ => ServiceError::Storage(e),
        })
    }

    /// Returns whether an object was removed. Empty parent directories are
    /// left in place.
    pub async fn remove(&self, key: &ObjectKey) -> ServiceResult<bool> {
        match fs::remove_file(self.path_of(key)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(ServiceError::Storage(e)),
        }
    }

    /// URL under which a public bucket serves `key`; `None` for private
    /// buckets. Each path segment is percent-encoded.
    pub fn public_url(&self, key: &ObjectKey) -> Option<String> {
        self.is_public(&key.bucket).then(|| {
            let path = key
                .name
                .split('/')
                .map(|segment| urlencoding::encode(segment).into_owned())
                .collect::<Vec<_>>()
                .join("/");
            format!(
                "{}/api/v1/public/{}/{}",
                self.public_base_url, key.bucket, path
            )
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage(root: &Path) -> FileStorage {
        FileStorage::new(
            root,
            ["avatars".to_string(), "documents".to_string()],
            ["avatars".to_string(), "unknown".to_string()],
            "http://localhost:8080/",
        )
    }

    #[test]
    fn normalizes_object_names() {
        assert_eq!(
            normalize_object_name("/students/42/photo.png/").unwrap(),
            "students/42/photo.png"
        );
        assert_eq!(normalize_object_name("report.pdf").unwrap(), "report.pdf");
    }

    #[test]
    fn rejects_traversal_and_unsafe_names() {
        for name in [
            "",
            "/",
            "../secret",
            "a/../../b",
            "a//b",
            "./a",
            "a\\b",
            "bad:name",
            "a/ b",
        ] {
            assert!(
                matches!(normalize_object_name(name), Err(ServiceError::Validation(_))),
                "{name:?} should be rejected"
            );
        }
    }

    #[test]
    fn only_configured_buckets_are_addressable() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage(dir.path());

        assert!(storage.key("avatars", "a.png").is_ok());
        assert!(matches!(
            storage.key("payroll", "a.png"),
            Err(ServiceError::NotFound("Bucket"))
        ));
        assert!(storage.is_public("avatars"));
        assert!(!storage.is_public("documents"));
        assert!(!storage.is_public("unknown"));
    }

    #[test]
    fn public_url_only_for_public_buckets() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage(dir.path());

        let avatar = storage.key("avatars", "u1/me.png").unwrap();
        assert_eq!(
            storage.public_url(&avatar).as_deref(),
            Some("http://localhost:8080/api/v1/public/avatars/u1/me.png")
        );

        let document = storage.key("documents", "report.pdf").unwrap();
        assert!(storage.public_url(&document).is_none());
    }

    #[test]
    fn public_url_encodes_path_segments() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage(dir.path());

        let key = storage.key("avatars", "class 7/report #1 100%.png").unwrap();
        let url = storage.public_url(&key).unwrap();
        assert_eq!(
            url,
            "http://localhost:8080/api/v1/public/avatars/class%207/report%20%231%20100%25.png"
        );

        let uri: http::Uri = url.parse().unwrap();
        assert!(uri.query().is_none());
        assert_eq!(
            uri.path(),
            "/api/v1/public/avatars/class%207/report%20%231%20100%25.png"
        );
    }

    #[tokio::test]
    async fn public_url_routes_back_to_the_object_key() {
        use axum::{Router, body::Body, extract::Path as UrlPath, routing::get};
        use http_body_util::BodyExt;
        use tower::ServiceExt;

        let dir = tempfile::tempdir().unwrap();
        let storage = storage(dir.path());
        let key = storage.key("avatars", "u1/my photo #2.png").unwrap();
        let uri: http::Uri = storage.public_url(&key).unwrap().parse().unwrap();

        let router = Router::new().route(
            "/api/v1/public/{bucket}/{*path}",
            get(|UrlPath((bucket, path)): UrlPath<(String, String)>| async move {
                format!("{bucket}|{path}")
            }),
        );
        let request = http::Request::builder()
            .uri(uri.path())
            .body(Body::empty())
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body = String::from_utf8(body.to_vec()).unwrap();

        let (bucket, path) = body.split_once('|').unwrap();
        assert_eq!(storage.key(bucket, path).unwrap(), key);
    }

    #[tokio::test]
    async fn staged_objects_land_only_when_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage(dir.path());
        storage.init().await.unwrap();

        let key = storage.key("documents", "reports/2026/term1.txt").unwrap();
        let staged = storage.stage(&key, b"first").await.unwrap();
        assert!(matches!(
            storage.get(&key).await,
            Err(ServiceError::NotFound("Object"))
        ));

        drop(staged);
        let staging = std::fs::read_dir(dir.path().join(STAGING_DIR)).unwrap();
        assert_eq!(staging.count(), 0);
        assert!(!dir.path().join("documents/reports/2026/term1.txt").exists());

        storage.stage(&key, b"first").await.unwrap().persist().await.unwrap();
        assert_eq!(storage.get(&key).await.unwrap(), b"first");
        assert!(dir.path().join("documents/reports/2026/term1.txt").exists());
    }

    #[tokio::test]
    async fn persist_replaces_a_stale_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage(dir.path());
        storage.init().await.unwrap();

        let key = storage.key("documents", "left-behind.txt").unwrap();
        std::fs::write(dir.path().join("documents/left-behind.txt"), b"stale").unwrap();

        storage.stage(&key, b"fresh").await.unwrap().persist().await.unwrap();
        assert_eq!(storage.get(&key).await.unwrap(), b"fresh");
    }

    #[tokio::test]
    async fn get_and_remove_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage(dir.path());
        storage.init().await.unwrap();

        let key = storage.key("documents", "reports/2026/term1.txt").unwrap();
        storage.stage(&key, b"second").await.unwrap().persist().await.unwrap();
        assert_eq!(storage.get(&key).await.unwrap(), b"second");

        assert!(storage.remove(&key).await.unwrap());
        assert!(!storage.remove(&key).await.unwrap());
        assert!(matches!(
            storage.get(&key).await,
            Err(ServiceError::NotFound("Object"))
        ));
    }
}
