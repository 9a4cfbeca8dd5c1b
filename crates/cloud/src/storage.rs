//! Object storage backends for uploaded and annotated photos.
//!
//! The router tries S3 when configured and falls back to the local uploads
//! directory when S3 is unavailable, so report submission never fails on a
//! storage hiccup alone.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("S3 upload failed: {0}")]
    S3(String),

    #[error("local storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Stores an object and returns its public URL.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn store(
        &self,
        bytes: Vec<u8>,
        key: &str,
        content_type: &str,
    ) -> Result<String, StorageError>;
}

/// S3-backed storage. Objects are served from the bucket's public URL.
pub struct S3Storage {
    client: aws_sdk_s3::Client,
    bucket: String,
    region: String,
}

impl S3Storage {
    pub fn new(client: aws_sdk_s3::Client, bucket: String, region: String) -> Self {
        Self {
            client,
            bucket,
            region,
        }
    }

    /// Build a client from the ambient AWS environment (credentials chain).
    pub async fn from_env(bucket: String, region: String) -> Self {
        let config = aws_config::load_from_env().await;
        Self::new(aws_sdk_s3::Client::new(&config), bucket, region)
    }
}

#[async_trait]
impl ObjectStorage for S3Storage {
    async fn store(
        &self,
        bytes: Vec<u8>,
        key: &str,
        content_type: &str,
    ) -> Result<String, StorageError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| StorageError::S3(e.to_string()))?;

        Ok(format!(
            "https://{}.s3.{}.amazonaws.com/{}",
            self.bucket, self.region, key
        ))
    }
}

/// Filesystem storage under the uploads directory, served by the API at
/// `/uploads/{key}`.
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ObjectStorage for LocalStorage {
    async fn store(
        &self,
        bytes: Vec<u8>,
        key: &str,
        _content_type: &str,
    ) -> Result<String, StorageError> {
        let path = self.root.join(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;
        Ok(format!("/uploads/{key}"))
    }
}

/// Primary/fallback pair. When the primary store fails the write is retried
/// against local storage and the failure is logged, not surfaced.
pub struct StorageRouter {
    primary: Option<Arc<dyn ObjectStorage>>,
    local: LocalStorage,
}

impl StorageRouter {
    pub fn new(primary: Option<Arc<dyn ObjectStorage>>, local: LocalStorage) -> Self {
        Self { primary, local }
    }

    /// Local-only router, used in tests and when `USE_LOCAL_STORAGE=true`.
    pub fn local_only(root: impl Into<PathBuf>) -> Self {
        Self::new(None, LocalStorage::new(root))
    }

    pub async fn store(
        &self,
        bytes: Vec<u8>,
        key: &str,
        content_type: &str,
    ) -> Result<String, StorageError> {
        if let Some(primary) = &self.primary {
            match primary.store(bytes.clone(), key, content_type).await {
                Ok(url) => return Ok(url),
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "primary storage failed, falling back to local");
                }
            }
        }
        self.local.store(bytes, key, content_type).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingStorage;

    #[async_trait]
    impl ObjectStorage for FailingStorage {
        async fn store(&self, _: Vec<u8>, _: &str, _: &str) -> Result<String, StorageError> {
            Err(StorageError::S3("connection refused".into()))
        }
    }

    #[tokio::test]
    async fn test_local_storage_writes_file_and_returns_relative_url() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());

        let url = storage
            .store(b"png bytes".to_vec(), "abc123.png", "image/png")
            .await
            .unwrap();

        assert_eq!(url, "/uploads/abc123.png");
        let written = tokio::fs::read(dir.path().join("abc123.png")).await.unwrap();
        assert_eq!(written, b"png bytes");
    }

    #[tokio::test]
    async fn test_router_falls_back_to_local_when_primary_fails() {
        let dir = tempfile::tempdir().unwrap();
        let router = StorageRouter::new(
            Some(Arc::new(FailingStorage)),
            LocalStorage::new(dir.path()),
        );

        let url = router
            .store(b"data".to_vec(), "k.png", "image/png")
            .await
            .unwrap();

        assert_eq!(url, "/uploads/k.png");
        assert!(dir.path().join("k.png").exists());
    }

    #[tokio::test]
    async fn test_local_only_router_skips_primary() {
        let dir = tempfile::tempdir().unwrap();
        let router = StorageRouter::local_only(dir.path());

        let url = router
            .store(b"data".to_vec(), "nested/k.png", "image/png")
            .await
            .unwrap();

        assert_eq!(url, "/uploads/nested/k.png");
    }
}
