// stowage-core/src/infrastructure/adapters/local_store.rs

use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

use crate::domain::resource::BucketName;
use crate::error::StowageError;
use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::fs::atomic_write;
use crate::ports::object_store::ObjectStore;

/// Object store on the local filesystem: one directory per bucket under `root`.
pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn bucket_dir(&self, bucket: &BucketName) -> Result<PathBuf, StowageError> {
        Ok(self.root.join(safe_relative(bucket.as_str())?))
    }
}

// Keeps object paths inside their bucket directory.
fn safe_relative(path: &str) -> Result<PathBuf, StowageError> {
    let rel = Path::new(path);
    let escapes = rel
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes || path.is_empty() {
        return Err(StowageError::InternalError(format!(
            "Unsafe object path: {}",
            path
        )));
    }
    Ok(rel.to_path_buf())
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn bucket_exists(&self, bucket: &BucketName) -> Result<bool, StowageError> {
        Ok(self.bucket_dir(bucket)?.is_dir())
    }

    async fn create_bucket(&self, bucket: &BucketName, location: &str) -> Result<(), StowageError> {
        let dir = self.bucket_dir(bucket)?;
        debug!(dir = ?dir, location, "Creating local bucket");
        std::fs::create_dir_all(dir).map_err(InfrastructureError::Io)?;
        Ok(())
    }

    async fn upload(
        &self,
        bucket: &BucketName,
        path: &str,
        data: Vec<u8>,
        _content_type: &str,
    ) -> Result<(), StowageError> {
        let dir = self.bucket_dir(bucket)?;
        if !dir.is_dir() {
            return Err(StowageError::InternalError(format!(
                "Bucket '{}' does not exist",
                bucket
            )));
        }
        atomic_write(dir.join(safe_relative(path)?), data)?;
        Ok(())
    }
}
