// stowage-core/src/ports/object_store.rs

use async_trait::async_trait;

use crate::domain::resource::BucketName;
use crate::error::StowageError;

/// Blob storage organised in named buckets.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// `Ok(false)` only when the store answers that the bucket does not exist.
    async fn bucket_exists(&self, bucket: &BucketName) -> Result<bool, StowageError>;

    async fn create_bucket(&self, bucket: &BucketName, location: &str)
    -> Result<(), StowageError>;

    /// Writes `data` at `path`, replacing any previous object.
    async fn upload(
        &self,
        bucket: &BucketName,
        path: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StowageError>;
}
