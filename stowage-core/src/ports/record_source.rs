// stowage-core/src/ports/record_source.rs

use async_trait::async_trait;
use serde_json::Value;

use crate::error::StowageError;

/// Remote origin of the JSON records.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// A non-success answer is an error; the body is returned as parsed JSON.
    async fn fetch(&self, url: &str) -> Result<Value, StowageError>;
}
