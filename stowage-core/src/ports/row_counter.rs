// stowage-core/src/ports/row_counter.rs

use async_trait::async_trait;

use crate::domain::resource::QualifiedName;
use crate::error::StowageError;

#[async_trait]
pub trait RowCounter: Send + Sync {
    async fn count_rows(&self, table: &QualifiedName) -> Result<u64, StowageError>;

    fn engine_name(&self) -> &str;
}
