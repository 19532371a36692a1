// stowage-core/src/ports/warehouse.rs

use async_trait::async_trait;
use std::path::Path;

use crate::domain::load::{LoadJobConfig, LoadSummary};
use crate::domain::resource::{DatasetRef, TableRef};
use crate::error::StowageError;

#[async_trait]
pub trait Warehouse: Send + Sync {
    /// `Ok(false)` for a genuine "not found"; any other lookup failure is an error.
    async fn dataset_exists(&self, dataset: &DatasetRef) -> Result<bool, StowageError>;

    async fn create_dataset(&self, dataset: &DatasetRef) -> Result<(), StowageError>;

    /// Loads a local file into `table` and returns once the job has completed.
    async fn load_file(
        &self,
        path: &Path,
        table: &TableRef,
        config: &LoadJobConfig,
    ) -> Result<LoadSummary, StowageError>;
}
