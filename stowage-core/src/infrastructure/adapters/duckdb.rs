// stowage-core/src/infrastructure/adapters/duckdb.rs
//
// Local warehouse + row counter on top of an embedded DuckDB file.
// Datasets are schemas, tables live at "dataset"."table"; the project part of
// a TableRef is ignored.

use async_trait::async_trait;
use duckdb::{Config, Connection};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, instrument};

use crate::domain::load::{LoadJobConfig, LoadSummary, SourceFormat, WriteDisposition};
use crate::domain::resource::{DatasetRef, QualifiedName, TableRef, quote_ident};
use crate::error::StowageError;
use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::fs::require_file;
use crate::ports::row_counter::RowCounter;
use crate::ports::warehouse::Warehouse;

pub struct DuckDBEngine {
    conn: Arc<Mutex<Connection>>,
}

impl DuckDBEngine {
    pub fn new(db_path: &str) -> Result<Self, InfrastructureError> {
        let config = Config::default();

        let conn = if db_path == ":memory:" {
            Connection::open_in_memory_with_flags(config)?
        } else {
            if let Some(parent) = Path::new(db_path).parent()
                && !parent.as_os_str().is_empty()
            {
                std::fs::create_dir_all(parent)?;
            }
            Connection::open_with_flags(db_path, config)?
        };

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StowageError> {
        self.conn.lock().map_err(|_| {
            StowageError::Infrastructure(InfrastructureError::Io(std::io::Error::other(
                "DuckDB Mutex Poisoned",
            )))
        })
    }

    pub fn execute(&self, sql: &str) -> Result<(), StowageError> {
        let conn = self.lock()?;
        conn.execute_batch(sql)?;
        Ok(())
    }

    pub fn query_scalar(&self, sql: &str) -> Result<u64, StowageError> {
        let conn = self.lock()?;
        let value: i64 = conn.query_row(sql, [], |row| row.get(0))?;
        u64::try_from(value)
            .map_err(|_| StowageError::InternalError(format!("Negative scalar: {}", value)))
    }

    fn table_exists(&self, dataset: &str, table: &str) -> Result<bool, StowageError> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT count(*) FROM information_schema.tables WHERE table_schema = ? AND table_name = ?",
            [dataset, table],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn run_load(
        &self,
        path: &Path,
        table: &TableRef,
        config: &LoadJobConfig,
        job_id: &str,
    ) -> Result<u64, StowageError> {
        let literal = path.to_string_lossy().replace('\'', "''");
        let reader = match config.source_format {
            SourceFormat::Csv => format!("read_csv_auto('{}', header = true)", literal),
            SourceFormat::NewlineDelimitedJson => {
                format!("read_json_auto('{}', format = 'newline_delimited')", literal)
            }
        };
        let target = format!("{}.{}", quote_ident(&table.dataset), quote_ident(&table.table));

        let statement = match config.write_disposition {
            WriteDisposition::Truncate => {
                format!("CREATE OR REPLACE TABLE {} AS SELECT * FROM {}", target, reader)
            }
            WriteDisposition::Append if self.table_exists(&table.dataset, &table.table)? => {
                format!("INSERT INTO {} BY NAME SELECT * FROM {}", target, reader)
            }
            WriteDisposition::Append => {
                format!("CREATE TABLE {} AS SELECT * FROM {}", target, reader)
            }
        };
        debug!(job_id, statement = %statement, "Running DuckDB load");

        self.execute(&statement).map_err(|e| {
            StowageError::Infrastructure(InfrastructureError::LoadJobFailed {
                job_id: job_id.to_string(),
                message: e.to_string(),
            })
        })?;

        self.query_scalar(&format!("SELECT count(*) FROM {}", target))
    }
}

#[async_trait]
impl Warehouse for DuckDBEngine {
    async fn dataset_exists(&self, dataset: &DatasetRef) -> Result<bool, StowageError> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT count(*) FROM information_schema.schemata WHERE schema_name = ?",
            [dataset.dataset.as_str()],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    async fn create_dataset(&self, dataset: &DatasetRef) -> Result<(), StowageError> {
        self.execute(&format!(
            "CREATE SCHEMA IF NOT EXISTS {}",
            quote_ident(&dataset.dataset)
        ))
    }

    #[instrument(skip(self, config), fields(format = %config.source_format))]
    async fn load_file(
        &self,
        path: &Path,
        table: &TableRef,
        config: &LoadJobConfig,
    ) -> Result<LoadSummary, StowageError> {
        require_file(path)?;
        let job_id = format!("duckdb_load_{}", chrono::Utc::now().format("%Y%m%d%H%M%S%f"));
        let rows = self.run_load(path, table, config, &job_id)?;

        Ok(LoadSummary {
            table: table.clone(),
            job_id,
            output_rows: Some(rows),
        })
    }
}

#[async_trait]
impl RowCounter for DuckDBEngine {
    async fn count_rows(&self, table: &QualifiedName) -> Result<u64, StowageError> {
        self.query_scalar(&format!("SELECT count(*) FROM {}", table.to_sql()))
    }

    fn engine_name(&self) -> &str {
        "duckdb"
    }
}
