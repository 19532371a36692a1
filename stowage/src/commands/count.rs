// stowage/src/commands/count.rs
//
// USE CASE: Print the row count of one table.

use anyhow::{Context, bail};
use stowage_core::application::count_table;
use stowage_core::domain::resource::QualifiedName;
use stowage_core::domain::settings::{DatabaseBackend, DatabaseConfig};
use stowage_core::infrastructure::adapters::duckdb::DuckDBEngine;
use stowage_core::infrastructure::adapters::postgres::PostgresCounter;
use stowage_core::infrastructure::config::load_config;
use stowage_core::ports::RowCounter;

use crate::cli::CountArgs;

async fn open_counter(db: &DatabaseConfig) -> anyhow::Result<Box<dyn RowCounter>> {
    match db.backend {
        DatabaseBackend::Postgres => {
            let counter = PostgresCounter::connect(db).await.with_context(|| {
                format!("Failed to connect to Postgres at {}:{}", db.host, db.port)
            })?;
            Ok(Box::new(counter))
        }
        DatabaseBackend::DuckDB => {
            let path = db
                .path
                .as_ref()
                .context("The duckdb backend needs --db-path or STOWAGE_DB_PATH")?;
            // Opening a missing file would create an empty database
            if !path.is_file() {
                bail!("Database not found at: {}", path.display());
            }
            let path = path.to_string_lossy();
            let engine = DuckDBEngine::new(&path)
                .with_context(|| format!("Failed to open DuckDB at {}", path))?;
            Ok(Box::new(engine))
        }
    }
}

async fn count(args: &CountArgs) -> anyhow::Result<u64> {
    let mut config = load_config(&args.config_dir, args.config.as_deref())?;
    args.apply(&mut config.database);
    let db = config.database;

    let table = QualifiedName::parse(&db.table)?;
    let counter = open_counter(&db).await?;
    let rows = count_table(counter.as_ref(), &table).await?;
    Ok(rows)
}

pub async fn execute(args: CountArgs) -> anyhow::Result<()> {
    match count(&args).await {
        Ok(rows) => {
            println!("Number of records in the table: {}", rows);
            Ok(())
        }
        Err(e) => {
            eprintln!("❌ Count failed: {:#}", e);
            std::process::exit(1);
        }
    }
}
