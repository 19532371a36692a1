// stowage/src/commands/ingest.rs
//
// USE CASE: Run the ingestion pipeline.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tracing::debug;
use stowage_core::application::{IngestContext, IngestPlan, run_ingestion};
use stowage_core::domain::settings::{IngestConfig, Target};
use stowage_core::infrastructure::adapters::bigquery::BigQueryWarehouse;
use stowage_core::infrastructure::adapters::duckdb::DuckDBEngine;
use stowage_core::infrastructure::adapters::gcs::GcsObjectStore;
use stowage_core::infrastructure::adapters::google_auth::{Credentials, TokenProvider};
use stowage_core::infrastructure::adapters::http::{HttpRecordSource, build_client};
use stowage_core::infrastructure::adapters::local_store::LocalObjectStore;
use stowage_core::infrastructure::config::{load_config, validate_ingest};
use stowage_core::ports::{ObjectStore, Warehouse};

type Adapters = (Box<dyn ObjectStore>, Box<dyn Warehouse>);

fn build_adapters(config: &IngestConfig, client: &reqwest::Client) -> anyhow::Result<Adapters> {
    match config.target {
        Target::Gcp => {
            println!("   Target: Cloud Storage + BigQuery ☁️");
            let credentials =
                Credentials::from_config(config).context("Failed to load GCP credentials")?;
            let tokens = Arc::new(TokenProvider::new(client.clone(), credentials));
            let store = GcsObjectStore::new(
                client.clone(),
                tokens.clone(),
                &config.project_id,
                &config.storage_endpoint,
            );
            let warehouse = BigQueryWarehouse::new(
                client.clone(),
                tokens,
                &config.bigquery_endpoint,
                config.dataset_location.clone(),
            );
            Ok((Box::new(store), Box::new(warehouse)))
        }
        Target::Local => {
            println!("   Target: local lake + DuckDB 🦆");
            let db_path = config.local.warehouse_path.to_string_lossy();
            let warehouse = DuckDBEngine::new(&db_path)
                .with_context(|| format!("Failed to initialize DuckDB at {}", db_path))?;
            let store = LocalObjectStore::new(config.local.lake_dir.clone());
            Ok((Box::new(store), Box::new(warehouse)))
        }
    }
}

pub async fn execute(
    config_dir: PathBuf,
    config_file: Option<PathBuf>,
    target: Option<Target>,
) -> anyhow::Result<()> {
    let start = std::time::Instant::now();

    // A. Load the Config (Infra)
    println!("⚙️  Loading configuration...");
    let mut config = load_config(&config_dir, config_file.as_deref()).with_context(|| {
        format!("Failed to load configuration from {:?}", config_dir)
    })?;
    if let Some(target) = target {
        config.ingest.target = target;
    }
    let ingest = config.ingest;
    validate_ingest(&ingest).context("Invalid ingestion configuration")?;
    let plan = IngestPlan::from_config(&ingest)?;
    println!("   Bucket: {} | Dataset: {}", plan.bucket, plan.dataset);
    debug!(csv = ?plan.csv_path, jsonl = ?plan.jsonl_path, api_url = %plan.api_url, "Ingestion plan resolved");

    // B. Instantiate the Adapters for the chosen target
    let client = build_client()?;
    let record_source = HttpRecordSource::new(client.clone());
    let (object_store, warehouse) = build_adapters(&ingest, &client)?;

    // C. Run the Pipeline (Application Layer)
    let ctx = IngestContext {
        object_store: object_store.as_ref(),
        warehouse: warehouse.as_ref(),
        record_source: &record_source,
    };
    let result = run_ingestion(ctx, &plan).await;

    // Close the warehouse before a possible early exit
    drop(warehouse);
    drop(object_store);

    match result {
        Ok(report) => {
            println!(
                "\n✨ SUCCESS! {} steps finished in {:.2?}",
                report.steps.len(),
                start.elapsed()
            );
        }
        Err(failure) => {
            eprintln!("\n💥 INGESTION FAILED at step '{}'", failure.step);
            eprintln!("{:?}", miette::Report::new(failure.source));
            if !failure.completed.is_empty() {
                eprintln!(
                    "   {} completed step(s) were left in place.",
                    failure.completed.len()
                );
            }
            std::process::exit(1);
        }
    }

    Ok(())
}
