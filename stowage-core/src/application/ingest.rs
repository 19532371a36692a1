// stowage-core/src/application/ingest.rs
//
// USE CASE: the ingestion pipeline.
// ensure_bucket -> ensure_dataset -> load_tabular_file -> fetch_remote
//   -> persist_records -> write_line_delimited -> load_line_delimited_file
// Strictly sequential; the first failing step stops the run.

use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{error, info, instrument};

use crate::application::report::{
    IngestReport, PipelineFailure, Provisioned, Step, StepOutcome, StepReport,
};
use crate::domain::load::{LoadJobConfig, LoadSummary, WriteDisposition};
use crate::domain::records::RecordSet;
use crate::domain::resource::{BucketName, DatasetRef, TableRef};
use crate::domain::settings::IngestConfig;
use crate::error::StowageError;
use crate::infrastructure::fs::atomic_write;
use crate::ports::{ObjectStore, RecordSource, Warehouse};

/// The adapters one run talks to.
#[derive(Clone, Copy)]
pub struct IngestContext<'a> {
    pub object_store: &'a dyn ObjectStore,
    pub warehouse: &'a dyn Warehouse,
    pub record_source: &'a dyn RecordSource,
}

/// Resolved identifiers and paths for one run, built once from the configuration.
#[derive(Debug, Clone)]
pub struct IngestPlan {
    pub bucket: BucketName,
    pub bucket_location: String,
    pub dataset: DatasetRef,
    pub csv_path: PathBuf,
    pub csv_table: TableRef,
    pub api_url: String,
    pub blob_path: String,
    pub jsonl_path: PathBuf,
    pub records_table: TableRef,
    pub write_disposition: WriteDisposition,
}

impl IngestPlan {
    pub fn from_config(config: &IngestConfig) -> Result<Self, StowageError> {
        let dataset = DatasetRef::new(&config.project_id, &config.dataset)?;
        Ok(Self {
            bucket: BucketName::new(&config.bucket)?,
            bucket_location: config.bucket_location.clone(),
            csv_table: dataset.table(&config.table)?,
            records_table: dataset.table(config.records_table())?,
            dataset,
            csv_path: config.csv_path.clone(),
            api_url: config.api_url.clone(),
            blob_path: config.blob_path.clone(),
            jsonl_path: config.jsonl_path.clone(),
            write_disposition: config.write_disposition,
        })
    }
}

// --- STEPS ---

/// Creates the bucket only when the store says it is absent.
pub async fn ensure_bucket(
    store: &dyn ObjectStore,
    bucket: &BucketName,
    location: &str,
) -> Result<Provisioned, StowageError> {
    if store.bucket_exists(bucket).await? {
        return Ok(Provisioned::AlreadyExists);
    }
    store.create_bucket(bucket, location).await?;
    Ok(Provisioned::Created)
}

/// Creates the dataset only on a genuine not-found; lookup errors propagate.
pub async fn ensure_dataset(
    warehouse: &dyn Warehouse,
    dataset: &DatasetRef,
) -> Result<Provisioned, StowageError> {
    if warehouse.dataset_exists(dataset).await? {
        return Ok(Provisioned::AlreadyExists);
    }
    warehouse.create_dataset(dataset).await?;
    Ok(Provisioned::Created)
}

pub async fn load_tabular_file(
    warehouse: &dyn Warehouse,
    path: &Path,
    table: &TableRef,
    disposition: WriteDisposition,
) -> Result<LoadSummary, StowageError> {
    warehouse
        .load_file(path, table, &LoadJobConfig::csv(disposition))
        .await
}

pub async fn fetch_remote(source: &dyn RecordSource, url: &str) -> Result<RecordSet, StowageError> {
    let payload = source.fetch(url).await?;
    Ok(RecordSet::from_value(payload)?)
}

/// Uploads the whole collection as one JSON document. Returns the byte count.
pub async fn persist_records(
    store: &dyn ObjectStore,
    records: &RecordSet,
    bucket: &BucketName,
    path: &str,
) -> Result<usize, StowageError> {
    let document = records.to_json_document()?.into_bytes();
    let bytes = document.len();
    store
        .upload(bucket, path, document, "application/json")
        .await?;
    Ok(bytes)
}

/// Rewrites `path` with one JSON object per line. Returns the line count.
pub fn write_line_delimited(records: &RecordSet, path: &Path) -> Result<usize, StowageError> {
    atomic_write(path, records.to_json_lines()?)?;
    Ok(records.len())
}

pub async fn load_line_delimited_file(
    warehouse: &dyn Warehouse,
    path: &Path,
    table: &TableRef,
    disposition: WriteDisposition,
) -> Result<LoadSummary, StowageError> {
    warehouse
        .load_file(path, table, &LoadJobConfig::json_lines(disposition))
        .await
}

// --- ORCHESTRATOR ---

struct Progress {
    completed: Vec<StepReport>,
}

impl Progress {
    /// Records a finished step, or turns its error into the run's failure.
    fn check<T>(
        &mut self,
        step: Step,
        started: Instant,
        result: Result<T, StowageError>,
        describe: impl FnOnce(&T) -> StepOutcome,
    ) -> Result<T, PipelineFailure> {
        let elapsed = started.elapsed();
        match result {
            Ok(value) => {
                let outcome = describe(&value);
                println!("   ✅ [{}] {} ({:.2?})", step, outcome, elapsed);
                info!(step = %step, elapsed = ?elapsed, "{}", outcome);
                self.completed.push(StepReport {
                    step,
                    outcome,
                    elapsed,
                });
                Ok(value)
            }
            Err(source) => {
                error!(step = %step, elapsed = ?elapsed, "❌ Step failed: {}", source);
                Err(PipelineFailure {
                    step,
                    source,
                    completed: std::mem::take(&mut self.completed),
                })
            }
        }
    }
}

fn loaded(summary: &LoadSummary) -> StepOutcome {
    StepOutcome::Loaded {
        table: summary.table.to_string(),
        job_id: summary.job_id.clone(),
        rows: summary.output_rows,
    }
}

/// Runs the seven steps in their fixed order. Nothing is rolled back on failure.
#[instrument(skip_all, fields(bucket = %plan.bucket, dataset = %plan.dataset))]
pub async fn run_ingestion(
    ctx: IngestContext<'_>,
    plan: &IngestPlan,
) -> Result<IngestReport, PipelineFailure> {
    println!("🚀 Starting ingestion...");
    let run_start = Instant::now();
    let mut progress = Progress {
        completed: Vec::with_capacity(Step::ALL.len()),
    };

    // 1. Landing resources
    let started = Instant::now();
    let result = ensure_bucket(ctx.object_store, &plan.bucket, &plan.bucket_location).await;
    progress.check(Step::EnsureBucket, started, result, |state| {
        StepOutcome::Provisioned {
            resource: format!("Bucket {}", plan.bucket),
            state: *state,
        }
    })?;

    let started = Instant::now();
    let result = ensure_dataset(ctx.warehouse, &plan.dataset).await;
    progress.check(Step::EnsureDataset, started, result, |state| {
        StepOutcome::Provisioned {
            resource: format!("Dataset {}", plan.dataset),
            state: *state,
        }
    })?;

    // 2. Local CSV -> table
    let started = Instant::now();
    let result = load_tabular_file(
        ctx.warehouse,
        &plan.csv_path,
        &plan.csv_table,
        plan.write_disposition,
    )
    .await;
    progress.check(Step::LoadTabularFile, started, result, loaded)?;

    // 3. API -> object store
    let started = Instant::now();
    let result = fetch_remote(ctx.record_source, &plan.api_url).await;
    let records = progress.check(Step::FetchRemote, started, result, |records| {
        StepOutcome::Fetched {
            records: records.len(),
        }
    })?;

    let started = Instant::now();
    let result = persist_records(ctx.object_store, &records, &plan.bucket, &plan.blob_path).await;
    progress.check(Step::PersistRecords, started, result, |bytes| {
        StepOutcome::Persisted {
            uri: format!("{}/{}", plan.bucket, plan.blob_path),
            bytes: *bytes,
        }
    })?;

    // 4. Records -> JSON Lines -> table
    let started = Instant::now();
    let result = write_line_delimited(&records, &plan.jsonl_path);
    progress.check(Step::WriteLineDelimited, started, result, |lines| {
        StepOutcome::Written {
            path: plan.jsonl_path.clone(),
            lines: *lines,
        }
    })?;

    let started = Instant::now();
    let result = load_line_delimited_file(
        ctx.warehouse,
        &plan.jsonl_path,
        &plan.records_table,
        plan.write_disposition,
    )
    .await;
    progress.check(Step::LoadLineDelimitedFile, started, result, loaded)?;

    Ok(IngestReport {
        steps: progress.completed,
        elapsed: run_start.elapsed(),
    })
}
