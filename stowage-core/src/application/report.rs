// stowage-core/src/application/report.rs

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::error::StowageError;

/// The seven ingestion steps, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    EnsureBucket,
    EnsureDataset,
    LoadTabularFile,
    FetchRemote,
    PersistRecords,
    WriteLineDelimited,
    LoadLineDelimitedFile,
}

impl Step {
    pub const ALL: [Step; 7] = [
        Step::EnsureBucket,
        Step::EnsureDataset,
        Step::LoadTabularFile,
        Step::FetchRemote,
        Step::PersistRecords,
        Step::WriteLineDelimited,
        Step::LoadLineDelimitedFile,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Step::EnsureBucket => "ensure_bucket",
            Step::EnsureDataset => "ensure_dataset",
            Step::LoadTabularFile => "load_tabular_file",
            Step::FetchRemote => "fetch_remote",
            Step::PersistRecords => "persist_records",
            Step::WriteLineDelimited => "write_line_delimited",
            Step::LoadLineDelimitedFile => "load_line_delimited_file",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Provisioned {
    Created,
    AlreadyExists,
}

/// What a completed step produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepOutcome {
    Provisioned {
        resource: String,
        state: Provisioned,
    },
    Loaded {
        table: String,
        job_id: String,
        rows: Option<u64>,
    },
    Fetched {
        records: usize,
    },
    Persisted {
        uri: String,
        bytes: usize,
    },
    Written {
        path: PathBuf,
        lines: usize,
    },
}

impl fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepOutcome::Provisioned { resource, state } => match state {
                Provisioned::Created => write!(f, "{} created", resource),
                Provisioned::AlreadyExists => write!(f, "{} already exists", resource),
            },
            StepOutcome::Loaded { table, rows, .. } => match rows {
                Some(rows) => write!(f, "loaded {} rows into {}", rows, table),
                None => write!(f, "loaded into {}", table),
            },
            StepOutcome::Fetched { records } => write!(f, "fetched {} records", records),
            StepOutcome::Persisted { uri, bytes } => write!(f, "saved {} bytes to {}", bytes, uri),
            StepOutcome::Written { path, lines } => {
                write!(f, "wrote {} lines to {}", lines, path.display())
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub step: Step,
    pub outcome: StepOutcome,
    pub elapsed: Duration,
}

#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub steps: Vec<StepReport>,
    pub elapsed: Duration,
}

impl IngestReport {
    pub fn step(&self, step: Step) -> Option<&StepReport> {
        self.steps.iter().find(|r| r.step == step)
    }
}

/// The step that stopped the pipeline, its error, and what had already run.
/// Completed steps are not rolled back.
#[derive(Debug, Error)]
#[error("step '{step}' failed: {source}")]
pub struct PipelineFailure {
    pub step: Step,
    #[source]
    pub source: StowageError,
    pub completed: Vec<StepReport>,
}
