// stowage-core/src/domain/load.rs

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::resource::TableRef;

/// File format handed to a warehouse load job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceFormat {
    Csv,
    NewlineDelimitedJson,
}

impl SourceFormat {
    /// Name used by the BigQuery API.
    pub fn api_name(&self) -> &'static str {
        match self {
            SourceFormat::Csv => "CSV",
            SourceFormat::NewlineDelimitedJson => "NEWLINE_DELIMITED_JSON",
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.api_name())
    }
}

/// What a load job does with rows already in the destination table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WriteDisposition {
    /// Replace the table contents (truncate + write).
    #[default]
    Truncate,
    Append,
}

impl WriteDisposition {
    pub fn api_name(&self) -> &'static str {
        match self {
            WriteDisposition::Truncate => "WRITE_TRUNCATE",
            WriteDisposition::Append => "WRITE_APPEND",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadJobConfig {
    pub source_format: SourceFormat,
    pub autodetect: bool,
    pub write_disposition: WriteDisposition,
}

impl LoadJobConfig {
    pub fn csv(write_disposition: WriteDisposition) -> Self {
        Self {
            source_format: SourceFormat::Csv,
            autodetect: true,
            write_disposition,
        }
    }

    pub fn json_lines(write_disposition: WriteDisposition) -> Self {
        Self {
            source_format: SourceFormat::NewlineDelimitedJson,
            autodetect: true,
            write_disposition,
        }
    }
}

/// Outcome of a completed load job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadSummary {
    pub table: TableRef,
    pub job_id: String,
    /// Rows in the destination after the job, when the backend reports it.
    pub output_rows: Option<u64>,
}
