// stowage-core/src/application/mod.rs

pub mod count;
pub mod ingest;
pub mod report;

// --- RE-EXPORTS (FACADE PATTERN) ---
// The CLI can write `use stowage_core::application::{run_ingestion, count_table};`
// without knowing the file layout.

pub use count::count_table;
pub use ingest::{IngestContext, IngestPlan, run_ingestion};
pub use report::{IngestReport, PipelineFailure, Provisioned, Step, StepOutcome, StepReport};
