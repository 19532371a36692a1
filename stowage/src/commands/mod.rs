// stowage/src/commands/mod.rs

pub mod count;
pub mod ingest;
