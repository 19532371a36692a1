// stowage-core/src/infrastructure/adapters/mod.rs

pub mod bigquery;
pub mod duckdb;
pub mod gcs;
pub mod google_auth;
pub mod http;
pub mod local_store;
pub mod postgres;
