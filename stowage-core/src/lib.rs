// stowage-core/src/lib.rs

// 1. Documentation is welcome but not enforced yet
#![allow(missing_docs)]
// 2. Memory safety
#![deny(unsafe_code)]
// 3. Robustness
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
// 4. Performance
#![warn(clippy::perf)]

// --- HEXAGONAL MODULES ---

// 1. Ports (Interfaces / Traits)
// What the use cases need from the outside world: object store, warehouse,
// record source, row counter.
pub mod ports;

// 2. Domain
// Resource identifiers, record sets, load job settings, configuration types.
// Depends on nothing else in the crate.
pub mod domain;

// 3. Infrastructure (Adapters)
// Cloud Storage, BigQuery, DuckDB, Postgres, HTTP, config files.
// Depends on the Domain and the Ports.
pub mod infrastructure;

// 4. Application (Use Cases)
// Ingestion pipeline and row count.
pub mod application;

// --- GLOBAL ERROR HANDLING ---
pub mod error;

#[cfg(test)]
pub(crate) mod test_support;

// --- RE-EXPORTS (FACADE) ---
// use stowage_core::StowageError;
pub use error::StowageError;
