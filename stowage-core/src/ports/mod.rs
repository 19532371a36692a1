// stowage-core/src/ports/mod.rs

pub mod object_store;
pub mod record_source;
pub mod row_counter;
pub mod warehouse;

pub use object_store::ObjectStore;
pub use record_source::RecordSource;
pub use row_counter::RowCounter;
pub use warehouse::Warehouse;
