pub mod error;
pub mod load;
pub mod records;
pub mod resource;
pub mod settings;

// Re-exports to keep imports short elsewhere
pub use error::DomainError;
pub use load::{LoadJobConfig, LoadSummary, SourceFormat, WriteDisposition};
pub use records::RecordSet;
pub use resource::{BucketName, DatasetRef, QualifiedName, TableRef};
