// stowage-core/src/domain/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum DomainError {
    #[error("Invalid identifier '{value}': {reason}")]
    #[diagnostic(
        code(stowage::domain::identifier),
        help("Identifiers look like 'project.dataset.table'; every part must be non-empty.")
    )]
    InvalidIdentifier { value: String, reason: String },

    #[error("Unexpected payload: {0}")]
    #[diagnostic(
        code(stowage::domain::payload),
        help("The remote API must answer with a JSON array of objects.")
    )]
    UnexpectedPayload(String),
}
