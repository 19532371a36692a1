// stowage-core/src/error.rs

use crate::domain::error::DomainError;
use crate::infrastructure::error::InfrastructureError;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum StowageError {
    // --- DOMAIN ERRORS (identifiers, payload shape) ---
    #[error(transparent)]
    #[diagnostic(transparent)]
    Domain(#[from] DomainError),

    // --- INFRASTRUCTURE ERRORS (IO, network, databases) ---
    #[error(transparent)]
    #[diagnostic(transparent)]
    Infrastructure(#[from] InfrastructureError),

    // --- GENERIC / APPLICATION ERRORS ---
    #[error("Internal Error: {0}")]
    InternalError(String),
}

// Manual implementations so `?` works straight on io / http / db calls
impl From<std::io::Error> for StowageError {
    fn from(err: std::io::Error) -> Self {
        StowageError::Infrastructure(InfrastructureError::Io(err))
    }
}

impl From<reqwest::Error> for StowageError {
    fn from(err: reqwest::Error) -> Self {
        StowageError::Infrastructure(InfrastructureError::Http(err))
    }
}

impl From<serde_json::Error> for StowageError {
    fn from(err: serde_json::Error) -> Self {
        StowageError::Infrastructure(InfrastructureError::Json(err))
    }
}

impl From<duckdb::Error> for StowageError {
    fn from(err: duckdb::Error) -> Self {
        StowageError::Infrastructure(InfrastructureError::from(err))
    }
}

impl From<tokio_postgres::Error> for StowageError {
    fn from(err: tokio_postgres::Error) -> Self {
        StowageError::Infrastructure(InfrastructureError::from(err))
    }
}

impl StowageError {
    /// True when the error is a non-2xx answer carrying the given status code.
    pub fn is_http_status(&self, code: u16) -> bool {
        matches!(
            self,
            StowageError::Infrastructure(InfrastructureError::RemoteStatus { status, .. })
                if *status == code
        )
    }
}
