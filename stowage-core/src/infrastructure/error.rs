// stowage-core/src/infrastructure/error.rs

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum DatabaseError {
    #[error("DuckDB Engine Error: {0}")]
    #[diagnostic(
        code(stowage::infra::database::duckdb),
        help("An error occurred inside the SQL engine.")
    )]
    DuckDB(#[from] duckdb::Error),

    #[error("Postgres Error: {0}")]
    #[diagnostic(
        code(stowage::infra::database::postgres),
        help("Check host, port, credentials and that the table exists.")
    )]
    Postgres(#[from] tokio_postgres::Error),
}

#[derive(Error, Debug, Diagnostic)]
pub enum InfrastructureError {
    // --- DATABASE (Abstracted) ---
    #[error(transparent)]
    #[diagnostic(transparent)]
    Database(#[from] DatabaseError),

    // --- FILESYSTEM (IO) ---
    #[error("File System Error: {0}")]
    #[diagnostic(
        code(stowage::infra::io),
        help("Check file permissions or path validity.")
    )]
    Io(#[from] std::io::Error),

    #[error("File not found: {}", .0.display())]
    #[diagnostic(code(stowage::infra::file_not_found))]
    FileNotFound(PathBuf),

    // --- CONFIG / YAML ---
    #[error("YAML Parsing Error: {0}")]
    #[diagnostic(
        code(stowage::infra::yaml),
        help("Check your YAML syntax (indentation, types).")
    )]
    YamlError(#[from] serde_yaml::Error),

    #[error("Configuration Error: {0}")]
    #[diagnostic(code(stowage::infra::config))]
    ConfigError(String),

    #[error("Configuration not found at '{0}'")]
    #[diagnostic(code(stowage::infra::config_missing))]
    ConfigNotFound(String),

    #[error("Invalid configuration: {0}")]
    #[diagnostic(
        code(stowage::infra::config_invalid),
        help("Set the missing values in stowage.yaml, .env or the environment.")
    )]
    Validation(#[from] validator::ValidationErrors),

    // --- SERIALIZATION ---
    #[error("JSON Error: {0}")]
    #[diagnostic(code(stowage::infra::json))]
    Json(#[from] serde_json::Error),

    // --- NETWORK ---
    #[error("HTTP transport error: {0}")]
    #[diagnostic(
        code(stowage::infra::http),
        help("Check network connectivity and the endpoint URL.")
    )]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}: {body}")]
    #[diagnostic(code(stowage::infra::http_status))]
    RemoteStatus {
        url: String,
        status: u16,
        body: String,
    },

    #[error("Authentication failed: {0}")]
    #[diagnostic(
        code(stowage::infra::auth),
        help("Check GCP_SERVICE_ACCOUNT_JSON or GOOGLE_OAUTH_ACCESS_TOKEN.")
    )]
    Auth(String),

    #[error("Could not sign token assertion: {0}")]
    #[diagnostic(code(stowage::infra::jwt))]
    Jwt(#[from] jsonwebtoken::errors::Error),

    // --- WAREHOUSE ---
    #[error("Load job '{job_id}' failed: {message}")]
    #[diagnostic(
        code(stowage::infra::load_job),
        help("The source file is probably malformed or does not match the table schema.")
    )]
    LoadJobFailed { job_id: String, message: String },
}

// Shortcuts for `?` on driver calls
impl From<duckdb::Error> for InfrastructureError {
    fn from(err: duckdb::Error) -> Self {
        InfrastructureError::Database(DatabaseError::DuckDB(err))
    }
}

impl From<tokio_postgres::Error> for InfrastructureError {
    fn from(err: tokio_postgres::Error) -> Self {
        InfrastructureError::Database(DatabaseError::Postgres(err))
    }
}
