// stowage-core/src/domain/settings.rs

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use validator::Validate;

use crate::domain::load::WriteDisposition;

/// Where the ingestion pipeline writes.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    /// Cloud Storage + BigQuery.
    #[default]
    Gcp,
    /// A directory per bucket + a DuckDB file.
    Local,
}

/// Relational engine used by the row counter.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    #[default]
    Postgres,
    DuckDB,
}

/// Top level of `stowage.yaml`.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct StowageConfig {
    #[serde(default)]
    pub ingest: IngestConfig,

    #[serde(default)]
    pub database: DatabaseConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, Validate)]
pub struct IngestConfig {
    #[serde(default)]
    pub target: Target,

    #[validate(length(min = 1, message = "GCP_PROJECT_ID is not set"))]
    #[serde(default)]
    pub project_id: String,

    /// Service account key file.
    #[serde(default)]
    pub credentials_path: Option<PathBuf>,

    /// Pre-minted OAuth2 token, used instead of the key file when set.
    #[serde(default, skip_serializing)]
    pub access_token: Option<String>,

    #[validate(url(message = "API_URL must be an absolute URL"))]
    #[serde(default)]
    pub api_url: String,

    #[validate(length(min = 1, message = "GCS_BUCKET_NAME is not set"))]
    #[serde(default)]
    pub bucket: String,

    #[serde(default = "default_bucket_location")]
    pub bucket_location: String,

    #[validate(length(min = 1, message = "BIGQUERY_DATASET is not set"))]
    #[serde(default)]
    pub dataset: String,

    #[serde(default)]
    pub dataset_location: Option<String>,

    #[validate(length(min = 1, message = "table cannot be empty"))]
    #[serde(default = "default_table")]
    pub table: String,

    /// Destination of the API records; the CSV table when unset.
    #[serde(default)]
    pub records_table: Option<String>,

    #[serde(default = "default_csv_path")]
    pub csv_path: PathBuf,

    #[serde(default = "default_jsonl_path")]
    pub jsonl_path: PathBuf,

    #[validate(length(min = 1, message = "blob_path cannot be empty"))]
    #[serde(default = "default_blob_path")]
    pub blob_path: String,

    #[serde(default)]
    pub write_disposition: WriteDisposition,

    #[serde(default = "default_storage_endpoint")]
    pub storage_endpoint: String,

    #[serde(default = "default_bigquery_endpoint")]
    pub bigquery_endpoint: String,

    #[serde(default)]
    pub local: LocalTargetConfig,
}

impl IngestConfig {
    pub fn records_table(&self) -> &str {
        self.records_table.as_deref().unwrap_or(&self.table)
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            target: Target::default(),
            project_id: String::new(),
            credentials_path: None,
            access_token: None,
            api_url: String::new(),
            bucket: String::new(),
            bucket_location: default_bucket_location(),
            dataset: String::new(),
            dataset_location: None,
            table: default_table(),
            records_table: None,
            csv_path: default_csv_path(),
            jsonl_path: default_jsonl_path(),
            blob_path: default_blob_path(),
            write_disposition: WriteDisposition::default(),
            storage_endpoint: default_storage_endpoint(),
            bigquery_endpoint: default_bigquery_endpoint(),
            local: LocalTargetConfig::default(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LocalTargetConfig {
    #[serde(default = "default_lake_dir")]
    pub lake_dir: PathBuf,
    #[serde(default = "default_warehouse_path")]
    pub warehouse_path: PathBuf,
}

impl Default for LocalTargetConfig {
    fn default() -> Self {
        Self {
            lake_dir: default_lake_dir(),
            warehouse_path: default_warehouse_path(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub backend: DatabaseBackend,
    #[serde(default = "default_db_host")]
    pub host: String,
    #[serde(default = "default_db_port")]
    pub port: u16,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default, skip_serializing)]
    pub password: Option<String>,
    #[serde(default = "default_db_name")]
    pub dbname: String,
    /// DuckDB database file.
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default = "default_count_table")]
    pub table: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: DatabaseBackend::default(),
            host: default_db_host(),
            port: default_db_port(),
            user: None,
            password: None,
            dbname: default_db_name(),
            path: None,
            table: default_count_table(),
        }
    }
}

fn default_bucket_location() -> String {
    "US".to_string()
}
fn default_table() -> String {
    "customers".to_string()
}
fn default_csv_path() -> PathBuf {
    PathBuf::from("data/customers.csv")
}
fn default_jsonl_path() -> PathBuf {
    PathBuf::from("data/data.jsonl")
}
fn default_blob_path() -> String {
    "data.json".to_string()
}
fn default_storage_endpoint() -> String {
    "https://storage.googleapis.com".to_string()
}
fn default_bigquery_endpoint() -> String {
    "https://bigquery.googleapis.com".to_string()
}
fn default_lake_dir() -> PathBuf {
    PathBuf::from("target/lake")
}
fn default_warehouse_path() -> PathBuf {
    PathBuf::from("target/warehouse.duckdb")
}
fn default_db_host() -> String {
    "localhost".to_string()
}
fn default_db_port() -> u16 {
    5434
}
fn default_db_name() -> String {
    "customers_db".to_string()
}
fn default_count_table() -> String {
    "customers.customer_data".to_string()
}
