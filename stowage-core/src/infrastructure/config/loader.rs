// stowage-core/src/infrastructure/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};
use validator::Validate;

use crate::domain::load::WriteDisposition;
use crate::domain::settings::{DatabaseBackend, IngestConfig, StowageConfig, Target};
use crate::infrastructure::error::InfrastructureError;

const CONFIG_CANDIDATES: [&str; 2] = ["stowage.yaml", "stowage.yml"];

/// Loads `.env` from the working directory into the process environment.
/// Variables that are already set keep their value.
pub fn load_dotenv() -> Option<PathBuf> {
    match dotenvy::dotenv() {
        Ok(path) => {
            debug!(path = ?path, "Loaded .env");
            Some(path)
        }
        Err(_) => None,
    }
}

/// Builds the configuration once: YAML file (optional) then environment overrides.
///
/// `explicit` is a file passed on the command line; it must exist. Otherwise
/// `config_dir` is searched for `stowage.yaml` / `stowage.yml`, and a missing
/// file just means defaults.
pub fn load_config(
    config_dir: &Path,
    explicit: Option<&Path>,
) -> Result<StowageConfig, InfrastructureError> {
    load_config_with(config_dir, explicit, |key| std::env::var(key).ok())
}

#[instrument(skip(explicit, lookup))]
pub fn load_config_with<F>(
    config_dir: &Path,
    explicit: Option<&Path>,
    lookup: F,
) -> Result<StowageConfig, InfrastructureError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match find_config_file(config_dir, explicit)? {
        Some(path) => {
            info!(path = ?path, "Loading configuration file");
            let content = fs::read_to_string(&path)?;
            serde_yaml::from_str(&content)?
        }
        None => {
            info!("No configuration file, using defaults and environment");
            StowageConfig::default()
        }
    };

    apply_env_overrides(&mut config, lookup)?;

    Ok(config)
}

fn find_config_file(
    root: &Path,
    explicit: Option<&Path>,
) -> Result<Option<PathBuf>, InfrastructureError> {
    if let Some(path) = explicit {
        if path.is_file() {
            return Ok(Some(path.to_path_buf()));
        }
        return Err(InfrastructureError::ConfigNotFound(
            path.display().to_string(),
        ));
    }
    Ok(CONFIG_CANDIDATES
        .iter()
        .map(|name| root.join(name))
        .find(|p| p.is_file()))
}

/// Layers environment variables over the file values.
///
/// The lookup is injected so callers (and tests) decide where values come from.
/// Empty values count as unset.
pub fn apply_env_overrides<F>(
    config: &mut StowageConfig,
    lookup: F,
) -> Result<(), InfrastructureError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    let ingest = &mut config.ingest;
    if let Some(val) = get("STOWAGE_TARGET") {
        ingest.target = parse_target(&val)?;
        info!("Overriding target via ENV: {:?}", ingest.target);
    }
    if let Some(val) = get("GCP_PROJECT_ID") {
        ingest.project_id = val;
    }
    if let Some(val) = get("GCP_SERVICE_ACCOUNT_JSON") {
        ingest.credentials_path = Some(PathBuf::from(val));
    }
    if let Some(val) = get("GOOGLE_OAUTH_ACCESS_TOKEN") {
        ingest.access_token = Some(val);
    }
    if let Some(val) = get("API_URL") {
        ingest.api_url = val;
    }
    if let Some(val) = get("GCS_BUCKET_NAME") {
        ingest.bucket = val;
    }
    if let Some(val) = get("BIGQUERY_DATASET") {
        ingest.dataset = val;
    }
    if let Some(val) = get("STOWAGE_WRITE_DISPOSITION") {
        ingest.write_disposition = match val.to_ascii_lowercase().as_str() {
            "truncate" => WriteDisposition::Truncate,
            "append" => WriteDisposition::Append,
            other => {
                return Err(InfrastructureError::ConfigError(format!(
                    "STOWAGE_WRITE_DISPOSITION must be 'truncate' or 'append', got '{}'",
                    other
                )));
            }
        };
    }

    let db = &mut config.database;
    if let Some(val) = get("STOWAGE_DB_BACKEND") {
        db.backend = match val.to_ascii_lowercase().as_str() {
            "postgres" => DatabaseBackend::Postgres,
            "duckdb" => DatabaseBackend::DuckDB,
            other => {
                return Err(InfrastructureError::ConfigError(format!(
                    "STOWAGE_DB_BACKEND must be 'postgres' or 'duckdb', got '{}'",
                    other
                )));
            }
        };
    }
    if let Some(val) = get("STOWAGE_DB_HOST") {
        db.host = val;
    }
    if let Some(val) = get("STOWAGE_DB_PORT") {
        db.port = val.parse().map_err(|_| {
            InfrastructureError::ConfigError(format!("STOWAGE_DB_PORT is not a port: '{}'", val))
        })?;
    }
    if let Some(val) = get("STOWAGE_DB_USER") {
        db.user = Some(val);
    }
    if let Some(val) = get("STOWAGE_DB_PASSWORD") {
        db.password = Some(val);
    }
    if let Some(val) = get("STOWAGE_DB_NAME") {
        db.dbname = val;
    }
    if let Some(val) = get("STOWAGE_DB_PATH") {
        db.path = Some(PathBuf::from(val));
    }
    if let Some(val) = get("STOWAGE_DB_TABLE") {
        db.table = val;
    }

    Ok(())
}

fn parse_target(val: &str) -> Result<Target, InfrastructureError> {
    match val.to_ascii_lowercase().as_str() {
        "gcp" => Ok(Target::Gcp),
        "local" => Ok(Target::Local),
        other => Err(InfrastructureError::ConfigError(format!(
            "STOWAGE_TARGET must be 'gcp' or 'local', got '{}'",
            other
        ))),
    }
}

/// Everything the ingestion pipeline needs must be present before the first step runs.
pub fn validate_ingest(config: &IngestConfig) -> Result<(), InfrastructureError> {
    config.validate()?;
    if config.target == Target::Gcp
        && config.credentials_path.is_none()
        && config.access_token.is_none()
    {
        return Err(InfrastructureError::ConfigError(
            "GCP target needs GCP_SERVICE_ACCOUNT_JSON or GOOGLE_OAUTH_ACCESS_TOKEN".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_yaml_file_is_loaded() -> Result<()> {
        let dir = tempdir()?;
        fs::write(
            dir.path().join("stowage.yaml"),
            r#"
ingest:
  target: local
  project_id: acme
  api_url: https://api.example.com/customers
  bucket: landing
  dataset: raw
  records_table: api_customers
database:
  backend: duckdb
  path: fixtures/customers.duckdb
  table: main.customers
"#,
        )?;

        let config = load_config_with(dir.path(), None, env(&[]))?;
        assert_eq!(config.ingest.target, Target::Local);
        assert_eq!(config.ingest.project_id, "acme");
        assert_eq!(config.ingest.table, "customers");
        assert_eq!(config.ingest.records_table(), "api_customers");
        assert_eq!(config.ingest.bucket_location, "US");
        assert_eq!(config.database.backend, DatabaseBackend::DuckDB);
        assert_eq!(config.database.port, 5434);
        Ok(())
    }

    #[test]
    fn test_missing_explicit_file_fails() -> Result<()> {
        let dir = tempdir()?;
        let missing = dir.path().join("nope.yaml");
        let err = load_config_with(dir.path(), Some(&missing), env(&[])).unwrap_err();
        assert!(matches!(err, InfrastructureError::ConfigNotFound(_)));
        Ok(())
    }

    #[test]
    fn test_env_overrides_file_values() -> Result<()> {
        let mut config = StowageConfig::default();
        config.ingest.bucket = "from-file".to_string();

        apply_env_overrides(
            &mut config,
            env(&[
                ("GCS_BUCKET_NAME", "from-env"),
                ("GCP_PROJECT_ID", "acme"),
                ("BIGQUERY_DATASET", ""),
                ("STOWAGE_TARGET", "LOCAL"),
                ("STOWAGE_DB_PORT", "6543"),
            ]),
        )?;

        assert_eq!(config.ingest.bucket, "from-env");
        assert_eq!(config.ingest.project_id, "acme");
        // Empty values do not wipe anything
        assert_eq!(config.ingest.dataset, "");
        assert_eq!(config.ingest.target, Target::Local);
        assert_eq!(config.database.port, 6543);
        Ok(())
    }

    #[test]
    fn test_bad_env_values_are_rejected() {
        let mut config = StowageConfig::default();
        assert!(apply_env_overrides(&mut config, env(&[("STOWAGE_DB_PORT", "abc")])).is_err());
        assert!(apply_env_overrides(&mut config, env(&[("STOWAGE_TARGET", "azure")])).is_err());
    }

    #[test]
    fn test_validate_ingest() -> Result<()> {
        let mut config = IngestConfig::default();
        assert!(matches!(
            validate_ingest(&config),
            Err(InfrastructureError::Validation(_))
        ));

        config.project_id = "acme".into();
        config.api_url = "https://api.example.com/v1/users".into();
        config.bucket = "landing".into();
        config.dataset = "raw".into();
        // GCP target without credentials
        assert!(matches!(
            validate_ingest(&config),
            Err(InfrastructureError::ConfigError(_))
        ));

        config.access_token = Some("ya29.token".into());
        validate_ingest(&config)?;

        config.access_token = None;
        config.target = Target::Local;
        validate_ingest(&config)?;
        Ok(())
    }
}
