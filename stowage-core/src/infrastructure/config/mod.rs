pub mod loader;

pub use crate::domain::settings::{
    DatabaseBackend, DatabaseConfig, IngestConfig, LocalTargetConfig, StowageConfig, Target,
};
pub use loader::{apply_env_overrides, load_config, load_config_with, load_dotenv, validate_ingest};
