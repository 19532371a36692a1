// stowage/src/cli.rs
//
// Single source of truth for all CLI definitions (Clap structs).

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use stowage_core::domain::settings::{DatabaseBackend, DatabaseConfig, Target};

#[derive(Parser)]
#[command(name = "stowage")]
#[command(about = "Lands CSV files and API records in object storage and a data warehouse", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 🚚 Runs the ingestion pipeline (CSV -> table, API -> bucket, JSON Lines -> table)
    Ingest {
        /// Directory searched for stowage.yaml
        #[arg(long, default_value = ".")]
        config_dir: PathBuf,

        /// Explicit configuration file (must exist)
        #[arg(long, short)]
        config: Option<PathBuf>,

        /// Overrides STOWAGE_TARGET and the file value
        #[arg(long, value_enum)]
        target: Option<TargetArg>,
    },

    /// 🔢 Prints the number of rows in a relational table
    Count(CountArgs),
}

#[derive(Args, Debug)]
pub struct CountArgs {
    /// Directory searched for stowage.yaml
    #[arg(long, default_value = ".")]
    pub config_dir: PathBuf,

    /// Explicit configuration file (must exist)
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    #[arg(long, value_enum)]
    pub backend: Option<BackendArg>,

    #[arg(long)]
    pub host: Option<String>,

    #[arg(long)]
    pub port: Option<u16>,

    #[arg(long)]
    pub user: Option<String>,

    #[arg(long)]
    pub dbname: Option<String>,

    /// DuckDB database file (duckdb backend)
    #[arg(long)]
    pub db_path: Option<PathBuf>,

    /// Table to count, optionally schema-qualified (ex: "customers.customer_data")
    #[arg(long, short)]
    pub table: Option<String>,
}

impl CountArgs {
    /// Flags win over the environment and the file.
    pub fn apply(&self, db: &mut DatabaseConfig) {
        if let Some(backend) = self.backend {
            db.backend = backend.into();
        }
        if let Some(host) = &self.host {
            db.host = host.clone();
        }
        if let Some(port) = self.port {
            db.port = port;
        }
        if let Some(user) = &self.user {
            db.user = Some(user.clone());
        }
        if let Some(dbname) = &self.dbname {
            db.dbname = dbname.clone();
        }
        if let Some(path) = &self.db_path {
            db.path = Some(path.clone());
        }
        if let Some(table) = &self.table {
            db.table = table.clone();
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum TargetArg {
    Gcp,
    Local,
}

impl From<TargetArg> for Target {
    fn from(arg: TargetArg) -> Self {
        match arg {
            TargetArg::Gcp => Target::Gcp,
            TargetArg::Local => Target::Local,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum BackendArg {
    Postgres,
    Duckdb,
}

impl From<BackendArg> for DatabaseBackend {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Postgres => DatabaseBackend::Postgres,
            BackendArg::Duckdb => DatabaseBackend::DuckDB,
        }
    }
}
