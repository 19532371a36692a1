// stowage-core/src/infrastructure/adapters/postgres.rs

use async_trait::async_trait;
use tokio_postgres::{Client, Config as PgConfig, NoTls};
use tracing::{debug, warn};

use crate::domain::resource::QualifiedName;
use crate::domain::settings::DatabaseConfig;
use crate::error::StowageError;
use crate::infrastructure::error::InfrastructureError;
use crate::ports::row_counter::RowCounter;

/// Row counter over a single Postgres connection.
///
/// The value only exists once the connection is open, so there is never
/// anything to close after a failed connect. Dropping the counter closes the
/// connection.
pub struct PostgresCounter {
    client: Client,
}

impl PostgresCounter {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StowageError> {
        let mut pg = PgConfig::new();
        pg.host(&config.host);
        pg.port(config.port);
        if let Some(user) = &config.user {
            pg.user(user);
        }
        if let Some(password) = &config.password {
            pg.password(password);
        }
        pg.dbname(&config.dbname);

        debug!(host = %config.host, port = config.port, dbname = %config.dbname, "Connecting to Postgres");
        let (client, connection) = pg.connect(NoTls).await.map_err(InfrastructureError::from)?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                warn!("Postgres connection error: {}", e);
            }
        });

        Ok(Self { client })
    }
}

#[async_trait]
impl RowCounter for PostgresCounter {
    async fn count_rows(&self, table: &QualifiedName) -> Result<u64, StowageError> {
        let sql = format!("SELECT COUNT(*) FROM {}", table.to_sql());
        let row = self
            .client
            .query_one(sql.as_str(), &[])
            .await
            .map_err(InfrastructureError::from)?;
        let count: i64 = row.try_get(0).map_err(InfrastructureError::from)?;
        u64::try_from(count)
            .map_err(|_| StowageError::InternalError(format!("Negative row count: {}", count)))
    }

    fn engine_name(&self) -> &str {
        "postgres"
    }
}
