// stowage-core/src/application/count.rs

use std::time::Instant;
use tracing::{debug, error, instrument};

use crate::domain::resource::QualifiedName;
use crate::error::StowageError;
use crate::ports::row_counter::RowCounter;

/// Counts the rows of one table, with timing in the logs.
#[instrument(skip(counter), fields(engine = counter.engine_name(), table = %table))]
pub async fn count_table(
    counter: &dyn RowCounter,
    table: &QualifiedName,
) -> Result<u64, StowageError> {
    let start = Instant::now();

    match counter.count_rows(table).await {
        Ok(count) => {
            debug!("✅ Counted {} rows in {:.2?}", count, start.elapsed());
            Ok(count)
        }
        Err(e) => {
            error!("❌ Count failed after {:.2?}: {}", start.elapsed(), e);
            Err(e)
        }
    }
}
