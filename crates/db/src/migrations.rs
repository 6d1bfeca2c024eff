use sqlx::migrate::{MigrateError, Migrator};
use tracing::debug;

use crate::DbPool;

/// Schema for the cart mirror: one `key_value_store` row per storage key.
pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Brings the cart schema up to date. Applied migrations are skipped, so
/// every command runs this before touching the store.
pub async fn run_pending(pool: &DbPool) -> Result<(), MigrateError> {
    MIGRATOR.run(pool).await?;
    debug!(
        event_name = "db.migrations.current",
        migrations = MIGRATOR.iter().count(),
        "cart storage schema is current"
    );
    Ok(())
}
