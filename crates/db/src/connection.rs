use std::str::FromStr;
use std::time::Duration;

use rocketshoes_core::config::StorageConfig;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};

pub type DbPool = sqlx::SqlitePool;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

pub async fn connect(database_url: &str) -> Result<DbPool, sqlx::Error> {
    connect_with_settings(database_url, 1, 30).await
}

pub async fn connect_with_config(storage: &StorageConfig) -> Result<DbPool, sqlx::Error> {
    connect_with_settings(&storage.url, storage.max_connections, storage.timeout_secs).await
}

/// Opens the cart database, creating the file on first use.
///
/// WAL keeps readers off the writer's lock and the busy timeout covers a
/// second process holding the same file.
pub async fn connect_with_settings(
    database_url: &str,
    max_connections: u32,
    timeout_secs: u64,
) -> Result<DbPool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(BUSY_TIMEOUT);

    SqlitePoolOptions::new()
        .max_connections(max_connections.max(1))
        .acquire_timeout(Duration::from_secs(timeout_secs.max(1)))
        .connect_with(options)
        .await
}
