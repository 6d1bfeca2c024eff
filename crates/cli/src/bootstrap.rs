use std::sync::Arc;

use rocketshoes_catalog::{CatalogClientError, HttpCatalog};
use rocketshoes_core::config::AppConfig;
use rocketshoes_core::{CartManager, LogNotifier, Notice, Notifier, RecordingNotifier};
use rocketshoes_db::{connect_with_config, migrations, DbPool, SqlKeyValueStore};
use thiserror::Error;
use tracing::info;

/// A hydrated cart wired to the configured store and catalog.
pub struct CartSession {
    pub manager: CartManager,
    pub notices: Arc<RecordingNotifier>,
    pub db_pool: DbPool,
}

/// Logs every notice and keeps it for the command report.
struct SessionNotifier {
    recorder: Arc<RecordingNotifier>,
}

impl Notifier for SessionNotifier {
    fn notify(&self, notice: Notice) {
        LogNotifier.notify(notice.clone());
        self.recorder.notify(notice);
    }
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("storage connection failed: {0}")]
    StorageConnect(#[source] sqlx::Error),
    #[error("storage migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
    #[error(transparent)]
    Catalog(#[from] CatalogClientError),
}

impl BootstrapError {
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::StorageConnect(_) => "storage_connectivity",
            Self::Migration(_) => "migration",
            Self::Catalog(_) => "catalog_client",
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            Self::StorageConnect(_) => 4,
            Self::Migration(_) => 5,
            Self::Catalog(_) => 6,
        }
    }
}

pub async fn open_storage(config: &AppConfig) -> Result<DbPool, BootstrapError> {
    let db_pool =
        connect_with_config(&config.storage).await.map_err(BootstrapError::StorageConnect)?;
    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;

    info!(
        event_name = "system.bootstrap.storage_ready",
        correlation_id = "bootstrap",
        "cart storage connected and migrated"
    );
    Ok(db_pool)
}

pub async fn bootstrap(config: &AppConfig) -> Result<CartSession, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        cart_key = %config.storage.cart_key,
        catalog = %config.catalog.base_url,
        "starting cart bootstrap"
    );

    let catalog = HttpCatalog::new(&config.catalog)?;
    let db_pool = open_storage(config).await?;
    let notices = Arc::new(RecordingNotifier::default());

    let manager = CartManager::hydrate(
        config.storage.cart_key.clone(),
        Arc::new(catalog),
        Arc::new(SqlKeyValueStore::new(db_pool.clone())),
        Arc::new(SessionNotifier { recorder: notices.clone() }),
    )
    .await;

    Ok(CartSession { manager, notices, db_pool })
}
