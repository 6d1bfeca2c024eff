use rocketshoes_core::config::AppConfig;

use crate::bootstrap::open_storage;
use crate::commands::CommandResult;

pub async fn run(config: &AppConfig) -> CommandResult {
    match open_storage(config).await {
        Ok(pool) => {
            pool.close().await;
            CommandResult::success("migrate", "applied pending migrations")
        }
        Err(error) => CommandResult::failure(
            "migrate",
            error.error_class(),
            error.to_string(),
            error.exit_code(),
        ),
    }
}
