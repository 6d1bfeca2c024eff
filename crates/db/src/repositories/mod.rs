use rocketshoes_core::StoreError;
use thiserror::Error;

pub mod key_value;
pub mod memory;

pub use key_value::SqlKeyValueStore;
pub use memory::InMemoryKeyValueStore;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

impl From<RepositoryError> for StoreError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::Database(sqlx::Error::PoolTimedOut)
            | RepositoryError::Database(sqlx::Error::PoolClosed) => {
                StoreError::Unavailable(value.to_string())
            }
            other => StoreError::Backend(other.to_string()),
        }
    }
}
