//! # FSM storage
//!
//! Per-conversation state tag plus a scratch map of JSON values, behind [`StateStore`].
//!
//! - [`RedisStateStore`] – durable; survives restarts, every record carries a TTL
//! - [`MemoryStateStore`] – volatile; a background sweep evicts idle records
//! - [`StorageConfig`] – backend selection and tuning, loaded from env

mod config;
mod memory;
mod redis;
mod store;

pub use config::{RedisConfig, StorageBackend, StorageConfig};
pub use memory::MemoryStateStore;
pub use redis::RedisStateStore;
pub use store::StateStore;

use std::sync::Arc;

use tracing::info;

/// Builds the store selected by `config.backend`. The Redis backend is pinged before returning.
pub async fn build_state_store(
    config: &StorageConfig,
) -> Result<Arc<dyn StateStore>, quizbot_core::StorageError> {
    match config.backend {
        StorageBackend::Memory => {
            info!(
                sweep_interval_secs = config.sweep_interval.as_secs(),
                "step: using in-memory state store"
            );
            Ok(Arc::new(MemoryStateStore::new(config.sweep_interval)))
        }
        StorageBackend::Redis => {
            info!(addr = %config.redis.addr, db = config.redis.db, "step: using Redis state store");
            let store = RedisStateStore::connect(&config.redis, &config.key_prefix, config.ttl).await?;
            store.ping().await?;
            Ok(Arc::new(store))
        }
    }
}
