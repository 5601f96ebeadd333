//! Durable state store on Redis.
//!
//! Layout: `<prefix>state:<chat>:<user>` is a string holding the state tag; `<prefix>data:<chat>:<user>`
//! is a hash of JSON-encoded scratch values. Both keys expire server side after the configured TTL;
//! every write refreshes the TTL of the key it touched.

use async_trait::async_trait;
use quizbot_core::{ConversationKey, State, StorageError};
use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use redis::AsyncCommands;
use serde_json::Value;
use std::time::Duration;
use tracing::{info, instrument};

use crate::config::RedisConfig;
use crate::store::StateStore;

/// Longest pause between reconnect attempts, in milliseconds.
const MAX_RECONNECT_DELAY_MS: u64 = 1_000;

fn backend_error(action: &str, err: redis::RedisError) -> StorageError {
    StorageError::Backend(format!("failed to {} in Redis: {}", action, err))
}

pub(crate) fn state_key(prefix: &str, key: ConversationKey) -> String {
    format!("{}state:{}:{}", prefix, key.chat_id, key.user_id)
}

pub(crate) fn data_key(prefix: &str, key: ConversationKey) -> String {
    format!("{}data:{}:{}", prefix, key.chat_id, key.user_id)
}

/// Bounded retries with a capped backoff, so an unreachable server fails startup within seconds
/// and a stalled one fails the command instead of blocking its conversation.
fn manager_config(config: &RedisConfig) -> ConnectionManagerConfig {
    ConnectionManagerConfig::new()
        .set_number_of_retries(config.connect_retries)
        .set_max_delay(MAX_RECONNECT_DELAY_MS)
        .set_connection_timeout(config.connect_timeout)
        .set_response_timeout(config.response_timeout)
}

/// [`StateStore`] backed by a shared Redis connection manager (reconnects on its own).
#[derive(Clone)]
pub struct RedisStateStore {
    conn: ConnectionManager,
    key_prefix: String,
    ttl: Duration,
}

impl RedisStateStore {
    pub async fn connect(
        config: &RedisConfig,
        key_prefix: &str,
        ttl: Duration,
    ) -> Result<Self, StorageError> {
        Self::open(&config.url(), config, key_prefix, ttl).await
    }

    /// Connects to `url` with the default retry and timeout settings of [`RedisConfig`].
    pub async fn connect_url(
        url: &str,
        key_prefix: &str,
        ttl: Duration,
    ) -> Result<Self, StorageError> {
        Self::open(url, &RedisConfig::default(), key_prefix, ttl).await
    }

    async fn open(
        url: &str,
        config: &RedisConfig,
        key_prefix: &str,
        ttl: Duration,
    ) -> Result<Self, StorageError> {
        let client = redis::Client::open(url).map_err(|e| backend_error("open client", e))?;
        let conn = ConnectionManager::new_with_config(client, manager_config(config))
            .await
            .map_err(|e| backend_error("connect", e))?;
        info!(key_prefix = %key_prefix, ttl_secs = ttl.as_secs(), "Redis state store connected");
        Ok(Self::with_connection(conn, key_prefix, ttl))
    }

    pub fn with_connection(conn: ConnectionManager, key_prefix: &str, ttl: Duration) -> Self {
        Self {
            conn,
            key_prefix: key_prefix.to_string(),
            ttl,
        }
    }

    /// Round-trips a `PING`; used at startup to fail fast on a bad address.
    #[instrument(skip(self))]
    pub async fn ping(&self) -> Result<(), StorageError> {
        let mut conn = self.conn.clone();
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| backend_error("ping", e))?;
        Ok(())
    }

    fn state_key(&self, key: ConversationKey) -> String {
        state_key(&self.key_prefix, key)
    }

    fn data_key(&self, key: ConversationKey) -> String {
        data_key(&self.key_prefix, key)
    }

    fn ttl_secs(&self) -> u64 {
        self.ttl.as_secs().max(1)
    }
}

#[async_trait]
impl StateStore for RedisStateStore {
    async fn get(&self, key: ConversationKey) -> Result<State, StorageError> {
        let mut conn = self.conn.clone();
        let tag: Option<String> = conn
            .get(self.state_key(key))
            .await
            .map_err(|e| backend_error("get state", e))?;
        Ok(tag.map(State::from).unwrap_or_default())
    }

    async fn set(&self, key: ConversationKey, state: &State) -> Result<(), StorageError> {
        let mut conn = self.conn.clone();
        let _: () = conn
            .set_ex(self.state_key(key), state.as_str(), self.ttl_secs())
            .await
            .map_err(|e| backend_error("set state", e))?;
        Ok(())
    }

    async fn delete(&self, key: ConversationKey) -> Result<(), StorageError> {
        let mut conn = self.conn.clone();
        let _: () = conn
            .del(self.state_key(key))
            .await
            .map_err(|e| backend_error("delete state", e))?;
        Ok(())
    }

    async fn get_data(
        &self,
        key: ConversationKey,
        field: &str,
    ) -> Result<Option<Value>, StorageError> {
        let mut conn = self.conn.clone();
        let encoded: Option<String> = conn
            .hget(self.data_key(key), field)
            .await
            .map_err(|e| backend_error("get data", e))?;
        match encoded {
            Some(encoded) => Ok(Some(serde_json::from_str(&encoded)?)),
            None => Ok(None),
        }
    }

    async fn set_data(
        &self,
        key: ConversationKey,
        field: &str,
        value: Value,
    ) -> Result<(), StorageError> {
        let encoded = serde_json::to_string(&value)?;
        let data_key = self.data_key(key);
        let mut conn = self.conn.clone();
        let _: () = redis::pipe()
            .atomic()
            .hset(&data_key, field, encoded)
            .ignore()
            .expire(&data_key, self.ttl_secs() as i64)
            .ignore()
            .query_async(&mut conn)
            .await
            .map_err(|e| backend_error("set data", e))?;
        Ok(())
    }

    async fn clear_data(&self, key: ConversationKey) -> Result<(), StorageError> {
        let mut conn = self.conn.clone();
        let _: () = conn
            .del(self.data_key(key))
            .await
            .map_err(|e| backend_error("clear data", e))?;
        Ok(())
    }
}
