//! State store configuration: backend selection, Redis connection, key prefix, TTL, sweep.

use anyhow::{bail, Result};
use std::env;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_KEY_PREFIX: &str = "fsm:";
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Which [`crate::StateStore`] implementation to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageBackend {
    #[default]
    Memory,
    Redis,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "memory" | "inmemory" | "" => Ok(StorageBackend::Memory),
            "redis" => Ok(StorageBackend::Redis),
            other => bail!("Unknown FSM_STORAGE backend: {}", other),
        }
    }
}

pub const DEFAULT_REDIS_CONNECT_RETRIES: usize = 2;
pub const DEFAULT_REDIS_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_REDIS_RESPONSE_TIMEOUT: Duration = Duration::from_secs(5);

/// Redis connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedisConfig {
    pub addr: String,
    pub password: Option<String>,
    pub db: i64,
    /// Reconnect attempts after the first failure, at startup and after a dropped connection.
    pub connect_retries: usize,
    /// Per-attempt TCP connect timeout.
    pub connect_timeout: Duration,
    /// Upper bound on a single command round trip.
    pub response_timeout: Duration,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:6379".to_string(),
            password: None,
            db: 0,
            connect_retries: DEFAULT_REDIS_CONNECT_RETRIES,
            connect_timeout: DEFAULT_REDIS_CONNECT_TIMEOUT,
            response_timeout: DEFAULT_REDIS_RESPONSE_TIMEOUT,
        }
    }
}

impl RedisConfig {
    /// Connection URL in the form `redis://[:password@]addr/db`.
    pub fn url(&self) -> String {
        match &self.password {
            Some(password) => format!("redis://:{}@{}/{}", password, self.addr, self.db),
            None => format!("redis://{}/{}", self.addr, self.db),
        }
    }
}

/// State store settings. `ttl` applies to the Redis backend, `sweep_interval` to the memory one.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub redis: RedisConfig,
    pub key_prefix: String,
    pub ttl: Duration,
    pub sweep_interval: Duration,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Memory,
            redis: RedisConfig::default(),
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            ttl: DEFAULT_TTL,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
        }
    }
}

impl StorageConfig {
    /// Load from environment variables; unset or unparsable numbers fall back to defaults.
    pub fn from_env() -> Result<Self> {
        let backend = match env::var("FSM_STORAGE") {
            Ok(value) => value.parse()?,
            Err(_) => StorageBackend::Memory,
        };
        let redis = RedisConfig {
            addr: env::var("REDIS_ADDR").unwrap_or_else(|_| RedisConfig::default().addr),
            password: env::var("REDIS_PASSWORD").ok().filter(|p| !p.is_empty()),
            db: env::var("REDIS_DB")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(0),
            connect_retries: env::var("REDIS_CONNECT_RETRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_REDIS_CONNECT_RETRIES),
            connect_timeout: env::var("REDIS_CONNECT_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_REDIS_CONNECT_TIMEOUT),
            response_timeout: env::var("REDIS_RESPONSE_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_REDIS_RESPONSE_TIMEOUT),
        };
        let key_prefix =
            env::var("FSM_KEY_PREFIX").unwrap_or_else(|_| DEFAULT_KEY_PREFIX.to_string());
        let ttl = env::var("FSM_TTL_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TTL);
        let sweep_interval = env::var("FSM_SWEEP_INTERVAL_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_SWEEP_INTERVAL);

        Ok(Self {
            backend,
            redis,
            key_prefix,
            ttl,
            sweep_interval,
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.ttl.is_zero() {
            bail!("FSM_TTL_SECS must be greater than zero");
        }
        if self.backend == StorageBackend::Memory && self.sweep_interval.is_zero() {
            bail!("FSM_SWEEP_INTERVAL_SECS must be greater than zero");
        }
        if self.backend == StorageBackend::Redis {
            if self.redis.addr.trim().is_empty() {
                bail!("REDIS_ADDR must not be empty");
            }
            if self.redis.connect_timeout.is_zero() || self.redis.response_timeout.is_zero() {
                bail!("REDIS_CONNECT_TIMEOUT_SECS and REDIS_RESPONSE_TIMEOUT_SECS must be greater than zero");
            }
        }
        Ok(())
    }
}
