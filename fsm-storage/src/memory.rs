//! Volatile state store. Records live in process memory and are evicted by a periodic sweep once
//! they have not been read or written for twice the sweep interval.

use async_trait::async_trait;
use quizbot_core::{ConversationKey, State, StorageError};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::store::StateStore;

#[derive(Debug)]
struct Stamped<T> {
    value: T,
    last_access: Instant,
}

impl<T> Stamped<T> {
    fn new(value: T, now: Instant) -> Self {
        Self {
            value,
            last_access: now,
        }
    }

    fn touch(&mut self, now: Instant) -> &T {
        self.last_access = now;
        &self.value
    }
}

#[derive(Debug, Default)]
struct Records {
    states: HashMap<ConversationKey, Stamped<State>>,
    // Scratch values are kept JSON-encoded so reads behave like the durable backend.
    data: HashMap<ConversationKey, Stamped<HashMap<String, String>>>,
}

/// In-process [`StateStore`] behind a read/write lock.
///
/// State and scratch records carry separate access stamps, so each expires on its own. Reads
/// refresh the stamp too, which is why they take the write lock. The sweep
/// task holds a weak reference and stops once the last clone of the store is dropped.
#[derive(Debug, Clone)]
pub struct MemoryStateStore {
    records: Arc<RwLock<Records>>,
    sweep_interval: Duration,
}

impl MemoryStateStore {
    /// Creates the store and starts its sweep task on the current tokio runtime.
    ///
    /// A zero interval, or no runtime, means no sweep: records then live until deleted.
    pub fn new(sweep_interval: Duration) -> Self {
        let store = Self::without_sweep(sweep_interval);
        if sweep_interval.is_zero() {
            return store;
        }
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let records = Arc::downgrade(&store.records);
                handle.spawn(sweep_loop(records, sweep_interval));
            }
            Err(_) => warn!("no tokio runtime, in-memory state store will not sweep"),
        }
        store
    }

    /// Creates the store without a background sweep; call [`Self::sweep_expired`] manually.
    pub fn without_sweep(sweep_interval: Duration) -> Self {
        Self {
            records: Arc::new(RwLock::new(Records::default())),
            sweep_interval,
        }
    }

    /// Evicts records older than twice the sweep interval. Returns how many were removed.
    pub async fn sweep_expired(&self) -> usize {
        sweep(&self.records, Instant::now(), self.sweep_interval * 2).await
    }

    /// Number of keys holding a state record.
    pub async fn len(&self) -> usize {
        self.records.read().await.states.len()
    }

    pub async fn is_empty(&self) -> bool {
        let records = self.records.read().await;
        records.states.is_empty() && records.data.is_empty()
    }

    #[cfg(test)]
    async fn sweep_at(&self, now: Instant) -> usize {
        sweep(&self.records, now, self.sweep_interval * 2).await
    }
}

async fn sweep(records: &RwLock<Records>, now: Instant, max_age: Duration) -> usize {
    let mut records = records.write().await;
    let before = records.states.len() + records.data.len();
    records
        .states
        .retain(|_, slot| now.saturating_duration_since(slot.last_access) <= max_age);
    records
        .data
        .retain(|_, slot| now.saturating_duration_since(slot.last_access) <= max_age);
    before - (records.states.len() + records.data.len())
}

async fn sweep_loop(records: Weak<RwLock<Records>>, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    // The first tick completes immediately.
    ticker.tick().await;
    loop {
        ticker.tick().await;
        let Some(records) = records.upgrade() else {
            debug!("in-memory state store dropped, sweep stopped");
            break;
        };
        let evicted = sweep(&records, Instant::now(), interval * 2).await;
        if evicted > 0 {
            info!(evicted, "step: swept idle conversation records");
        }
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn get(&self, key: ConversationKey) -> Result<State, StorageError> {
        let now = Instant::now();
        let mut records = self.records.write().await;
        Ok(records
            .states
            .get_mut(&key)
            .map(|slot| slot.touch(now).clone())
            .unwrap_or_default())
    }

    async fn set(&self, key: ConversationKey, state: &State) -> Result<(), StorageError> {
        let mut records = self.records.write().await;
        records
            .states
            .insert(key, Stamped::new(state.clone(), Instant::now()));
        Ok(())
    }

    async fn delete(&self, key: ConversationKey) -> Result<(), StorageError> {
        self.records.write().await.states.remove(&key);
        Ok(())
    }

    async fn get_data(
        &self,
        key: ConversationKey,
        field: &str,
    ) -> Result<Option<Value>, StorageError> {
        let now = Instant::now();
        let mut records = self.records.write().await;
        match records
            .data
            .get_mut(&key)
            .and_then(|slot| slot.touch(now).get(field))
        {
            Some(encoded) => Ok(Some(serde_json::from_str(encoded)?)),
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
        let now = Instant::now();
        let mut records = self.records.write().await;
        let slot = records
            .data
            .entry(key)
            .or_insert_with(|| Stamped::new(HashMap::new(), now));
        slot.value.insert(field.to_string(), encoded);
        slot.last_access = now;
        Ok(())
    }

    async fn clear_data(&self, key: ConversationKey) -> Result<(), StorageError> {
        self.records.write().await.data.remove(&key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const KEY: ConversationKey = ConversationKey {
        chat_id: 10,
        user_id: 20,
    };

    #[tokio::test(start_paused = true)]
    async fn test_sweep_evicts_records_older_than_twice_the_interval() {
        let store = MemoryStateStore::without_sweep(Duration::from_secs(60));
        store.set(KEY, &State::new("awaiting_login")).await.unwrap();
        store.set_data(KEY, "login", json!("alice")).await.unwrap();

        let now = Instant::now();
        assert_eq!(store.sweep_at(now + Duration::from_secs(119)).await, 0);
        assert_eq!(store.get(KEY).await.unwrap(), State::new("awaiting_login"));

        assert_eq!(store.sweep_at(now + Duration::from_secs(121)).await, 2);
        assert!(store.get(KEY).await.unwrap().is_default());
        assert_eq!(store.get_data(KEY, "login").await.unwrap(), None);
        assert!(store.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_state_and_scratch_expire_independently() {
        let store = MemoryStateStore::without_sweep(Duration::from_secs(10));
        store.set(KEY, &State::new("registered")).await.unwrap();
        tokio::time::advance(Duration::from_secs(15)).await;
        store.set_data(KEY, "login", json!("alice")).await.unwrap();
        tokio::time::advance(Duration::from_secs(10)).await;

        assert_eq!(store.sweep_expired().await, 1);
        assert!(store.get(KEY).await.unwrap().is_default());
        assert_eq!(
            store.get_data(KEY, "login").await.unwrap(),
            Some(json!("alice"))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_data_refreshes_whole_scratch_map() {
        let store = MemoryStateStore::without_sweep(Duration::from_secs(10));
        store.set_data(KEY, "login", json!("alice")).await.unwrap();
        tokio::time::advance(Duration::from_secs(15)).await;
        store.set_data(KEY, "code", json!("123456")).await.unwrap();
        tokio::time::advance(Duration::from_secs(15)).await;

        assert_eq!(store.sweep_expired().await, 0);
        assert_eq!(
            store.get_data(KEY, "login").await.unwrap(),
            Some(json!("alice"))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_reads_keep_an_active_conversation_alive() {
        let store = MemoryStateStore::without_sweep(Duration::from_secs(60));
        store.set(KEY, &State::new("registered")).await.unwrap();
        store.set_data(KEY, "login", json!("alice")).await.unwrap();

        // Five minutes of read-only traffic, well past twice the interval since the last write.
        for _ in 0..10 {
            tokio::time::advance(Duration::from_secs(30)).await;
            store.get(KEY).await.unwrap();
            store.get_data(KEY, "login").await.unwrap();
        }

        assert_eq!(store.sweep_expired().await, 0);
        assert_eq!(store.get(KEY).await.unwrap(), State::new("registered"));
        assert_eq!(
            store.get_data(KEY, "login").await.unwrap(),
            Some(json!("alice"))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_reading_state_does_not_keep_scratch_alive() {
        let store = MemoryStateStore::without_sweep(Duration::from_secs(10));
        store.set(KEY, &State::new("registered")).await.unwrap();
        store.set_data(KEY, "login", json!("alice")).await.unwrap();
        tokio::time::advance(Duration::from_secs(15)).await;
        store.get(KEY).await.unwrap();
        tokio::time::advance(Duration::from_secs(10)).await;

        assert_eq!(store.sweep_expired().await, 1);
        assert_eq!(store.get(KEY).await.unwrap(), State::new("registered"));
        assert_eq!(store.get_data(KEY, "login").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_sweep_task_stops_after_store_is_dropped() {
        let store = MemoryStateStore::new(Duration::from_millis(5));
        let weak = Arc::downgrade(&store.records);
        drop(store);
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn test_new_without_runtime_does_not_panic() {
        let store = MemoryStateStore::new(Duration::from_secs(1));
        assert_eq!(store.sweep_interval, Duration::from_secs(1));
    }
}
