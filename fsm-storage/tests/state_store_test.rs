//! Integration tests for [`fsm_storage::StateStore`] implementations.
//!
//! The same contract runs against the in-memory store and, when a server is available, Redis
//! (`REDIS_URL`, ignored by default).

use std::sync::Arc;
use std::time::Duration;

use fsm_storage::{MemoryStateStore, RedisStateStore, StateStore};
use quizbot_core::{ConversationKey, State};
use serde_json::json;

async fn assert_contract(store: Arc<dyn StateStore>, key: ConversationKey) {
    store.delete(key).await.unwrap();
    store.clear_data(key).await.unwrap();

    // Never-written keys read as the default state and have no scratch data.
    assert!(store.get(key).await.unwrap().is_default());
    assert_eq!(store.get_data(key, "login").await.unwrap(), None);

    store.set(key, &State::new("awaiting_login")).await.unwrap();
    assert_eq!(store.get(key).await.unwrap(), State::new("awaiting_login"));

    store.set(key, &State::new("awaiting_otp")).await.unwrap();
    assert_eq!(store.get(key).await.unwrap(), State::new("awaiting_otp"));

    store.set_data(key, "login", json!("alice")).await.unwrap();
    store
        .set_data(key, "attempts", json!({"count": 2, "last": [1, 2]}))
        .await
        .unwrap();
    assert_eq!(
        store.get_data(key, "login").await.unwrap(),
        Some(json!("alice"))
    );
    assert_eq!(
        store.get_data(key, "attempts").await.unwrap(),
        Some(json!({"count": 2, "last": [1, 2]}))
    );

    // clear_data leaves the state alone.
    store.clear_data(key).await.unwrap();
    assert_eq!(store.get_data(key, "login").await.unwrap(), None);
    assert_eq!(store.get(key).await.unwrap(), State::new("awaiting_otp"));

    // delete leaves the scratch map alone.
    store.set_data(key, "login", json!("alice")).await.unwrap();
    store.delete(key).await.unwrap();
    assert!(store.get(key).await.unwrap().is_default());
    assert_eq!(
        store.get_data(key, "login").await.unwrap(),
        Some(json!("alice"))
    );

    store.clear_data(key).await.unwrap();
}

/// **Test: In-memory store honours the StateStore contract.**
///
/// **Setup:** Fresh `MemoryStateStore`.
/// **Action:** get/set/delete/get_data/set_data/clear_data sequence.
/// **Expected:** Defaults for absent records; state and scratch are independent.
#[tokio::test]
async fn test_memory_store_contract() {
    let store = Arc::new(MemoryStateStore::new(Duration::from_secs(60)));
    assert_contract(store, ConversationKey::new(1, 2)).await;
}

/// **Test: Keys are isolated from each other.**
///
/// **Setup:** Same user in two chats.
/// **Action:** Set a state and a scratch field for one key only.
/// **Expected:** The other key still reads default / absent.
#[tokio::test]
async fn test_memory_store_isolates_keys() {
    let store = MemoryStateStore::new(Duration::from_secs(60));
    let private = ConversationKey::new(7, 7);
    let group = ConversationKey::new(-100, 7);

    store.set(private, &State::new("registered")).await.unwrap();
    store.set_data(private, "login", json!("bob")).await.unwrap();

    assert!(store.get(group).await.unwrap().is_default());
    assert_eq!(store.get_data(group, "login").await.unwrap(), None);
    assert_eq!(store.len().await, 1);
}

/// **Test: Redis store honours the StateStore contract, key layout and per-key TTLs.**
///
/// **Setup:** Redis at `REDIS_URL` (default `redis://127.0.0.1:6379/15`).
/// **Action:** Contract sequence, then inspect the raw keys and their TTLs around each write.
/// **Expected:** Same behaviour as memory; records live at `<prefix>state:<chat>:<user>` and
/// `<prefix>data:<chat>:<user>`; each write sets its own key's TTL and leaves the other alone.
#[tokio::test]
#[ignore = "requires a Redis server; set REDIS_URL and run with --ignored"]
async fn test_redis_store_contract() {
    let url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379/15".to_string());
    let prefix = "fsm-test:";
    let store = RedisStateStore::connect_url(&url, prefix, Duration::from_secs(120))
        .await
        .expect("Failed to connect to Redis");
    store.ping().await.expect("Redis ping failed");

    let key = ConversationKey::new(-4242, 99);
    assert_contract(Arc::new(store.clone()), key).await;

    let client = redis::Client::open(url.as_str()).unwrap();
    let mut conn = client.get_multiplexed_async_connection().await.unwrap();
    let state_key = "fsm-test:state:-4242:99";
    let data_key = "fsm-test:data:-4242:99";

    store.set(key, &State::new("awaiting_otp")).await.unwrap();
    let tag: Option<String> = redis::cmd("GET")
        .arg(state_key)
        .query_async(&mut conn)
        .await
        .unwrap();
    assert_eq!(tag.as_deref(), Some("awaiting_otp"));
    let state_ttl = ttl(&mut conn, state_key).await;
    assert!(state_ttl > 0 && state_ttl <= 120);

    // Shorten the state TTL by hand; a scratch write must not refresh it.
    let _: () = redis::cmd("EXPIRE")
        .arg(state_key)
        .arg(30)
        .query_async(&mut conn)
        .await
        .unwrap();
    store.set_data(key, "code", json!("123456")).await.unwrap();
    let encoded: Option<String> = redis::cmd("HGET")
        .arg(data_key)
        .arg("code")
        .query_async(&mut conn)
        .await
        .unwrap();
    assert_eq!(encoded.as_deref(), Some("\"123456\""));
    let data_ttl = ttl(&mut conn, data_key).await;
    assert!(data_ttl > 30 && data_ttl <= 120);
    assert!(ttl(&mut conn, state_key).await <= 30);

    // And a state write must not refresh the scratch TTL.
    let _: () = redis::cmd("EXPIRE")
        .arg(data_key)
        .arg(30)
        .query_async(&mut conn)
        .await
        .unwrap();
    store.set(key, &State::new("registered")).await.unwrap();
    assert!(ttl(&mut conn, state_key).await > 30);
    assert!(ttl(&mut conn, data_key).await <= 30);

    store.delete(key).await.unwrap();
    store.clear_data(key).await.unwrap();
}

async fn ttl(conn: &mut redis::aio::MultiplexedConnection, key: &str) -> i64 {
    redis::cmd("TTL").arg(key).query_async(conn).await.unwrap()
}
