use async_trait::async_trait;
use quizbot_core::{ConversationKey, State, StorageError};
use serde_json::Value;

/// Persistence for conversation state and scratch data, keyed by (chat, user).
///
/// Reads of a missing state return [`State::DEFAULT`]; reads of a missing scratch field return
/// `None`. Values round-trip through JSON, so a stored `5_i64` may come back as a JSON number
/// that callers decode as they see fit. Backend failures surface as [`StorageError`] and are never
/// retried here.
#[async_trait]
pub trait StateStore: Send + Sync {
    async fn get(&self, key: ConversationKey) -> Result<State, StorageError>;

    async fn set(&self, key: ConversationKey, state: &State) -> Result<(), StorageError>;

    /// Removes the state record. Scratch data is left as is.
    async fn delete(&self, key: ConversationKey) -> Result<(), StorageError>;

    async fn get_data(
        &self,
        key: ConversationKey,
        field: &str,
    ) -> Result<Option<Value>, StorageError>;

    /// Stores one scratch field; other fields of the same key are untouched.
    async fn set_data(
        &self,
        key: ConversationKey,
        field: &str,
        value: Value,
    ) -> Result<(), StorageError>;

    /// Removes every scratch field of the key. The state record is left as is.
    async fn clear_data(&self, key: ConversationKey) -> Result<(), StorageError>;
}
