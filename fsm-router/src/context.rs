//! Per-message view of one conversation's state and scratch data.

use fsm_storage::StateStore;
use quizbot_core::{ConversationKey, Result, State, StorageError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Binds a [`StateStore`] to one [`ConversationKey`]. Holds no session data of its own; every call
/// goes to the store, so a context is cheap to build per message and safe to drop at any time.
#[derive(Clone)]
pub struct ConversationContext {
    store: Arc<dyn StateStore>,
    key: ConversationKey,
}

impl ConversationContext {
    pub fn new(store: Arc<dyn StateStore>, key: ConversationKey) -> Self {
        Self { store, key }
    }

    pub fn key(&self) -> ConversationKey {
        self.key
    }

    pub async fn current(&self) -> Result<State> {
        Ok(self.store.get(self.key).await?)
    }

    /// True when the current state equals any of `states`.
    pub async fn is_in_state(&self, states: &[State]) -> Result<bool> {
        let current = self.current().await?;
        Ok(states.contains(&current))
    }

    pub async fn set(&self, state: &State) -> Result<()> {
        Ok(self.store.set(self.key, state).await?)
    }

    /// Ends the conversation: removes the state record. Scratch data stays until cleared or expired.
    pub async fn finish(&self) -> Result<()> {
        Ok(self.store.delete(self.key).await?)
    }

    /// Moves back to the default state, keeping scratch data.
    pub async fn reset_state(&self) -> Result<()> {
        self.set(&State::DEFAULT).await
    }

    pub async fn get_data(&self, field: &str) -> Result<Option<Value>> {
        Ok(self.store.get_data(self.key, field).await?)
    }

    pub async fn set_data(&self, field: &str, value: Value) -> Result<()> {
        Ok(self.store.set_data(self.key, field, value).await?)
    }

    pub async fn clear_data(&self) -> Result<()> {
        Ok(self.store.clear_data(self.key).await?)
    }

    /// Reads a scratch field and decodes it into `T`.
    ///
    /// A present value of the wrong shape is a [`StorageError::TypeMismatch`], not `None`.
    pub async fn get_as<T: DeserializeOwned>(&self, field: &str) -> Result<Option<T>> {
        match self.get_data(field).await? {
            Some(value) => serde_json::from_value(value).map(Some).map_err(|e| {
                StorageError::TypeMismatch {
                    field: field.to_string(),
                    reason: e.to_string(),
                }
                .into()
            }),
            None => Ok(None),
        }
    }

    pub async fn set_as<T: Serialize + ?Sized>(&self, field: &str, value: &T) -> Result<()> {
        let value = serde_json::to_value(value).map_err(StorageError::from)?;
        self.set_data(field, value).await
    }

    /// Read-modify-write of one scratch field.
    ///
    /// Not atomic against other writers of the same key. Messages of one conversation are
    /// serialized by the dispatcher, which is what makes this safe inside handlers.
    pub async fn update_data<F>(&self, field: &str, f: F) -> Result<()>
    where
        F: FnOnce(Option<Value>) -> Value + Send,
    {
        let current = self.get_data(field).await?;
        self.set_data(field, f(current)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fsm_storage::MemoryStateStore;
    use quizbot_core::BotError;
    use serde::Deserialize;
    use serde_json::json;
    use std::time::Duration;

    fn context() -> ConversationContext {
        let store = Arc::new(MemoryStateStore::without_sweep(Duration::from_secs(60)));
        ConversationContext::new(store, ConversationKey::new(1, 1))
    }

    #[tokio::test]
    async fn test_finish_returns_to_default_and_keeps_scratch() {
        let ctx = context();
        ctx.set(&State::new("awaiting_otp")).await.unwrap();
        ctx.set_data("login", json!("alice")).await.unwrap();

        ctx.finish().await.unwrap();

        assert!(ctx.current().await.unwrap().is_default());
        assert_eq!(ctx.get_data("login").await.unwrap(), Some(json!("alice")));
    }

    #[tokio::test]
    async fn test_reset_state_keeps_scratch() {
        let ctx = context();
        ctx.set(&State::new("registered")).await.unwrap();
        ctx.set_data("login", json!("alice")).await.unwrap();

        ctx.reset_state().await.unwrap();

        assert_eq!(ctx.current().await.unwrap(), State::DEFAULT);
        assert_eq!(ctx.get_data("login").await.unwrap(), Some(json!("alice")));
    }

    #[tokio::test]
    async fn test_is_in_state() {
        let ctx = context();
        let login = State::new("awaiting_login");
        let otp = State::new("awaiting_otp");

        assert!(ctx.is_in_state(&[State::DEFAULT]).await.unwrap());
        ctx.set(&otp).await.unwrap();
        assert!(ctx.is_in_state(&[login.clone(), otp.clone()]).await.unwrap());
        assert!(!ctx.is_in_state(&[login]).await.unwrap());
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Attempts {
        count: u32,
    }

    #[tokio::test]
    async fn test_typed_round_trip() {
        let ctx = context();
        ctx.set_as("attempts", &Attempts { count: 2 }).await.unwrap();
        assert_eq!(
            ctx.get_as::<Attempts>("attempts").await.unwrap(),
            Some(Attempts { count: 2 })
        );
        assert_eq!(ctx.get_as::<Attempts>("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_typed_read_of_wrong_shape_is_type_mismatch() {
        let ctx = context();
        ctx.set_data("code", json!(123456)).await.unwrap();

        let err = ctx.get_as::<String>("code").await.unwrap_err();
        match err {
            BotError::Storage(StorageError::TypeMismatch { field, .. }) => assert_eq!(field, "code"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_update_data_applies_function() {
        let ctx = context();
        let bump = |current: Option<Value>| {
            json!(current.and_then(|v| v.as_u64()).unwrap_or(0) + 1)
        };
        ctx.update_data("attempts", bump).await.unwrap();
        ctx.update_data("attempts", bump).await.unwrap();
        assert_eq!(ctx.get_data("attempts").await.unwrap(), Some(json!(2)));
    }
}
