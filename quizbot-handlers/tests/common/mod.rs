//! Hand-written collaborators for handler tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use email_client::{EmailError, EmailSender, TemplateData};
use fsm_router::ConversationContext;
use fsm_storage::{MemoryStateStore, StateStore};
use quizbot_core::{Bot, Chat, ConversationKey, Message, OutgoingMessage, Result, User};
use quizbot_handlers::{HandlerComponents, OtpGenerator, VerificationConfig};
use tokio::sync::mpsc;
use user_storage::{RepositoryError, UserRecord, UserRepository};

pub const CHAT_ID: i64 = 456;
pub const USER_ID: i64 = 123;

/// Forwards every sent message to the test through a channel.
pub struct MockBot {
    sent_tx: mpsc::UnboundedSender<OutgoingMessage>,
}

impl MockBot {
    pub fn with_receiver() -> (Arc<Self>, mpsc::UnboundedReceiver<OutgoingMessage>) {
        let (sent_tx, sent_rx) = mpsc::unbounded_channel();
        (Arc::new(Self { sent_tx }), sent_rx)
    }
}

#[async_trait]
impl Bot for MockBot {
    async fn send(&self, message: OutgoingMessage) -> Result<()> {
        let _ = self.sent_tx.send(message);
        Ok(())
    }
}

/// In-memory repository that counts upserts.
#[derive(Default)]
pub struct MockUserRepository {
    pub users: Mutex<Vec<UserRecord>>,
    pub upserts: AtomicUsize,
}

#[async_trait]
impl UserRepository for MockUserRepository {
    async fn get_by_id(&self, id: &str) -> std::result::Result<Option<UserRecord>, RepositoryError> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.id == id).cloned())
    }

    async fn get_by_login(
        &self,
        login: &str,
    ) -> std::result::Result<Option<UserRecord>, RepositoryError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.login == login)
            .cloned())
    }

    async fn update_or_create(
        &self,
        user: &UserRecord,
    ) -> std::result::Result<UserRecord, RepositoryError> {
        self.upserts.fetch_add(1, Ordering::SeqCst);
        let mut users = self.users.lock().unwrap();
        match users.iter_mut().find(|u| u.login == user.login) {
            Some(existing) => {
                existing.roles |= user.roles;
                existing.telegram_id = user.telegram_id.or(existing.telegram_id);
                Ok(existing.clone())
            }
            None => {
                users.push(user.clone());
                Ok(user.clone())
            }
        }
    }
}

/// Records emails; fails every send while `fail` is set.
#[derive(Default)]
pub struct MockEmailSender {
    pub sent: Mutex<Vec<(String, TemplateData)>>,
    pub fail: AtomicBool,
}

#[async_trait]
impl EmailSender for MockEmailSender {
    async fn send(
        &self,
        recipient: &str,
        _subject: &str,
        data: &TemplateData,
    ) -> std::result::Result<(), EmailError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(EmailError::Api {
                status: 500,
                body: "relay down".to_string(),
            });
        }
        self.sent
            .lock()
            .unwrap()
            .push((recipient.to_string(), data.clone()));
        Ok(())
    }
}

/// Always returns the same code.
pub struct FixedOtpGenerator(pub &'static str);

impl OtpGenerator for FixedOtpGenerator {
    fn generate(&self) -> Result<String> {
        Ok(self.0.to_string())
    }
}

pub struct Harness {
    pub components: HandlerComponents,
    pub sent_rx: mpsc::UnboundedReceiver<OutgoingMessage>,
    pub users: Arc<MockUserRepository>,
    pub email: Arc<MockEmailSender>,
    pub store: Arc<dyn StateStore>,
}

impl Harness {
    pub fn new(config: VerificationConfig) -> Self {
        let (bot, sent_rx) = MockBot::with_receiver();
        let users = Arc::new(MockUserRepository::default());
        let email = Arc::new(MockEmailSender::default());
        let components = HandlerComponents {
            bot,
            users: users.clone(),
            email: email.clone(),
            otp: Arc::new(FixedOtpGenerator("482913")),
            verification: config,
            quiz_web_app_url: Some("https://quiz.example.com/app".to_string()),
        };
        Self {
            components,
            sent_rx,
            users,
            email,
            store: Arc::new(MemoryStateStore::without_sweep(Duration::from_secs(60))),
        }
    }

    pub fn context(&self) -> ConversationContext {
        ConversationContext::new(self.store.clone(), ConversationKey::new(CHAT_ID, USER_ID))
    }

    /// Next reply, failing the test if none arrives.
    pub async fn next_reply(&mut self) -> OutgoingMessage {
        tokio::time::timeout(Duration::from_secs(2), self.sent_rx.recv())
            .await
            .expect("timed out waiting for reply")
            .expect("bot channel closed")
    }
}

pub fn message(content: &str) -> Message {
    Message {
        id: format!("msg-{}", content),
        content: content.to_string(),
        user: User {
            id: USER_ID,
            username: Some("test_user".to_string()),
            first_name: Some("Test".to_string()),
            last_name: None,
        },
        chat: Chat {
            id: CHAT_ID,
            chat_type: "private".to_string(),
        },
        created_at: Utc::now(),
    }
}
