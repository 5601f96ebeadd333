//! Dispatch loop with per-conversation serialization.
//!
//! Each [`ConversationKey`] gets a worker task fed by an unbounded queue: messages of one
//! conversation are handled one at a time in arrival order, different conversations run in
//! parallel. A worker that stays idle for `idle_timeout` retires; the next message for its key
//! starts a fresh one. [`Dispatcher::handle_message`] goes through the same queue and waits for
//! the outcome.

use dashmap::DashMap;
use fsm_storage::StateStore;
use futures::{FutureExt, Stream, StreamExt};
use quizbot_core::{BotError, ConversationKey, Message, Result, Update};
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, instrument, warn};

use crate::command::CommandRouter;
use crate::context::ConversationContext;
use crate::state::StateRouter;

pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// One queued message; `reply` is set when a caller waits for the routing result.
struct Job {
    message: Message,
    reply: Option<oneshot::Sender<Result<()>>>,
}

struct Queue {
    worker_id: u64,
    tx: mpsc::UnboundedSender<Job>,
}

struct Inner {
    store: Arc<dyn StateStore>,
    commands: Arc<CommandRouter>,
    states: Arc<StateRouter>,
    queues: DashMap<ConversationKey, Queue>,
    next_worker_id: AtomicU64,
    idle_timeout: Duration,
}

/// Routes inbound updates: commands to the [`CommandRouter`], everything else to the
/// [`StateRouter`]. Cheap to clone; clones share workers and routers.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<Inner>,
}

impl Dispatcher {
    pub fn new(
        store: Arc<dyn StateStore>,
        commands: Arc<CommandRouter>,
        states: Arc<StateRouter>,
    ) -> Self {
        Self::with_idle_timeout(store, commands, states, DEFAULT_IDLE_TIMEOUT)
    }

    pub fn with_idle_timeout(
        store: Arc<dyn StateStore>,
        commands: Arc<CommandRouter>,
        states: Arc<StateRouter>,
        idle_timeout: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                commands,
                states,
                queues: DashMap::new(),
                next_worker_id: AtomicU64::new(0),
                idle_timeout,
            }),
        }
    }

    /// Number of conversations that currently have a live worker.
    pub fn active_conversations(&self) -> usize {
        self.inner.queues.len()
    }

    /// Enqueues the update's message on its conversation's worker and returns immediately.
    /// Updates without a user message are skipped.
    pub fn dispatch(&self, update: Update) {
        let Some(message) = update.message else {
            debug!(update_id = %update.id, "update without message skipped");
            return;
        };
        self.enqueue(Job {
            message,
            reply: None,
        });
    }

    fn enqueue(&self, mut job: Job) {
        let key = job.message.conversation_key();
        loop {
            // Sending under the entry lock orders this against a worker retiring the queue.
            let entry = self
                .inner
                .queues
                .entry(key)
                .or_insert_with(|| Self::spawn_worker(self.inner.clone(), key));
            let worker_id = entry.worker_id;
            match entry.tx.send(job) {
                Ok(()) => return,
                Err(mpsc::error::SendError(returned)) => {
                    drop(entry);
                    warn!(
                        chat_id = key.chat_id,
                        user_id = key.user_id,
                        "conversation worker gone, restarting"
                    );
                    self.inner
                        .queues
                        .remove_if(&key, |_, queue| queue.worker_id == worker_id);
                    job = returned;
                }
            }
        }
    }

    /// Feeds every update of `updates` to [`Self::dispatch`] until the stream ends.
    pub async fn run<S>(&self, updates: S)
    where
        S: Stream<Item = Update>,
    {
        futures::pin_mut!(updates);
        info!("step: dispatcher started");
        while let Some(update) = updates.next().await {
            self.dispatch(update);
        }
        info!("step: dispatcher input ended");
    }

    /// Queues one message behind any pending messages of its conversation and waits until it has
    /// been routed, returning the handler's result.
    #[instrument(skip_all, fields(chat_id = message.chat.id, user_id = message.user.id, message_id = %message.id))]
    pub async fn handle_message(&self, message: &Message) -> Result<()> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.enqueue(Job {
            message: message.clone(),
            reply: Some(reply_tx),
        });
        reply_rx.await.map_err(|_| {
            BotError::Dispatch(format!(
                "conversation worker stopped before handling message {}",
                message.id
            ))
        })?
    }

    fn spawn_worker(inner: Arc<Inner>, key: ConversationKey) -> Queue {
        let (tx, rx) = mpsc::unbounded_channel();
        let worker_id = inner.next_worker_id.fetch_add(1, Ordering::Relaxed);
        tokio::spawn(process_queue_loop(inner, key, worker_id, rx));
        Queue { worker_id, tx }
    }
}

async fn route(inner: &Inner, message: &Message) -> Result<()> {
    let ctx = ConversationContext::new(inner.store.clone(), message.conversation_key());
    if message.is_command() {
        inner.commands.handle_command(message, &ctx).await
    } else {
        inner.states.process_update(message, &ctx).await
    }
}

async fn process_queue_loop(
    inner: Arc<Inner>,
    key: ConversationKey,
    worker_id: u64,
    mut rx: mpsc::UnboundedReceiver<Job>,
) {
    debug!(chat_id = key.chat_id, user_id = key.user_id, worker_id, "conversation worker started");
    loop {
        match tokio::time::timeout(inner.idle_timeout, rx.recv()).await {
            Ok(Some(Job { message, reply })) => {
                info!(
                    chat_id = key.chat_id,
                    user_id = key.user_id,
                    message_id = %message.id,
                    "step: dispatch message"
                );
                let result = match AssertUnwindSafe(route(&inner, &message)).catch_unwind().await {
                    Ok(result) => result,
                    Err(_) => Err(BotError::Dispatch(format!(
                        "handler panicked on message {}",
                        message.id
                    ))),
                };
                match reply {
                    Some(reply) => {
                        let _ = reply.send(result);
                    }
                    None => {
                        if let Err(e) = result {
                            error!(
                                error = %e,
                                chat_id = key.chat_id,
                                user_id = key.user_id,
                                message_id = %message.id,
                                "Failed to handle message"
                            );
                        }
                    }
                }
            }
            Ok(None) => break,
            Err(_) => {
                // Retire only when nothing is queued; senders hold the same lock.
                let retired = inner
                    .queues
                    .remove_if(&key, |_, queue| queue.worker_id == worker_id && rx.is_empty())
                    .is_some();
                if retired {
                    break;
                }
            }
        }
    }
    debug!(chat_id = key.chat_id, user_id = key.user_id, worker_id, "conversation worker stopped");
}
