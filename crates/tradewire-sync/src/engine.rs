//! SyncEngine — the presentation layer's single entry point.
//!
//! Composes the conversation directory, the open conversation's message
//! store, the polling scheduler, and the per-trade state machines. The
//! engine mutates; the presentation layer reads snapshots and subscribes to
//! [`SyncEvent`]s.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use dashmap::DashMap;
use tokio::sync::{RwLock, broadcast};
use tracing::{debug, info, warn};

use tradewire_core::{Conversation, ConversationId, Message};

use crate::config::SyncConfig;
use crate::directory::ConversationDirectory;
use crate::error::{SyncError, SyncResult};
use crate::poller::Poller;
use crate::remote::ChatService;
use crate::store::MessageStore;
use crate::trade::{Rating, TradeNegotiation};

/// Change notifications for the presentation layer.
///
/// Events are best-effort: a subscriber that lags past the channel capacity
/// misses events and should re-read the snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// The conversation directory was replaced with a fresh fetch.
    DirectoryReplaced,
    /// New messages were merged into the open conversation's store.
    MessagesMerged {
        /// The conversation whose store changed.
        conversation: ConversationId,
    },
    /// A trade was confirmed completed.
    TradeCompleted {
        /// The completed trade conversation.
        conversation: ConversationId,
    },
}

struct EngineInner<S> {
    service: S,
    directory: RwLock<ConversationDirectory>,
    /// Store for the currently open conversation, if any. Every merge takes
    /// the write lock, which serializes merges as required.
    open: RwLock<Option<MessageStore>>,
    /// State machines for trade conversations, kept across open/close cycles.
    trades: DashMap<ConversationId, TradeNegotiation>,
    poller: Poller,
    loading: AtomicBool,
    events: broadcast::Sender<SyncEvent>,
}

/// Chat/trade synchronization engine.
///
/// Cheap to clone; clones share state. Generic over the remote service so
/// tests can inject a scripted implementation.
pub struct SyncEngine<S: ChatService> {
    inner: Arc<EngineInner<S>>,
}

impl<S: ChatService> Clone for SyncEngine<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: ChatService> SyncEngine<S> {
    /// Create an engine with default configuration.
    pub fn new(service: S) -> Self {
        Self::with_config(service, SyncConfig::default())
    }

    /// Create an engine with custom configuration.
    pub fn with_config(service: S, config: SyncConfig) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity);
        Self {
            inner: Arc::new(EngineInner {
                service,
                directory: RwLock::new(ConversationDirectory::new()),
                open: RwLock::new(None),
                trades: DashMap::new(),
                poller: Poller::new(config.poll_interval),
                loading: AtomicBool::new(false),
                events,
            }),
        }
    }

    /// Fetch the full conversation directory and replace the local copy.
    ///
    /// Also seeds/updates the trade state machines from the fetched rows;
    /// a locally completed trade is never moved back to active by a stale
    /// remote row.
    pub async fn load_conversations(&self) -> SyncResult<Vec<Conversation>> {
        self.inner.loading.store(true, Ordering::SeqCst);
        let result = self.inner.service.fetch_conversations().await;
        self.inner.loading.store(false, Ordering::SeqCst);

        let fetched = result?;
        debug!(count = fetched.len(), "Fetched conversation directory");

        let snapshot = {
            let mut directory = self.inner.directory.write().await;
            directory.replace_all(fetched);
            directory.snapshot()
        };

        for conversation in &snapshot {
            if !conversation.is_trade() {
                continue;
            }
            match self.inner.trades.get_mut(&conversation.id) {
                Some(mut trade) => trade.absorb_remote(conversation),
                None => {
                    if let Some(trade) = TradeNegotiation::from_remote(conversation) {
                        self.inner.trades.insert(conversation.id.clone(), trade);
                    }
                }
            }
        }

        let _ = self.inner.events.send(SyncEvent::DirectoryReplaced);
        Ok(snapshot)
    }

    /// Open a conversation: clear its store, arm polling, and let the
    /// poller's immediate first tick issue the initial fetch.
    ///
    /// Only one conversation is open at a time; opening another replaces it
    /// and its timer. The call itself never waits on the network.
    pub async fn open_conversation(&self, id: &ConversationId) -> SyncResult<()> {
        {
            let directory = self.inner.directory.read().await;
            if directory.get(id).is_none() {
                return Err(SyncError::ConversationNotFound(id.clone()));
            }
        }

        {
            let mut open = self.inner.open.write().await;
            *open = Some(MessageStore::new(id.clone()));
        }

        let engine = self.clone();
        let conversation = id.clone();
        self.inner.poller.start(move |generation| {
            let engine = engine.clone();
            let conversation = conversation.clone();
            async move {
                engine.refresh_open(conversation, generation).await;
            }
        });

        info!(conversation = %id, "Conversation opened");
        Ok(())
    }

    /// Close the open conversation, disarming polling and dropping its
    /// store. Idempotent.
    pub async fn close_conversation(&self) {
        self.inner.poller.stop();
        let mut open = self.inner.open.write().await;
        if let Some(store) = open.take() {
            debug!(conversation = %store.conversation_id(), "Conversation closed");
        }
    }

    /// Send a message.
    ///
    /// Empty/whitespace content and locked or completed conversations are
    /// rejected locally, before any network call. On success the canonical
    /// server echo is merged into the open store like any polled batch and
    /// returned.
    pub async fn send_message(
        &self,
        id: &ConversationId,
        content: &str,
    ) -> SyncResult<Message> {
        let content = content.trim();
        if content.is_empty() {
            return Err(SyncError::EmptyMessage);
        }

        if let Some(trade) = self.inner.trades.get(id)
            && trade.is_completed()
        {
            return Err(SyncError::AlreadyCompleted(id.clone()));
        }

        {
            let directory = self.inner.directory.read().await;
            let conversation = directory
                .get(id)
                .ok_or_else(|| SyncError::ConversationNotFound(id.clone()))?;
            if conversation.is_completed {
                return Err(SyncError::AlreadyCompleted(id.clone()));
            }
            if conversation.is_locked {
                return Err(SyncError::ConversationLocked(id.clone()));
            }
        }

        let message = self.inner.service.post_message(id, content).await?;
        debug!(conversation = %id, message = %message.id, "Message posted");

        let mut open = self.inner.open.write().await;
        if let Some(store) = open.as_mut().filter(|s| s.conversation_id() == id)
            && store.merge(vec![message.clone()]) > 0
        {
            let _ = self.inner.events.send(SyncEvent::MessagesMerged {
                conversation: id.clone(),
            });
        }

        Ok(message)
    }

    /// Finalize a trade with a 1-5 satisfaction rating.
    ///
    /// Returns `Ok(true)` when the remote confirmed the completion,
    /// `Ok(false)` when the transition already happened (locally known or
    /// remotely rejected) — the caller should re-fetch to reconcile. On
    /// confirmation the conversation is marked completed and locked, and
    /// polling for it is disarmed.
    pub async fn complete_trade(&self, id: &ConversationId, points: u8) -> SyncResult<bool> {
        let rating = Rating::new(points)?;

        {
            let directory = self.inner.directory.read().await;
            let conversation = directory
                .get(id)
                .ok_or_else(|| SyncError::ConversationNotFound(id.clone()))?;
            if !conversation.is_trade() {
                return Err(SyncError::NotATrade(id.clone()));
            }
            let locally_completed = conversation.is_completed
                || self
                    .inner
                    .trades
                    .get(id)
                    .is_some_and(|trade| trade.is_completed());
            if locally_completed {
                debug!(conversation = %id, "Completion requested on already-completed trade");
                return Ok(false);
            }
        }

        let accepted = self
            .inner
            .service
            .post_trade_completion(id, rating)
            .await?;
        if !accepted {
            info!(conversation = %id, "Remote declined trade completion");
            return Ok(false);
        }

        self.inner
            .trades
            .entry(id.clone())
            .or_default()
            .complete();
        {
            let mut directory = self.inner.directory.write().await;
            directory.mark_completed(id);
        }
        {
            let open = self.inner.open.read().await;
            if open.as_ref().is_some_and(|s| s.conversation_id() == id) {
                self.inner.poller.stop();
            }
        }

        info!(conversation = %id, points, "Trade completed");
        let _ = self.inner.events.send(SyncEvent::TradeCompleted {
            conversation: id.clone(),
        });
        Ok(true)
    }

    /// Current directory snapshot, most recent activity first.
    pub async fn conversations(&self) -> Vec<Conversation> {
        self.inner.directory.read().await.snapshot()
    }

    /// Messages of the open conversation in display order. Empty when no
    /// conversation is open.
    pub async fn current_messages(&self) -> Vec<Message> {
        self.inner
            .open
            .read()
            .await
            .as_ref()
            .map(|store| store.messages())
            .unwrap_or_default()
    }

    /// Id of the open conversation, if any.
    pub async fn open_conversation_id(&self) -> Option<ConversationId> {
        self.inner
            .open
            .read()
            .await
            .as_ref()
            .map(|store| store.conversation_id().clone())
    }

    /// Whether a directory load is in flight.
    pub fn is_loading(&self) -> bool {
        self.inner.loading.load(Ordering::SeqCst)
    }

    /// Whether the open conversation is being polled.
    pub fn is_polling(&self) -> bool {
        self.inner.poller.is_armed()
    }

    /// Subscribe to change notifications.
    pub fn events(&self) -> broadcast::Receiver<SyncEvent> {
        self.inner.events.subscribe()
    }

    /// One poll tick: fetch the open conversation's messages and merge.
    ///
    /// Transport failures are swallowed here — a failed tick leaves the
    /// last known state in place and the next tick still fires. The merge
    /// re-checks the generation and target conversation under the write
    /// lock, so a result from a replaced timer is discarded, not merged.
    async fn refresh_open(&self, conversation: ConversationId, generation: u64) {
        let since = {
            let open = self.inner.open.read().await;
            open.as_ref()
                .filter(|s| s.conversation_id() == &conversation)
                .and_then(|s| s.newest_at())
        };

        let batch = match self
            .inner
            .service
            .fetch_messages(&conversation, since)
            .await
        {
            Ok(batch) => batch,
            Err(error) => {
                warn!(
                    conversation = %conversation,
                    error = %error,
                    "Poll tick failed; keeping last known state"
                );
                return;
            }
        };

        let mut open = self.inner.open.write().await;
        if generation != self.inner.poller.generation() {
            debug!(
                conversation = %conversation,
                generation,
                "Discarding fetch result from replaced timer"
            );
            return;
        }
        let Some(store) = open.as_mut().filter(|s| s.conversation_id() == &conversation)
        else {
            debug!(conversation = %conversation, "Discarding fetch for closed conversation");
            return;
        };

        let merged = store.merge(batch);
        if merged > 0 {
            debug!(conversation = %conversation, merged, "Merged polled messages");
            let _ = self.inner.events.send(SyncEvent::MessagesMerged {
                conversation,
            });
        }
    }
}
