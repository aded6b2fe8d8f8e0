//! Ordered, deduplicated message storage for the open conversation.
//!
//! Merging is purely additive: a batch never replaces what is already
//! shown, so a stale poll response racing a faster one cannot regress the
//! display. Dedup is strictly by message id — two sends with identical text
//! and timestamp but distinct ids are both kept, and a retried send with
//! the same id is dropped.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use tradewire_core::{ConversationId, Message, MessageId};
use tracing::warn;

/// Ordering key: timestamp ascending, ties broken by the id's natural order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct MessageKey {
    sent_at: DateTime<Utc>,
    id: MessageId,
}

impl MessageKey {
    fn of(message: &Message) -> Self {
        Self {
            sent_at: message.sent_at,
            id: message.id.clone(),
        }
    }
}

/// Message store for a single conversation.
///
/// Created when the conversation is opened and dropped when it is closed —
/// this is a view mirror, not a durable cache.
#[derive(Debug)]
pub struct MessageStore {
    conversation_id: ConversationId,
    /// Messages in display order, keyed by `(sent_at, id)`.
    ordered: BTreeMap<MessageKey, Message>,
    /// Ids already present, across all merges.
    seen: HashSet<MessageId>,
}

impl MessageStore {
    /// Create an empty store for a conversation.
    pub fn new(conversation_id: ConversationId) -> Self {
        Self {
            conversation_id,
            ordered: BTreeMap::new(),
            seen: HashSet::new(),
        }
    }

    /// The conversation this store mirrors.
    pub fn conversation_id(&self) -> &ConversationId {
        &self.conversation_id
    }

    /// Merge a fetched batch, returning how many messages were new.
    ///
    /// Messages whose id is already present are discarded. Messages
    /// addressed to a different conversation are dropped with a warning —
    /// they indicate a routing bug upstream, never data to display here.
    pub fn merge(&mut self, batch: Vec<Message>) -> usize {
        let mut inserted = 0;
        for message in batch {
            if message.conversation_id != self.conversation_id {
                warn!(
                    expected = %self.conversation_id,
                    got = %message.conversation_id,
                    message = %message.id,
                    "Dropping message addressed to another conversation"
                );
                continue;
            }
            if !self.seen.insert(message.id.clone()) {
                continue;
            }
            self.ordered.insert(MessageKey::of(&message), message);
            inserted += 1;
        }
        inserted
    }

    /// The messages in display order. This is the only externally visible
    /// order — there is no separate pending lane.
    pub fn messages(&self) -> Vec<Message> {
        self.ordered.values().cloned().collect()
    }

    /// Timestamp of the newest stored message, used as the `since` hint for
    /// the next fetch.
    pub fn newest_at(&self) -> Option<DateTime<Utc>> {
        self.ordered.keys().next_back().map(|k| k.sent_at)
    }

    /// Whether a message id is already stored.
    pub fn contains(&self, id: &MessageId) -> bool {
        self.seen.contains(id)
    }

    /// Number of stored messages.
    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    /// Whether the store holds no messages.
    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}
