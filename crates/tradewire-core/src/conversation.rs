//! Conversations and their directory summary metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::ConversationId;
use crate::participant::Participant;

/// Whether a conversation is free-form chat or tied to a trade negotiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationKind {
    /// Free-form 1:1 chat.
    Direct,
    /// Chat attached to a trade negotiation.
    Trade,
}

/// A chat thread between two participants, mirrored from the remote service.
///
/// `last_message_preview` / `last_message_at` are denormalized from the
/// newest message for directory display and are never authoritative.
/// `unread_count` and `peer_is_typing` likewise come straight from the
/// remote payload.
///
/// Invariant: `is_completed` implies `is_locked`. Remote payloads are run
/// through [`Conversation::normalize`] on entry so the invariant holds even
/// if the service sends an inconsistent row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    /// Remote-assigned stable id.
    pub id: ConversationId,
    /// Direct chat or trade negotiation.
    pub kind: ConversationKind,
    /// Exactly the two parties of the 1:1 thread.
    pub participants: Vec<Participant>,
    /// Body of the newest message, for the directory row.
    pub last_message_preview: Option<String>,
    /// Timestamp of the newest message; drives directory ordering.
    pub last_message_at: Option<DateTime<Utc>>,
    /// Messages the local user has not seen yet.
    pub unread_count: u32,
    /// Whether the other party is currently typing.
    pub peer_is_typing: bool,
    /// True once the conversation no longer accepts new messages.
    pub is_locked: bool,
    /// True once a trade negotiation has been finalized. Implies locked.
    pub is_completed: bool,
    /// Opaque payload describing the trade in progress; display-only.
    pub trade_context: Option<serde_json::Value>,
}

impl Conversation {
    /// Create a conversation with empty summary metadata.
    pub fn new(id: impl Into<ConversationId>, kind: ConversationKind) -> Self {
        Self {
            id: id.into(),
            kind,
            participants: Vec::new(),
            last_message_preview: None,
            last_message_at: None,
            unread_count: 0,
            peer_is_typing: false,
            is_locked: false,
            is_completed: false,
            trade_context: None,
        }
    }

    /// Enforce `is_completed ⇒ is_locked` on a remote payload.
    pub fn normalize(mut self) -> Self {
        if self.is_completed {
            self.is_locked = true;
        }
        self
    }

    /// Whether the local user may still send messages here.
    pub fn is_sendable(&self) -> bool {
        !self.is_locked && !self.is_completed
    }

    /// Whether this is a trade negotiation thread.
    pub fn is_trade(&self) -> bool {
        self.kind == ConversationKind::Trade
    }
}
