//! Chat messages mirrored from the remote service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::{ConversationId, MessageId, ParticipantId};

/// A message within a conversation.
///
/// Messages are created remotely; the id and timestamp are server-assigned.
/// Timestamps are sortable but not guaranteed monotonic across senders, so
/// display order is `(sent_at, id)` — see [`Message::sort_key`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Unique within the conversation; the deduplication key.
    pub id: MessageId,
    /// Conversation this message belongs to.
    pub conversation_id: ConversationId,
    /// Who sent it.
    pub sender_id: ParticipantId,
    /// Message body.
    pub content: String,
    /// Server-assigned send time.
    pub sent_at: DateTime<Utc>,
}

impl Message {
    /// Create a message record.
    pub fn new(
        id: impl Into<MessageId>,
        conversation_id: impl Into<ConversationId>,
        sender_id: impl Into<ParticipantId>,
        content: impl Into<String>,
        sent_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            conversation_id: conversation_id.into(),
            sender_id: sender_id.into(),
            content: content.into(),
            sent_at,
        }
    }

    /// The deterministic ordering key: timestamp ascending, ties broken by
    /// the id's natural order.
    pub fn sort_key(&self) -> (DateTime<Utc>, &MessageId) {
        (self.sent_at, &self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn msg(id: &str, secs: i64) -> Message {
        Message::new(id, "conv-1", "u1", "hi", at(secs))
    }

    #[test]
    fn test_sort_key_orders_by_timestamp_first() {
        let older = msg("z", 10);
        let newer = msg("a", 20);
        assert!(older.sort_key() < newer.sort_key());
    }

    #[test]
    fn test_sort_key_ties_break_on_id() {
        let first = msg("m1", 10);
        let second = msg("m2", 10);
        assert!(first.sort_key() < second.sort_key());
    }

    #[test]
    fn test_serde_round_trip() {
        let m = msg("m1", 10);
        let json = serde_json::to_string(&m).unwrap();
        let back: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(back, m);
    }
}
