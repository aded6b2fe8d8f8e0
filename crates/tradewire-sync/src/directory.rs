//! Conversation directory bookkeeping.
//!
//! The directory is replaced wholesale on every successful
//! `load_conversations` — entries are cheap and order/freshness matter more
//! than row stability. Ordering is most-recent-activity first.

use tradewire_core::{Conversation, ConversationId};

/// Ordered list of conversations for directory display.
#[derive(Debug, Default)]
pub struct ConversationDirectory {
    entries: Vec<Conversation>,
}

impl ConversationDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the full directory with a fresh remote payload.
    ///
    /// Entries are normalized (`is_completed ⇒ is_locked`) and sorted by
    /// `last_message_at` descending. Conversations with no activity sort
    /// last; ties break on id so the order is deterministic.
    pub fn replace_all(&mut self, conversations: Vec<Conversation>) {
        let mut entries: Vec<Conversation> = conversations
            .into_iter()
            .map(Conversation::normalize)
            .collect();
        entries.sort_by(|a, b| match (a.last_message_at, b.last_message_at) {
            (Some(left), Some(right)) => right.cmp(&left).then_with(|| a.id.cmp(&b.id)),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.id.cmp(&b.id),
        });
        self.entries = entries;
    }

    /// Look up a conversation by id.
    pub fn get(&self, id: &ConversationId) -> Option<&Conversation> {
        self.entries.iter().find(|c| &c.id == id)
    }

    /// Flip a conversation to completed (and therefore locked) after a
    /// confirmed remote completion. Returns whether the entry existed.
    ///
    /// This is the one local mutation the directory accepts; everything
    /// else waits for the next full replace.
    pub fn mark_completed(&mut self, id: &ConversationId) -> bool {
        match self.entries.iter_mut().find(|c| &c.id == id) {
            Some(conv) => {
                conv.is_completed = true;
                conv.is_locked = true;
                true
            }
            None => false,
        }
    }

    /// Clone the current entries in display order.
    pub fn snapshot(&self) -> Vec<Conversation> {
        self.entries.clone()
    }

    /// Number of conversations listed.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the directory is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use tradewire_core::ConversationKind;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn conv(id: &str, last_at: Option<i64>) -> Conversation {
        Conversation {
            last_message_at: last_at.map(at),
            ..Conversation::new(id, ConversationKind::Direct)
        }
    }

    fn listed_ids(dir: &ConversationDirectory) -> Vec<String> {
        dir.snapshot()
            .iter()
            .map(|c| c.id.as_str().to_string())
            .collect()
    }

    #[test]
    fn test_replace_orders_most_recent_first() {
        let mut dir = ConversationDirectory::new();
        dir.replace_all(vec![conv("a", Some(10)), conv("b", Some(30)), conv("c", Some(20))]);
        assert_eq!(listed_ids(&dir), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_no_activity_sorts_last() {
        let mut dir = ConversationDirectory::new();
        dir.replace_all(vec![conv("idle", None), conv("busy", Some(10))]);
        assert_eq!(listed_ids(&dir), vec!["busy", "idle"]);
    }

    #[test]
    fn test_ties_and_empty_break_on_id() {
        let mut dir = ConversationDirectory::new();
        dir.replace_all(vec![
            conv("b", Some(10)),
            conv("a", Some(10)),
            conv("z", None),
            conv("y", None),
        ]);
        assert_eq!(listed_ids(&dir), vec!["a", "b", "y", "z"]);
    }

    #[test]
    fn test_replace_is_wholesale() {
        let mut dir = ConversationDirectory::new();
        dir.replace_all(vec![conv("a", Some(10)), conv("b", Some(20))]);
        dir.replace_all(vec![conv("c", Some(5))]);
        assert_eq!(listed_ids(&dir), vec!["c"]);
    }

    #[test]
    fn test_replace_normalizes_completion_lock() {
        let mut dir = ConversationDirectory::new();
        let inconsistent = Conversation {
            is_completed: true,
            is_locked: false,
            ..Conversation::new("t1", ConversationKind::Trade)
        };
        dir.replace_all(vec![inconsistent]);
        let row = dir.get(&ConversationId::new("t1")).unwrap();
        assert!(row.is_locked);
    }

    #[test]
    fn test_mark_completed_flips_both_flags() {
        let mut dir = ConversationDirectory::new();
        dir.replace_all(vec![Conversation::new("t1", ConversationKind::Trade)]);

        assert!(dir.mark_completed(&ConversationId::new("t1")));
        let row = dir.get(&ConversationId::new("t1")).unwrap();
        assert!(row.is_completed);
        assert!(row.is_locked);

        assert!(!dir.mark_completed(&ConversationId::new("missing")));
    }
}
