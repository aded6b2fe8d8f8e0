//! Trade negotiation state machine.
//!
//! A trade-kind conversation is `Active` until one party finalizes it, at
//! which point it is `Completed` — a terminal state nothing transitions out
//! of. The conversation's `is_locked` flag is derived from completion, not
//! a state of its own. Direct conversations have no machine instance.

use serde::{Deserialize, Serialize};
use tradewire_core::Conversation;

use crate::error::{SyncError, SyncResult};

/// A 1-5 satisfaction rating attached to every trade completion.
///
/// Validated at construction so an out-of-range value can never reach the
/// network path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rating(u8);

impl Rating {
    /// Lowest accepted rating.
    pub const MIN: u8 = 1;
    /// Highest accepted rating.
    pub const MAX: u8 = 5;

    /// Validate and wrap a rating value.
    pub fn new(points: u8) -> SyncResult<Self> {
        if (Self::MIN..=Self::MAX).contains(&points) {
            Ok(Self(points))
        } else {
            Err(SyncError::RatingOutOfRange(points))
        }
    }

    /// The rating value.
    pub fn points(&self) -> u8 {
        self.0
    }
}

/// Negotiation states of a trade conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeState {
    /// Negotiation in progress; messages and completion are allowed.
    Active,
    /// Finalized. Terminal — no transition leaves this state.
    Completed,
}

/// State machine instance for one trade conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeNegotiation {
    state: TradeState,
}

impl TradeNegotiation {
    /// A fresh negotiation in the `Active` state.
    pub fn new() -> Self {
        Self {
            state: TradeState::Active,
        }
    }

    /// Build from a remote directory row. Returns `None` for direct
    /// conversations, which carry no state machine.
    pub fn from_remote(conversation: &Conversation) -> Option<Self> {
        if !conversation.is_trade() {
            return None;
        }
        let state = if conversation.is_completed {
            TradeState::Completed
        } else {
            TradeState::Active
        };
        Some(Self { state })
    }

    /// Current state.
    pub fn state(&self) -> TradeState {
        self.state
    }

    /// Whether completion is still a legal transition.
    pub fn is_active(&self) -> bool {
        self.state == TradeState::Active
    }

    /// Whether the negotiation has reached its terminal state.
    pub fn is_completed(&self) -> bool {
        self.state == TradeState::Completed
    }

    /// Transition to `Completed`. Idempotent on an already-terminal machine.
    pub fn complete(&mut self) {
        self.state = TradeState::Completed;
    }

    /// Fold in a remote directory row. Completion is monotonic: a remote row
    /// still reporting `active` never moves a locally completed machine back.
    pub fn absorb_remote(&mut self, conversation: &Conversation) {
        if conversation.is_completed {
            self.state = TradeState::Completed;
        }
    }
}

impl Default for TradeNegotiation {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tradewire_core::ConversationKind;

    #[test]
    fn test_rating_bounds() {
        assert!(Rating::new(0).is_err());
        assert!(Rating::new(6).is_err());
        for points in 1..=5 {
            assert_eq!(Rating::new(points).unwrap().points(), points);
        }
    }

    #[test]
    fn test_rating_error_carries_value() {
        match Rating::new(7) {
            Err(SyncError::RatingOutOfRange(7)) => {}
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_direct_conversation_has_no_machine() {
        let conv = Conversation::new("d1", ConversationKind::Direct);
        assert!(TradeNegotiation::from_remote(&conv).is_none());
    }

    #[test]
    fn test_initial_state_from_remote_flags() {
        let active = Conversation::new("t1", ConversationKind::Trade);
        assert!(TradeNegotiation::from_remote(&active).unwrap().is_active());

        let done = Conversation {
            is_completed: true,
            ..Conversation::new("t2", ConversationKind::Trade)
        };
        assert!(TradeNegotiation::from_remote(&done).unwrap().is_completed());
    }

    #[test]
    fn test_completed_is_terminal() {
        let mut trade = TradeNegotiation::new();
        trade.complete();
        assert!(trade.is_completed());

        // A stale remote row reporting active must not reactivate it.
        let stale = Conversation::new("t1", ConversationKind::Trade);
        trade.absorb_remote(&stale);
        assert!(trade.is_completed());

        trade.complete();
        assert!(trade.is_completed());
    }

    #[test]
    fn test_absorb_remote_completion() {
        let mut trade = TradeNegotiation::new();
        let done = Conversation {
            is_completed: true,
            ..Conversation::new("t1", ConversationKind::Trade)
        };
        trade.absorb_remote(&done);
        assert!(trade.is_completed());
    }
}
