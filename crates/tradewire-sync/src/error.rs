//! Error taxonomy for the sync engine.
//!
//! Validation errors are raised before any network call; transport errors
//! wrap failures from the remote service. A completion rejected by the
//! remote because it already happened is not an error at all —
//! `complete_trade` reports it as `Ok(false)`.

use thiserror::Error;
use tradewire_core::ConversationId;

/// Result type alias for engine operations.
pub type SyncResult<T> = std::result::Result<T, SyncError>;

/// Transport-level failure from the remote marketplace service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The request did not complete in time.
    #[error("request timed out")]
    Timeout,

    /// Connection-level failure.
    #[error("network error: {0}")]
    Network(String),

    /// The remote answered with a non-success status.
    #[error("remote returned {status}: {message}")]
    Status { status: u16, message: String },
}

/// Errors surfaced by the sync engine.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A remote call failed in transit.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Message content is empty or whitespace-only.
    #[error("message content is empty")]
    EmptyMessage,

    /// Satisfaction rating outside the accepted range.
    #[error("rating {0} is out of range (expected 1-5)")]
    RatingOutOfRange(u8),

    /// Trade completion requested on a direct conversation.
    #[error("conversation {0} is not a trade")]
    NotATrade(ConversationId),

    /// The conversation no longer accepts messages.
    #[error("conversation {0} is locked")]
    ConversationLocked(ConversationId),

    /// The trade negotiation has already been finalized.
    #[error("trade {0} is already completed")]
    AlreadyCompleted(ConversationId),

    /// Unknown conversation id.
    #[error("conversation not found: {0}")]
    ConversationNotFound(ConversationId),
}

impl SyncError {
    /// Whether this error came from the transport layer rather than local
    /// validation. Transport errors are worth retrying; validation errors
    /// are not.
    pub fn is_transport(&self) -> bool {
        matches!(self, SyncError::Transport(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SyncError::RatingOutOfRange(9);
        assert!(err.to_string().contains('9'));

        let err = SyncError::ConversationNotFound(ConversationId::new("conv-7"));
        assert!(err.to_string().contains("conv-7"));
    }

    #[test]
    fn test_transport_classification() {
        let transport = SyncError::from(TransportError::Timeout);
        assert!(transport.is_transport());
        assert!(!SyncError::EmptyMessage.is_transport());
    }
}
