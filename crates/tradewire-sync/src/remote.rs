//! Contract to the remote marketplace chat service.
//!
//! The engine never talks to the wire directly; it consumes this trait and
//! tests inject a scripted implementation. All calls are request/response
//! over a reliable but latent channel — freshness comes from polling, not
//! from a persistent stream.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tradewire_core::{Conversation, ConversationId, Message};

use crate::error::TransportError;
use crate::trade::Rating;

/// Result type for remote calls.
pub type RemoteResult<T> = Result<T, TransportError>;

/// Remote chat/trade operations consumed by the sync engine.
#[async_trait]
pub trait ChatService: Send + Sync + 'static {
    /// Fetch the full conversation directory.
    async fn fetch_conversations(&self) -> RemoteResult<Vec<Conversation>>;

    /// Fetch messages for a conversation.
    ///
    /// `since` is a lower-bound hint the remote may use to trim the payload.
    /// The remote is free to ignore it and resend full history; the caller's
    /// merge must tolerate that.
    async fn fetch_messages(
        &self,
        conversation: &ConversationId,
        since: Option<DateTime<Utc>>,
    ) -> RemoteResult<Vec<Message>>;

    /// Post a message and return the canonical stored form, with
    /// server-assigned id and timestamp.
    async fn post_message(
        &self,
        conversation: &ConversationId,
        content: &str,
    ) -> RemoteResult<Message>;

    /// Ask the remote to finalize a trade with a satisfaction rating.
    ///
    /// Returns whether the completion was accepted. `Ok(false)` means the
    /// transition already happened on the remote side (e.g. the counterparty
    /// completed first) — the caller should re-fetch to reconcile.
    async fn post_trade_completion(
        &self,
        conversation: &ConversationId,
        rating: Rating,
    ) -> RemoteResult<bool>;
}
