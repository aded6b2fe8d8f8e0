//! # Tradewire Sync
//!
//! Chat and trade synchronization engine for the Tradewire client.
//!
//! Keeps a local view of conversations and messages consistent with the
//! remote marketplace service via periodic polling, and drives the
//! trade-negotiation state machine (active → completed, terminal) that
//! gates what the UI may do.
//!
//! ## Structure
//!
//! - [`SyncEngine`] — orchestrator; the only type the presentation layer
//!   talks to
//! - [`MessageStore`] — ordered, deduplicated messages for the open
//!   conversation
//! - [`ConversationDirectory`] — directory rows, replaced wholesale per load
//! - [`Poller`] — single polling timer with generation-tagged ticks
//! - [`TradeNegotiation`] — per-trade state machine
//! - [`ChatService`] — the remote service seam
//!
//! ## Example
//!
//! ```rust,ignore
//! use tradewire_sync::{SyncEngine, SyncEvent};
//!
//! let engine = SyncEngine::new(service);
//! let conversations = engine.load_conversations().await?;
//!
//! engine.open_conversation(&conversations[0].id).await?;
//! let mut events = engine.events();
//! while let Ok(event) = events.recv().await {
//!     if let SyncEvent::MessagesMerged { .. } = event {
//!         render(engine.current_messages().await);
//!     }
//! }
//! ```

pub mod config;
pub mod directory;
pub mod engine;
pub mod error;
pub mod poller;
pub mod remote;
pub mod store;
pub mod trade;

// Re-exports
pub use config::SyncConfig;
pub use directory::ConversationDirectory;
pub use engine::{SyncEngine, SyncEvent};
pub use error::{SyncError, SyncResult, TransportError};
pub use poller::Poller;
pub use remote::{ChatService, RemoteResult};
pub use store::MessageStore;
pub use trade::{Rating, TradeNegotiation, TradeState};
