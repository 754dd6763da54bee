//! Ordered, windowed message-timeline engine for chat rooms.
//!
//! `roomline` reconciles a realtime stream of chat events (creates, edits,
//! deletions, reaction summaries) with backward-paginated history into one
//! totally-ordered in-memory sequence, exposes a bounded window of that
//! sequence for rendering, and repairs gaps reported by the transport by
//! replaying history backward until the missing range is bridged.
//!
//! The engine owns no transport or persistence: the host feeds it
//! [`RoomEvent`]s and supplies a [`HistorySource`] capability for
//! pagination. See [`RoomEngine`] for the full surface.

pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod history;
pub mod message;
pub mod recovery;
pub mod serial;
pub mod store;
pub mod window;

pub use config::EngineConfig;
pub use engine::RoomEngine;
pub use error::{Error, Result};
pub use events::{MessageEvent, MessageEventKind, ReactionSummaryEvent, RoomEvent};
pub use history::{HistoryPage, HistorySource, PageCursor};
pub use message::{Message, MessageAction, MessageVersion, ReactionSummary, ReactionTally};
pub use serial::Serial;
pub use store::OrderedStore;
pub use window::{Anchor, WindowConfig, compute_window};
