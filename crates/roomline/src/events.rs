//! Realtime event types fed to the engine.
//!
//! The engine registers no listeners anywhere: an external dispatcher
//! (the transport adapter) constructs these events and calls the engine's
//! handler methods explicitly.

use serde::{Deserialize, Serialize};

use crate::message::{Message, ReactionSummary};
use crate::serial::Serial;

/// Kind of per-message lifecycle event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageEventKind {
    Created,
    Updated,
    Deleted,
}

/// A per-message lifecycle event from the realtime channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageEvent {
    pub kind: MessageEventKind,
    /// The message value after the event's operation was applied.
    pub message: Message,
}

/// A reaction summary snapshot for one target message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionSummaryEvent {
    /// Serial of the message the summary belongs to.
    pub message_serial: Serial,
    pub summary: ReactionSummary,
}

/// Union of everything the realtime channel can deliver.
///
/// `Discontinuity` signals that events between the last delivered one and
/// now may have been missed; it carries no payload because the engine
/// itself remembers the newest serial it has observed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RoomEvent {
    Message(MessageEvent),
    Reaction(ReactionSummaryEvent),
    Discontinuity,
}
