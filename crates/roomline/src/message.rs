//! Chat message data models.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::serial::Serial;

/// Lifecycle action a message value represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageAction {
    /// Original creation.
    Create,
    /// An edit of the original text or metadata.
    Update,
    /// A (soft) deletion.
    Delete,
}

impl fmt::Display for MessageAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => write!(f, "create"),
            Self::Update => write!(f, "update"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

impl std::str::FromStr for MessageAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "create" => Ok(Self::Create),
            "update" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            _ => Err(format!("Unknown message action: {}", s)),
        }
    }
}

/// Version of a message value: identifies the latest edit or delete
/// operation applied to it. Version serials share the message serial's
/// total order, so "newer operation" is a plain comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageVersion {
    /// Serial of the operation that produced this value.
    pub serial: Serial,
    /// When the operation happened.
    pub timestamp: DateTime<Utc>,
}

/// Tally for a single reaction name.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ReactionTally {
    /// Total number of reactions of this name.
    pub total: u64,
    /// Clients that contributed, when the upstream summary carries them.
    #[serde(default)]
    pub client_ids: Vec<String>,
}

/// Snapshot of all reactions attached to one message, keyed by reaction
/// name. Summaries arrive as authoritative snapshots from upstream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionSummary {
    #[serde(default)]
    pub totals: BTreeMap<String, ReactionTally>,
}

impl ReactionSummary {
    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    /// Union of two summaries, keeping the larger tally per reaction name.
    /// Symmetric: merging A with B equals merging B with A.
    pub fn merged(&self, other: &ReactionSummary) -> ReactionSummary {
        let mut totals = self.totals.clone();
        for (name, tally) in &other.totals {
            totals
                .entry(name.clone())
                .and_modify(|existing| {
                    if tally > existing {
                        *existing = tally.clone();
                    }
                })
                .or_insert_with(|| tally.clone());
        }
        ReactionSummary { totals }
    }
}

/// A chat message.
///
/// Messages are immutable value objects: an edit, deletion, or reaction
/// change is represented by producing a new merged value via
/// [`Message::merged_with`] or [`Message::with_reactions`], never by
/// mutating in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Totally-ordered identity key.
    pub serial: Serial,
    /// Client that authored the message.
    pub client_id: String,
    /// Message text.
    pub text: String,
    /// Arbitrary metadata attached by the author.
    #[serde(default)]
    pub metadata: serde_json::Map<String, Value>,
    /// When the message was created.
    pub created_at: DateTime<Utc>,
    /// Lifecycle action this value represents.
    pub action: MessageAction,
    /// Latest operation applied to this value.
    pub version: MessageVersion,
    /// Attached reaction summary.
    #[serde(default)]
    pub reactions: ReactionSummary,
}

impl Message {
    /// A freshly created message; its version starts at its own serial.
    pub fn new(
        serial: Serial,
        client_id: impl Into<String>,
        text: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        let version = MessageVersion {
            serial: serial.clone(),
            timestamp: created_at,
        };
        Self {
            serial,
            client_id: client_id.into(),
            text: text.into(),
            metadata: serde_json::Map::new(),
            created_at,
            action: MessageAction::Create,
            version,
            reactions: ReactionSummary::default(),
        }
    }

    /// Whether this value reflects an edit.
    pub fn is_updated(&self) -> bool {
        self.action == MessageAction::Update
    }

    /// Whether this value reflects a deletion.
    pub fn is_deleted(&self) -> bool {
        self.action == MessageAction::Delete
    }

    /// Copy of this message with the reaction summary replaced.
    pub fn with_reactions(mut self, reactions: ReactionSummary) -> Self {
        self.reactions = reactions;
        self
    }

    /// Combine this stored value with an incoming value for the same serial.
    ///
    /// The side with the greater version wins; reaction summaries are
    /// unioned. Merging a given pair yields the same output no matter which
    /// side is stored and which is incoming, and merging a value with
    /// itself yields itself.
    pub fn merged_with(&self, incoming: &Message) -> Message {
        debug_assert_eq!(self.serial, incoming.serial);
        let reactions = self.reactions.merged(&incoming.reactions);
        let base = if incoming.version.serial.after(&self.version.serial) {
            incoming
        } else {
            self
        };
        base.clone().with_reactions(reactions)
    }
}
