//! Ordered message store: the authoritative in-memory sequence.

use std::collections::HashSet;

use tracing::debug;

use crate::events::ReactionSummaryEvent;
use crate::message::Message;
use crate::serial::Serial;
use crate::window::Anchor;

/// Owns the full ordered sequence of known messages.
///
/// Invariant: the sequence is strictly increasing by serial with no
/// duplicates. All other components read through this API; the store is
/// single-writer and a batch passed to [`OrderedStore::integrate`] is
/// applied as one atomic update.
#[derive(Debug, Default)]
pub struct OrderedStore {
    sequence: Vec<Message>,
    /// Serials present in the sequence, for O(1) new-vs-merge decisions.
    known: HashSet<Serial>,
    version: u64,
}

impl OrderedStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// The full ordered sequence.
    pub fn messages(&self) -> &[Message] {
        &self.sequence
    }

    pub fn first(&self) -> Option<&Message> {
        self.sequence.first()
    }

    pub fn last(&self) -> Option<&Message> {
        self.sequence.last()
    }

    /// Change counter; increments on every observable mutation. Downstream
    /// consumers use it to decide whether to recompute derived views.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn contains(&self, serial: &Serial) -> bool {
        self.known.contains(serial)
    }

    /// Index of `serial` in the sequence, if known.
    pub fn position_of(&self, serial: &Serial) -> Option<usize> {
        if !self.known.contains(serial) {
            return None;
        }
        self.sequence
            .binary_search_by(|message| message.serial.cmp(serial))
            .ok()
    }

    /// Discard all messages and reset the serial index.
    pub fn clear(&mut self) {
        self.sequence.clear();
        self.known.clear();
        self.version += 1;
    }

    /// Integrate a batch of messages.
    ///
    /// Known serials are merged in place (replaced only when the merge
    /// differs from the stored value); unknown serials are inserted at
    /// their ordered position, with an O(1) fast path for live tail
    /// appends and, when `prepend` holds, for head inserts of older
    /// history. A concrete anchor shifts right for every insertion at or
    /// before its index so it keeps denoting the same logical message.
    ///
    /// Returns whether anything changed.
    pub fn integrate<I>(&mut self, batch: I, prepend: bool, anchor: &mut Anchor) -> bool
    where
        I: IntoIterator<Item = Message>,
    {
        let mut changed = false;
        for message in batch {
            changed |= self.integrate_one(message, prepend, anchor);
        }
        if changed {
            self.version += 1;
        }
        changed
    }

    fn integrate_one(&mut self, incoming: Message, prepend: bool, anchor: &mut Anchor) -> bool {
        if self.known.contains(&incoming.serial) {
            return self.merge_known(&incoming);
        }

        let index = self.insertion_index(&incoming, prepend);
        self.known.insert(incoming.serial.clone());
        self.sequence.insert(index, incoming);
        if let Anchor::At(position) = anchor
            && index <= *position
        {
            *position += 1;
        }
        true
    }

    fn merge_known(&mut self, incoming: &Message) -> bool {
        let Some(index) = self.position_of(&incoming.serial) else {
            // Serial index and sequence disagree; keep the invariant by
            // inserting instead.
            let index = self.insertion_index(incoming, false);
            self.sequence.insert(index, incoming.clone());
            return true;
        };
        let merged = self.sequence[index].merged_with(incoming);
        if merged == self.sequence[index] {
            return false;
        }
        self.sequence[index] = merged;
        true
    }

    fn insertion_index(&self, incoming: &Message, prepend: bool) -> usize {
        if prepend
            && self
                .sequence
                .first()
                .is_none_or(|first| incoming.serial.before(&first.serial))
        {
            return 0;
        }
        if self
            .sequence
            .last()
            .is_none_or(|last| incoming.serial.after(&last.serial))
        {
            return self.sequence.len();
        }
        match self
            .sequence
            .binary_search_by(|message| message.serial.cmp(&incoming.serial))
        {
            Ok(index) | Err(index) => index,
        }
    }

    /// Merge a reaction summary into its target message.
    ///
    /// Events for unknown serials are dropped: a later full history fetch
    /// carries the up-to-date summary.
    pub fn apply_reaction(&mut self, event: &ReactionSummaryEvent) -> bool {
        let Some(index) = self.position_of(&event.message_serial) else {
            debug!(
                serial = %event.message_serial,
                "reaction summary for unknown message dropped"
            );
            return false;
        };
        let updated = self.sequence[index]
            .clone()
            .with_reactions(event.summary.clone());
        if updated == self.sequence[index] {
            return false;
        }
        self.sequence[index] = updated;
        self.version += 1;
        true
    }
}
