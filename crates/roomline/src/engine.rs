//! Room engine facade: the surface the UI layer talks to.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, trace};

use crate::config::EngineConfig;
use crate::events::{MessageEvent, ReactionSummaryEvent, RoomEvent};
use crate::history::{self, HistorySource, LoaderState};
use crate::message::Message;
use crate::recovery::{self, RecoveryState};
use crate::serial::Serial;
use crate::store::OrderedStore;
use crate::window::{self, Anchor};

/// Mutable engine state for the current room context.
///
/// Created empty on room-context entry; [`RoomState::reset`] tears it back
/// down when the room context changes.
#[derive(Debug, Default)]
pub(crate) struct RoomState {
    pub store: OrderedStore,
    pub anchor: Anchor,
    pub loader: LoaderState,
    pub recovery: RecoveryState,
    /// Newest serial observed from the live stream; the target a gap
    /// recovery pass replays toward.
    pub last_seen: Option<Serial>,
    /// Room-context generation. A fetch captures it before suspending and
    /// re-checks on arrival, so a stale in-flight result is discarded
    /// instead of applied.
    pub epoch: u64,
}

impl RoomState {
    pub(crate) fn integrate(&mut self, batch: Vec<Message>, prepend: bool) -> bool {
        self.store.integrate(batch, prepend, &mut self.anchor)
    }

    fn reset(&mut self) {
        self.store.clear();
        self.anchor = Anchor::TailFollow;
        self.loader.reset();
        self.recovery = RecoveryState::Idle;
        self.last_seen = None;
        self.epoch += 1;
    }
}

/// Ordered, windowed message-stream engine for one room context.
///
/// The engine owns the ordered sequence, the serial index, and the anchor
/// exclusively; external callers only read derived snapshots (the current
/// window, the loading flags) and feed events in through the handler
/// methods. State lives behind one mutex, so a batch is applied as a
/// single atomic update and the lock is released only across history
/// fetches.
pub struct RoomEngine {
    source: Arc<dyn HistorySource>,
    config: EngineConfig,
    state: Mutex<RoomState>,
}

impl RoomEngine {
    /// Create an engine over the given history capability.
    pub fn new(source: Arc<dyn HistorySource>, config: EngineConfig) -> Self {
        Self {
            source,
            config,
            state: Mutex::new(RoomState::default()),
        }
    }

    // ========== Derived views ==========

    /// Current renderable slice of messages: ordered, contiguous, bounded.
    pub async fn window(&self) -> Vec<Message> {
        let state = self.state.lock().await;
        window::compute_window(state.store.messages(), state.anchor, &self.config.window).to_vec()
    }

    /// Store change counter; increments whenever the sequence changes.
    pub async fn version(&self) -> u64 {
        self.state.lock().await.store.version()
    }

    /// Number of messages currently held.
    pub async fn message_count(&self) -> usize {
        self.state.lock().await.store.len()
    }

    /// Whether a message with this serial is known.
    pub async fn contains(&self, serial: &Serial) -> bool {
        self.state.lock().await.store.contains(serial)
    }

    // ========== Event entry points ==========

    /// Dispatch one realtime event.
    pub async fn handle_event(&self, event: RoomEvent) -> bool {
        match event {
            RoomEvent::Message(event) => self.handle_message_event(event).await,
            RoomEvent::Reaction(event) => self.handle_reaction_event(&event).await,
            RoomEvent::Discontinuity => self.handle_discontinuity().await,
        }
    }

    /// Integrate a created/updated/deleted event from the live stream.
    pub async fn handle_message_event(&self, event: MessageEvent) -> bool {
        trace!(kind = ?event.kind, serial = %event.message.serial, "live message event");
        let mut state = self.state.lock().await;
        let serial = event.message.serial.clone();
        if state
            .last_seen
            .as_ref()
            .is_none_or(|seen| serial.after(seen))
        {
            state.last_seen = Some(serial);
        }
        state.integrate(vec![event.message], false)
    }

    /// Merge a reaction summary into its target message.
    pub async fn handle_reaction_event(&self, event: &ReactionSummaryEvent) -> bool {
        self.state.lock().await.store.apply_reaction(event)
    }

    /// React to a transport discontinuity: replay history backward until
    /// the last observed serial is found or history is exhausted. Dropped
    /// if a recovery pass is already running.
    pub async fn handle_discontinuity(&self) -> bool {
        recovery::recover(&self.state, self.source.as_ref(), &self.config).await
    }

    // ========== Manual integration ==========

    /// Integrate a batch of messages directly. `prepend` marks the batch
    /// as known to be older than the earliest held message.
    pub async fn update_messages(&self, batch: Vec<Message>, prepend: bool) -> bool {
        self.state.lock().await.integrate(batch, prepend)
    }

    // ========== Navigation ==========

    /// Reset the anchor to tail-follow so the window tracks the newest
    /// message.
    pub async fn show_latest_messages(&self) {
        self.state.lock().await.anchor = Anchor::TailFollow;
    }

    /// Move the anchor by `delta` positions. Clamps to the first message
    /// at the low end; scrolling to or past the newest message re-enables
    /// tail-follow.
    pub async fn scroll_by(&self, delta: i64) {
        let mut state = self.state.lock().await;
        state.anchor = window::scroll_target(state.anchor, delta, state.store.len());
    }

    /// Anchor the window at this serial. No-op when the serial is unknown;
    /// returns whether it was found.
    pub async fn show_messages_around(&self, serial: &Serial) -> bool {
        let mut state = self.state.lock().await;
        let Some(index) = state.store.position_of(serial) else {
            return false;
        };
        state.anchor = Anchor::At(index);
        true
    }

    // ========== Pagination ==========

    /// Whether a history fetch is in flight.
    pub async fn is_loading(&self) -> bool {
        self.state.lock().await.loader.loading
    }

    /// Whether a further older history page is known to exist.
    pub async fn has_more_history(&self) -> bool {
        self.state.lock().await.loader.has_more
    }

    /// Trigger the initial history load for this room context. Runs at
    /// most once per context; a failed attempt re-arms for retry. Returns
    /// whether the store changed.
    pub async fn ensure_history(&self) -> bool {
        history::initial_load(&self.state, self.source.as_ref(), &self.config).await
    }

    /// Fetch the next older history page. No-op while a fetch is in
    /// flight or when history is exhausted. Returns whether the store
    /// changed.
    pub async fn load_more_history(&self) -> bool {
        history::load_more(&self.state, self.source.as_ref(), &self.config).await
    }

    // ========== Lifecycle ==========

    /// Tear down the current room context: drop all messages, cursors,
    /// and latches, and return the anchor to tail-follow. Results of
    /// fetches still in flight for the old context are discarded when
    /// they arrive.
    pub async fn reset(&self) {
        self.state.lock().await.reset();
        debug!("room context reset");
    }
}
