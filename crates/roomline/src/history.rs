//! Backward-paginated history loading.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::engine::RoomState;
use crate::error::Result;
use crate::message::Message;

/// Opaque continuation handle for fetching the next older page.
///
/// Exists only while a further older page is known to be available;
/// discarded when exhausted or when the room context changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageCursor(String);

impl PageCursor {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One page of history. Items are newest-first, consistent with backward
/// pagination.
#[derive(Debug, Clone)]
pub struct HistoryPage {
    pub items: Vec<Message>,
    /// Continuation for the next older page, if one exists.
    pub next: Option<PageCursor>,
}

impl HistoryPage {
    pub fn has_more(&self) -> bool {
        self.next.is_some()
    }
}

/// Backward-paginated history query capability supplied by the host.
///
/// `before = None` starts from the newest message; otherwise the page
/// holds messages older than the cursor's position.
#[async_trait]
pub trait HistorySource: Send + Sync {
    async fn query(&self, before: Option<&PageCursor>, limit: usize) -> Result<HistoryPage>;
}

/// Pagination state held by the engine for the current room context.
#[derive(Debug, Default)]
pub(crate) struct LoaderState {
    /// A fetch is in flight.
    pub loading: bool,
    /// A further older page is known to exist.
    pub has_more: bool,
    /// The initial load has been triggered for this room context.
    pub attempted: bool,
    /// Continuation for the next older page.
    pub cursor: Option<PageCursor>,
}

impl LoaderState {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// First activation for a room context: fetch one page sized to cover the
/// window, oldest-first it, and prepend it into the store.
///
/// Runs at most once per room context; a failed attempt re-arms the latch
/// so a later trigger can retry. Returns whether the store changed.
pub(crate) async fn initial_load(
    state: &Mutex<RoomState>,
    source: &dyn HistorySource,
    config: &EngineConfig,
) -> bool {
    let epoch = {
        let mut guard = state.lock().await;
        if guard.loader.loading || guard.loader.attempted {
            return false;
        }
        guard.loader.loading = true;
        guard.loader.attempted = true;
        guard.epoch
    };

    let result = source.query(None, config.initial_page_size()).await;

    let mut guard = state.lock().await;
    if guard.epoch != epoch {
        debug!("discarding initial history page from a previous room context");
        return false;
    }
    guard.loader.loading = false;
    match result {
        Ok(page) => {
            if page.items.is_empty() {
                debug!("initial history page was empty");
            }
            guard.loader.has_more = page.next.is_some();
            guard.loader.cursor = page.next;
            let mut items = page.items;
            items.reverse(); // newest-first -> oldest-first
            guard.integrate(items, true)
        }
        Err(err) => {
            warn!("initial history load failed: {err}");
            guard.loader.attempted = false;
            false
        }
    }
}

/// Fetch the next older page and prepend it into the store.
///
/// Guarded: a no-op while a fetch is in flight, when no further page
/// exists, or when no continuation is held. On failure `has_more` and the
/// cursor are left untouched so the caller can retry. Returns whether the
/// store changed.
pub(crate) async fn load_more(
    state: &Mutex<RoomState>,
    source: &dyn HistorySource,
    config: &EngineConfig,
) -> bool {
    let (epoch, cursor) = {
        let mut guard = state.lock().await;
        if guard.loader.loading || !guard.loader.has_more {
            return false;
        }
        let Some(cursor) = guard.loader.cursor.clone() else {
            return false;
        };
        guard.loader.loading = true;
        (guard.epoch, cursor)
    };

    let result = source.query(Some(&cursor), config.page_size).await;

    let mut guard = state.lock().await;
    if guard.epoch != epoch {
        debug!("discarding history page from a previous room context");
        return false;
    }
    guard.loader.loading = false;
    match result {
        Ok(page) => {
            if page.items.is_empty() {
                debug!("history returned an empty page; treating it as exhausted");
            }
            guard.loader.has_more = page.next.is_some();
            guard.loader.cursor = page.next;
            let mut items = page.items;
            items.reverse();
            guard.integrate(items, true)
        }
        Err(err) => {
            warn!("history page load failed: {err}");
            false
        }
    }
}
