//! Gap recovery: bridging missed realtime events with history replay.

use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::engine::RoomState;
use crate::history::{HistoryPage, HistorySource, PageCursor};
use crate::message::Message;
use crate::serial::Serial;

/// Recovery pass state. These are the only two states; a pass always
/// returns to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecoveryState {
    #[default]
    Idle,
    Recovering,
}

/// Whether `serial` appears in a newest-first page. Scans from the old
/// end of the page, where the recovery target sits once the page bridges
/// the gap.
fn contains_serial(items: &[Message], serial: &Serial) -> bool {
    items.iter().rev().any(|message| message.serial == *serial)
}

/// Run one recovery pass: fetch successively older pages starting from the
/// newest, integrating each, until the last observed serial is found or
/// history is exhausted.
///
/// At most one pass runs at a time; signals arriving while one is running
/// are dropped. The guard is released on every exit path. Returns whether
/// the store changed.
pub(crate) async fn recover(
    state: &Mutex<RoomState>,
    source: &dyn HistorySource,
    config: &EngineConfig,
) -> bool {
    let (epoch, target) = {
        let mut guard = state.lock().await;
        if guard.recovery == RecoveryState::Recovering {
            debug!("discontinuity signal dropped: recovery already running");
            return false;
        }
        guard.recovery = RecoveryState::Recovering;
        (guard.epoch, guard.last_seen.clone())
    };

    let mut cursor: Option<PageCursor> = None;
    let mut changed = false;
    loop {
        let result = source.query(cursor.as_ref(), config.page_size).await;

        let mut guard = state.lock().await;
        if guard.epoch != epoch {
            // Room context changed mid-pass; reset() already released the
            // guard for the new context.
            debug!("discarding recovery page from a previous room context");
            return changed;
        }
        let HistoryPage { items, next } = match result {
            Ok(page) => page,
            Err(err) => {
                warn!("history fetch during gap recovery failed: {err}");
                guard.recovery = RecoveryState::Idle;
                return changed;
            }
        };

        let found = target
            .as_ref()
            .is_some_and(|serial| contains_serial(&items, serial));
        // Recovery pages can span both sides of already-known messages;
        // the store's general insertion path repositions each one.
        changed |= guard.integrate(items, false);

        if found {
            debug!("gap recovery reached the last observed serial");
            guard.recovery = RecoveryState::Idle;
            return changed;
        }
        if target.is_none() {
            // Nothing observed yet: one latest page is the whole catch-up.
            guard.recovery = RecoveryState::Idle;
            return changed;
        }
        let Some(older) = next else {
            warn!("gap recovery exhausted history without finding the last observed serial");
            guard.recovery = RecoveryState::Idle;
            return changed;
        };
        cursor = Some(older);
    }
}
