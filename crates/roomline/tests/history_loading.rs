//! History pagination: initial load, load-more guards, failure recovery.

use std::sync::Arc;

use roomline::{EngineConfig, Error, RoomEngine, Serial, WindowConfig};

mod common;
use common::{page, ScriptedSource};

fn config() -> EngineConfig {
    EngineConfig {
        window: WindowConfig {
            window_size: 4,
            overscan: 1,
        },
        page_size: 5,
    }
}

#[tokio::test]
async fn test_initial_load_populates_oldest_first() {
    let source = Arc::new(ScriptedSource::new(vec![Ok(page(
        &["0005", "0004", "0003", "0002", "0001"],
        Some("older"),
    ))]));
    let engine = RoomEngine::new(source.clone(), config());

    assert!(engine.ensure_history().await);
    assert_eq!(engine.message_count().await, 5);
    assert!(engine.has_more_history().await);
    assert!(!engine.is_loading().await);

    let window = engine.window().await;
    assert_eq!(window.first().unwrap().serial, Serial::new("0002"));
    assert_eq!(window.last().unwrap().serial, Serial::new("0005"));

    // The initial load runs at most once per room context.
    assert!(!engine.ensure_history().await);
    assert_eq!(source.calls(), 1);
}

#[tokio::test]
async fn test_load_more_prepends_older_pages() {
    let source = Arc::new(ScriptedSource::new(vec![
        Ok(page(&["0010", "0009", "0008", "0007", "0006"], Some("c1"))),
        Ok(page(&["0005", "0004", "0003", "0002", "0001"], None)),
    ]));
    let engine = RoomEngine::new(source.clone(), config());

    engine.ensure_history().await;
    assert!(engine.load_more_history().await);
    assert_eq!(engine.message_count().await, 10);
    assert!(!engine.has_more_history().await);

    // Exhausted: further calls are no-ops and hit the source no more.
    assert!(!engine.load_more_history().await);
    assert_eq!(source.calls(), 2);

    // Oldest message is reachable by scrolling back.
    engine.scroll_by(-100).await;
    assert_eq!(engine.window().await[0].serial, Serial::new("0001"));
}

#[tokio::test]
async fn test_initial_load_failure_rearms_the_latch() {
    let source = Arc::new(ScriptedSource::new(vec![
        Err(Error::History("timeout".to_string())),
        Ok(page(&["0002", "0001"], None)),
    ]));
    let engine = RoomEngine::new(source.clone(), config());

    assert!(!engine.ensure_history().await);
    assert!(!engine.is_loading().await);
    assert_eq!(engine.message_count().await, 0);

    // A later trigger retries.
    assert!(engine.ensure_history().await);
    assert_eq!(engine.message_count().await, 2);
    assert_eq!(source.calls(), 2);
}

#[tokio::test]
async fn test_load_more_failure_leaves_state_retryable() {
    let source = Arc::new(ScriptedSource::new(vec![
        Ok(page(&["0006", "0005"], Some("c1"))),
        Err(Error::History("connection reset".to_string())),
        Ok(page(&["0004", "0003"], None)),
    ]));
    let engine = RoomEngine::new(source.clone(), config());

    engine.ensure_history().await;
    assert!(!engine.load_more_history().await);
    assert!(!engine.is_loading().await);
    // The continuation survives the failure, so the user can retry.
    assert!(engine.has_more_history().await);

    assert!(engine.load_more_history().await);
    assert_eq!(engine.message_count().await, 4);
    assert!(!engine.has_more_history().await);
}

#[tokio::test]
async fn test_empty_page_is_treated_as_exhausted() {
    let source = Arc::new(ScriptedSource::new(vec![
        Ok(page(&["0002", "0001"], Some("c1"))),
        Ok(page(&[], None)),
    ]));
    let engine = RoomEngine::new(source, config());

    engine.ensure_history().await;
    assert!(!engine.load_more_history().await);
    assert!(!engine.has_more_history().await);
    assert_eq!(engine.message_count().await, 2);
}

#[tokio::test]
async fn test_stale_fetch_is_discarded_after_reset() {
    let source = Arc::new(ScriptedSource::gated(vec![Ok(page(
        &["0002", "0001"],
        None,
    ))]));
    let engine = Arc::new(RoomEngine::new(source.clone(), config()));

    let task = {
        let engine = Arc::clone(&engine);
        tokio::spawn(async move { engine.ensure_history().await })
    };
    // Let the fetch get in flight, then switch room context under it.
    tokio::task::yield_now().await;
    engine.reset().await;
    source.release(1);

    assert!(!task.await.unwrap());
    assert_eq!(engine.message_count().await, 0);
    assert!(!engine.is_loading().await);
}
