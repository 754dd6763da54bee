//! Shared fixtures for integration tests.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use roomline::{
    Error, HistoryPage, HistorySource, Message, MessageEvent, MessageEventKind, PageCursor,
    Result, Serial,
};
use tokio::sync::Semaphore;

/// A message with defaults suitable for tests.
pub fn msg(serial: &str) -> Message {
    Message::new(
        Serial::new(serial),
        "alice",
        format!("message {serial}"),
        Utc::now(),
    )
}

/// A created-message live event.
pub fn created(serial: &str) -> MessageEvent {
    MessageEvent {
        kind: MessageEventKind::Created,
        message: msg(serial),
    }
}

/// Newest-first page over the given serials.
pub fn page(serials: &[&str], next: Option<&str>) -> HistoryPage {
    HistoryPage {
        items: serials.iter().map(|s| msg(s)).collect(),
        next: next.map(PageCursor::new),
    }
}

/// History source that replays a script of page responses in order.
pub struct ScriptedSource {
    responses: Mutex<VecDeque<Result<HistoryPage>>>,
    calls: AtomicUsize,
    gate: Option<Semaphore>,
}

impl ScriptedSource {
    pub fn new(responses: Vec<Result<HistoryPage>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: AtomicUsize::new(0),
            gate: None,
        }
    }

    /// Like `new`, but every query waits for a permit first, so tests can
    /// hold a fetch in flight.
    pub fn gated(responses: Vec<Result<HistoryPage>>) -> Self {
        Self {
            gate: Some(Semaphore::new(0)),
            ..Self::new(responses)
        }
    }

    pub fn release(&self, permits: usize) {
        self.gate
            .as_ref()
            .expect("source is not gated")
            .add_permits(permits);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HistorySource for ScriptedSource {
    async fn query(&self, _before: Option<&PageCursor>, _limit: usize) -> Result<HistoryPage> {
        if let Some(gate) = &self.gate {
            let permit = gate
                .acquire()
                .await
                .map_err(|_| Error::History("gate closed".to_string()))?;
            permit.forget();
        }
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Error::History("script exhausted".to_string())))
    }
}
