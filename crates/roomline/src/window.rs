//! Window selection: deriving the bounded rendering slice.
//!
//! Pure given the sequence, anchor, and sizing parameters. No I/O, never
//! blocks.

use serde::{Deserialize, Serialize};

use crate::message::Message;

fn default_window_size() -> usize {
    100
}

fn default_overscan() -> usize {
    20
}

/// Sizing of the rendering window around the anchor.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WindowConfig {
    /// Target number of messages rendered around the anchor.
    #[serde(default = "default_window_size")]
    pub window_size: usize,
    /// Extra messages materialized on each side of the window.
    #[serde(default = "default_overscan")]
    pub overscan: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            window_size: default_window_size(),
            overscan: default_overscan(),
        }
    }
}

/// Reference point the rendering window is computed around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Anchor {
    /// Always track the newest element.
    #[default]
    TailFollow,
    /// Pin to a concrete index in the sequence.
    At(usize),
}

impl Anchor {
    /// Concrete index this anchor denotes in a sequence of `len` elements.
    pub fn resolve(self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        Some(match self {
            Anchor::TailFollow => len - 1,
            Anchor::At(index) => index.min(len - 1),
        })
    }

    pub fn is_tail_follow(self) -> bool {
        self == Anchor::TailFollow
    }
}

/// Contiguous sub-sequence of `sequence` centered on the anchor.
///
/// Covers `[index - window_size/2 - overscan, index + window_size/2 +
/// overscan]`, clipped to the sequence bounds. Empty sequence yields an
/// empty slice.
pub fn compute_window<'a>(
    sequence: &'a [Message],
    anchor: Anchor,
    config: &WindowConfig,
) -> &'a [Message] {
    let Some(index) = anchor.resolve(sequence.len()) else {
        return &[];
    };
    let reach = config.window_size / 2 + config.overscan;
    let start = index.saturating_sub(reach);
    let end = (index + reach + 1).min(sequence.len());
    &sequence[start..end]
}

/// Anchor resulting from scrolling by `delta` positions.
///
/// The base is the anchor's resolved index (the tail when tail-following).
/// The target clamps to `0` at the low end; reaching or passing the last
/// index re-enables tail-follow, so scrolling forward past the end resumes
/// live tracking.
pub fn scroll_target(anchor: Anchor, delta: i64, len: usize) -> Anchor {
    if len == 0 {
        return Anchor::TailFollow;
    }
    let last = len - 1;
    let base = match anchor {
        Anchor::TailFollow => last,
        Anchor::At(index) => index.min(last),
    };
    let target = base as i64 + delta;
    if target >= last as i64 {
        return Anchor::TailFollow;
    }
    Anchor::At(target.max(0) as usize)
}
