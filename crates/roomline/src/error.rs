//! Engine errors.

use thiserror::Error;

/// Errors surfaced by the engine and its history capability.
///
/// Fetch failures never propagate to the UI surface: the engine catches
/// them at the call site, logs them, and degrades to a possibly stale
/// window.
#[derive(Debug, Error)]
pub enum Error {
    /// Upstream history query failed (network, timeout, remote error).
    #[error("history query failed: {0}")]
    History(String),

    /// Upstream returned a malformed page.
    #[error("malformed history page: {0}")]
    MalformedPage(String),
}

pub type Result<T> = std::result::Result<T, Error>;
