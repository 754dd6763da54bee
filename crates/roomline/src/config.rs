//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::window::WindowConfig;

fn default_page_size() -> usize {
    100
}

/// Tuning parameters supplied by the host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Window sizing.
    #[serde(default)]
    pub window: WindowConfig,
    /// Messages requested per history page.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl EngineConfig {
    /// Page size for the first fetch: at least a full window plus overscan
    /// on both sides.
    pub fn initial_page_size(&self) -> usize {
        self.page_size
            .max(self.window.window_size + 2 * self.window.overscan)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            page_size: default_page_size(),
        }
    }
}
