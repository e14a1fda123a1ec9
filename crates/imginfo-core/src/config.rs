//! Scan configuration.

use serde::{Deserialize, Serialize};

/// Most files a single scan will collect.
pub const DEFAULT_MAX_FILES: usize = 100_000;

/// Options controlling a directory scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Upper bound on collected paths
    pub max_files: usize,
    /// Descend into symlinked directories and report symlinked files
    pub follow_links: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_files: DEFAULT_MAX_FILES,
            follow_links: false,
        }
    }
}

impl ScanConfig {
    /// Create a config with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_files(mut self, max_files: usize) -> Self {
        self.max_files = max_files;
        self
    }

    pub fn with_follow_links(mut self, follow_links: bool) -> Self {
        self.follow_links = follow_links;
        self
    }
}
