use serde::{Deserialize, Serialize};

/// One file of a torrent as reported by the client, before tree construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TorrentFile {
    /// Stable identifier used by priority operations
    pub index: u32,
    /// Relative path, '/'-separated, no leading '/' and no empty segments
    pub name: String,
    /// Size in bytes
    pub size: u64,
    /// Completion fraction in [0, 1]
    pub progress: f64,
    /// Client priority, passed through untouched
    #[serde(default)]
    pub priority: i32,
}

impl TorrentFile {
    pub fn new(index: u32, name: impl Into<String>, size: u64, progress: f64) -> Self {
        Self {
            index,
            name: name.into(),
            size,
            progress,
            priority: 0,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}
