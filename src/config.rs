//! Station configuration

use std::time::Duration;

/// Default chunk size in bytes
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Default tick interval between chunk broadcasts
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Station configuration options
///
/// The chunk size and tick interval together set the effective streaming
/// bitrate: `chunk_size / tick_interval` bytes per second. The defaults
/// (4096 bytes every 100 ms) stream at roughly 320 kbit/s.
#[derive(Debug, Clone)]
pub struct StationConfig {
    /// Size of each broadcast chunk in bytes
    pub chunk_size: usize,

    /// Wall-clock interval between chunk broadcasts
    pub tick_interval: Duration,

    /// Route the stream is mounted on
    pub mount_path: String,

    /// Content type sent to listeners
    pub content_type: String,
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            tick_interval: DEFAULT_TICK_INTERVAL,
            mount_path: "/music/stream".to_string(),
            content_type: "audio/aac".to_string(),
        }
    }
}

impl StationConfig {
    /// Set the chunk size (must be non-zero; values below 1 are clamped to 1)
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size.max(1);
        self
    }

    /// Set the tick interval
    pub fn tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    /// Set the mount path for the stream route
    pub fn mount_path(mut self, path: impl Into<String>) -> Self {
        self.mount_path = path.into();
        self
    }

    /// Set the content type sent to listeners
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }
}
