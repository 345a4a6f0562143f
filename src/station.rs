//! Station facade
//!
//! Wires the source payload, listener registry, playback scheduler, and
//! HTTP route together. Callers load a station once at startup, merge its
//! router into their application, and run (or spawn) its scheduler.

use std::path::Path;
use std::sync::Arc;

use axum::Router;

use crate::config::StationConfig;
use crate::error::Result;
use crate::playback::PlaybackScheduler;
use crate::registry::{ListenerRegistry, RegistryStats};
use crate::source::SourcePayload;

/// A single looping broadcast: one source, many listeners
pub struct Station {
    payload: SourcePayload,
    registry: Arc<ListenerRegistry>,
    config: StationConfig,
}

impl Station {
    /// Load the source payload from disk and set up the station
    ///
    /// An unreadable or empty source file is fatal; the station cannot run
    /// without a payload.
    pub fn load(path: impl AsRef<Path>, config: StationConfig) -> Result<Self> {
        let payload = SourcePayload::load(path, config.chunk_size)?;
        Ok(Self::from_payload(payload, config))
    }

    /// Set up a station over a payload already in memory
    pub fn from_payload(payload: SourcePayload, config: StationConfig) -> Self {
        Self {
            payload,
            registry: Arc::new(ListenerRegistry::new()),
            config,
        }
    }

    /// The station's listener registry
    pub fn registry(&self) -> &Arc<ListenerRegistry> {
        &self.registry
    }

    /// The station's configuration
    pub fn config(&self) -> &StationConfig {
        &self.config
    }

    /// Build the playback scheduler for this station
    ///
    /// The scheduler starts at the beginning of the payload. Run it with
    /// [`PlaybackScheduler::run`], [`PlaybackScheduler::run_until`] for
    /// graceful shutdown, or [`PlaybackScheduler::spawn`].
    pub fn scheduler(&self) -> PlaybackScheduler {
        PlaybackScheduler::new(
            &self.payload,
            Arc::clone(&self.registry),
            self.config.tick_interval,
        )
    }

    /// Build a router with the stream route mounted at the configured path
    ///
    /// Merge this into the surrounding application's router; page rendering
    /// and static files stay the caller's business.
    pub fn router(&self) -> Router {
        crate::session::router(Arc::clone(&self.registry), &self.config)
    }

    /// Current listener and delivery statistics
    pub async fn stats(&self) -> RegistryStats {
        self.registry.stats().await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio_test::assert_ok;

    use super::*;

    #[test]
    fn test_load_missing_source_is_fatal() {
        let result = Station::load("/no/such/file.aac", StationConfig::default());

        assert!(result.is_err());
    }

    #[test]
    fn test_load_reads_source_file() {
        let path = std::env::temp_dir().join("radiocast_station_load_test.aac");
        std::fs::write(&path, vec![1u8; 4096 * 2]).unwrap();

        let station = assert_ok!(Station::load(&path, StationConfig::default()));
        assert_eq!(station.config().chunk_size, 4096);

        std::fs::remove_file(&path).ok();
    }

    #[tokio::test(start_paused = true)]
    async fn test_station_wires_scheduler_to_registry() {
        let payload = SourcePayload::from_bytes(vec![42u8; 8192], 4096);
        let station = Station::from_payload(
            payload,
            StationConfig::default().tick_interval(Duration::from_millis(100)),
        );

        let mut outlet = station.registry().add().await;
        let handle = station.scheduler().spawn();

        let chunk = outlet.recv().await.unwrap();
        assert_eq!(chunk.len(), 4096);
        assert!(chunk.iter().all(|&b| b == 42));

        assert_eq!(station.stats().await.listeners, 1);

        handle.abort();
    }
}
