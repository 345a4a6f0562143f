//! Playback scheduler
//!
//! A single background task that walks the source payload at a fixed
//! wall-clock cadence and broadcasts one chunk per tick. When the payload is
//! exhausted the cursor wraps to the start, so the stream never ends.
//!
//! The cadence is the sole timing authority: it does not change with the
//! number of listeners or how fast they drain. Slow listeners are handled by
//! the registry's drop-on-full delivery, not by slowing the ticker down.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::registry::ListenerRegistry;
use crate::source::{PayloadCursor, SourcePayload};

/// Fixed-cadence broadcast loop over a source payload
pub struct PlaybackScheduler {
    cursor: PayloadCursor,
    registry: Arc<ListenerRegistry>,
    tick_interval: Duration,
}

impl PlaybackScheduler {
    /// Create a scheduler over `payload`, broadcasting through `registry`
    pub fn new(
        payload: &SourcePayload,
        registry: Arc<ListenerRegistry>,
        tick_interval: Duration,
    ) -> Self {
        Self {
            cursor: payload.cursor(),
            registry,
            tick_interval,
        }
    }

    /// Run the broadcast loop forever
    pub async fn run(mut self) {
        tracing::info!(
            tick_ms = self.tick_interval.as_millis() as u64,
            "Playback scheduler started"
        );

        let mut ticker = tokio::time::interval(self.tick_interval);
        loop {
            ticker.tick().await;
            self.tick().await;
        }
    }

    /// Run the broadcast loop until `shutdown` completes
    ///
    /// The shutdown future is checked between ticks, so the loop ends at a
    /// chunk boundary.
    pub async fn run_until<F>(mut self, shutdown: F)
    where
        F: std::future::Future<Output = ()>,
    {
        tracing::info!(
            tick_ms = self.tick_interval.as_millis() as u64,
            "Playback scheduler started"
        );

        let mut ticker = tokio::time::interval(self.tick_interval);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("Playback scheduler shutting down");
                    return;
                }
                _ = ticker.tick() => {
                    self.tick().await;
                }
            }
        }
    }

    /// Spawn the broadcast loop as a background task
    ///
    /// Returns a handle that can be used to abort the task.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn tick(&mut self) {
        let chunk = self.cursor.next_chunk();
        self.registry.broadcast(chunk).await;
    }
}
