//! Listener registry implementation
//!
//! The central set of currently connected listeners, and the broadcast
//! fan-out over it.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;
use tokio::sync::RwLock;

use super::subscriber::{Delivery, Outlet, Subscriber, SubscriberId, DELIVERY_CAPACITY};

/// Registry of active listeners
///
/// Thread-safe via `RwLock`: broadcast traverses under the read lock,
/// add/remove take the write lock. Delivery itself is `try_send` and never
/// blocks, so the lock is only held for brief synchronous sections and
/// never across an await point.
pub struct ListenerRegistry {
    /// Map of subscriber id to delivery endpoint
    subscribers: RwLock<HashMap<SubscriberId, Subscriber>>,

    /// Next subscriber id to hand out
    next_id: AtomicU64,

    /// Chunks successfully handed to a subscriber channel
    delivered: AtomicU64,

    /// Chunks dropped because a subscriber had not drained the previous one
    dropped: AtomicU64,
}

/// Point-in-time registry statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryStats {
    /// Currently registered listeners
    pub listeners: usize,
    /// Total chunks delivered across all listeners
    pub delivered: u64,
    /// Total chunks dropped under backpressure
    pub dropped: u64,
}

impl ListenerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            subscribers: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            delivered: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
        }
    }

    /// Register a new listener
    ///
    /// Creates a fresh capacity-1 delivery channel, inserts the sender half
    /// into the active set, and returns the receiver half for the session to
    /// drain. Always succeeds.
    pub async fn add(&self) -> Outlet {
        let id = SubscriberId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (tx, rx) = tokio::sync::mpsc::channel(DELIVERY_CAPACITY);

        let mut subscribers = self.subscribers.write().await;
        subscribers.insert(id, Subscriber { tx });

        tracing::info!(
            listener = %id,
            listeners = subscribers.len(),
            "Listener registered"
        );

        Outlet { id, rx }
    }

    /// Deregister a listener
    ///
    /// Idempotent: removing an id that is not registered is a no-op.
    pub async fn remove(&self, id: SubscriberId) {
        let mut subscribers = self.subscribers.write().await;

        if subscribers.remove(&id).is_some() {
            tracing::info!(
                listener = %id,
                listeners = subscribers.len(),
                "Listener deregistered"
            );
        }
    }

    /// Broadcast a chunk to every currently registered listener
    ///
    /// Delivery is non-blocking per subscriber: a listener whose channel
    /// still holds the previous chunk loses this one. That is the defined
    /// degradation policy for slow consumers, not an error, so drops are
    /// counted rather than logged. A closed channel means the session is
    /// tearing itself down; membership is left to the session's own
    /// `remove` call.
    ///
    /// Returns the number of listeners the chunk was handed to.
    pub async fn broadcast(&self, chunk: Bytes) -> usize {
        let subscribers = self.subscribers.read().await;

        let mut sent = 0usize;
        let mut dropped = 0u64;

        for subscriber in subscribers.values() {
            match subscriber.try_deliver(chunk.clone()) {
                Delivery::Sent => sent += 1,
                Delivery::Dropped => dropped += 1,
                Delivery::Closed => {}
            }
        }

        self.delivered.fetch_add(sent as u64, Ordering::Relaxed);
        if dropped > 0 {
            self.dropped.fetch_add(dropped, Ordering::Relaxed);
            tracing::trace!(dropped = dropped, "Chunks dropped for slow listeners");
        }

        sent
    }

    /// Number of currently registered listeners
    pub async fn listener_count(&self) -> usize {
        self.subscribers.read().await.len()
    }

    /// Get registry statistics
    pub async fn stats(&self) -> RegistryStats {
        RegistryStats {
            listeners: self.subscribers.read().await.len(),
            delivered: self.delivered.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }
}

impl Default for ListenerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
