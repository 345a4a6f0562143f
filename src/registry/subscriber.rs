//! Subscriber endpoint types
//!
//! A subscriber is the registry's handle on one connected listener: a
//! capacity-1 channel sender. The matching receiver half (`Outlet`) is owned
//! by the listener's session, which drains it and writes to the network.

use bytes::Bytes;
use tokio::sync::mpsc;

/// Capacity of each subscriber's delivery channel
///
/// One undrained chunk at most. If a new chunk arrives before the session
/// has drained the previous one, the new chunk is dropped for that
/// subscriber (drop-on-full backpressure).
pub(super) const DELIVERY_CAPACITY: usize = 1;

/// Unique identifier for a subscriber, monotonically increasing per registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(pub(super) u64);

impl std::fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The registry's delivery endpoint for one listener
#[derive(Debug)]
pub(super) struct Subscriber {
    pub(super) tx: mpsc::Sender<Bytes>,
}

/// Outcome of offering a chunk to one subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Delivery {
    /// The chunk was handed to the subscriber's channel
    Sent,
    /// The channel still held the previous chunk; this one was dropped
    Dropped,
    /// The session has gone away (receiver closed)
    Closed,
}

impl Subscriber {
    /// Offer a chunk without blocking
    pub(super) fn try_deliver(&self, chunk: Bytes) -> Delivery {
        match self.tx.try_send(chunk) {
            Ok(()) => Delivery::Sent,
            Err(mpsc::error::TrySendError::Full(_)) => Delivery::Dropped,
            Err(mpsc::error::TrySendError::Closed(_)) => Delivery::Closed,
        }
    }
}

/// The session-owned half of a subscription
///
/// Created by [`ListenerRegistry::add`](super::ListenerRegistry::add). The
/// session drains chunks from it and must call
/// [`ListenerRegistry::remove`](super::ListenerRegistry::remove) with
/// [`Outlet::id`] when its connection fails.
#[derive(Debug)]
pub struct Outlet {
    pub(super) id: SubscriberId,
    pub(super) rx: mpsc::Receiver<Bytes>,
}

impl Outlet {
    /// This subscription's id
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Wait for the next chunk
    ///
    /// Returns `None` only if the registry side has been dropped entirely,
    /// which does not happen during normal operation (the stream is endless).
    pub async fn recv(&mut self) -> Option<Bytes> {
        self.rx.recv().await
    }

    /// Take the next chunk if one is already waiting
    pub fn try_recv(&mut self) -> Option<Bytes> {
        self.rx.try_recv().ok()
    }
}
