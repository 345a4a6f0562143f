//! Listener registry for broadcast fan-out
//!
//! The registry holds the set of currently connected listeners and offers
//! each broadcast chunk to all of them. Each listener has its own capacity-1
//! delivery channel; delivery is `try_send`, so a slow listener loses chunks
//! instead of stalling the scheduler or the other listeners.
//!
//! # Architecture
//!
//! ```text
//!                        Arc<ListenerRegistry>
//!                   ┌────────────────────────────┐
//!                   │ subscribers: HashMap<      │
//!                   │   SubscriberId,            │
//!                   │   Subscriber { tx }        │
//!                   │ >                          │
//!                   └────────────┬───────────────┘
//!                                │ broadcast(chunk)  -- try_send per listener
//!          ┌─────────────────────┼─────────────────────┐
//!          │                     │                     │
//!          ▼                     ▼                     ▼
//!     [Session]             [Session]             [Session]
//!     outlet.recv()         outlet.recv()         outlet.recv()
//!          │                     │                     │
//!          └──► HTTP body ──► flush ──► client
//! ```
//!
//! # Zero-Copy Design
//!
//! Chunks are `bytes::Bytes` slices of the immutable source payload, so
//! `broadcast` clones a reference count per listener, never the audio data.
//! Because the payload is never mutated, a listener that drains late can
//! never observe a chunk being overwritten by a later tick.

pub mod store;
pub mod subscriber;

pub use store::{ListenerRegistry, RegistryStats};
pub use subscriber::{Outlet, SubscriberId};
