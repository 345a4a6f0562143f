//! # radiocast
//!
//! The live broadcast core of a small personal web server: one audio file is
//! read into memory once and re-streamed forever, at a fixed cadence, to any
//! number of concurrently connected HTTP listeners.
//!
//! ```text
//!  SourcePayload ──► PlaybackScheduler ──► ListenerRegistry ──► N sessions
//!  (loaded once)     (one chunk / tick,    (fan-out,             (one task per
//!                     loops at EOF)         drop-on-full)         connection)
//! ```
//!
//! Listeners join and leave at any time. A slow listener loses chunks
//! (audible gap) instead of stalling the scheduler or anyone else; a
//! listener whose connection fails is deregistered by its own session and
//! affects nobody.
//!
//! # Example
//!
//! ```no_run
//! use radiocast::{Station, StationConfig};
//!
//! #[tokio::main]
//! async fn main() -> radiocast::Result<()> {
//!     let station = Station::load("music.aac", StationConfig::default())?;
//!
//!     station.scheduler().spawn();
//!
//!     let app = axum::Router::new().merge(station.router());
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod playback;
pub mod registry;
mod session;
pub mod source;
pub mod station;

pub use config::StationConfig;
pub use error::{Error, Result};
pub use playback::PlaybackScheduler;
pub use registry::{ListenerRegistry, Outlet, RegistryStats, SubscriberId};
pub use source::SourcePayload;
pub use station::Station;
