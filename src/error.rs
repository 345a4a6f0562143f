//! Crate-wide error types
//!
//! Startup errors are fatal: the broadcast cannot run without a source
//! payload. Per-listener failures never surface here; they end the one
//! session that hit them (see `session`).

use std::path::PathBuf;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for station setup and serving
#[derive(Debug)]
pub enum Error {
    /// The source payload could not be opened or read
    Source {
        /// Path that failed to load
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },
    /// The source payload is empty; there is nothing to broadcast
    EmptyPayload(PathBuf),
    /// I/O error outside of source loading (e.g. binding the listener)
    Io(std::io::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Source { path, source } => {
                write!(f, "Failed to load source payload {}: {}", path.display(), source)
            }
            Error::EmptyPayload(path) => {
                write!(f, "Source payload is empty: {}", path.display())
            }
            Error::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Source { source, .. } => Some(source),
            Error::EmptyPayload(_) => None,
            Error::Io(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}
