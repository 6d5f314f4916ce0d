//! Error types for product-harvest
//!
//! The taxonomy separates failures by how the orchestrator reacts to them:
//! - navigation failures are retried in place and, once exhausted, fault the session
//! - render (DOM) failures degrade a single extracted field and never escalate
//! - session acquisition failures trigger identity rotation without retrying
//! - persistence failures are logged and leave the affected item pending
//!
//! Session teardown is always signaled by value (see [`crate::types::SessionEnd`]),
//! never by unwinding.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for product-harvest operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for product-harvest
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "input_list")
        key: Option<String>,
    },

    /// Input list could not be loaded
    #[error("input list error: {0}")]
    Input(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Durable output could not be written
    #[error("persistence error: {0}")]
    Persist(#[from] PersistError),

    /// Render session lifecycle error
    #[error("session error: {0}")]
    Session(#[from] SessionError),

    /// Page navigation error
    #[error("navigation error: {0}")]
    Navigation(#[from] NavigationError),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failure to load a page inside an open render session.
///
/// Timeouts and network resets are transient and retried in place; a closed
/// render target means the session itself is gone and is never retried.
#[derive(Debug, Error)]
pub enum NavigationError {
    /// Page load did not finish within the configured timeout
    #[error("navigation to {url} timed out after {timeout:?}")]
    Timeout {
        /// The target that timed out
        url: String,
        /// The timeout that was applied
        timeout: Duration,
    },

    /// Connection-level failure (reset, refused, DNS, proxy error)
    #[error("network failure loading {url}: {message}")]
    Network {
        /// The target that failed to load
        url: String,
        /// Backend-reported failure description
        message: String,
    },

    /// The render target (page/browser) disappeared underneath us
    #[error("render target closed: {message}")]
    TargetClosed {
        /// Backend-reported failure description
        message: String,
    },
}

/// Failure of a single DOM inspection call.
///
/// These degrade one extracted field to absent and never abort a record.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Selector query failed inside the render backend
    #[error("query failed for selector {selector}: {message}")]
    Query {
        /// The selector that was being evaluated
        selector: String,
        /// Backend-reported failure description
        message: String,
    },

    /// An element handle no longer refers to a live element
    #[error("stale element handle {handle}")]
    StaleHandle {
        /// The raw handle value
        handle: u64,
    },
}

/// Render session lifecycle errors
#[derive(Debug, Error)]
pub enum SessionError {
    /// Could not start a render session for an identity (e.g., bad proxy)
    #[error("failed to acquire render session: {message}")]
    Acquisition {
        /// Backend-reported failure description
        message: String,
    },

    /// Could not discard an identity's persistent storage scope
    #[error("failed to discard storage scope {scope}: {message}")]
    StorageDiscard {
        /// The storage scope that could not be removed
        scope: String,
        /// Backend-reported failure description
        message: String,
    },
}

/// Durable output errors
#[derive(Debug, Error)]
pub enum PersistError {
    /// Appending to one of the output files failed
    #[error("failed to append to {path}: {source}")]
    Append {
        /// The output file that rejected the write
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A record could not be encoded as JSON
    #[error("failed to encode record: {0}")]
    Encode(#[from] serde_json::Error),

    /// Writing the aggregate snapshot failed
    #[error("failed to write snapshot {path}: {source}")]
    Snapshot {
        /// The snapshot file that rejected the write
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}
