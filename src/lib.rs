//! # product-harvest
//!
//! Resilient harvesting of structured product data (name, price, stock) from
//! browser-rendered pages, built to survive the conditions real shops throw
//! at long-running jobs: anti-bot blocking, rate limiting, transient network
//! failures, and restarts mid-run.
//!
//! ## Design Philosophy
//!
//! - **Durable by default** - every record is fsynced to the outputs before
//!   the loop moves on; the tabular row count *is* the resume cursor
//! - **Failure is data** - sessions report how they ended by value, and the
//!   batch controller rotates identities instead of giving up
//! - **Library-first** - no CLI or UI; the browser backend is supplied by the
//!   caller behind a small capability trait, so a deterministic test double
//!   drops in cleanly
//! - **Deliberately sequential** - one render session at a time, with
//!   randomized pacing; parallel sessions from one identity pool only
//!   amplify detection risk
//!
//! ## Quick Start
//!
//! ```no_run
//! use product_harvest::{Config, Harvester, SessionError};
//! use product_harvest::render::{RenderSession, SessionProvider};
//! use product_harvest::identity::{SessionIdentity, StorageScope};
//! use std::sync::Arc;
//!
//! // Bind your browser automation backend to the capability seam.
//! struct Chromium;
//!
//! #[async_trait::async_trait]
//! impl SessionProvider for Chromium {
//!     async fn open(
//!         &self,
//!         identity: &SessionIdentity,
//!     ) -> Result<Box<dyn RenderSession>, SessionError> {
//!         todo!("launch a browser context bound to identity.proxy + identity.storage_scope")
//!     }
//!
//!     async fn discard_storage(&self, scope: &StorageScope) -> Result<(), SessionError> {
//!         todo!("remove the profile directory")
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let mut harvester = Harvester::new(config, Arc::new(Chromium))?;
//!
//!     // Subscribe to events
//!     let mut events = harvester.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     let summary = harvester.run().await?;
//!     println!(
//!         "harvested {} of {} items",
//!         summary.harvested, summary.input_count
//!     );
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Rolling zero-success block heuristic
pub mod detector;
/// Error types
pub mod error;
/// Field extraction pipeline
pub mod extract;
/// Rate and behavior governor
pub mod governor;
/// Harvesting orchestrator (batch controller + session loop)
pub mod harvester;
/// Session identities and the rotation pool
pub mod identity;
/// Input list loading
pub mod input;
/// Render-session capability seam
pub mod render;
/// Retry logic with exponential backoff
pub mod retry;
/// Durable record sink
pub mod sink;
/// Core types and events
pub mod types;
/// Row formatting helpers for the tabular output
pub mod utils;

// Re-export commonly used types
pub use config::{Config, DelayRange, OutputConfig, RetryConfig};
pub use detector::BlockDetector;
pub use error::{
    Error, NavigationError, PersistError, RenderError, Result, SessionError,
};
pub use extract::Extractor;
pub use governor::Governor;
pub use harvester::Harvester;
pub use identity::{IdentityPool, SessionIdentity, StorageScope};
pub use render::{ElementHandle, RenderSession, SessionProvider};
pub use sink::RecordSink;
pub use types::{
    Event, ProductRecord, RecordStatus, RunSummary, SessionEnd, SessionFault, SessionReport,
    Stock, WorkItem,
};
