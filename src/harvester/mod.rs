//! Harvesting orchestrator split into focused submodules.
//!
//! The `Harvester` struct and its control loop are organized by scope:
//! - [`batch`] - top-level loop: resume, identity rotation, retry budget
//! - [`session`] - per-session loop: navigation retry, extraction, block
//!   detection

mod batch;
mod session;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;

use crate::config::Config;
use crate::error::Result;
use crate::extract::Extractor;
use crate::governor::Governor;
use crate::identity::IdentityPool;
use crate::input;
use crate::render::SessionProvider;
use crate::sink::RecordSink;
use crate::types::{Event, WorkItem};
use std::sync::Arc;

/// The resilient harvesting orchestrator.
///
/// Owns the work-item list, the identity pool, the durable sink, and the
/// global retry budget for one run. The render-session backend is supplied by
/// the caller as a [`SessionProvider`] and is the only part of the system
/// that touches a browser.
pub struct Harvester {
    pub(crate) config: Config,
    pub(crate) provider: Arc<dyn SessionProvider>,
    pub(crate) extractor: Extractor,
    pub(crate) governor: Governor,
    pub(crate) sink: RecordSink,
    pub(crate) pool: IdentityPool,
    pub(crate) items: Vec<WorkItem>,
    pub(crate) event_tx: tokio::sync::broadcast::Sender<Event>,
}

impl Harvester {
    /// Build a harvester: load the input list, build the identity pool, and
    /// open (or resume) the durable outputs.
    pub fn new(config: Config, provider: Arc<dyn SessionProvider>) -> Result<Self> {
        let items = input::load_work_items(&config.input_list)?;
        let pool = IdentityPool::load(&config.proxy_list, &config.storage_root);
        let sink = RecordSink::open(&config.output)?;
        let governor = Governor::new(&config);
        let (event_tx, _rx) = tokio::sync::broadcast::channel(256);

        tracing::info!(
            items = items.len(),
            identities = pool.len(),
            resume_at = sink.durable_count(),
            "harvester initialized"
        );

        Ok(Self {
            config,
            provider,
            extractor: Extractor::new(),
            governor,
            sink,
            pool,
            items,
            event_tx,
        })
    }

    /// Subscribe to run events. Any number of subscribers is supported; none
    /// is required.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// The loaded work-item list, in input order
    pub fn work_items(&self) -> &[WorkItem] {
        &self.items
    }

    /// Records durably present in the tabular output (the resume cursor)
    pub fn durable_count(&self) -> usize {
        self.sink.durable_count()
    }
}
