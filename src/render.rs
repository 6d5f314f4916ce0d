//! Render-session capability seam
//!
//! The orchestration core never talks to a browser directly. It consumes the
//! two traits below, which expose exactly the operations the harvesting loop
//! needs: open a session bound to one identity, navigate, and inspect the
//! rendered DOM. Any automation backend (CDP, WebDriver, a deterministic test
//! double) can sit behind them.

use crate::error::{NavigationError, RenderError, SessionError};
use crate::identity::{SessionIdentity, StorageScope};
use crate::types::WorkItem;
use async_trait::async_trait;
use std::time::Duration;

/// Opaque reference to an element in the currently rendered page.
///
/// Handles are only meaningful to the session that produced them and are
/// invalidated by the next navigation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ElementHandle(pub u64);

impl std::fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One live rendered-page session, bound to a single identity for its whole
/// lifetime.
///
/// Implementations are expected to use interior mutability: the orchestrator
/// holds the session behind a shared reference so navigation can be retried
/// from a closure.
#[async_trait]
pub trait RenderSession: Send + Sync {
    /// Load the given target, waiting at most `timeout` for the page to be
    /// ready for inspection
    async fn navigate(
        &self,
        url: &WorkItem,
        timeout: Duration,
    ) -> Result<(), NavigationError>;

    /// First element matching the selector in the current page, if any
    async fn query_first(&self, selector: &str) -> Result<Option<ElementHandle>, RenderError>;

    /// All elements matching the selector in the current page
    async fn query_all(&self, selector: &str) -> Result<Vec<ElementHandle>, RenderError>;

    /// Value of the named attribute on the element, if present
    async fn attribute(
        &self,
        handle: ElementHandle,
        name: &str,
    ) -> Result<Option<String>, RenderError>;

    /// Visible text content of the element
    async fn text(&self, handle: ElementHandle) -> Result<String, RenderError>;
}

/// Factory for render sessions, one per identity.
///
/// The provider also owns storage-scope cleanup: after a faulted session the
/// batch controller discards the torn-down identity's scope so the next
/// session starts from a clean slate.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Open a render session bound to the identity's proxy and storage scope
    async fn open(
        &self,
        identity: &SessionIdentity,
    ) -> Result<Box<dyn RenderSession>, SessionError>;

    /// Remove an identity's persistent storage scope
    async fn discard_storage(&self, scope: &StorageScope) -> Result<(), SessionError>;
}
