//! Core types and events for product-harvest

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One target identifier (a product page URL) to be harvested.
///
/// Work items are opaque to the orchestrator: the full input list is loaded
/// once and never reordered, and identity is the identifier string itself.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkItem(pub String);

impl WorkItem {
    /// Create a new WorkItem
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    /// Get the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for WorkItem {
    fn from(url: &str) -> Self {
        Self(url.to_string())
    }
}

impl From<String> for WorkItem {
    fn from(url: String) -> Self {
        Self(url)
    }
}

impl std::fmt::Display for WorkItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Tri-state stock availability observed on a product page
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stock {
    /// The purchase control offered an add-to-cart action
    InStock,
    /// The purchase control carried a sold-out marker
    SoldOut,
    /// Neither marker was found (or the control was absent)
    #[default]
    Unknown,
}

impl std::fmt::Display for Stock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Stock::InStock => "in_stock",
            Stock::SoldOut => "sold_out",
            Stock::Unknown => "unknown",
        };
        write!(f, "{s}")
    }
}

/// Outcome classification of one harvested record
///
/// Invariants: `Success` implies a price is present; `Failed` implies both
/// name and price are absent. A name without a valid price is `Partial`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    /// A price was found (a name may or may not accompany it)
    Success,
    /// A name was found but no valid price
    Partial,
    /// Neither a name nor a price was found
    Failed,
}

impl std::fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RecordStatus::Success => "success",
            RecordStatus::Partial => "partial",
            RecordStatus::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

/// One extracted product observation.
///
/// Created once per work-item processing attempt, appended to the durable
/// outputs, and never mutated or updated in place afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// The work item this record was extracted from
    pub url: WorkItem,

    /// Product name, if any extraction strategy yielded one
    pub product_name: Option<String>,

    /// Lowest advertised price in minor currency units, if any strategy
    /// yielded at least one candidate
    pub cheapest_price: Option<u64>,

    /// Stock availability signal
    pub stock: Stock,

    /// Outcome classification (see [`RecordStatus`] invariants)
    pub status: RecordStatus,

    /// When the page was observed
    pub observed_at: DateTime<Utc>,
}

/// How a session ended
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEnd {
    /// The assigned work list was exhausted (or the rotation interval was
    /// reached) without a fault
    Clean,
    /// The session was torn down early
    Faulted(SessionFault),
}

/// Why a session was torn down early.
///
/// Faults are propagated by return value so the batch controller can match on
/// the outcome; a fault always triggers identity rotation upstream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionFault {
    /// A render session could not be acquired for the identity
    Acquisition,
    /// Navigation to one item kept failing after all in-place retries
    Navigation {
        /// The item whose navigation was exhausted
        url: WorkItem,
    },
    /// The rolling zero-success heuristic flagged the session as blocked
    SuspectedBlock,
}

/// Exit contract of one session run
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionReport {
    /// Items whose records were durably appended during this session, in
    /// processing order
    pub appended: Vec<WorkItem>,

    /// How the session ended
    pub end: SessionEnd,
}

impl SessionReport {
    /// True if the session exhausted its assigned work without a fault.
    ///
    /// `false` is the sole signal that triggers identity rotation upstream.
    pub fn completed_cleanly(&self) -> bool {
        self.end == SessionEnd::Clean
    }
}

/// Final accounting of one `Harvester::run` invocation
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Number of work items in the input list
    pub input_count: usize,

    /// Records durably appended during this run (excludes records already
    /// present from a prior run)
    pub harvested: usize,

    /// Work items still pending when the run ended (0 means full coverage;
    /// non-zero means the retry budget was exhausted first)
    pub pending_remaining: usize,

    /// Identity rotations spent against the global retry budget
    pub rotations_spent: u32,
}

/// Events emitted during a run.
///
/// Consumers subscribe via `Harvester::subscribe`; sends are best-effort and
/// no subscriber is required.
#[derive(Clone, Debug, Serialize)]
pub enum Event {
    /// A session was started for an identity
    SessionStarted {
        /// The proxy endpoint of the identity, if any
        proxy: Option<String>,
        /// Work items assigned to the session
        pending: usize,
    },
    /// A record was durably appended
    RecordHarvested {
        /// The work item the record belongs to
        url: WorkItem,
        /// Outcome classification of the record
        status: RecordStatus,
    },
    /// The rolling zero-success heuristic tripped
    BlockSuspected {
        /// Items attempted in the session when the heuristic tripped
        attempted: usize,
    },
    /// A session ended
    SessionEnded {
        /// Records appended during the session
        appended: usize,
        /// Whether the session completed cleanly
        clean: bool,
    },
    /// An identity was rotated after a non-clean session
    IdentityRotated {
        /// Rotations spent so far against the global budget
        rotations: u32,
    },
    /// The run terminated
    RunCompleted {
        /// Records appended during the run
        harvested: usize,
        /// Work items left unprocessed
        pending: usize,
    },
}
