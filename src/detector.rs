//! Rolling zero-success block heuristic
//!
//! Anti-bot blocking rarely announces itself; what it looks like from the
//! outside is a session where every page stops yielding data. The detector
//! tracks items attempted vs. items succeeded since session start and flags
//! the session once the attempted count passes a small threshold with zero
//! successes. False positives (a stretch of genuinely dead URLs) are accepted
//! as the cost of rotating early.

/// Per-session rolling success/failure counter
#[derive(Clone, Debug)]
pub struct BlockDetector {
    attempted: usize,
    succeeded: usize,
    threshold: usize,
}

impl BlockDetector {
    /// New detector; `threshold` is the attempted count that must be exceeded
    /// (with zero successes) before the session is considered blocked
    pub fn new(threshold: usize) -> Self {
        Self {
            attempted: 0,
            succeeded: 0,
            threshold,
        }
    }

    /// Record the outcome of one processed item
    pub fn record(&mut self, success: bool) {
        self.attempted += 1;
        if success {
            self.succeeded += 1;
        }
    }

    /// True once more than `threshold` items were attempted and none succeeded
    pub fn is_blocked(&self) -> bool {
        self.attempted > self.threshold && self.succeeded == 0
    }

    /// Items attempted since session start
    pub fn attempted(&self) -> usize {
        self.attempted
    }

    /// Items succeeded since session start
    pub fn succeeded(&self) -> usize {
        self.succeeded
    }
}
