//! Rate and behavior governor
//!
//! All deliberate pacing lives here: the humanization pause after a page
//! settles, the randomized delay between items, the longer rest after each
//! batch, and the extended cooldown once the identity pool has been cycled.
//! Every wait is a plain timed sleep; there is no external cancellation
//! signal in this design.

use crate::config::{Config, DelayRange};

/// Enforces inter-item delays, periodic batch pauses, and rotation cooldowns
#[derive(Clone, Debug)]
pub struct Governor {
    settle_delay: DelayRange,
    item_delay: DelayRange,
    batch_size: usize,
    batch_pause: DelayRange,
    cycle_cooldown: DelayRange,
}

impl Governor {
    /// Build a governor from the run configuration
    pub fn new(config: &Config) -> Self {
        Self {
            settle_delay: config.page_settle_delay,
            item_delay: config.item_delay,
            batch_size: config.batch_size,
            batch_pause: config.batch_pause,
            cycle_cooldown: config.pool_cycle_cooldown,
        }
    }

    /// Pause after a successful navigation, before the page is inspected
    pub async fn settle(&self) {
        sleep_range(&self.settle_delay).await;
    }

    /// Pause after finishing an item. `processed` is the number of items
    /// completed so far in this session; every `batch_size` items the longer
    /// batch rest is taken instead of the per-item delay.
    pub async fn rest_between_items(&self, processed: usize) {
        if self.batch_size > 0 && processed % self.batch_size == 0 {
            tracing::info!(processed, "batch boundary reached, taking extended rest");
            sleep_range(&self.batch_pause).await;
        } else {
            sleep_range(&self.item_delay).await;
        }
    }

    /// Extended pause before reusing an identity pool that has been fully
    /// cycled
    pub async fn cooldown(&self) {
        sleep_range(&self.cycle_cooldown).await;
    }
}

async fn sleep_range(range: &DelayRange) {
    let delay = range.sample();
    tracing::debug!(delay_ms = delay.as_millis(), "sleeping");
    tokio::time::sleep(delay).await;
}
