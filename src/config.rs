//! Configuration types for product-harvest

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration for a [`crate::Harvester`].
///
/// Every tunable of the orchestration loop lives here and is passed in at
/// construction; there are no process-wide constants. All fields have
/// defaults, so `Config::default()` describes a conservative, working setup.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Path to the newline-delimited input list of target URLs
    /// (blank lines and `#` comments ignored)
    #[serde(default = "default_input_list")]
    pub input_list: PathBuf,

    /// Path to the newline-delimited proxy endpoint list. A missing or empty
    /// file yields a pool with exactly one direct (proxy-less) identity.
    #[serde(default = "default_proxy_list")]
    pub proxy_list: PathBuf,

    /// Root directory under which per-identity storage scopes (browser
    /// profiles) are created
    #[serde(default = "default_storage_root")]
    pub storage_root: PathBuf,

    /// Durable output destinations
    #[serde(default)]
    pub output: OutputConfig,

    /// Per-navigation timeout (default: 60 seconds)
    #[serde(default = "default_navigation_timeout", with = "duration_serde")]
    pub navigation_timeout: Duration,

    /// In-place retry policy for transient navigation failures
    #[serde(default)]
    pub navigation_retry: RetryConfig,

    /// Randomized pause after a successful navigation, before extraction
    /// (the humanization slot; default: 2-5 seconds)
    #[serde(default = "default_settle_delay")]
    pub page_settle_delay: DelayRange,

    /// Randomized pause between consecutive work items (default: 8-15 seconds)
    #[serde(default = "default_item_delay")]
    pub item_delay: DelayRange,

    /// Number of items after which the longer batch pause is inserted
    /// (default: 20; 0 disables batch pauses)
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Randomized batch pause duration (default: 60-120 seconds)
    #[serde(default = "default_batch_pause")]
    pub batch_pause: DelayRange,

    /// Proactively end a session cleanly after this many items so the next
    /// identity takes over (default: 0 = sessions run until their list is
    /// exhausted or they fault)
    #[serde(default)]
    pub session_rotate_every: usize,

    /// Extended cooldown inserted once every identity in the pool has been
    /// used and rotation wraps around (default: 30-60 seconds)
    #[serde(default = "default_cycle_cooldown")]
    pub pool_cycle_cooldown: DelayRange,

    /// Items attempted with zero successes before a session is considered
    /// blocked (default: 3)
    #[serde(default = "default_block_threshold")]
    pub block_threshold: usize,

    /// Maximum identity rotations across the whole run; exhausting the budget
    /// ends the run with whatever was persisted (default: 5)
    #[serde(default = "default_max_global_retries")]
    pub max_global_retries: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_list: default_input_list(),
            proxy_list: default_proxy_list(),
            storage_root: default_storage_root(),
            output: OutputConfig::default(),
            navigation_timeout: default_navigation_timeout(),
            navigation_retry: RetryConfig::default(),
            page_settle_delay: default_settle_delay(),
            item_delay: default_item_delay(),
            batch_size: default_batch_size(),
            batch_pause: default_batch_pause(),
            session_rotate_every: 0,
            pool_cycle_cooldown: default_cycle_cooldown(),
            block_threshold: default_block_threshold(),
            max_global_retries: default_max_global_retries(),
        }
    }
}

/// Durable output destinations.
///
/// Each appended record lands in the line-delimited log and the tabular file
/// before the append returns; the snapshot is written once at run completion.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Line-delimited JSON log, one record per line (default: "records.jsonl")
    #[serde(default = "default_jsonl_path")]
    pub jsonl_path: PathBuf,

    /// Tabular output with a fixed column order; its data row count is the
    /// resume cursor (default: "records.csv")
    #[serde(default = "default_table_path")]
    pub table_path: PathBuf,

    /// Aggregate snapshot, a single JSON array of the run's records
    /// (default: "records.json")
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            jsonl_path: default_jsonl_path(),
            table_path: default_table_path(),
            snapshot_path: default_snapshot_path(),
        }
    }
}

/// Retry configuration for transient navigation failures
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of retry attempts after the initial try (default: 2)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Initial delay before the first retry (default: 5 seconds)
    #[serde(default = "default_initial_delay", with = "duration_serde")]
    pub initial_delay: Duration,

    /// Maximum delay between retries (default: 10 seconds)
    #[serde(default = "default_max_delay", with = "duration_serde")]
    pub max_delay: Duration,

    /// Multiplier for exponential backoff (default: 2.0)
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Add random jitter to delays (default: true)
    #[serde(default = "default_true")]
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay: default_initial_delay(),
            max_delay: default_max_delay(),
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }
}

/// An inclusive duration range sampled uniformly for each pause.
///
/// Serialized as milliseconds so short test configurations survive a
/// round trip.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayRange {
    /// Lower bound of the pause
    #[serde(with = "duration_serde")]
    pub min: Duration,

    /// Upper bound of the pause
    #[serde(with = "duration_serde")]
    pub max: Duration,
}

impl DelayRange {
    /// Build a range from millisecond bounds
    pub fn from_millis(min: u64, max: u64) -> Self {
        Self {
            min: Duration::from_millis(min),
            max: Duration::from_millis(max),
        }
    }

    /// Build a range from second bounds
    pub fn from_secs(min: u64, max: u64) -> Self {
        Self {
            min: Duration::from_secs(min),
            max: Duration::from_secs(max),
        }
    }

    /// Draw a uniformly distributed duration from the range.
    ///
    /// A degenerate range (max <= min) always yields `min`.
    pub fn sample(&self) -> Duration {
        if self.max <= self.min {
            return self.min;
        }
        let min_ms = self.min.as_millis() as u64;
        let max_ms = self.max.as_millis() as u64;
        let ms = rand::Rng::gen_range(&mut rand::thread_rng(), min_ms..=max_ms);
        Duration::from_millis(ms)
    }
}

fn default_input_list() -> PathBuf {
    PathBuf::from("urls.txt")
}

fn default_proxy_list() -> PathBuf {
    PathBuf::from("proxies.txt")
}

fn default_storage_root() -> PathBuf {
    PathBuf::from("profiles")
}

fn default_jsonl_path() -> PathBuf {
    PathBuf::from("records.jsonl")
}

fn default_table_path() -> PathBuf {
    PathBuf::from("records.csv")
}

fn default_snapshot_path() -> PathBuf {
    PathBuf::from("records.json")
}

fn default_navigation_timeout() -> Duration {
    Duration::from_secs(60)
}

fn default_settle_delay() -> DelayRange {
    DelayRange::from_secs(2, 5)
}

fn default_item_delay() -> DelayRange {
    DelayRange::from_secs(8, 15)
}

fn default_batch_size() -> usize {
    20
}

fn default_batch_pause() -> DelayRange {
    DelayRange::from_secs(60, 120)
}

fn default_cycle_cooldown() -> DelayRange {
    DelayRange::from_secs(30, 60)
}

fn default_block_threshold() -> usize {
    3
}

fn default_max_global_retries() -> u32 {
    5
}

fn default_max_attempts() -> u32 {
    2
}

fn default_initial_delay() -> Duration {
    Duration::from_secs(5)
}

fn default_max_delay() -> Duration {
    Duration::from_secs(10)
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_true() -> bool {
    true
}

// Durations are stored as integer milliseconds on the wire
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
