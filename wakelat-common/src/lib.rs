use serde::Serialize;
use thiserror::Error;

/// Default sleep between periodic wake rounds, in microseconds.
pub const DEFAULT_ARRIVAL_RATE_US: u64 = 10;
/// Default task service time, in microseconds. Reserved; not used by measurement.
pub const DEFAULT_SERVICE_TIME_US: u64 = 50;
pub const DEFAULT_LOOP_COUNT: u64 = 10_000;
/// Loop counts must be a positive multiple of this value.
pub const LOOP_GRANULARITY: u64 = 10_000;
/// Fixed real-time priority applied when a FIFO or RR policy is requested.
pub const RT_PRIORITY: i32 = 80;

/// Error types for wakeup latency runs
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WakeError {
    #[error("loop count must be a positive multiple of {LOOP_GRANULARITY}, got {0}")]
    InvalidLoopCount(u64),

    #[error("thread count must be at least 1")]
    InvalidThreadCount,

    #[error("Unknown scenario: {0}")]
    UnknownScenario(String),

    #[error("Unknown RT policy code: {0}")]
    UnknownPolicy(u8),

    #[error("Cannot compute statistics over an empty sample buffer")]
    EmptySamples,

    #[error("Failed to spawn worker {0}: {1}")]
    SpawnFailed(usize, String),

    #[error("Failed to apply {0} scheduling: {1}")]
    SchedPolicy(String, String),

    #[error("Signaling path closed: {0}")]
    ChannelClosed(&'static str),

    #[error("Worker {0} panicked")]
    WorkerPanicked(usize),

    #[error("Worker {0} failed: {1}")]
    WorkerFailed(usize, String),
}

/// Result type for wakeup latency operations
pub type Result<T> = std::result::Result<T, WakeError>;

/// Scheduling attributes applied to every worker thread at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum SchedulingHint {
    /// Inherit the default time-sharing policy.
    #[default]
    Default,
    Fifo(i32),
    Rr(i32),
}

impl SchedulingHint {
    /// Map the numeric CLI code (0: non-RT, 1: FIFO, 2: RR) to a hint.
    pub fn from_policy_code(code: u8) -> Result<Self> {
        match code {
            0 => Ok(SchedulingHint::Default),
            1 => Ok(SchedulingHint::Fifo(RT_PRIORITY)),
            2 => Ok(SchedulingHint::Rr(RT_PRIORITY)),
            other => Err(WakeError::UnknownPolicy(other)),
        }
    }

    pub fn policy_name(&self) -> &'static str {
        match self {
            SchedulingHint::Default => "other",
            SchedulingHint::Fifo(_) => "FIFO",
            SchedulingHint::Rr(_) => "RR",
        }
    }

    pub fn is_realtime(&self) -> bool {
        !matches!(self, SchedulingHint::Default)
    }
}

/// Immutable parameters for one scenario run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BenchConfig {
    pub arrival_rate_us: u64,
    pub service_time_us: u64,
    pub loop_count: u64,
    pub thread_count: usize,
    pub scheduling: SchedulingHint,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            arrival_rate_us: DEFAULT_ARRIVAL_RATE_US,
            service_time_us: DEFAULT_SERVICE_TIME_US,
            loop_count: DEFAULT_LOOP_COUNT,
            thread_count: available_cpus(),
            scheduling: SchedulingHint::Default,
        }
    }
}

impl BenchConfig {
    /// Reject configurations that would produce an invalid run.
    /// Called before any worker thread is spawned.
    pub fn validate(&self) -> Result<()> {
        if self.loop_count == 0 || self.loop_count % LOOP_GRANULARITY != 0 {
            return Err(WakeError::InvalidLoopCount(self.loop_count));
        }
        if self.thread_count == 0 {
            return Err(WakeError::InvalidThreadCount);
        }
        Ok(())
    }
}

/// Number of CPUs available to this process, falling back to 1.
pub fn available_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Registered wakeup scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Scenario {
    WakeupSingle,
    WakeupPeriodic,
}

impl Scenario {
    pub fn all() -> [Scenario; 2] {
        [Scenario::WakeupSingle, Scenario::WakeupPeriodic]
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::all().into_iter().find(|s| s.as_name() == name)
    }

    pub fn as_name(&self) -> &'static str {
        match self {
            Scenario::WakeupSingle => "wakeup-single",
            Scenario::WakeupPeriodic => "wakeup-periodic",
        }
    }
}
