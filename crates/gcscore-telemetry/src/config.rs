use std::time::Duration;

/// Samples retained by the ring buffer by default.
pub const DEFAULT_CAPACITY: usize = 10_000;

/// Producer cadence by default.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(50);

/// Seed for the synthetic sample source.
pub const DEFAULT_SEED: u64 = 12345;

/// Configuration for a [`TelemetryEngine`](crate::TelemetryEngine).
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Ring buffer capacity in samples. Default: 10000.
    pub capacity: usize,
    /// Time between produced samples. Default: 50 ms.
    pub interval: Duration,
    /// Seed for the default synthetic source. Default: 12345.
    pub seed: u64,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            interval: DEFAULT_INTERVAL,
            seed: DEFAULT_SEED,
        }
    }
}
