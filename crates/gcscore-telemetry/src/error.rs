/// Errors that can occur in the telemetry pipeline.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// A ring buffer needs room for at least one sample.
    #[error("ring buffer capacity must be at least 1")]
    InvalidCapacity,

    /// The producer cadence must be non-zero.
    #[error("producer interval must be non-zero")]
    InvalidInterval,

    /// The producer thread could not be started.
    #[error("failed to spawn producer thread: {0}")]
    Spawn(#[source] std::io::Error),

    /// JSON serialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TelemetryError>;
