use gcscore_frame::FrameError;
use gcscore_telemetry::TelemetryError;
use gcscore_vehicle::VehicleError;

/// Errors surfaced by [`GcsContext`](crate::GcsContext).
#[derive(Debug, thiserror::Error)]
pub enum GcsError {
    #[error(transparent)]
    Frame(#[from] FrameError),

    #[error(transparent)]
    Vehicle(#[from] VehicleError),

    #[error(transparent)]
    Telemetry(#[from] TelemetryError),

    /// JSON serialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GcsError>;
