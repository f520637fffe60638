/// Errors that can occur in vehicle link operations.
#[derive(Debug, thiserror::Error)]
pub enum VehicleError {
    /// Frame-level error.
    #[error("frame error: {0}")]
    Frame(#[from] gcscore_frame::FrameError),

    /// A caller-supplied argument was rejected.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The operation has no defined encoding.
    #[error("unsupported operation: {0}")]
    Unsupported(String),

    /// Writing an encoded command to the outbound sink failed.
    #[error("command sink error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, VehicleError>;
