/// Errors that can occur during frame encoding or stream I/O.
///
/// Malformed input is never an error for the decoder; it resynchronises on
/// the next start marker instead.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The payload exceeds what the one-byte length field can describe.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// No CRC_EXTRA is known for the message id, so no valid checksum can be produced.
    #[error("unknown message id {0} (no CRC_EXTRA available)")]
    UnknownMessage(u8),

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream ended before another complete frame was received.
    #[error("connection closed (incomplete frame)")]
    ConnectionClosed,
}

pub type Result<T> = std::result::Result<T, FrameError>;
