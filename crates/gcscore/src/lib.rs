//! Ground-control-station core for uncrewed vehicles.
//!
//! gcscore turns a raw MAVLink v1 byte stream into vehicle state, encodes
//! outbound commands, and runs a bounded telemetry pipeline a UI can poll.
//!
//! # Crate Structure
//!
//! - [`frame`]: Byte-at-a-time frame decoder, checksum, and encoding
//! - [`vehicle`]: Vehicle state store, message dispatch, and commands
//! - [`telemetry`]: Producer thread, ring buffer, and rate statistics
//! - [`GcsContext`]: One explicitly owned instance of all of the above

mod context;
mod error;

pub use context::{ContextConfig, GcsContext};
pub use error::{GcsError, Result};

/// Re-export frame types.
pub mod frame {
    pub use gcscore_frame::*;
}

/// Re-export vehicle types.
pub mod vehicle {
    pub use gcscore_vehicle::*;
}

/// Re-export telemetry types.
pub mod telemetry {
    pub use gcscore_telemetry::*;
}
