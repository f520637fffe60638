use std::fmt;
use std::io;

use gcscore::frame::FrameError;
use gcscore::telemetry::TelemetryError;
use gcscore::vehicle::VehicleError;
use gcscore::GcsError;

// Exit codes follow sysexits-style ranges.
pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const NOT_FOUND: i32 = 66;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::NotFound => NOT_FOUND,
        io::ErrorKind::InvalidData | io::ErrorKind::UnexpectedEof => DATA_INVALID,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    match err {
        FrameError::Io(source) => io_error(context, source),
        FrameError::PayloadTooLarge { .. } | FrameError::UnknownMessage(_) => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
        FrameError::ConnectionClosed => CliError::new(FAILURE, format!("{context}: {err}")),
    }
}

pub fn vehicle_error(context: &str, err: VehicleError) -> CliError {
    match err {
        VehicleError::Frame(err) => frame_error(context, err),
        VehicleError::Io(source) => io_error(context, source),
        VehicleError::InvalidArgument(_) => CliError::new(USAGE, format!("{context}: {err}")),
        VehicleError::Unsupported(_) => CliError::new(FAILURE, format!("{context}: {err}")),
        VehicleError::Json(_) => CliError::new(INTERNAL, format!("{context}: {err}")),
    }
}

pub fn telemetry_error(context: &str, err: TelemetryError) -> CliError {
    match err {
        TelemetryError::InvalidCapacity | TelemetryError::InvalidInterval => {
            CliError::new(USAGE, format!("{context}: {err}"))
        }
        TelemetryError::Spawn(source) => io_error(context, source),
        TelemetryError::Json(_) => CliError::new(INTERNAL, format!("{context}: {err}")),
    }
}

pub fn gcs_error(context: &str, err: GcsError) -> CliError {
    match err {
        GcsError::Frame(err) => frame_error(context, err),
        GcsError::Vehicle(err) => vehicle_error(context, err),
        GcsError::Telemetry(err) => telemetry_error(context, err),
        GcsError::Json(_) => CliError::new(INTERNAL, format!("{context}: {err}")),
    }
}
