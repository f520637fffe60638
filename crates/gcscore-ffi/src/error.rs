use std::cell::RefCell;
use std::ffi::CString;
use std::os::raw::c_char;

use gcscore::frame::FrameError;
use gcscore::telemetry::TelemetryError;
use gcscore::vehicle::VehicleError;
use gcscore::GcsError;

use crate::types::GcsResult;

thread_local! {
    static LAST_ERROR: RefCell<CString> = RefCell::new(CString::default());
}

pub(crate) fn clear_error_state() {
    LAST_ERROR.with(|state| {
        *state.borrow_mut() = CString::default();
    });
}

pub(crate) fn set_error_message(message: impl Into<String>) {
    let sanitized = message.into().replace('\0', "?");
    LAST_ERROR.with(|state| {
        *state.borrow_mut() = CString::new(sanitized).unwrap_or_default();
    });
}

pub(crate) fn set_invalid_argument(message: impl Into<String>) -> GcsResult {
    set_error_message(message);
    GcsResult::InvalidArgument
}

pub(crate) fn set_invalid_handle(handle: u64) -> GcsResult {
    set_error_message(format!("unknown context handle {handle}"));
    GcsResult::InvalidHandle
}

pub(crate) fn set_panic_error() {
    set_error_message("panic across FFI boundary");
}

pub(crate) fn map_gcs_error(err: &GcsError) -> GcsResult {
    set_error_message(err.to_string());
    match err {
        GcsError::Frame(err) => frame_code(err),
        GcsError::Vehicle(err) => vehicle_code(err),
        GcsError::Telemetry(err) => telemetry_code(err),
        GcsError::Json(_) => GcsResult::Internal,
    }
}

fn frame_code(err: &FrameError) -> GcsResult {
    match err {
        FrameError::Io(_) | FrameError::ConnectionClosed => GcsResult::IoError,
        FrameError::PayloadTooLarge { .. } | FrameError::UnknownMessage(_) => GcsResult::FrameError,
    }
}

fn vehicle_code(err: &VehicleError) -> GcsResult {
    match err {
        VehicleError::Frame(err) => frame_code(err),
        VehicleError::InvalidArgument(_) => GcsResult::InvalidArgument,
        VehicleError::Unsupported(_) => GcsResult::Unsupported,
        VehicleError::Io(_) => GcsResult::IoError,
        VehicleError::Json(_) => GcsResult::Internal,
    }
}

fn telemetry_code(err: &TelemetryError) -> GcsResult {
    match err {
        TelemetryError::InvalidCapacity | TelemetryError::InvalidInterval => {
            GcsResult::InvalidArgument
        }
        TelemetryError::Spawn(_) | TelemetryError::Json(_) => GcsResult::TelemetryError,
    }
}

pub(crate) fn last_error_ptr() -> *const c_char {
    LAST_ERROR.with(|state| state.borrow().as_ptr())
}
