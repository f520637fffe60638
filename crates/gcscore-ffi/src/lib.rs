//! gcscore-ffi: C-ABI exports for the gcscore ground-station core.
//!
//! Contexts are referred to by opaque `u64` handles issued by
//! `gcs_context_create`; the library keeps ownership of every context, and a
//! handle that has been destroyed is simply rejected.

mod args;
mod buffer;
mod command;
mod context;
mod error;
mod registry;
mod state;
mod telemetry;
mod types;

use std::panic::AssertUnwindSafe;

pub use buffer::{gcs_buffer_free, gcs_string_free};
pub use command::{
    gcs_arm_disarm, gcs_return_to_launch, gcs_set_command_sink, gcs_set_mode, gcs_takeoff,
};
pub use context::{
    gcs_context_create, gcs_context_create_with, gcs_context_destroy, gcs_is_connected,
    gcs_process_message, gcs_start_connection, gcs_stop_connection, gcs_submit,
};
pub use state::{gcs_get_state, gcs_register_state_observer, gcs_state_json};
pub use telemetry::{
    gcs_is_telemetry_running, gcs_latest_batch_json, gcs_start_telemetry, gcs_stats_json,
    gcs_stop_telemetry,
};
pub use types::{
    GcsBuffer, GcsCommandCallback, GcsContextHandle, GcsResult, GcsStateCallback,
    GcsVehicleState, GCS_ERR_FRAME, GCS_ERR_INTERNAL, GCS_ERR_INVALID_ARGUMENT,
    GCS_ERR_INVALID_HANDLE, GCS_ERR_IO, GCS_ERR_TELEMETRY, GCS_ERR_UNSUPPORTED, GCS_INVALID_HANDLE,
    GCS_MODE_LEN, GCS_OK,
};

fn ffi_boundary<T>(on_panic: T, f: impl FnOnce() -> T) -> T {
    match std::panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => value,
        Err(_) => {
            error::set_panic_error();
            on_panic
        }
    }
}

/// Message for the last failed call on this thread; empty after a success.
/// The pointer stays valid until the next call on the same thread.
#[no_mangle]
pub extern "C" fn gcs_last_error() -> *const std::os::raw::c_char {
    ffi_boundary(std::ptr::null(), error::last_error_ptr)
}

/// Library version as a static NUL-terminated string.
#[no_mangle]
pub extern "C" fn gcs_version() -> *const std::os::raw::c_char {
    concat!(env!("CARGO_PKG_VERSION"), "\0").as_ptr().cast()
}
