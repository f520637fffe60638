use std::os::raw::c_char;
use std::time::Duration;

use gcscore::telemetry::TelemetryConfig;
use gcscore::{ContextConfig, GcsContext};
use tracing::debug;

use crate::args;
use crate::error;
use crate::registry;
use crate::types::{GcsContextHandle, GcsResult, GCS_INVALID_HANDLE};

fn register(context: gcscore::Result<GcsContext>) -> GcsContextHandle {
    match context {
        Ok(context) => {
            let handle = registry::insert(context);
            debug!(handle, "context created");
            handle
        }
        Err(err) => {
            let _ = error::map_gcs_error(&err);
            GCS_INVALID_HANDLE
        }
    }
}

/// Create a context with default configuration.
///
/// Returns `GCS_INVALID_HANDLE` (0) on failure; see `gcs_last_error`.
#[no_mangle]
pub extern "C" fn gcs_context_create() -> GcsContextHandle {
    crate::ffi_boundary(GCS_INVALID_HANDLE, || {
        error::clear_error_state();
        register(GcsContext::new())
    })
}

/// Create a context with an explicit telemetry ring capacity, producer
/// interval, and sample seed.
#[no_mangle]
pub extern "C" fn gcs_context_create_with(
    capacity: usize,
    interval_ms: u32,
    seed: u64,
) -> GcsContextHandle {
    crate::ffi_boundary(GCS_INVALID_HANDLE, || {
        error::clear_error_state();
        let config = ContextConfig {
            telemetry: TelemetryConfig {
                capacity,
                interval: Duration::from_millis(u64::from(interval_ms)),
                seed,
            },
            ..ContextConfig::default()
        };
        register(GcsContext::with_config(config))
    })
}

/// Destroy a context. Telemetry is stopped and callbacks are released before
/// this returns, unless another call on the same handle is still running.
#[no_mangle]
pub extern "C" fn gcs_context_destroy(handle: GcsContextHandle) -> GcsResult {
    crate::ffi_boundary(GcsResult::Internal, || {
        error::clear_error_state();
        match registry::remove(handle) {
            Some(context) => {
                drop(context);
                debug!(handle, "context destroyed");
                GcsResult::Ok
            }
            None => error::set_invalid_handle(handle),
        }
    })
}

/// Feed one transport byte.
#[no_mangle]
pub extern "C" fn gcs_submit(handle: GcsContextHandle, byte: u8) -> GcsResult {
    crate::ffi_boundary(GcsResult::Internal, || {
        error::clear_error_state();
        registry::with_context(handle, GcsResult::InvalidHandle, |ctx| {
            ctx.submit(byte);
            GcsResult::Ok
        })
    })
}

/// Feed `len` transport bytes in order. `out_frames` (nullable) receives the
/// number of frames completed by this call.
///
/// # Safety
/// If `len > 0`, `data` must be readable for `len` bytes. `out_frames` must be
/// null or writable.
#[no_mangle]
pub unsafe extern "C" fn gcs_process_message(
    handle: GcsContextHandle,
    data: *const u8,
    len: usize,
    out_frames: *mut usize,
) -> GcsResult {
    crate::ffi_boundary(GcsResult::Internal, || {
        error::clear_error_state();

        // SAFETY: Pointer validity is guaranteed by the caller.
        let Some(bytes) = (unsafe { args::bytes_arg(data, len, "data") }) else {
            return GcsResult::InvalidArgument;
        };

        registry::with_context(handle, GcsResult::InvalidHandle, |ctx| {
            let frames = ctx.process_message(bytes);
            if !out_frames.is_null() {
                // SAFETY: Checked for null; writability is guaranteed by the caller.
                unsafe { *out_frames = frames };
            }
            GcsResult::Ok
        })
    })
}

/// Mark the link connected to `host:port`. `port` 0 selects the default port.
///
/// # Safety
/// `host` must be a non-null pointer to a valid UTF-8, NUL-terminated C string.
#[no_mangle]
pub unsafe extern "C" fn gcs_start_connection(
    handle: GcsContextHandle,
    host: *const c_char,
    port: i32,
) -> GcsResult {
    crate::ffi_boundary(GcsResult::Internal, || {
        error::clear_error_state();

        // SAFETY: We validate null and UTF-8 in helper.
        let Some(host) = (unsafe { args::required_str_arg(host, "host") }) else {
            return GcsResult::InvalidArgument;
        };
        let port = match port {
            0 => None,
            1..=65535 => u16::try_from(port).ok(),
            _ => return error::set_invalid_argument(format!("port out of range: {port}")),
        };

        registry::with_context(handle, GcsResult::InvalidHandle, |ctx| {
            match ctx.start_connection(host, port) {
                Ok(()) => GcsResult::Ok,
                Err(err) => error::map_gcs_error(&err),
            }
        })
    })
}

#[no_mangle]
pub extern "C" fn gcs_stop_connection(handle: GcsContextHandle) -> GcsResult {
    crate::ffi_boundary(GcsResult::Internal, || {
        error::clear_error_state();
        registry::with_context(handle, GcsResult::InvalidHandle, |ctx| {
            ctx.stop_connection();
            GcsResult::Ok
        })
    })
}

/// `false` for unknown handles as well as disconnected links.
#[no_mangle]
pub extern "C" fn gcs_is_connected(handle: GcsContextHandle) -> bool {
    crate::ffi_boundary(false, || {
        error::clear_error_state();
        registry::with_context(handle, false, GcsContext::is_connected)
    })
}

#[cfg(test)]
mod tests {
    use std::ffi::CString;

    use super::*;

    #[test]
    fn create_and_destroy() {
        let handle = gcs_context_create();
        assert_ne!(handle, GCS_INVALID_HANDLE);
        assert_eq!(gcs_context_destroy(handle), GcsResult::Ok);
        assert_eq!(gcs_context_destroy(handle), GcsResult::InvalidHandle);
    }

    #[test]
    fn create_with_zero_capacity_fails() {
        assert_eq!(gcs_context_create_with(0, 50, 1), GCS_INVALID_HANDLE);
    }

    #[test]
    fn connection_lifecycle() {
        let handle = gcs_context_create();
        let host = CString::new("127.0.0.1").unwrap();

        assert!(!gcs_is_connected(handle));
        // SAFETY: `host` is a valid C string for the duration of the call.
        let result = unsafe { gcs_start_connection(handle, host.as_ptr(), 0) };
        assert_eq!(result, GcsResult::Ok);
        assert!(gcs_is_connected(handle));

        assert_eq!(gcs_stop_connection(handle), GcsResult::Ok);
        assert!(!gcs_is_connected(handle));
        gcs_context_destroy(handle);
    }

    #[test]
    fn start_connection_rejects_bad_arguments() {
        let handle = gcs_context_create();
        let empty = CString::new("  ").unwrap();
        let host = CString::new("localhost").unwrap();

        // SAFETY: Null is handled; the C strings outlive the calls.
        unsafe {
            assert_eq!(
                gcs_start_connection(handle, std::ptr::null(), 14550),
                GcsResult::InvalidArgument
            );
            assert_eq!(
                gcs_start_connection(handle, empty.as_ptr(), 14550),
                GcsResult::InvalidArgument
            );
            assert_eq!(
                gcs_start_connection(handle, host.as_ptr(), 70000),
                GcsResult::InvalidArgument
            );
        }
        assert!(!gcs_is_connected(handle));
        gcs_context_destroy(handle);
    }

    #[test]
    fn process_message_counts_frames() {
        let handle = gcs_context_create();
        let frame = gcscore::frame::Frame::new(
            gcscore::frame::FrameHeader::new(1, 2, 3, gcscore::frame::HEARTBEAT),
            vec![0u8; 9],
        )
        .unwrap()
        .to_bytes();

        let mut frames = 0usize;
        // SAFETY: `frame` and `frames` are live for the call.
        let result = unsafe { gcs_process_message(handle, frame.as_ptr(), frame.len(), &mut frames) };
        assert_eq!(result, GcsResult::Ok);
        assert_eq!(frames, 1);

        // SAFETY: Null data with len > 0 is rejected before use.
        let result = unsafe { gcs_process_message(handle, std::ptr::null(), 4, std::ptr::null_mut()) };
        assert_eq!(result, GcsResult::InvalidArgument);
        gcs_context_destroy(handle);
    }

    #[test]
    fn submit_on_unknown_handle() {
        assert_eq!(gcs_submit(GCS_INVALID_HANDLE, 0xFE), GcsResult::InvalidHandle);
    }
}
