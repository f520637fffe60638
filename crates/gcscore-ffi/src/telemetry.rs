use std::os::raw::c_char;

use gcscore::GcsContext;

use crate::args;
use crate::buffer::string_out;
use crate::error;
use crate::registry;
use crate::types::{GcsContextHandle, GcsResult};

/// Start the telemetry producer. Already running is not an error.
#[no_mangle]
pub extern "C" fn gcs_start_telemetry(handle: GcsContextHandle) -> GcsResult {
    crate::ffi_boundary(GcsResult::Internal, || {
        error::clear_error_state();
        registry::with_context(handle, GcsResult::InvalidHandle, |ctx| {
            match ctx.start_telemetry() {
                Ok(_) => GcsResult::Ok,
                Err(err) => error::map_gcs_error(&err),
            }
        })
    })
}

/// Stop the producer and wait for its thread. Already stopped is not an error.
#[no_mangle]
pub extern "C" fn gcs_stop_telemetry(handle: GcsContextHandle) -> GcsResult {
    crate::ffi_boundary(GcsResult::Internal, || {
        error::clear_error_state();
        registry::with_context(handle, GcsResult::InvalidHandle, |ctx| {
            ctx.stop_telemetry();
            GcsResult::Ok
        })
    })
}

#[no_mangle]
pub extern "C" fn gcs_is_telemetry_running(handle: GcsContextHandle) -> bool {
    crate::ffi_boundary(false, || {
        error::clear_error_state();
        registry::with_context(handle, false, GcsContext::is_telemetry_running)
    })
}

/// `{"engine":{"running":bool},"stats":{"total":N,"approxRate":R}}`.
/// Free with `gcs_string_free`. Null on failure.
#[no_mangle]
pub extern "C" fn gcs_stats_json(handle: GcsContextHandle) -> *mut c_char {
    crate::ffi_boundary(std::ptr::null_mut(), || {
        error::clear_error_state();
        registry::with_context(handle, std::ptr::null_mut(), |ctx| {
            match ctx.stats_json() {
                Ok(json) => string_out(json),
                Err(err) => {
                    let _ = error::map_gcs_error(&err);
                    std::ptr::null_mut()
                }
            }
        })
    })
}

/// Up to `max_count` most recent samples, newest first, as a JSON array of
/// `{seq,type,v1,v2,v3}`. `max_count` must be positive. Free with
/// `gcs_string_free`. Null on failure.
#[no_mangle]
pub extern "C" fn gcs_latest_batch_json(handle: GcsContextHandle, max_count: i32) -> *mut c_char {
    crate::ffi_boundary(std::ptr::null_mut(), || {
        error::clear_error_state();
        let Some(max) = args::count_arg(max_count, "max_count") else {
            return std::ptr::null_mut();
        };

        registry::with_context(handle, std::ptr::null_mut(), |ctx| {
            match ctx.latest_batch_json(max) {
                Ok(json) => string_out(json),
                Err(err) => {
                    let _ = error::map_gcs_error(&err);
                    std::ptr::null_mut()
                }
            }
        })
    })
}

#[cfg(test)]
mod tests {
    use std::ffi::CStr;
    use std::time::{Duration, Instant};

    use super::*;
    use crate::{gcs_context_create_with, gcs_context_destroy, gcs_string_free};

    fn take_string(ptr: *mut c_char) -> String {
        assert!(!ptr.is_null());
        // SAFETY: Returned by this library and freed right after copying.
        let text = unsafe { CStr::from_ptr(ptr) }.to_str().unwrap().to_string();
        unsafe { gcs_string_free(ptr) };
        text
    }

    #[test]
    fn telemetry_lifecycle_over_ffi() {
        let handle = gcs_context_create_with(64, 5, 7);
        assert_eq!(gcs_start_telemetry(handle), GcsResult::Ok);
        assert_eq!(gcs_start_telemetry(handle), GcsResult::Ok);
        assert!(gcs_is_telemetry_running(handle));

        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            let stats = take_string(gcs_stats_json(handle));
            if !stats.contains("\"total\":0") || Instant::now() > deadline {
                break;
            }
            std::thread::sleep(Duration::from_millis(5));
        }

        assert_eq!(gcs_stop_telemetry(handle), GcsResult::Ok);
        assert_eq!(gcs_stop_telemetry(handle), GcsResult::Ok);
        assert!(!gcs_is_telemetry_running(handle));

        let stats = take_string(gcs_stats_json(handle));
        assert!(stats.starts_with("{\"engine\":{\"running\":false},\"stats\":{\"total\":"));
        let batch = take_string(gcs_latest_batch_json(handle, 3));
        assert!(batch.starts_with("[{\"seq\":"), "batch: {batch}");
        gcs_context_destroy(handle);
    }

    #[test]
    fn latest_batch_rejects_non_positive_count() {
        let handle = gcs_context_create_with(16, 50, 1);
        assert!(gcs_latest_batch_json(handle, 0).is_null());
        assert!(gcs_latest_batch_json(handle, -3).is_null());
        assert_eq!(take_string(gcs_latest_batch_json(handle, 4)), "[]");
        gcs_context_destroy(handle);
    }

    #[test]
    fn unknown_handle_yields_null_and_false() {
        assert!(gcs_stats_json(0).is_null());
        assert!(!gcs_is_telemetry_running(0));
        assert_eq!(gcs_start_telemetry(0), GcsResult::InvalidHandle);
    }
}
