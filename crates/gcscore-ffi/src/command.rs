use std::io::{self, Write};
use std::os::raw::{c_char, c_void};

use gcscore::GcsContext;

use crate::args;
use crate::buffer::write_buffer_out;
use crate::error;
use crate::registry;
use crate::types::{GcsBuffer, GcsCommandCallback, GcsContextHandle, GcsResult, UserData};

/// Forwards encoded command frames to a host callback.
struct CallbackSink {
    callback: unsafe extern "C" fn(*const u8, usize, *mut c_void) -> i32,
    user_data: UserData,
}

impl Write for CallbackSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        // SAFETY: The host registered this callback and vouches for `user_data`.
        let status = unsafe { (self.callback)(buf.as_ptr(), buf.len(), self.user_data.get()) };
        if status != 0 {
            return Err(io::Error::other(format!(
                "command sink rejected frame (status {status})"
            )));
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn run_command(
    handle: GcsContextHandle,
    out_frame: *mut GcsBuffer,
    command: impl FnOnce(&GcsContext) -> gcscore::Result<Vec<u8>>,
) -> GcsResult {
    registry::with_context(handle, GcsResult::InvalidHandle, |ctx| match command(ctx) {
        Ok(frame) => write_buffer_out(out_frame, &frame),
        Err(err) => error::map_gcs_error(&err),
    })
}

/// Install (or, with a null callback, remove) the sink that receives every
/// encoded command frame.
#[no_mangle]
pub extern "C" fn gcs_set_command_sink(
    handle: GcsContextHandle,
    callback: GcsCommandCallback,
    user_data: *mut c_void,
) -> GcsResult {
    crate::ffi_boundary(GcsResult::Internal, || {
        error::clear_error_state();
        registry::with_context(handle, GcsResult::InvalidHandle, |ctx| {
            match callback {
                Some(callback) => ctx.set_command_sink(Box::new(CallbackSink {
                    callback,
                    user_data: UserData::new(user_data),
                })),
                None => ctx.link().clear_command_sink(),
            }
            GcsResult::Ok
        })
    })
}

/// Arm (`true`) or disarm the vehicle. `out_frame` (nullable) receives the
/// encoded frame.
///
/// # Safety
/// `out_frame` must be null or point to a writable `GcsBuffer`.
#[no_mangle]
pub unsafe extern "C" fn gcs_arm_disarm(
    handle: GcsContextHandle,
    arm: bool,
    out_frame: *mut GcsBuffer,
) -> GcsResult {
    crate::ffi_boundary(GcsResult::Internal, || {
        error::clear_error_state();
        run_command(handle, out_frame, |ctx| ctx.arm_disarm(arm))
    })
}

/// # Safety
/// `out_frame` must be null or point to a writable `GcsBuffer`.
#[no_mangle]
pub unsafe extern "C" fn gcs_return_to_launch(
    handle: GcsContextHandle,
    out_frame: *mut GcsBuffer,
) -> GcsResult {
    crate::ffi_boundary(GcsResult::Internal, || {
        error::clear_error_state();
        run_command(handle, out_frame, GcsContext::return_to_launch)
    })
}

/// Take off to `altitude` metres.
///
/// # Safety
/// `out_frame` must be null or point to a writable `GcsBuffer`.
#[no_mangle]
pub unsafe extern "C" fn gcs_takeoff(
    handle: GcsContextHandle,
    altitude: f32,
    out_frame: *mut GcsBuffer,
) -> GcsResult {
    crate::ffi_boundary(GcsResult::Internal, || {
        error::clear_error_state();
        run_command(handle, out_frame, |ctx| ctx.takeoff(Some(altitude)))
    })
}

/// Mode changes have no command encoding yet; always `GCS_ERR_UNSUPPORTED`
/// once the arguments are valid.
///
/// # Safety
/// `mode` must be a non-null pointer to a valid UTF-8, NUL-terminated C string.
#[no_mangle]
pub unsafe extern "C" fn gcs_set_mode(handle: GcsContextHandle, mode: *const c_char) -> GcsResult {
    crate::ffi_boundary(GcsResult::Internal, || {
        error::clear_error_state();

        // SAFETY: We validate null and UTF-8 in helper.
        let Some(mode) = (unsafe { args::required_str_arg(mode, "mode") }) else {
            return GcsResult::InvalidArgument;
        };
        run_command(handle, std::ptr::null_mut(), |ctx| ctx.set_mode(mode))
    })
}

#[cfg(test)]
mod tests {
    use std::ffi::CString;
    use std::sync::Mutex;

    use super::*;
    use crate::{gcs_buffer_free, gcs_context_create, gcs_context_destroy};

    unsafe extern "C" fn collect(data: *const u8, len: usize, user_data: *mut c_void) -> i32 {
        // SAFETY: Test passes a `Mutex<Vec<Vec<u8>>>` and a valid slice.
        let frames = unsafe { &*(user_data as *const Mutex<Vec<Vec<u8>>>) };
        let bytes = unsafe { std::slice::from_raw_parts(data, len) };
        frames.lock().unwrap().push(bytes.to_vec());
        0
    }

    unsafe extern "C" fn reject(_data: *const u8, _len: usize, _user_data: *mut c_void) -> i32 {
        -1
    }

    #[test]
    fn arm_returns_frame_and_feeds_sink() {
        let handle = gcs_context_create();
        let frames = Mutex::new(Vec::<Vec<u8>>::new());
        let user_data = &frames as *const _ as *mut c_void;
        assert_eq!(
            gcs_set_command_sink(handle, Some(collect), user_data),
            GcsResult::Ok
        );

        let mut out = GcsBuffer::default();
        // SAFETY: `out` is a live local.
        assert_eq!(unsafe { gcs_arm_disarm(handle, true, &mut out) }, GcsResult::Ok);
        assert_eq!(out.len, 41);
        // SAFETY: Filled by the library above.
        let bytes = unsafe { std::slice::from_raw_parts(out.data, out.len) }.to_vec();
        unsafe { gcs_buffer_free(&mut out) };

        assert_eq!(&bytes[..6], &[0xFE, 33, 0, 255, 0, 76]);
        assert_eq!(frames.lock().unwrap().as_slice(), &[bytes]);

        gcs_set_command_sink(handle, None, std::ptr::null_mut());
        gcs_context_destroy(handle);
    }

    #[test]
    fn sink_failure_maps_to_io_error() {
        let handle = gcs_context_create();
        gcs_set_command_sink(handle, Some(reject), std::ptr::null_mut());

        // SAFETY: Null out_frame is allowed.
        let result = unsafe { gcs_return_to_launch(handle, std::ptr::null_mut()) };
        assert_eq!(result, GcsResult::IoError);
        gcs_context_destroy(handle);
    }

    #[test]
    fn takeoff_rejects_non_finite_altitude() {
        let handle = gcs_context_create();
        // SAFETY: Null out_frame is allowed.
        let result = unsafe { gcs_takeoff(handle, f32::NAN, std::ptr::null_mut()) };
        assert_eq!(result, GcsResult::InvalidArgument);
        gcs_context_destroy(handle);
    }

    #[test]
    fn set_mode_is_unsupported() {
        let handle = gcs_context_create();
        let mode = CString::new("GUIDED").unwrap();
        // SAFETY: `mode` outlives the call.
        assert_eq!(
            unsafe { gcs_set_mode(handle, mode.as_ptr()) },
            GcsResult::Unsupported
        );
        // SAFETY: Null is rejected before use.
        assert_eq!(
            unsafe { gcs_set_mode(handle, std::ptr::null()) },
            GcsResult::InvalidArgument
        );
        gcs_context_destroy(handle);
    }
}
