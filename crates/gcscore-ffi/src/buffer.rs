use std::ffi::CString;
use std::os::raw::c_char;
use std::ptr;

use crate::error;
use crate::types::{GcsBuffer, GcsResult};

/// Hand `bytes` to the caller through `out`, releasing anything it held.
///
/// A null `out` discards the bytes.
pub(crate) fn write_buffer_out(out: *mut GcsBuffer, bytes: &[u8]) -> GcsResult {
    if out.is_null() {
        return GcsResult::Ok;
    }

    // SAFETY: Pointer validity is guaranteed by the caller.
    let out = unsafe { &mut *out };
    release(out);

    let boxed: Box<[u8]> = bytes.to_vec().into_boxed_slice();
    let len = boxed.len();
    out.data = if len == 0 {
        ptr::null_mut()
    } else {
        Box::into_raw(boxed) as *mut u8
    };
    out.len = len;
    GcsResult::Ok
}

fn release(buffer: &mut GcsBuffer) {
    if !buffer.data.is_null() {
        let slice_ptr = ptr::slice_from_raw_parts_mut(buffer.data, buffer.len);
        // SAFETY: `data` was allocated as a `Box<[u8]>` by `write_buffer_out`.
        unsafe {
            drop(Box::from_raw(slice_ptr));
        }
    }
    *buffer = GcsBuffer::default();
}

/// Convert an owned string into a C string the caller frees with
/// `gcs_string_free`. Null (with last error set) on interior NUL.
pub(crate) fn string_out(text: String) -> *mut c_char {
    match CString::new(text) {
        Ok(text) => text.into_raw(),
        Err(_) => {
            error::set_error_message("string contains interior NUL");
            ptr::null_mut()
        }
    }
}

/// Free bytes returned through a [`GcsBuffer`].
///
/// # Safety
/// `buffer` must be null or point to a `GcsBuffer` whose `data` is null or was
/// filled by this library.
#[no_mangle]
pub unsafe extern "C" fn gcs_buffer_free(buffer: *mut GcsBuffer) {
    crate::ffi_boundary((), || {
        if buffer.is_null() {
            return;
        }
        // SAFETY: Pointer validity is guaranteed by the caller.
        release(unsafe { &mut *buffer });
    });
}

/// Free a string returned by this library.
///
/// # Safety
/// `text` must be null or a pointer returned by a `gcs_*_json` function that
/// has not been freed yet.
#[no_mangle]
pub unsafe extern "C" fn gcs_string_free(text: *mut c_char) {
    crate::ffi_boundary((), || {
        if text.is_null() {
            return;
        }
        // SAFETY: `text` came from `CString::into_raw` in `string_out`.
        drop(unsafe { CString::from_raw(text) });
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_out_populates_and_frees() {
        let mut buffer = GcsBuffer::default();
        assert_eq!(write_buffer_out(&mut buffer, &[1, 2, 3]), GcsResult::Ok);
        assert_eq!(buffer.len, 3);
        assert!(!buffer.data.is_null());

        // SAFETY: Filled by `write_buffer_out` above.
        unsafe { gcs_buffer_free(&mut buffer) };
        assert!(buffer.data.is_null());
        assert_eq!(buffer.len, 0);
    }

    #[test]
    fn buffer_out_reuse_releases_previous() {
        let mut buffer = GcsBuffer::default();
        write_buffer_out(&mut buffer, &[9; 41]);
        write_buffer_out(&mut buffer, &[7; 2]);
        assert_eq!(buffer.len, 2);

        // SAFETY: Filled by `write_buffer_out` above.
        let bytes = unsafe { std::slice::from_raw_parts(buffer.data, buffer.len) };
        assert_eq!(bytes, &[7, 7]);
        // SAFETY: Filled by `write_buffer_out` above.
        unsafe { gcs_buffer_free(&mut buffer) };
    }

    #[test]
    fn string_roundtrip_and_free() {
        let ptr = string_out("{\"a\":1}".to_string());
        assert!(!ptr.is_null());
        // SAFETY: Returned by `string_out`.
        unsafe { gcs_string_free(ptr) };
        assert!(string_out("bad\0text".to_string()).is_null());
    }
}
