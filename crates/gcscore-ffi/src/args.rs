use std::ffi::CStr;
use std::os::raw::c_char;

use crate::error;

/// Convert a required C string argument to `&str`.
///
/// # Safety
/// If non-null, `value` must point to a valid NUL-terminated C string.
pub(crate) unsafe fn required_str_arg<'a>(value: *const c_char, name: &str) -> Option<&'a str> {
    if value.is_null() {
        let _ = error::set_invalid_argument(format!("{name} cannot be null"));
        return None;
    }

    // SAFETY: The caller guarantees `value` points to a valid NUL-terminated C string.
    let raw = unsafe { CStr::from_ptr(value) };
    match raw.to_str() {
        Ok(text) => Some(text),
        Err(_) => {
            let _ = error::set_invalid_argument(format!("{name} must be valid UTF-8"));
            None
        }
    }
}

/// Convert a byte pointer + length into a slice.
///
/// # Safety
/// If `len > 0`, `data` must be non-null and readable for `len` bytes.
pub(crate) unsafe fn bytes_arg<'a>(data: *const u8, len: usize, name: &str) -> Option<&'a [u8]> {
    if len == 0 {
        return Some(&[]);
    }
    if data.is_null() {
        let _ = error::set_invalid_argument(format!("{name} cannot be null when len > 0"));
        return None;
    }

    // SAFETY: Pointer and length are validated above and owned by caller for the call duration.
    Some(unsafe { std::slice::from_raw_parts(data, len) })
}

/// Convert a host-supplied count to `usize`, rejecting non-positive values.
pub(crate) fn count_arg(count: i32, name: &str) -> Option<usize> {
    match usize::try_from(count) {
        Ok(count) if count > 0 => Some(count),
        _ => {
            let _ = error::set_invalid_argument(format!("{name} must be positive, got {count}"));
            None
        }
    }
}
