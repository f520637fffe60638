use std::os::raw::{c_char, c_void};
use std::sync::Arc;

use gcscore::vehicle::VehicleState;

use crate::buffer::string_out;
use crate::error;
use crate::registry;
use crate::types::{GcsContextHandle, GcsResult, GcsStateCallback, GcsVehicleState, UserData};

/// Register `callback` to receive a state snapshot after every change,
/// replacing any previous observer. A null callback clears it.
///
/// The callback runs synchronously on the thread that fed the triggering
/// bytes and must not block.
#[no_mangle]
pub extern "C" fn gcs_register_state_observer(
    handle: GcsContextHandle,
    callback: GcsStateCallback,
    user_data: *mut c_void,
) -> GcsResult {
    crate::ffi_boundary(GcsResult::Internal, || {
        error::clear_error_state();
        registry::with_context(handle, GcsResult::InvalidHandle, |ctx| {
            let Some(callback) = callback else {
                ctx.clear_state_observer();
                return GcsResult::Ok;
            };

            let user_data = UserData::new(user_data);
            ctx.register_state_observer(Arc::new(move |state: &VehicleState| {
                let snapshot = GcsVehicleState::from(state);
                // SAFETY: The host registered this callback and vouches for `user_data`.
                unsafe { callback(&snapshot, user_data.get()) };
            }));
            GcsResult::Ok
        })
    })
}

/// Copy the current vehicle state into `out_state`.
///
/// # Safety
/// `out_state` must be a non-null pointer to a writable `GcsVehicleState`.
#[no_mangle]
pub unsafe extern "C" fn gcs_get_state(
    handle: GcsContextHandle,
    out_state: *mut GcsVehicleState,
) -> GcsResult {
    crate::ffi_boundary(GcsResult::Internal, || {
        error::clear_error_state();
        if out_state.is_null() {
            return error::set_invalid_argument("out_state cannot be null");
        }

        registry::with_context(handle, GcsResult::InvalidHandle, |ctx| {
            let state = GcsVehicleState::from(&ctx.vehicle_state());
            // SAFETY: Checked for null; writability is guaranteed by the caller.
            unsafe { out_state.write(state) };
            GcsResult::Ok
        })
    })
}

/// Current vehicle state as a JSON object. Free with `gcs_string_free`.
/// Null on failure.
#[no_mangle]
pub extern "C" fn gcs_state_json(handle: GcsContextHandle) -> *mut c_char {
    crate::ffi_boundary(std::ptr::null_mut(), || {
        error::clear_error_state();
        registry::with_context(handle, std::ptr::null_mut(), |ctx| {
            match ctx.vehicle_state_json() {
                Ok(json) => string_out(json),
                Err(err) => {
                    let _ = error::map_gcs_error(&err);
                    std::ptr::null_mut()
                }
            }
        })
    })
}
