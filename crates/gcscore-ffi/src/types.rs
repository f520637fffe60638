use std::ffi::c_void;
use std::os::raw::c_char;

use gcscore::vehicle::VehicleState;

#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GcsResult {
    Ok = 0,
    InvalidArgument = 1,
    InvalidHandle = 2,
    FrameError = 3,
    IoError = 4,
    Unsupported = 5,
    TelemetryError = 6,
    Internal = 99,
}

pub const GCS_OK: GcsResult = GcsResult::Ok;
pub const GCS_ERR_INVALID_ARGUMENT: GcsResult = GcsResult::InvalidArgument;
pub const GCS_ERR_INVALID_HANDLE: GcsResult = GcsResult::InvalidHandle;
pub const GCS_ERR_FRAME: GcsResult = GcsResult::FrameError;
pub const GCS_ERR_IO: GcsResult = GcsResult::IoError;
pub const GCS_ERR_UNSUPPORTED: GcsResult = GcsResult::Unsupported;
pub const GCS_ERR_TELEMETRY: GcsResult = GcsResult::TelemetryError;
pub const GCS_ERR_INTERNAL: GcsResult = GcsResult::Internal;

/// Opaque context handle. Zero is never issued.
pub type GcsContextHandle = u64;

pub const GCS_INVALID_HANDLE: GcsContextHandle = 0;

/// Capacity of [`GcsVehicleState::mode`], including the terminating NUL.
pub const GCS_MODE_LEN: usize = 32;

/// Flat copy of the vehicle state handed to foreign callers.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct GcsVehicleState {
    pub connected: bool,
    pub armed: bool,
    /// NUL-terminated mode name.
    pub mode: [c_char; GCS_MODE_LEN],
    pub system_id: u8,
    pub component_id: u8,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f32,
    pub heading: f32,
    pub roll: f32,
    pub pitch: f32,
    pub yaw: f32,
    pub ground_speed: f32,
    pub air_speed: f32,
    pub battery_voltage: f32,
    pub battery_current: f32,
    pub battery_remaining: u8,
    pub gps_fix_type: u8,
    pub gps_num_satellites: u8,
}

impl Default for GcsVehicleState {
    fn default() -> Self {
        Self::from(&VehicleState::default())
    }
}

impl From<&VehicleState> for GcsVehicleState {
    fn from(state: &VehicleState) -> Self {
        let mut mode = [0 as c_char; GCS_MODE_LEN];
        for (dst, src) in mode
            .iter_mut()
            .zip(state.mode.bytes().filter(|b| *b != 0).take(GCS_MODE_LEN - 1))
        {
            *dst = src as c_char;
        }

        Self {
            connected: state.connected,
            armed: state.armed,
            mode,
            system_id: state.system_id,
            component_id: state.component_id,
            latitude: state.latitude,
            longitude: state.longitude,
            altitude: state.altitude,
            heading: state.heading,
            roll: state.roll,
            pitch: state.pitch,
            yaw: state.yaw,
            ground_speed: state.ground_speed,
            air_speed: state.air_speed,
            battery_voltage: state.battery_voltage,
            battery_current: state.battery_current,
            battery_remaining: state.battery_remaining,
            gps_fix_type: state.gps_fix_type,
            gps_num_satellites: state.gps_num_satellites,
        }
    }
}

/// Encoded bytes owned by this library; release with `gcs_buffer_free`.
#[repr(C)]
#[derive(Debug)]
pub struct GcsBuffer {
    pub data: *mut u8,
    pub len: usize,
}

impl Default for GcsBuffer {
    fn default() -> Self {
        Self {
            data: std::ptr::null_mut(),
            len: 0,
        }
    }
}

/// Called with a state snapshot after every change. The pointer is only valid
/// for the duration of the call.
pub type GcsStateCallback =
    Option<unsafe extern "C" fn(state: *const GcsVehicleState, user_data: *mut c_void)>;

/// Receives every encoded command frame. A non-zero return is reported to the
/// caller of the command as an I/O error.
pub type GcsCommandCallback =
    Option<unsafe extern "C" fn(data: *const u8, len: usize, user_data: *mut c_void) -> i32>;

/// Host-supplied context pointer passed back to callbacks untouched.
#[derive(Clone, Copy)]
pub(crate) struct UserData(*mut c_void);

// SAFETY: the pointer is never dereferenced here; callers registering a
// callback guarantee it may be used from whichever thread triggers it.
unsafe impl Send for UserData {}
// SAFETY: see above.
unsafe impl Sync for UserData {}

impl UserData {
    pub(crate) fn new(ptr: *mut c_void) -> Self {
        Self(ptr)
    }

    pub(crate) fn get(self) -> *mut c_void {
        self.0
    }
}
