use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

/// Flight mode text before any heartbeat has been decoded.
pub const MODE_UNKNOWN: &str = "UNKNOWN";

/// Latest known vehicle state.
///
/// Serialized with camelCase keys for host consumption.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleState {
    pub connected: bool,
    pub armed: bool,
    pub mode: String,
    pub system_id: u8,
    pub component_id: u8,
    /// Degrees.
    pub latitude: f64,
    /// Degrees.
    pub longitude: f64,
    /// Metres above mean sea level.
    pub altitude: f32,
    /// Degrees, 0..360.
    pub heading: f32,
    /// Degrees.
    pub roll: f32,
    /// Degrees.
    pub pitch: f32,
    /// Degrees.
    pub yaw: f32,
    /// m/s.
    pub ground_speed: f32,
    /// m/s.
    pub air_speed: f32,
    /// Volts.
    pub battery_voltage: f32,
    /// Amperes; negative when the autopilot does not measure current.
    pub battery_current: f32,
    /// Percent, 0..=100.
    pub battery_remaining: u8,
    pub gps_fix_type: u8,
    pub gps_num_satellites: u8,
}

impl Default for VehicleState {
    fn default() -> Self {
        Self {
            connected: false,
            armed: false,
            mode: MODE_UNKNOWN.to_string(),
            system_id: 0,
            component_id: 0,
            latitude: 0.0,
            longitude: 0.0,
            altitude: 0.0,
            heading: 0.0,
            roll: 0.0,
            pitch: 0.0,
            yaw: 0.0,
            ground_speed: 0.0,
            air_speed: 0.0,
            battery_voltage: 0.0,
            battery_current: 0.0,
            battery_remaining: 0,
            gps_fix_type: 0,
            gps_num_satellites: 0,
        }
    }
}

/// Callback invoked with a snapshot after every state change.
///
/// Runs synchronously on the thread that made the change and must not block.
/// It may read the store but must not write to it.
pub type StateObserver = Arc<dyn Fn(&VehicleState) + Send + Sync>;

/// Holds the single authoritative [`VehicleState`].
///
/// Writes are serialized together with their notification, so the observer
/// sees snapshots in the order they were stored and its last snapshot always
/// matches [`read`](Self::read). The state lock itself is released before the
/// observer runs.
#[derive(Default)]
pub struct VehicleStateStore {
    writer: Mutex<()>,
    state: Mutex<VehicleState>,
    observer: Mutex<Option<StateObserver>>,
}

impl VehicleStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A consistent copy of the current state.
    pub fn read(&self) -> VehicleState {
        lock(&self.state).clone()
    }

    /// Replace the state and notify the observer.
    pub fn update(&self, state: VehicleState) {
        let _writer = lock(&self.writer);
        let snapshot = {
            let mut current = lock(&self.state);
            *current = state;
            current.clone()
        };
        self.notify(&snapshot);
    }

    /// Apply `f` to the state under the lock, then notify with the result.
    ///
    /// `f` returns whether it changed anything; no notification is sent otherwise.
    pub fn modify(&self, f: impl FnOnce(&mut VehicleState) -> bool) -> bool {
        let _writer = lock(&self.writer);
        let snapshot = {
            let mut current = lock(&self.state);
            if !f(&mut *current) {
                return false;
            }
            current.clone()
        };
        self.notify(&snapshot);
        true
    }

    /// Register the observer, replacing any previous one.
    pub fn set_observer(&self, observer: StateObserver) {
        *lock(&self.observer) = Some(observer);
    }

    /// Remove the observer. Later updates are retained for polling only.
    pub fn clear_observer(&self) {
        *lock(&self.observer) = None;
    }

    pub fn has_observer(&self) -> bool {
        lock(&self.observer).is_some()
    }

    fn notify(&self, snapshot: &VehicleState) {
        // Clone the Arc out so the observer may re-register without deadlocking.
        let observer = lock(&self.observer).clone();
        if let Some(observer) = observer {
            observer(snapshot);
        }
    }
}

impl fmt::Debug for VehicleStateStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VehicleStateStore")
            .field("state", &self.read())
            .field("has_observer", &self.has_observer())
            .finish()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
