use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use bytes::Buf;
use gcscore_frame::{
    message_name, payload_len, Frame, ATTITUDE, GLOBAL_POSITION_INT, GPS_RAW_INT, HEARTBEAT,
    SYS_STATUS, VFR_HUD,
};
use tracing::{debug, trace};

use crate::state::{VehicleState, VehicleStateStore, MODE_UNKNOWN};

/// base_mode flag: motors armed.
pub const MODE_FLAG_SAFETY_ARMED: u8 = 0x80;
/// base_mode flag: manual input enabled.
pub const MODE_FLAG_MANUAL_INPUT: u8 = 0x40;
/// base_mode flag: attitude stabilization enabled.
pub const MODE_FLAG_STABILIZE: u8 = 0x10;
/// base_mode flag: guided mode enabled.
pub const MODE_FLAG_GUIDED: u8 = 0x08;
/// base_mode flag: autonomous mode enabled.
pub const MODE_FLAG_AUTO: u8 = 0x04;

/// What happened to a frame handed to [`MessageDispatcher::dispatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// State was updated from the frame.
    Applied,
    /// Message id has no handler; nothing changed.
    Ignored,
    /// Known message whose payload is too short; nothing changed.
    Malformed,
}

/// Dispatch counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub applied: u64,
    pub ignored: u64,
    pub malformed: u64,
}

/// Interprets completed frames and folds them into the vehicle state.
#[derive(Debug)]
pub struct MessageDispatcher {
    store: Arc<VehicleStateStore>,
    applied: AtomicU64,
    ignored: AtomicU64,
    malformed: AtomicU64,
}

impl MessageDispatcher {
    pub fn new(store: Arc<VehicleStateStore>) -> Self {
        Self {
            store,
            applied: AtomicU64::new(0),
            ignored: AtomicU64::new(0),
            malformed: AtomicU64::new(0),
        }
    }

    /// The store this dispatcher writes to.
    pub fn store(&self) -> &Arc<VehicleStateStore> {
        &self.store
    }

    /// Apply one frame. The observer, if any, runs before this returns.
    pub fn dispatch(&self, frame: &Frame) -> DispatchOutcome {
        let id = frame.message_id();
        let payload = frame.payload.as_ref();

        let outcome = match id {
            // A heartbeat of any length proves the link is alive.
            HEARTBEAT => {
                self.store
                    .modify(|state| apply_heartbeat(state, frame, payload));
                DispatchOutcome::Applied
            }
            SYS_STATUS | ATTITUDE | GLOBAL_POSITION_INT | GPS_RAW_INT | VFR_HUD => {
                if payload.len() < payload_len(id).unwrap_or(0) {
                    debug!(
                        message = message_name(id),
                        len = payload.len(),
                        "short payload ignored"
                    );
                    DispatchOutcome::Malformed
                } else {
                    self.store.modify(|state| {
                        apply_telemetry(state, id, payload);
                        true
                    });
                    DispatchOutcome::Applied
                }
            }
            _ => {
                trace!(message_id = id, "no handler for message");
                DispatchOutcome::Ignored
            }
        };

        let counter = match outcome {
            DispatchOutcome::Applied => &self.applied,
            DispatchOutcome::Ignored => &self.ignored,
            DispatchOutcome::Malformed => &self.malformed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        outcome
    }

    pub fn stats(&self) -> DispatchStats {
        DispatchStats {
            applied: self.applied.load(Ordering::Relaxed),
            ignored: self.ignored.load(Ordering::Relaxed),
            malformed: self.malformed.load(Ordering::Relaxed),
        }
    }
}

fn apply_heartbeat(state: &mut VehicleState, frame: &Frame, payload: &[u8]) -> bool {
    state.connected = true;
    state.system_id = frame.header.system_id;
    state.component_id = frame.header.component_id;

    if payload.len() >= payload_len(HEARTBEAT).unwrap_or(0) {
        let base_mode = payload[6];
        state.armed = base_mode & MODE_FLAG_SAFETY_ARMED != 0;
        state.mode = mode_name(base_mode).to_string();
    }
    true
}

fn apply_telemetry(state: &mut VehicleState, id: u8, payload: &[u8]) {
    match id {
        SYS_STATUS => {
            let mut buf = &payload[14..];
            state.battery_voltage = f32::from(buf.get_u16_le()) / 1000.0;
            state.battery_current = f32::from(buf.get_i16_le()) / 100.0;
            state.battery_remaining = (payload[30] as i8).clamp(0, 100) as u8;
        }
        ATTITUDE => {
            let mut buf = &payload[4..];
            state.roll = buf.get_f32_le().to_degrees();
            state.pitch = buf.get_f32_le().to_degrees();
            state.yaw = buf.get_f32_le().to_degrees();
        }
        GLOBAL_POSITION_INT => {
            let mut buf = &payload[4..];
            state.latitude = f64::from(buf.get_i32_le()) / 1e7;
            state.longitude = f64::from(buf.get_i32_le()) / 1e7;
            state.altitude = buf.get_i32_le() as f32 / 1000.0;
        }
        GPS_RAW_INT => {
            state.gps_fix_type = payload[28];
            state.gps_num_satellites = payload[29];
        }
        VFR_HUD => {
            let mut buf = payload;
            state.air_speed = buf.get_f32_le();
            state.ground_speed = buf.get_f32_le();
            state.heading = f32::from((&payload[16..]).get_i16_le());
        }
        _ => {}
    }
}

/// Mode text for a heartbeat base_mode byte.
pub fn mode_name(base_mode: u8) -> &'static str {
    if base_mode & MODE_FLAG_AUTO != 0 {
        "AUTO"
    } else if base_mode & MODE_FLAG_GUIDED != 0 {
        "GUIDED"
    } else if base_mode & MODE_FLAG_STABILIZE != 0 {
        "STABILIZE"
    } else if base_mode & MODE_FLAG_MANUAL_INPUT != 0 {
        "MANUAL"
    } else {
        MODE_UNKNOWN
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use bytes::BufMut;
    use gcscore_frame::FrameHeader;

    use super::*;

    fn frame(id: u8, payload: Vec<u8>) -> Frame {
        Frame::new(FrameHeader::new(0, 2, 3, id), payload).unwrap()
    }

    fn dispatcher() -> MessageDispatcher {
        MessageDispatcher::new(Arc::new(VehicleStateStore::new()))
    }

    #[test]
    fn empty_heartbeat_marks_connected() {
        let dispatcher = dispatcher();
        let seen = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&seen);
        dispatcher
            .store()
            .set_observer(Arc::new(move |state: &VehicleState| {
                *sink.lock().unwrap() = Some(state.clone());
            }));

        assert_eq!(
            dispatcher.dispatch(&frame(HEARTBEAT, vec![])),
            DispatchOutcome::Applied
        );

        let state = seen.lock().unwrap().clone().unwrap();
        assert!(state.connected);
        assert_eq!(state.system_id, 2);
        assert_eq!(state.component_id, 3);
        assert_eq!(state.mode, MODE_UNKNOWN);
    }

    #[test]
    fn full_heartbeat_sets_armed_and_mode() {
        let dispatcher = dispatcher();
        let mut payload = vec![0u8; 9];
        payload[6] = MODE_FLAG_SAFETY_ARMED | MODE_FLAG_GUIDED | MODE_FLAG_STABILIZE;
        dispatcher.dispatch(&frame(HEARTBEAT, payload));

        let state = dispatcher.store().read();
        assert!(state.armed);
        assert_eq!(state.mode, "GUIDED");
    }

    #[test]
    fn mode_priority() {
        assert_eq!(mode_name(0xFF), "AUTO");
        assert_eq!(mode_name(MODE_FLAG_MANUAL_INPUT | MODE_FLAG_STABILIZE), "STABILIZE");
        assert_eq!(mode_name(MODE_FLAG_MANUAL_INPUT), "MANUAL");
        assert_eq!(mode_name(MODE_FLAG_SAFETY_ARMED), "UNKNOWN");
    }

    #[test]
    fn sys_status_battery() {
        let dispatcher = dispatcher();
        let mut payload = vec![0u8; 31];
        payload[14..16].copy_from_slice(&12_600u16.to_le_bytes());
        payload[16..18].copy_from_slice(&(-1i16).to_le_bytes());
        payload[30] = 87;
        dispatcher.dispatch(&frame(SYS_STATUS, payload));

        let state = dispatcher.store().read();
        assert!((state.battery_voltage - 12.6).abs() < 1e-4);
        assert!((state.battery_current + 0.01).abs() < 1e-6);
        assert_eq!(state.battery_remaining, 87);
    }

    #[test]
    fn unknown_battery_remaining_clamps_to_zero() {
        let dispatcher = dispatcher();
        let mut payload = vec![0u8; 31];
        payload[30] = 0xFF;
        dispatcher.dispatch(&frame(SYS_STATUS, payload));
        assert_eq!(dispatcher.store().read().battery_remaining, 0);
    }

    #[test]
    fn attitude_in_degrees() {
        let dispatcher = dispatcher();
        let mut payload = Vec::with_capacity(28);
        payload.put_u32_le(1000);
        payload.put_f32_le(std::f32::consts::FRAC_PI_2);
        payload.put_f32_le(-std::f32::consts::FRAC_PI_4);
        payload.put_f32_le(std::f32::consts::PI);
        payload.resize(28, 0);
        dispatcher.dispatch(&frame(ATTITUDE, payload));

        let state = dispatcher.store().read();
        assert!((state.roll - 90.0).abs() < 1e-3);
        assert!((state.pitch + 45.0).abs() < 1e-3);
        assert!((state.yaw - 180.0).abs() < 1e-3);
    }

    #[test]
    fn global_position() {
        let dispatcher = dispatcher();
        let mut payload = Vec::with_capacity(28);
        payload.put_u32_le(0);
        payload.put_i32_le(473_977_420);
        payload.put_i32_le(85_455_940);
        payload.put_i32_le(488_500);
        payload.resize(28, 0);
        dispatcher.dispatch(&frame(GLOBAL_POSITION_INT, payload));

        let state = dispatcher.store().read();
        assert!((state.latitude - 47.397742).abs() < 1e-9);
        assert!((state.longitude - 8.545594).abs() < 1e-9);
        assert!((state.altitude - 488.5).abs() < 1e-3);
    }

    #[test]
    fn gps_and_hud() {
        let dispatcher = dispatcher();
        let mut gps = vec![0u8; 30];
        gps[28] = 3;
        gps[29] = 11;
        dispatcher.dispatch(&frame(GPS_RAW_INT, gps));

        let mut hud = Vec::with_capacity(20);
        hud.put_f32_le(14.5);
        hud.put_f32_le(12.25);
        hud.put_f32_le(100.0);
        hud.put_f32_le(0.5);
        hud.put_i16_le(270);
        hud.put_u16_le(40);
        dispatcher.dispatch(&frame(VFR_HUD, hud));

        let state = dispatcher.store().read();
        assert_eq!((state.gps_fix_type, state.gps_num_satellites), (3, 11));
        assert_eq!(state.air_speed, 14.5);
        assert_eq!(state.ground_speed, 12.25);
        assert_eq!(state.heading, 270.0);
    }

    #[test]
    fn short_payload_is_malformed() {
        let dispatcher = dispatcher();
        assert_eq!(
            dispatcher.dispatch(&frame(ATTITUDE, vec![0u8; 12])),
            DispatchOutcome::Malformed
        );
        assert_eq!(dispatcher.stats().malformed, 1);
        assert_eq!(dispatcher.store().read(), VehicleState::default());
    }

    #[test]
    fn unknown_message_is_ignored() {
        let dispatcher = dispatcher();
        let unknown = Frame {
            header: FrameHeader::new(0, 9, 9, 150),
            payload: bytes::Bytes::from_static(&[1, 2, 3]),
            checksum: 0,
        };
        assert_eq!(dispatcher.dispatch(&unknown), DispatchOutcome::Ignored);
        assert_eq!(dispatcher.store().read(), VehicleState::default());
        assert_eq!(
            dispatcher.stats(),
            DispatchStats {
                applied: 0,
                ignored: 1,
                malformed: 0
            }
        );
    }
}
