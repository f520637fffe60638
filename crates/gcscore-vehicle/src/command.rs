use std::sync::atomic::{AtomicU8, Ordering};

use bytes::{BufMut, Bytes, BytesMut};
use gcscore_frame::{encode_frame, FrameHeader, COMMAND_LONG, MAX_FRAME_SIZE};

use crate::error::Result;

/// MAV_CMD_NAV_RETURN_TO_LAUNCH.
pub const CMD_NAV_RETURN_TO_LAUNCH: u16 = 20;
/// MAV_CMD_NAV_TAKEOFF.
pub const CMD_NAV_TAKEOFF: u16 = 22;
/// MAV_CMD_COMPONENT_ARM_DISARM.
pub const CMD_COMPONENT_ARM_DISARM: u16 = 400;

/// Takeoff altitude used when the caller gives none, in metres.
pub const DEFAULT_TAKEOFF_ALTITUDE: f32 = 10.0;

/// A typed outbound command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CommandRequest {
    ArmDisarm(bool),
    /// Altitude in metres, carried in param7.
    Takeoff(f32),
    ReturnToLaunch,
    /// Any COMMAND_LONG with explicit parameters.
    Long { command: u16, params: [f32; 7] },
}

impl CommandRequest {
    /// MAV_CMD id.
    pub fn command_id(&self) -> u16 {
        match self {
            Self::ArmDisarm(_) => CMD_COMPONENT_ARM_DISARM,
            Self::Takeoff(_) => CMD_NAV_TAKEOFF,
            Self::ReturnToLaunch => CMD_NAV_RETURN_TO_LAUNCH,
            Self::Long { command, .. } => *command,
        }
    }

    /// param1..param7; unused slots are zero.
    pub fn params(&self) -> [f32; 7] {
        let mut params = [0.0f32; 7];
        match self {
            Self::ArmDisarm(arm) => params[0] = if *arm { 1.0 } else { 0.0 },
            Self::Takeoff(altitude) => params[6] = *altitude,
            Self::ReturnToLaunch => {}
            Self::Long { params: explicit, .. } => params = *explicit,
        }
        params
    }

    /// Build a COMMAND_LONG with up to seven parameters; missing ones are zero.
    pub fn long(command: u16, params: &[f32]) -> Self {
        let mut all = [0.0f32; 7];
        for (slot, value) in all.iter_mut().zip(params) {
            *slot = *value;
        }
        Self::Long {
            command,
            params: all,
        }
    }
}

/// Serializes a COMMAND_LONG payload (33 bytes, MAVLink wire order).
pub fn command_long_payload(
    request: &CommandRequest,
    target_system: u8,
    target_component: u8,
) -> [u8; 33] {
    let mut payload = [0u8; 33];
    let mut buf = &mut payload[..];
    for param in request.params() {
        buf.put_f32_le(param);
    }
    buf.put_u16_le(request.command_id());
    buf.put_u8(target_system);
    buf.put_u8(target_component);
    // confirmation
    buf.put_u8(0);
    payload
}

/// Builds outbound command frames stamped with the ground station's ids.
#[derive(Debug)]
pub struct CommandEncoder {
    system_id: u8,
    component_id: u8,
    sequence: AtomicU8,
}

impl CommandEncoder {
    pub fn new(system_id: u8, component_id: u8) -> Self {
        Self {
            system_id,
            component_id,
            sequence: AtomicU8::new(0),
        }
    }

    /// Encode `request` addressed to `target_system`/`target_component`.
    ///
    /// Each call takes the next outbound sequence number, wrapping at 255.
    pub fn encode(
        &self,
        request: &CommandRequest,
        target_system: u8,
        target_component: u8,
    ) -> Result<Bytes> {
        let payload = command_long_payload(request, target_system, target_component);
        let header = FrameHeader::new(
            self.sequence.fetch_add(1, Ordering::Relaxed),
            self.system_id,
            self.component_id,
            COMMAND_LONG,
        );

        let mut dst = BytesMut::with_capacity(MAX_FRAME_SIZE);
        encode_frame(&header, &payload, &mut dst)?;
        Ok(dst.freeze())
    }

    /// Sequence number the next command will carry.
    pub fn next_sequence(&self) -> u8 {
        self.sequence.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use bytes::Buf;
    use gcscore_frame::FrameDecoder;

    use super::*;

    fn decode_one(bytes: &[u8]) -> gcscore_frame::Frame {
        let mut frames = FrameDecoder::new().decode_all(bytes);
        assert_eq!(frames.len(), 1);
        frames.remove(0)
    }

    #[test]
    fn arm_frame_layout() {
        let encoder = CommandEncoder::new(255, 0);
        let bytes = encoder
            .encode(&CommandRequest::ArmDisarm(true), 1, 1)
            .expect("arm should encode");

        assert_eq!(bytes.len(), 41);
        assert_eq!(&bytes[..6], &[0xFE, 33, 0, 255, 0, COMMAND_LONG]);

        let frame = decode_one(&bytes);
        assert_eq!(frame.verify(), Some(true));
        let mut payload = frame.payload.clone();
        assert_eq!(payload.get_f32_le(), 1.0);
        payload.advance(24);
        assert_eq!(payload.get_u16_le(), CMD_COMPONENT_ARM_DISARM);
        assert_eq!(payload.get_u8(), 1);
        assert_eq!(payload.get_u8(), 1);
        assert_eq!(payload.get_u8(), 0);
    }

    #[test]
    fn takeoff_altitude_in_param7() {
        let payload = command_long_payload(&CommandRequest::Takeoff(25.0), 3, 4);
        assert_eq!(f32::from_le_bytes([payload[24], payload[25], payload[26], payload[27]]), 25.0);
        assert!(payload[..24].iter().all(|b| *b == 0));
        assert_eq!(u16::from_le_bytes([payload[28], payload[29]]), CMD_NAV_TAKEOFF);
        assert_eq!((payload[30], payload[31]), (3, 4));
    }

    #[test]
    fn return_to_launch_has_zero_params() {
        let request = CommandRequest::ReturnToLaunch;
        assert_eq!(request.params(), [0.0; 7]);
        assert_eq!(request.command_id(), 20);
    }

    #[test]
    fn long_pads_missing_params() {
        let request = CommandRequest::long(176, &[1.0, 4.0]);
        assert_eq!(request.params(), [1.0, 4.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(request.command_id(), 176);
    }

    #[test]
    fn sequence_increments_and_wraps() {
        let encoder = CommandEncoder::new(255, 0);
        for expected in 0..=u8::MAX {
            let bytes = encoder
                .encode(&CommandRequest::ReturnToLaunch, 1, 1)
                .expect("rtl should encode");
            assert_eq!(bytes[2], expected);
        }
        assert_eq!(encoder.next_sequence(), 0);
    }
}
