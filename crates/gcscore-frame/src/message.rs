//! Known message ids.
//!
//! Only messages listed here can be checksum-verified or encoded; any other id
//! is passed through unverified (if configured) and ignored by dispatch.

/// Vehicle liveness and identity.
pub const HEARTBEAT: u8 = 0;

/// Battery and sensor health.
pub const SYS_STATUS: u8 = 1;

/// Raw GPS fix.
pub const GPS_RAW_INT: u8 = 24;

/// Roll, pitch, yaw in radians.
pub const ATTITUDE: u8 = 30;

/// Fused global position.
pub const GLOBAL_POSITION_INT: u8 = 33;

/// HUD speeds and heading.
pub const VFR_HUD: u8 = 74;

/// Outbound long-form command.
pub const COMMAND_LONG: u8 = 76;

/// CRC_EXTRA seed byte for a message id.
pub fn crc_extra(message_id: u8) -> Option<u8> {
    match message_id {
        HEARTBEAT => Some(50),
        SYS_STATUS => Some(124),
        GPS_RAW_INT => Some(24),
        ATTITUDE => Some(39),
        GLOBAL_POSITION_INT => Some(104),
        VFR_HUD => Some(20),
        COMMAND_LONG => Some(152),
        _ => None,
    }
}

/// Wire payload length of a known message.
pub fn payload_len(message_id: u8) -> Option<usize> {
    match message_id {
        HEARTBEAT => Some(9),
        SYS_STATUS => Some(31),
        GPS_RAW_INT => Some(30),
        ATTITUDE => Some(28),
        GLOBAL_POSITION_INT => Some(28),
        VFR_HUD => Some(20),
        COMMAND_LONG => Some(33),
        _ => None,
    }
}

/// Returns a human-readable name for a message id.
pub fn message_name(message_id: u8) -> &'static str {
    match message_id {
        HEARTBEAT => "HEARTBEAT",
        SYS_STATUS => "SYS_STATUS",
        GPS_RAW_INT => "GPS_RAW_INT",
        ATTITUDE => "ATTITUDE",
        GLOBAL_POSITION_INT => "GLOBAL_POSITION_INT",
        VFR_HUD => "VFR_HUD",
        COMMAND_LONG => "COMMAND_LONG",
        _ => "UNKNOWN",
    }
}

/// Returns true if the message id is in the catalogue.
pub fn is_known(message_id: u8) -> bool {
    crc_extra(message_id).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalogue_is_consistent() {
        for id in 0..=u8::MAX {
            assert_eq!(crc_extra(id).is_some(), payload_len(id).is_some());
            assert_eq!(is_known(id), message_name(id) != "UNKNOWN");
        }
    }

    #[test]
    fn heartbeat_extra() {
        assert_eq!(crc_extra(HEARTBEAT), Some(50));
        assert_eq!(crc_extra(200), None);
    }
}
