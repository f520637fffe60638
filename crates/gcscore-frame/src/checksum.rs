//! X.25 checksum (CRC-16/MCRF4XX) as used by MAVLink.

/// Initial accumulator value.
pub const X25_INIT: u16 = 0xFFFF;

/// Running X.25 checksum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct X25Crc {
    value: u16,
}

impl X25Crc {
    /// Start a new checksum.
    pub fn new() -> Self {
        Self { value: X25_INIT }
    }

    /// Fold one byte into the checksum.
    pub fn accumulate(&mut self, byte: u8) {
        let mut tmp = byte ^ (self.value & 0xFF) as u8;
        tmp ^= tmp << 4;
        let tmp = u16::from(tmp);
        self.value = (self.value >> 8) ^ (tmp << 8) ^ (tmp << 3) ^ (tmp >> 4);
    }

    /// Fold a slice of bytes into the checksum.
    pub fn accumulate_slice(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.accumulate(byte);
        }
    }

    /// Current checksum value.
    pub fn value(&self) -> u16 {
        self.value
    }
}

impl Default for X25Crc {
    fn default() -> Self {
        Self::new()
    }
}

/// Checksum of a frame: `covered` is everything after the start marker up to
/// the end of the payload, followed by the message's CRC_EXTRA byte.
pub fn frame_checksum(covered: &[u8], crc_extra: u8) -> u16 {
    let mut crc = X25Crc::new();
    crc.accumulate_slice(covered);
    crc.accumulate(crc_extra);
    crc.value()
}
