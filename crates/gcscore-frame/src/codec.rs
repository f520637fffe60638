use bytes::{BufMut, Bytes, BytesMut};

use crate::checksum::X25Crc;
use crate::error::{FrameError, Result};
use crate::message::crc_extra;

/// Start-of-frame marker for MAVLink v1.
pub const START_MARKER: u8 = 0xFE;

/// Header: start (1) + length (1) + sequence (1) + system (1) + component (1) + message id (1).
pub const HEADER_SIZE: usize = 6;

/// Little-endian checksum trailer.
pub const CHECKSUM_SIZE: usize = 2;

/// Largest payload the one-byte length field can describe.
pub const MAX_PAYLOAD: usize = u8::MAX as usize;

/// Largest possible frame on the wire (263 bytes).
pub const MAX_FRAME_SIZE: usize = HEADER_SIZE + MAX_PAYLOAD + CHECKSUM_SIZE;

/// Routing fields carried by every frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameHeader {
    /// Sender's wrapping sequence number.
    pub sequence: u8,
    /// Source system id.
    pub system_id: u8,
    /// Source component id.
    pub component_id: u8,
    /// Message id selecting payload layout and CRC_EXTRA.
    pub message_id: u8,
}

impl FrameHeader {
    /// Create a header.
    pub fn new(sequence: u8, system_id: u8, component_id: u8, message_id: u8) -> Self {
        Self {
            sequence,
            system_id,
            component_id,
            message_id,
        }
    }
}

/// A complete frame: header, payload, and the checksum as received or encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub header: FrameHeader,
    pub payload: Bytes,
    pub checksum: u16,
}

impl Frame {
    /// Build a frame for a known message, computing its checksum.
    pub fn new(header: FrameHeader, payload: impl Into<Bytes>) -> Result<Self> {
        let payload = payload.into();
        let checksum = compute_checksum(&header, &payload)?;
        Ok(Self {
            header,
            payload,
            checksum,
        })
    }

    /// Message id of this frame.
    pub fn message_id(&self) -> u8 {
        self.header.message_id
    }

    /// The total wire size of this frame (header + payload + checksum).
    pub fn wire_size(&self) -> usize {
        HEADER_SIZE + self.payload.len() + CHECKSUM_SIZE
    }

    /// Check the stored checksum. `None` when the message id has no CRC_EXTRA.
    pub fn verify(&self) -> Option<bool> {
        compute_checksum(&self.header, &self.payload)
            .ok()
            .map(|expected| expected == self.checksum)
    }

    /// Serialize exactly as stored, including the stored checksum.
    pub fn to_bytes(&self) -> Bytes {
        let mut dst = BytesMut::with_capacity(self.wire_size());
        put_header(&self.header, self.payload.len() as u8, &mut dst);
        dst.put_slice(&self.payload);
        dst.put_u16_le(self.checksum);
        dst.freeze()
    }
}

/// Encode a frame into the wire format, returning the checksum written.
///
/// Wire format:
/// ```text
/// ┌──────┬─────┬─────┬───────┬────────┬───────┬──────────────┬──────────────┐
/// │ 0xFE │ len │ seq │ sysid │ compid │ msgid │ payload (len)│ crc (2B LE)  │
/// └──────┴─────┴─────┴───────┴────────┴───────┴──────────────┴──────────────┘
/// ```
pub fn encode_frame(header: &FrameHeader, payload: &[u8], dst: &mut BytesMut) -> Result<u16> {
    let checksum = compute_checksum(header, payload)?;
    dst.reserve(HEADER_SIZE + payload.len() + CHECKSUM_SIZE);
    put_header(header, payload.len() as u8, dst);
    dst.put_slice(payload);
    dst.put_u16_le(checksum);
    Ok(checksum)
}

fn put_header(header: &FrameHeader, len: u8, dst: &mut BytesMut) {
    dst.put_u8(START_MARKER);
    dst.put_u8(len);
    dst.put_u8(header.sequence);
    dst.put_u8(header.system_id);
    dst.put_u8(header.component_id);
    dst.put_u8(header.message_id);
}

fn compute_checksum(header: &FrameHeader, payload: &[u8]) -> Result<u16> {
    if payload.len() > MAX_PAYLOAD {
        return Err(FrameError::PayloadTooLarge {
            size: payload.len(),
            max: MAX_PAYLOAD,
        });
    }
    let extra =
        crc_extra(header.message_id).ok_or(FrameError::UnknownMessage(header.message_id))?;

    let mut crc = X25Crc::new();
    crc.accumulate(payload.len() as u8);
    crc.accumulate(header.sequence);
    crc.accumulate(header.system_id);
    crc.accumulate(header.component_id);
    crc.accumulate(header.message_id);
    crc.accumulate_slice(payload);
    crc.accumulate(extra);
    Ok(crc.value())
}

/// Configuration for frame decoding.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Drop frames whose checksum does not match. Default: true.
    pub verify_checksum: bool,
    /// Emit frames whose message id has no CRC_EXTRA (and so cannot be verified). Default: true.
    pub forward_unknown: bool,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            verify_checksum: true,
            forward_unknown: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum::frame_checksum;
    use crate::message::{COMMAND_LONG, HEARTBEAT};

    #[test]
    fn encode_zero_length_heartbeat() {
        let mut buf = BytesMut::new();
        let header = FrameHeader::new(1, 2, 3, HEARTBEAT);
        let crc = encode_frame(&header, &[], &mut buf).unwrap();

        assert_eq!(buf.len(), HEADER_SIZE + CHECKSUM_SIZE);
        assert_eq!(&buf[..6], &[0xFE, 0x00, 0x01, 0x02, 0x03, 0x00]);
        assert_eq!(crc, frame_checksum(&buf[1..6], 50));
        assert_eq!(u16::from_le_bytes([buf[6], buf[7]]), crc);
    }

    #[test]
    fn encode_rejects_unknown_message() {
        let mut buf = BytesMut::new();
        let header = FrameHeader::new(0, 1, 1, 200);
        let err = encode_frame(&header, b"abc", &mut buf).unwrap_err();
        assert!(matches!(err, FrameError::UnknownMessage(200)));
        assert!(buf.is_empty());
    }

    #[test]
    fn encode_rejects_oversized_payload() {
        let mut buf = BytesMut::new();
        let header = FrameHeader::new(0, 1, 1, COMMAND_LONG);
        let payload = vec![0u8; MAX_PAYLOAD + 1];
        let err = encode_frame(&header, &payload, &mut buf).unwrap_err();
        assert!(matches!(err, FrameError::PayloadTooLarge { size: 256, max: 255 }));
    }

    #[test]
    fn max_frame_size_is_263() {
        assert_eq!(MAX_FRAME_SIZE, 263);
    }

    #[test]
    fn frame_new_verifies_and_serializes() {
        let frame = Frame::new(FrameHeader::new(9, 1, 1, COMMAND_LONG), vec![0u8; 33]).unwrap();
        assert_eq!(frame.verify(), Some(true));
        assert_eq!(frame.wire_size(), 41);

        let mut encoded = BytesMut::new();
        encode_frame(&frame.header, &frame.payload, &mut encoded).unwrap();
        assert_eq!(frame.to_bytes().as_ref(), encoded.as_ref());
    }

    #[test]
    fn tampered_checksum_fails_verification() {
        let mut frame = Frame::new(FrameHeader::new(0, 1, 1, HEARTBEAT), vec![0u8; 9]).unwrap();
        frame.checksum ^= 0x0101;
        assert_eq!(frame.verify(), Some(false));
    }

    #[test]
    fn unknown_frame_cannot_be_verified() {
        let frame = Frame {
            header: FrameHeader::new(0, 1, 1, 201),
            payload: Bytes::from_static(b"xy"),
            checksum: 0,
        };
        assert_eq!(frame.verify(), None);
    }
}
