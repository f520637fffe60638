//! MAVLink v1 framing for the ground-station core.
//!
//! Every frame on the wire is:
//! - a 1-byte start marker (`0xFE`)
//! - a 5-byte header: payload length, sequence, source system, source component, message id
//! - 0..=255 payload bytes
//! - a 2-byte little-endian X.25 checksum seeded with the message's CRC_EXTRA
//!
//! [`FrameDecoder`] consumes one byte at a time and never rewinds, so any
//! chunking of the same byte stream yields the same frames.

pub mod checksum;
pub mod codec;
pub mod decoder;
pub mod error;
pub mod message;
pub mod reader;
pub mod writer;

#[cfg(feature = "async")]
pub mod tokio_codec;

pub use checksum::{frame_checksum, X25Crc};
pub use codec::{
    encode_frame, Frame, FrameConfig, FrameHeader, CHECKSUM_SIZE, HEADER_SIZE, MAX_FRAME_SIZE,
    MAX_PAYLOAD, START_MARKER,
};
pub use decoder::{DecodeState, DecoderStats, FrameDecoder};
pub use error::{FrameError, Result};
pub use message::{
    crc_extra, message_name, payload_len, ATTITUDE, COMMAND_LONG, GLOBAL_POSITION_INT,
    GPS_RAW_INT, HEARTBEAT, SYS_STATUS, VFR_HUD,
};
pub use reader::FrameReader;
pub use writer::FrameWriter;

#[cfg(feature = "async")]
pub use tokio_codec::MavlinkCodec;
