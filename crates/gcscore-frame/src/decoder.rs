use bytes::Bytes;

use crate::checksum::frame_checksum;
use crate::codec::{Frame, FrameConfig, FrameHeader, HEADER_SIZE, MAX_FRAME_SIZE, START_MARKER};
use crate::message::{crc_extra, message_name};

/// Decoder position. Each `Got*` state names the last field consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeState {
    WaitingForStart,
    GotStart,
    GotLength,
    GotSequence,
    GotSourceSystem,
    GotSourceComponent,
    GotMessageId,
    AccumulatingPayload,
    GotChecksumByte1,
}

/// Counters for frames seen by a decoder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecoderStats {
    /// Frames emitted to the caller.
    pub frames_decoded: u64,
    /// Complete frames dropped because the checksum did not match.
    pub checksum_failures: u64,
    /// Frames emitted without verification (message id has no CRC_EXTRA).
    pub unverified_frames: u64,
    /// Frames dropped because the message id is unknown and forwarding is off.
    pub dropped_unknown: u64,
    /// Bytes skipped while searching for a start marker.
    pub bytes_discarded: u64,
}

/// Byte-at-a-time MAVLink v1 frame decoder.
///
/// Holds exactly one in-flight frame. Noise before a start marker is skipped;
/// a frame that fails verification is dropped and decoding resumes at
/// [`DecodeState::WaitingForStart`].
pub struct FrameDecoder {
    state: DecodeState,
    buf: [u8; MAX_FRAME_SIZE],
    index: usize,
    payload_len: usize,
    config: FrameConfig,
    stats: DecoderStats,
}

impl FrameDecoder {
    /// Create a decoder with default configuration.
    pub fn new() -> Self {
        Self::with_config(FrameConfig::default())
    }

    /// Create a decoder with explicit configuration.
    pub fn with_config(config: FrameConfig) -> Self {
        Self {
            state: DecodeState::WaitingForStart,
            buf: [0u8; MAX_FRAME_SIZE],
            index: 0,
            payload_len: 0,
            config,
            stats: DecoderStats::default(),
        }
    }

    /// Feed one byte. Returns a frame when this byte completes one that passes verification.
    pub fn submit(&mut self, byte: u8) -> Option<Frame> {
        match self.state {
            DecodeState::WaitingForStart => {
                if byte == START_MARKER {
                    self.buf[0] = byte;
                    self.index = 1;
                    self.state = DecodeState::GotStart;
                } else {
                    self.stats.bytes_discarded += 1;
                }
                None
            }
            DecodeState::GotStart => {
                self.payload_len = usize::from(byte);
                self.push(byte, DecodeState::GotLength);
                None
            }
            DecodeState::GotLength => {
                self.push(byte, DecodeState::GotSequence);
                None
            }
            DecodeState::GotSequence => {
                self.push(byte, DecodeState::GotSourceSystem);
                None
            }
            DecodeState::GotSourceSystem => {
                self.push(byte, DecodeState::GotSourceComponent);
                None
            }
            DecodeState::GotSourceComponent => {
                self.push(byte, DecodeState::GotMessageId);
                None
            }
            DecodeState::GotMessageId | DecodeState::AccumulatingPayload => {
                // Once the payload is complete the next byte is the checksum's low byte;
                // a zero-length payload reaches that point straight from the message id.
                let next = if self.index >= HEADER_SIZE + self.payload_len {
                    DecodeState::GotChecksumByte1
                } else {
                    DecodeState::AccumulatingPayload
                };
                self.push(byte, next);
                None
            }
            DecodeState::GotChecksumByte1 => {
                self.buf[self.index] = byte;
                self.index += 1;
                let frame = self.finish();
                self.reset();
                frame
            }
        }
    }

    /// Feed a run of bytes, handing every completed frame to `on_frame` in order.
    pub fn submit_slice(&mut self, bytes: &[u8], mut on_frame: impl FnMut(Frame)) {
        for &byte in bytes {
            if let Some(frame) = self.submit(byte) {
                on_frame(frame);
            }
        }
    }

    /// Feed a run of bytes and collect every completed frame.
    pub fn decode_all(&mut self, bytes: &[u8]) -> Vec<Frame> {
        let mut frames = Vec::new();
        self.submit_slice(bytes, |frame| frames.push(frame));
        frames
    }

    /// Drop any partial frame and return to `WaitingForStart`. Counters are kept.
    pub fn reset(&mut self) {
        self.state = DecodeState::WaitingForStart;
        self.index = 0;
        self.payload_len = 0;
    }

    /// Current state.
    pub fn state(&self) -> DecodeState {
        self.state
    }

    /// Bytes of the in-flight frame buffered so far.
    pub fn buffered(&self) -> usize {
        self.index
    }

    /// Counters since construction.
    pub fn stats(&self) -> DecoderStats {
        self.stats
    }

    /// Current decoder configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    fn push(&mut self, byte: u8, next: DecodeState) {
        self.buf[self.index] = byte;
        self.index += 1;
        self.state = next;
    }

    fn finish(&mut self) -> Option<Frame> {
        let payload_end = HEADER_SIZE + self.payload_len;
        let header = FrameHeader::new(self.buf[2], self.buf[3], self.buf[4], self.buf[5]);
        let checksum = u16::from_le_bytes([self.buf[payload_end], self.buf[payload_end + 1]]);

        match crc_extra(header.message_id) {
            Some(extra) => {
                let expected = frame_checksum(&self.buf[1..payload_end], extra);
                if self.config.verify_checksum && expected != checksum {
                    self.stats.checksum_failures += 1;
                    tracing::debug!(
                        message = message_name(header.message_id),
                        seq = header.sequence,
                        expected,
                        received = checksum,
                        "dropping frame with bad checksum"
                    );
                    return None;
                }
            }
            None if self.config.forward_unknown => {
                self.stats.unverified_frames += 1;
            }
            None => {
                self.stats.dropped_unknown += 1;
                tracing::trace!(msg_id = header.message_id, "dropping unknown message");
                return None;
            }
        }

        self.stats.frames_decoded += 1;
        tracing::trace!(
            msg_id = header.message_id,
            seq = header.sequence,
            len = self.payload_len,
            "frame decoded"
        );
        Some(Frame {
            header,
            payload: Bytes::copy_from_slice(&self.buf[HEADER_SIZE..payload_end]),
            checksum,
        })
    }
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FrameDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameDecoder")
            .field("state", &self.state)
            .field("buffered", &self.index)
            .field("payload_len", &self.payload_len)
            .field("stats", &self.stats)
            .finish()
    }
}
