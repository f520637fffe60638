//! `tokio_util::codec` adapter for async streams.

use bytes::{Buf, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::codec::{Frame, FrameConfig, FrameHeader};
use crate::decoder::{DecoderStats, FrameDecoder};
use crate::error::FrameError;

/// Frames a byte stream with the same state machine as [`FrameDecoder`].
#[derive(Debug, Default)]
pub struct MavlinkCodec {
    decoder: FrameDecoder,
}

impl MavlinkCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: FrameConfig) -> Self {
        Self {
            decoder: FrameDecoder::with_config(config),
        }
    }

    pub fn stats(&self) -> DecoderStats {
        self.decoder.stats()
    }
}

impl Decoder for MavlinkCodec {
    type Item = Frame;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Frame>, FrameError> {
        // Consume up to and including the byte that completes a frame; the
        // rest stays in `src` for the next call.
        let mut consumed = 0usize;
        let mut found = None;
        for &byte in src.iter() {
            consumed += 1;
            if let Some(frame) = self.decoder.submit(byte) {
                found = Some(frame);
                break;
            }
        }
        src.advance(consumed);
        Ok(found)
    }
}

impl Encoder<Frame> for MavlinkCodec {
    type Error = FrameError;

    fn encode(&mut self, frame: Frame, dst: &mut BytesMut) -> Result<(), FrameError> {
        dst.extend_from_slice(&frame.to_bytes());
        Ok(())
    }
}

impl<'a> Encoder<(FrameHeader, &'a [u8])> for MavlinkCodec {
    type Error = FrameError;

    fn encode(
        &mut self,
        item: (FrameHeader, &'a [u8]),
        dst: &mut BytesMut,
    ) -> Result<(), FrameError> {
        crate::codec::encode_frame(&item.0, item.1, dst).map(|_| ())
    }
}
