use std::io::{ErrorKind, Write};

use bytes::BytesMut;

use crate::codec::{encode_frame, Frame, FrameHeader, MAX_FRAME_SIZE};
use crate::error::{FrameError, Result};

/// Encodes frames onto any `Write` stream.
///
/// Frames sent through [`FrameWriter::send`] are stamped with this writer's
/// source ids and a wrapping sequence number.
pub struct FrameWriter<T> {
    inner: T,
    buf: BytesMut,
    system_id: u8,
    component_id: u8,
    sequence: u8,
}

impl<T: Write> FrameWriter<T> {
    /// Create a new frame writer sending as `system_id`/`component_id`.
    pub fn new(inner: T, system_id: u8, component_id: u8) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(MAX_FRAME_SIZE),
            system_id,
            component_id,
            sequence: 0,
        }
    }

    /// Encode and send a payload, returning the header used.
    pub fn send(&mut self, message_id: u8, payload: &[u8]) -> Result<FrameHeader> {
        let header = FrameHeader::new(
            self.sequence,
            self.system_id,
            self.component_id,
            message_id,
        );

        self.buf.clear();
        encode_frame(&header, payload, &mut self.buf)?;
        self.sequence = self.sequence.wrapping_add(1);
        self.write_buffered()?;
        Ok(header)
    }

    /// Write a frame exactly as stored, including its header and checksum.
    pub fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        self.buf.clear();
        self.buf.extend_from_slice(&frame.to_bytes());
        self.write_buffered()
    }

    fn write_buffered(&mut self) -> Result<()> {
        let mut offset = 0usize;
        while offset < self.buf.len() {
            match self.inner.write(&self.buf[offset..]) {
                Ok(0) => return Err(FrameError::ConnectionClosed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }

        self.flush()
    }

    /// Flush the stream, retrying on interruption.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }

    /// Sequence number the next `send` will use.
    pub fn next_sequence(&self) -> u8 {
        self.sequence
    }

    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    pub fn into_inner(self) -> T {
        self.inner
    }
}
