use std::io::{ErrorKind, Write};

use bytes::BytesMut;

use crate::codec::{encode_frame, Frame};
use crate::config::DecoderConfig;
use crate::error::{FrameError, Result};

const INITIAL_BUFFER_CAPACITY: usize = 1024;

/// Writes complete frames to any `Write` stream.
pub struct FrameWriter<T> {
    inner: T,
    buf: BytesMut,
    config: DecoderConfig,
}

impl<T: Write> FrameWriter<T> {
    /// Create a frame writer for the wire format described by `config`.
    pub fn new(inner: T, config: DecoderConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Write a complete frame (blocking).
    pub fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        self.send(&frame.tag, &frame.value)
    }

    /// Encode and send a payload under `tag`.
    pub fn send(&mut self, tag: &[u8], value: &[u8]) -> Result<()> {
        self.buf.clear();
        encode_frame(&self.config, tag, value, &mut self.buf)?;

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

    /// Flush the underlying stream.
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

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Wire format configuration.
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }
}
