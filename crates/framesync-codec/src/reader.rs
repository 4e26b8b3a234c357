use std::collections::VecDeque;
use std::io::{ErrorKind, Read};

use crate::codec::Frame;
use crate::config::DecoderConfig;
use crate::decoder::FrameDecoder;
use crate::error::{FrameError, Result};
use crate::observer::{DecodeObserver, TracingObserver};

/// Default number of bytes requested per `read` call.
pub const DEFAULT_CHUNK_SIZE: usize = 8 * 1024;

/// Buffering options for [`FrameReader`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderConfig {
    /// Bytes requested per `read` call. Values below 1 are treated as 1.
    pub chunk_size: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

/// Reads complete frames from any `Read` stream.
///
/// Each `read` result is handed to the decoder as one chunk, so callers always
/// get complete frames no matter how the stream delivers bytes.
pub struct FrameReader<T, O = TracingObserver> {
    inner: T,
    decoder: FrameDecoder<O>,
    chunk: Vec<u8>,
    pending: VecDeque<Result<Frame>>,
}

impl<T: Read> FrameReader<T> {
    /// Create a new frame reader with default buffering.
    pub fn new(inner: T, config: DecoderConfig) -> Self {
        Self::with_decoder(inner, FrameDecoder::new(config), ReaderConfig::default())
    }
}

impl<T: Read, O: DecodeObserver> FrameReader<T, O> {
    /// Create a frame reader around an existing decoder.
    pub fn with_decoder(inner: T, decoder: FrameDecoder<O>, config: ReaderConfig) -> Self {
        Self {
            inner,
            decoder,
            chunk: vec![0; config.chunk_size.max(1)],
            pending: VecDeque::new(),
        }
    }

    /// Read the next complete frame (blocking).
    ///
    /// Returns `Err(FrameError::ConnectionClosed)` when EOF is reached. Under
    /// [`OversizePolicy::Fail`](crate::OversizePolicy::Fail) the
    /// `LengthOutOfRange` error is returned in stream order, after the frames
    /// that preceded it; reading may continue afterwards.
    pub fn read_frame(&mut self) -> Result<Frame> {
        loop {
            if let Some(next) = self.pending.pop_front() {
                return next;
            }

            let read = match self.inner.read(&mut self.chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            };

            if read == 0 {
                if self.decoder.state().stream_offset() > 0 {
                    tracing::debug!(
                        phase = ?self.decoder.phase(),
                        offset = self.decoder.stream_offset(),
                        "stream closed"
                    );
                }
                return Err(FrameError::ConnectionClosed);
            }

            feed_chunk(&mut self.decoder, &mut self.pending, &self.chunk[..read]);
        }
    }

    pub fn decoder(&self) -> &FrameDecoder<O> {
        &self.decoder
    }

    pub fn decoder_mut(&mut self) -> &mut FrameDecoder<O> {
        &mut self.decoder
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Consume the reader and return the decoder, e.g. to keep its state.
    pub fn into_decoder(self) -> FrameDecoder<O> {
        self.decoder
    }
}

/// Yields frames until EOF; I/O and `LengthOutOfRange` errors are yielded as
/// items.
impl<T: Read, O: DecodeObserver> Iterator for FrameReader<T, O> {
    type Item = Result<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.read_frame() {
            Err(FrameError::ConnectionClosed) => None,
            other => Some(other),
        }
    }
}

/// Decode a whole chunk, queueing frames and errors in stream order.
pub(crate) fn feed_chunk<O: DecodeObserver>(
    decoder: &mut FrameDecoder<O>,
    pending: &mut VecDeque<Result<Frame>>,
    mut bytes: &[u8],
) {
    loop {
        let mut frames = Vec::new();
        let result = decoder.decode_into(bytes, &mut frames);
        pending.extend(frames.into_iter().map(Ok));
        let err = match result {
            Ok(_) => return,
            Err(err) => err,
        };
        let resume = match &err {
            FrameError::LengthOutOfRange { consumed, .. } => Some(*consumed),
            _ => None,
        };
        pending.push_back(Err(err));
        match resume {
            Some(consumed) => bytes = &bytes[consumed..],
            None => return,
        }
    }
}
