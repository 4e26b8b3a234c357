//! The resumable frame decoder.
//!
//! [`ScannerState`] holds everything the decoder knows about one stream: the
//! current phase, the tag window, the in-progress frame and the number of
//! bytes consumed so far. Each decode call consumes a whole chunk, advancing
//! the state and emitting every frame completed along the way. How the stream
//! is sliced into chunks never changes which frames come out.

use bytes::{Bytes, BytesMut};
use serde::{Deserialize, Serialize};

use crate::codec::Frame;
use crate::config::{DecoderConfig, LengthField, OversizePolicy};
use crate::error::{FrameError, Result};
use crate::observer::{DecodeEvent, DecodeObserver, TracingObserver};
use crate::window::TagWindow;

/// Where the decoder is within the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Collecting tag candidate bytes.
    AwaitingTag,
    /// A tag matched; the next byte is the raw length.
    AwaitingLength,
    /// Collecting payload bytes.
    AwaitingValue,
}

/// Persistent per-stream scanner state.
///
/// Fields are private: the state changes only through decode calls. It can be
/// taken out of a decoder, serialized, and handed back later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannerState {
    phase: Phase,
    window: TagWindow,
    length: usize,
    value: BytesMut,
    offset: u64,
}

impl ScannerState {
    /// Fresh state for the start of a stream.
    pub fn new(config: &DecoderConfig) -> Self {
        Self {
            phase: Phase::AwaitingTag,
            window: TagWindow::new(config.tag_len()),
            length: 0,
            value: BytesMut::with_capacity(config.max_value_capacity()),
            offset: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Tag bytes collected for the current candidate (or the matched tag).
    pub fn tag_bytes_collected(&self) -> usize {
        self.window.collected()
    }

    /// Payload bytes collected for the in-progress frame.
    pub fn value_bytes_collected(&self) -> usize {
        self.value.len()
    }

    /// Payload size of the in-progress frame, once known.
    pub fn pending_length(&self) -> Option<usize> {
        match self.phase {
            Phase::AwaitingValue => Some(self.length),
            _ => None,
        }
    }

    /// Total bytes consumed from the stream.
    pub fn stream_offset(&self) -> u64 {
        self.offset
    }

    /// Check that this state can be driven by `config`.
    pub fn validate(&self, config: &DecoderConfig) -> Result<()> {
        let tag_len = self.window.tag_len();
        if tag_len != config.tag_len() {
            return Err(FrameError::InvalidState(format!(
                "tag window holds {tag_len} bytes, configuration expects {}",
                config.tag_len()
            )));
        }
        if self.window.collected() > tag_len {
            return Err(FrameError::InvalidState(format!(
                "{} tag bytes collected in a {tag_len}-byte window",
                self.window.collected()
            )));
        }
        if self.phase != Phase::AwaitingTag && !self.window.is_full() {
            return Err(FrameError::InvalidState(
                "frame in progress without a complete tag".to_string(),
            ));
        }
        if self.phase == Phase::AwaitingLength
            && matches!(config.length_field(), LengthField::Fixed(_))
        {
            return Err(FrameError::InvalidState(
                "awaiting a length byte under a fixed-length configuration".to_string(),
            ));
        }
        if let LengthField::Fixed(size) = config.length_field() {
            if self.phase == Phase::AwaitingValue && self.length != size {
                return Err(FrameError::InvalidState(format!(
                    "in-progress frame expects {} bytes, configuration fixes {size}",
                    self.length
                )));
            }
        }
        if self.length > config.max_value_capacity() || self.value.len() > self.length {
            return Err(FrameError::InvalidState(format!(
                "{} of {} payload bytes collected, capacity {}",
                self.value.len(),
                self.length,
                config.max_value_capacity()
            )));
        }
        Ok(())
    }

    /// Consume all of `chunk`, appending completed frames to `out`.
    ///
    /// Returns the number of frames appended. Tags and payloads are taken in
    /// the longest runs the chunk allows; the result is the same as feeding
    /// one byte at a time.
    pub(crate) fn advance<O: DecodeObserver + ?Sized>(
        &mut self,
        config: &DecoderConfig,
        chunk: &[u8],
        out: &mut Vec<Frame>,
        observer: &mut O,
    ) -> Result<usize> {
        let emitted_before = out.len();
        let mut pos = 0;

        while pos < chunk.len() {
            match self.phase {
                Phase::AwaitingTag => {
                    let taken = self.window.fill(&chunk[pos..]);
                    pos += taken;
                    self.offset += taken as u64;
                    if self.window.is_full() {
                        self.check_tag(config, out, observer);
                    }
                }
                Phase::AwaitingLength => {
                    let raw = chunk[pos];
                    pos += 1;
                    self.offset += 1;
                    if let Err(length) = self.accept_length(config, raw, out, observer) {
                        if config.oversize_policy() == OversizePolicy::Fail {
                            return Err(FrameError::LengthOutOfRange {
                                length,
                                capacity: config.max_value_capacity(),
                                consumed: pos,
                                frames: Vec::new(),
                            });
                        }
                    }
                }
                Phase::AwaitingValue => {
                    let wanted = self.length - self.value.len();
                    let taken = wanted.min(chunk.len() - pos);
                    self.value.extend_from_slice(&chunk[pos..pos + taken]);
                    pos += taken;
                    self.offset += taken as u64;
                    if self.value.len() == self.length {
                        self.emit(out, observer);
                    }
                }
            }
        }

        Ok(out.len() - emitted_before)
    }

    /// Evaluate a full tag window: advance on a match, slide on a miss.
    fn check_tag<O: DecodeObserver + ?Sized>(
        &mut self,
        config: &DecoderConfig,
        out: &mut Vec<Frame>,
        observer: &mut O,
    ) {
        if config.tags().matches(self.window.candidate()) {
            match config.length_field() {
                LengthField::Prefixed { .. } => self.phase = Phase::AwaitingLength,
                LengthField::Fixed(size) => self.begin_value(size, out, observer),
            }
            return;
        }

        let offset = self.offset - self.window.tag_len() as u64;
        let byte = self.window.slide();
        observer.on_event(&DecodeEvent::ByteDiscarded { byte, offset });
    }

    /// Apply a raw length byte. An out-of-range length rejects the whole
    /// header and rescans from one byte past the tag start; the rejected
    /// length is returned.
    fn accept_length<O: DecodeObserver + ?Sized>(
        &mut self,
        config: &DecoderConfig,
        raw: u8,
        out: &mut Vec<Frame>,
        observer: &mut O,
    ) -> std::result::Result<(), i64> {
        let length = match config.payload_len(raw) {
            Ok(length) => {
                self.begin_value(length, out, observer);
                return Ok(());
            }
            Err(length) => length,
        };

        observer.on_event(&DecodeEvent::LengthRejected {
            raw,
            length,
            capacity: config.max_value_capacity(),
            offset: self.offset - 1,
        });

        let offset = self.offset - 1 - self.window.tag_len() as u64;
        let byte = self.window.slide();
        observer.on_event(&DecodeEvent::ByteDiscarded { byte, offset });

        // The length byte becomes the last byte of the next candidate, which
        // is therefore full again.
        self.phase = Phase::AwaitingTag;
        self.window.push(raw);
        self.check_tag(config, out, observer);
        Err(length)
    }

    fn begin_value<O: DecodeObserver + ?Sized>(
        &mut self,
        length: usize,
        out: &mut Vec<Frame>,
        observer: &mut O,
    ) {
        self.length = length;
        self.value.clear();
        self.phase = Phase::AwaitingValue;
        if length == 0 {
            self.emit(out, observer);
        }
    }

    fn emit<O: DecodeObserver + ?Sized>(&mut self, out: &mut Vec<Frame>, observer: &mut O) {
        let tag = Bytes::copy_from_slice(self.window.candidate());
        let value = Bytes::copy_from_slice(&self.value);
        self.value.clear();
        self.window.clear();
        self.length = 0;
        self.phase = Phase::AwaitingTag;

        observer.on_event(&DecodeEvent::FrameDecoded {
            length: value.len(),
            end_offset: self.offset,
        });
        out.push(Frame { tag, value });
    }
}

/// Stateful frame decoder for one ordered byte stream.
///
/// Feed chunks in stream order with [`decode`](Self::decode). A call never
/// blocks and always consumes the whole chunk; a chunk ending mid-frame simply
/// yields fewer frames, and the partial frame completes on a later call.
#[derive(Debug)]
pub struct FrameDecoder<O = TracingObserver> {
    config: DecoderConfig,
    state: ScannerState,
    observer: O,
}

impl FrameDecoder<TracingObserver> {
    /// Create a decoder that reports anomalies through `tracing`.
    pub fn new(config: DecoderConfig) -> Self {
        Self::with_observer(config, TracingObserver)
    }
}

impl<O: DecodeObserver> FrameDecoder<O> {
    /// Create a decoder with an explicit observer.
    pub fn with_observer(config: DecoderConfig, observer: O) -> Self {
        let state = ScannerState::new(&config);
        Self {
            config,
            state,
            observer,
        }
    }

    /// Resume a stream from a previously extracted state.
    pub fn from_parts(config: DecoderConfig, state: ScannerState, observer: O) -> Result<Self> {
        state.validate(&config)?;
        Ok(Self {
            config,
            state,
            observer,
        })
    }

    /// Take the decoder apart, e.g. to persist the scanner state.
    pub fn into_parts(self) -> (DecoderConfig, ScannerState, O) {
        (self.config, self.state, self.observer)
    }

    /// Decode one chunk, returning the frames it completed in stream order.
    ///
    /// Errors only under [`OversizePolicy::Fail`]. The frames completed
    /// earlier in the same chunk then travel in the error's `frames` field.
    pub fn decode(&mut self, chunk: &[u8]) -> Result<Vec<Frame>> {
        let mut completed = Vec::new();
        match self.decode_into(chunk, &mut completed) {
            Ok(_) => Ok(completed),
            Err(FrameError::LengthOutOfRange {
                length,
                capacity,
                consumed,
                ..
            }) => Err(FrameError::LengthOutOfRange {
                length,
                capacity,
                consumed,
                frames: completed,
            }),
            Err(err) => Err(err),
        }
    }

    /// Decode one chunk, appending completed frames to `out`.
    ///
    /// Returns the number of frames appended. On
    /// [`FrameError::LengthOutOfRange`] the frames completed before the bad
    /// header are already in `out` and decoding continues with
    /// `&chunk[consumed..]`.
    pub fn decode_into(&mut self, chunk: &[u8], out: &mut Vec<Frame>) -> Result<usize> {
        self.state
            .advance(&self.config, chunk, out, &mut self.observer)
    }

    /// Forget any partial frame and start over as if at a new stream.
    pub fn reset(&mut self) {
        tracing::debug!(
            offset = self.state.stream_offset(),
            phase = ?self.state.phase(),
            "decoder reset"
        );
        self.state = ScannerState::new(&self.config);
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    pub fn state(&self) -> &ScannerState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn stream_offset(&self) -> u64 {
        self.state.stream_offset()
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }
}

/// Result of the value-passing [`decode`] form.
#[derive(Debug)]
pub struct DecodeStep {
    /// State to pass to the next call.
    pub state: ScannerState,
    /// Frames completed by this chunk.
    pub frames: Vec<Frame>,
    /// Set when the state did not fit the configuration (nothing was
    /// consumed) or on [`FrameError::LengthOutOfRange`].
    pub error: Option<FrameError>,
}

/// Decode one chunk against an explicit state, returning the next state.
pub fn decode<O: DecodeObserver>(
    config: &DecoderConfig,
    mut state: ScannerState,
    chunk: &[u8],
    mut observer: O,
) -> DecodeStep {
    let mut frames = Vec::new();
    let error = match state.validate(config) {
        Ok(()) => state
            .advance(config, chunk, &mut frames, &mut observer)
            .err(),
        Err(err) => Some(err),
    };
    DecodeStep {
        state,
        frames,
        error,
    }
}
