//! Resumable tag/length/value frame recognition over chunked byte streams.
//!
//! A frame on the wire is:
//! - A fixed-length tag matched against one or more masked patterns
//! - An optional one-byte length field (or a fixed value length)
//! - The value bytes
//!
//! Bytes can arrive in chunks of any size. The decoder keeps its partial
//! progress in a [`ScannerState`] between calls, drops bytes that cannot start
//! a frame, and emits each frame once its last value byte is seen.

pub mod codec;
pub mod config;
pub mod decoder;
pub mod error;
pub mod observer;
pub mod pattern;
pub mod protocol;
pub mod reader;
pub mod writer;

#[cfg(feature = "async")]
pub mod async_codec;

mod window;

pub use codec::{encode_frame, encode_frames, Frame};
pub use config::{
    DecoderConfig, LengthField, OversizePolicy, ProtocolSpec, DEFAULT_MAX_VALUE_CAPACITY,
};
pub use decoder::{decode, DecodeStep, FrameDecoder, Phase, ScannerState};
pub use error::{FrameError, Result};
pub use observer::{
    DecodeEvent, DecodeObserver, DecodeStats, EventLog, NoopObserver, TracingObserver,
};
pub use pattern::{TagPattern, TagSet, WILDCARD};
pub use protocol::{
    Protocol, HEADER_VALUE_TAG, MARKER_TAG, MASKED_LENGTH_MODIFIER, MASKED_TAG_PATTERN, SYNC_WORD,
};
pub use reader::{FrameReader, ReaderConfig, DEFAULT_CHUNK_SIZE};
pub use writer::FrameWriter;

#[cfg(feature = "async")]
pub use async_codec::FrameCodec;
