//! Resynchronizing frame decoder for noisy, chunked byte streams.
//!
//! framesync recognizes tag/length/value frames in a byte stream that arrives
//! in arbitrary chunks, skipping bytes that cannot start a frame and carrying
//! partial frames across calls.
//!
//! # Crate Structure
//!
//! - [`codec`]: decoder, encoder, protocol presets and stream adapters
//!
//! The `framesync` binary (feature `cli`) decodes captures from files or stdin.

/// Re-export codec types.
pub mod codec {
    pub use framesync_codec::*;
}

pub use framesync_codec::{
    DecoderConfig, Frame, FrameDecoder, FrameError, FrameReader, FrameWriter, Protocol,
    ProtocolSpec, Result, ScannerState,
};
