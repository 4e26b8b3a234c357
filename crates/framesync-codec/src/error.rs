use crate::codec::Frame;

/// Errors that can occur while configuring, decoding or encoding frames.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The decoder configuration is malformed.
    #[error("invalid decoder configuration: {0}")]
    InvalidConfig(String),

    /// A restored scanner state does not fit the decoder configuration.
    #[error("scanner state does not fit configuration: {0}")]
    InvalidState(String),

    /// A length byte resolved to a value outside `0..=capacity`.
    ///
    /// Only surfaced under [`OversizePolicy::Fail`](crate::OversizePolicy::Fail).
    /// The decoder has already resynchronized; `consumed` is the number of
    /// chunk bytes processed before the error, so decoding resumes with
    /// `&chunk[consumed..]`. `frames` holds the frames completed earlier in
    /// the chunk when the call had nowhere else to put them
    /// ([`FrameDecoder::decode`](crate::FrameDecoder::decode)); it is empty
    /// when they were already appended to the caller's buffer.
    #[error("frame length {length} outside 0..={capacity} (after {consumed} chunk bytes)")]
    LengthOutOfRange {
        length: i64,
        capacity: usize,
        consumed: usize,
        frames: Vec<Frame>,
    },

    /// The tag handed to the encoder matches no configured pattern.
    #[error("tag {tag:02X?} matches no configured pattern")]
    TagMismatch { tag: Vec<u8> },

    /// The payload exceeds the configured value capacity.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// The payload length cannot be expressed as a single raw length byte.
    #[error("payload length {length} not encodable with length modifier {modifier}")]
    LengthUnencodable { length: usize, modifier: i32 },

    /// A fixed-size protocol was handed a payload of the wrong size.
    #[error("fixed-size frame expects {expected} value bytes, got {actual}")]
    FixedLengthMismatch { expected: usize, actual: usize },

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream ended. Any partially collected frame is discarded.
    #[error("stream closed")]
    ConnectionClosed,
}

pub type Result<T> = std::result::Result<T, FrameError>;
