use bytes::{BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};

use crate::config::{DecoderConfig, LengthField};
use crate::error::{FrameError, Result};

/// A decoded frame: the tag that opened it and its payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Frame {
    /// The tag bytes exactly as they appeared on the wire.
    pub tag: Bytes,
    /// The payload.
    pub value: Bytes,
}

impl Frame {
    /// Create a new frame.
    pub fn new(tag: impl Into<Bytes>, value: impl Into<Bytes>) -> Self {
        Self {
            tag: tag.into(),
            value: value.into(),
        }
    }

    /// Payload size in bytes.
    pub fn length(&self) -> usize {
        self.value.len()
    }

    /// The total wire size of this frame under `config`.
    pub fn wire_size(&self, config: &DecoderConfig) -> usize {
        self.tag.len() + config.length_field().header_len() + self.value.len()
    }
}

/// Encode one frame into the wire format described by `config`.
///
/// Wire format:
/// ```text
/// ┌─────────────────┬──────────────────┬──────────────────────┐
/// │ Tag             │ Length (1B)      │ Value                │
/// │ (tag_len bytes) │ len - modifier   │ (len bytes)          │
/// │                 │ prefixed only    │                      │
/// └─────────────────┴──────────────────┴──────────────────────┘
/// ```
pub fn encode_frame(
    config: &DecoderConfig,
    tag: &[u8],
    value: &[u8],
    dst: &mut BytesMut,
) -> Result<()> {
    if !config.tags().matches(tag) {
        return Err(FrameError::TagMismatch { tag: tag.to_vec() });
    }
    if value.len() > config.max_value_capacity() {
        return Err(FrameError::PayloadTooLarge {
            size: value.len(),
            max: config.max_value_capacity(),
        });
    }

    let length_byte = match config.length_field() {
        LengthField::Prefixed { modifier } => {
            let raw = value.len() as i64 - i64::from(modifier);
            let raw = u8::try_from(raw).map_err(|_| FrameError::LengthUnencodable {
                length: value.len(),
                modifier,
            })?;
            Some(raw)
        }
        LengthField::Fixed(expected) => {
            if value.len() != expected {
                return Err(FrameError::FixedLengthMismatch {
                    expected,
                    actual: value.len(),
                });
            }
            None
        }
    };

    dst.reserve(tag.len() + usize::from(length_byte.is_some()) + value.len());
    dst.put_slice(tag);
    if let Some(raw) = length_byte {
        dst.put_u8(raw);
    }
    dst.put_slice(value);
    Ok(())
}

/// Encode frames back to back.
pub fn encode_frames<'a>(
    config: &DecoderConfig,
    frames: impl IntoIterator<Item = &'a Frame>,
    dst: &mut BytesMut,
) -> Result<()> {
    for frame in frames {
        encode_frame(config, &frame.tag, &frame.value, dst)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::TagPattern;

    fn protocol(pattern: &str, length: LengthField, capacity: usize) -> DecoderConfig {
        DecoderConfig::new(vec![TagPattern::parse(pattern).unwrap()], length, capacity).unwrap()
    }

    #[test]
    fn encode_prefixed_with_modifier() {
        let config = protocol(
            "FF 00 FF A5 ** ** ** **",
            LengthField::Prefixed { modifier: 2 },
            64,
        );
        let tag = [0xFF, 0x00, 0xFF, 0xA5, 0x01, 0x02, 0x03, 0x04];
        let mut buf = BytesMut::new();
        encode_frame(&config, &tag, b"abc", &mut buf).unwrap();

        assert_eq!(&buf[..8], &tag);
        assert_eq!(buf[8], 0x01);
        assert_eq!(&buf[9..], b"abc");
        let frame = Frame::new(tag.to_vec(), &b"abc"[..]);
        assert_eq!(frame.wire_size(&config), buf.len());
    }

    #[test]
    fn encode_fixed_has_no_length_byte() {
        let config = protocol("99", LengthField::Fixed(1), 1);
        let mut buf = BytesMut::new();
        encode_frame(&config, &[0x99], &[0x04], &mut buf).unwrap();
        assert_eq!(&buf[..], &[0x99, 0x04]);
    }

    #[test]
    fn encode_rejects_wrong_tag() {
        let config = protocol("DA BB AD 00", LengthField::default(), 16);
        let mut buf = BytesMut::new();
        let err =
            encode_frame(&config, &[0xDA, 0xBB, 0xAD, 0x01], b"x", &mut buf).unwrap_err();
        assert!(matches!(err, FrameError::TagMismatch { .. }));
        assert!(buf.is_empty());
    }

    #[test]
    fn encode_rejects_oversized_payload() {
        let config = protocol("7E", LengthField::default(), 4);
        let mut buf = BytesMut::new();
        let err = encode_frame(&config, &[0x7E], b"too long", &mut buf).unwrap_err();
        assert!(matches!(err, FrameError::PayloadTooLarge { size: 8, max: 4 }));
    }

    #[test]
    fn encode_rejects_unencodable_length() {
        let config = protocol("7E", LengthField::Prefixed { modifier: 2 }, 16);
        let mut buf = BytesMut::new();
        let err = encode_frame(&config, &[0x7E], b"a", &mut buf).unwrap_err();
        assert!(matches!(
            err,
            FrameError::LengthUnencodable {
                length: 1,
                modifier: 2
            }
        ));

        let config = protocol("7E", LengthField::Prefixed { modifier: -1 }, 1024);
        let err = encode_frame(&config, &[0x7E], &[0u8; 300], &mut buf).unwrap_err();
        assert!(matches!(err, FrameError::LengthUnencodable { .. }));
    }

    #[test]
    fn encode_rejects_wrong_fixed_size() {
        let config = protocol("99", LengthField::Fixed(1), 4);
        let mut buf = BytesMut::new();
        let err = encode_frame(&config, &[0x99], &[1, 2], &mut buf).unwrap_err();
        assert!(matches!(
            err,
            FrameError::FixedLengthMismatch {
                expected: 1,
                actual: 2
            }
        ));
    }

    #[test]
    fn encode_frames_back_to_back() {
        let config = protocol("7E", LengthField::default(), 16);
        let frames = [
            Frame::new(vec![0x7E], &b"one"[..]),
            Frame::new(vec![0x7E], &b""[..]),
            Frame::new(vec![0x7E], &b"three"[..]),
        ];
        let mut buf = BytesMut::new();
        encode_frames(&config, &frames, &mut buf).unwrap();
        assert_eq!(&buf[..], b"\x7E\x03one\x7E\x00\x7E\x05three");
    }

    #[test]
    fn frame_length_is_value_len() {
        let frame = Frame::new(vec![0x7E], vec![1, 2, 3]);
        assert_eq!(frame.length(), 3);
    }
}
