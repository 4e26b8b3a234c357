//! Built-in protocol presets.

use std::fmt;
use std::str::FromStr;

use crate::config::{DecoderConfig, LengthField, DEFAULT_MAX_VALUE_CAPACITY};
use crate::error::{FrameError, Result};
use crate::pattern::TagPattern;

/// Header byte of the two-byte header/value protocol.
pub const HEADER_VALUE_TAG: u8 = 0x99;

/// Tag of the single-byte marker TLV protocol.
pub const MARKER_TAG: u8 = 0x7E;

/// Tag pattern of the masked eight-byte TLV protocol.
pub const MASKED_TAG_PATTERN: &str = "FF 00 FF A5 ** ** ** **";

/// Length modifier of the masked eight-byte TLV protocol.
pub const MASKED_LENGTH_MODIFIER: i32 = 2;

/// Tag of the four-byte sync word TLV protocol.
pub const SYNC_WORD: [u8; 4] = [0xDA, 0xBB, 0xAD, 0x00];

/// A named protocol shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    /// `0x99` followed by exactly one value byte.
    HeaderValue,
    /// `0x7E`, a length byte, then the value.
    MarkerTlv,
    /// `FF 00 FF A5` plus four free bytes, a length byte (+2), then the value.
    MaskedTlv,
    /// `DA BB AD 00`, a length byte, then the value.
    SyncWordTlv,
}

impl Protocol {
    pub const ALL: [Protocol; 4] = [
        Protocol::HeaderValue,
        Protocol::MarkerTlv,
        Protocol::MaskedTlv,
        Protocol::SyncWordTlv,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Protocol::HeaderValue => "header-value",
            Protocol::MarkerTlv => "marker-tlv",
            Protocol::MaskedTlv => "masked-tlv",
            Protocol::SyncWordTlv => "sync-word-tlv",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Protocol::HeaderValue => "1-byte header 0x99 + 1 value byte",
            Protocol::MarkerTlv => "tag 0x7E + length byte + value",
            Protocol::MaskedTlv => "tag FF 00 FF A5 ** ** ** ** + length byte (+2) + value",
            Protocol::SyncWordTlv => "tag DA BB AD 00 + length byte + value",
        }
    }

    /// Decoder configuration for this protocol.
    pub fn config(self) -> DecoderConfig {
        let (pattern, length, capacity) = match self {
            Protocol::HeaderValue => (
                TagPattern::exact([HEADER_VALUE_TAG]),
                LengthField::Fixed(1),
                1,
            ),
            Protocol::MarkerTlv => (
                TagPattern::exact([MARKER_TAG]),
                LengthField::Prefixed { modifier: 0 },
                DEFAULT_MAX_VALUE_CAPACITY,
            ),
            Protocol::MaskedTlv => (
                TagPattern::parse(MASKED_TAG_PATTERN),
                LengthField::Prefixed {
                    modifier: MASKED_LENGTH_MODIFIER,
                },
                DEFAULT_MAX_VALUE_CAPACITY + MASKED_LENGTH_MODIFIER as usize,
            ),
            Protocol::SyncWordTlv => (
                TagPattern::exact(SYNC_WORD),
                LengthField::Prefixed { modifier: 0 },
                DEFAULT_MAX_VALUE_CAPACITY,
            ),
        };

        // Preset parameters are constants known to be valid.
        pattern
            .and_then(|pattern| DecoderConfig::new(vec![pattern], length, capacity))
            .unwrap_or_else(|err| unreachable!("preset {} is invalid: {err}", self.name()))
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Protocol {
    type Err = FrameError;

    fn from_str(s: &str) -> Result<Self> {
        Protocol::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let known: Vec<&str> = Protocol::ALL.iter().map(|p| p.name()).collect();
                FrameError::InvalidConfig(format!(
                    "unknown protocol {s:?} (known: {})",
                    known.join(", ")
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_preset_builds() {
        for protocol in Protocol::ALL {
            let config = protocol.config();
            assert!(config.tag_len() >= 1, "{protocol}");
        }
    }

    #[test]
    fn presets_have_expected_shapes() {
        let header = Protocol::HeaderValue.config();
        assert_eq!(header.tag_len(), 1);
        assert_eq!(header.length_field(), LengthField::Fixed(1));

        let masked = Protocol::MaskedTlv.config();
        assert_eq!(masked.tag_len(), 8);
        assert_eq!(masked.length_field(), LengthField::Prefixed { modifier: 2 });
        assert_eq!(masked.max_value_capacity(), 257);

        let sync = Protocol::SyncWordTlv.config();
        assert!(sync.tags().matches(&SYNC_WORD));
    }

    #[test]
    fn parse_names() {
        assert_eq!("masked-tlv".parse::<Protocol>().unwrap(), Protocol::MaskedTlv);
        assert_eq!("Header-Value".parse::<Protocol>().unwrap(), Protocol::HeaderValue);
        assert!(matches!(
            "nope".parse::<Protocol>(),
            Err(FrameError::InvalidConfig(_))
        ));
        for protocol in Protocol::ALL {
            assert_eq!(protocol.to_string().parse::<Protocol>().unwrap(), protocol);
        }
    }
}
