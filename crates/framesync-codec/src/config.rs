use serde::{Deserialize, Serialize};

use crate::error::{FrameError, Result};
use crate::pattern::{TagPattern, TagSet};

/// Default value capacity: the largest payload a raw length byte can describe
/// without a modifier.
pub const DEFAULT_MAX_VALUE_CAPACITY: usize = u8::MAX as usize;

/// How the payload size of a frame is determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LengthField {
    /// One raw length byte follows the tag; the payload size is
    /// `raw + modifier`.
    Prefixed { modifier: i32 },
    /// No length byte; every payload has exactly this many bytes.
    Fixed(usize),
}

impl LengthField {
    /// Payload size described by a raw length byte. May be negative.
    pub fn resolve(self, raw: u8) -> i64 {
        match self {
            LengthField::Prefixed { modifier } => i64::from(raw) + i64::from(modifier),
            LengthField::Fixed(size) => size as i64,
        }
    }

    /// Wire bytes between the tag and the payload.
    pub fn header_len(self) -> usize {
        match self {
            LengthField::Prefixed { .. } => 1,
            LengthField::Fixed(_) => 0,
        }
    }
}

impl Default for LengthField {
    fn default() -> Self {
        LengthField::Prefixed { modifier: 0 }
    }
}

/// What happens when a length byte describes a payload outside
/// `0..=max_value_capacity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OversizePolicy {
    /// Reject the header, resynchronize one byte past the tag start and
    /// report the rejection to the observer only.
    #[default]
    Resync,
    /// Resynchronize as with `Resync`, then return
    /// [`FrameError::LengthOutOfRange`] from the decode call.
    Fail,
}

/// Immutable decoder configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderConfig {
    tags: TagSet,
    length: LengthField,
    max_value_capacity: usize,
    oversize: OversizePolicy,
}

impl DecoderConfig {
    /// Validate and build a configuration.
    ///
    /// Fails on an empty pattern set, patterns of differing lengths, a zero
    /// capacity, or a fixed payload size above the capacity.
    pub fn new(
        patterns: Vec<TagPattern>,
        length: LengthField,
        max_value_capacity: usize,
    ) -> Result<Self> {
        let tags = TagSet::new(patterns)?;
        if max_value_capacity == 0 {
            return Err(FrameError::InvalidConfig(
                "max value capacity must be positive".to_string(),
            ));
        }
        if let LengthField::Fixed(size) = length {
            if size > max_value_capacity {
                return Err(FrameError::InvalidConfig(format!(
                    "fixed payload size {size} exceeds max value capacity {max_value_capacity}"
                )));
            }
        }
        Ok(Self {
            tags,
            length,
            max_value_capacity,
            oversize: OversizePolicy::default(),
        })
    }

    pub fn with_oversize_policy(mut self, policy: OversizePolicy) -> Self {
        self.oversize = policy;
        self
    }

    /// Tag length in bytes shared by every pattern.
    pub fn tag_len(&self) -> usize {
        self.tags.tag_len()
    }

    pub fn tags(&self) -> &TagSet {
        &self.tags
    }

    pub fn length_field(&self) -> LengthField {
        self.length
    }

    pub fn max_value_capacity(&self) -> usize {
        self.max_value_capacity
    }

    pub fn oversize_policy(&self) -> OversizePolicy {
        self.oversize
    }

    /// Payload size for `raw`, or the out-of-range value.
    pub(crate) fn payload_len(&self, raw: u8) -> std::result::Result<usize, i64> {
        let length = self.length.resolve(raw);
        match usize::try_from(length) {
            Ok(len) if len <= self.max_value_capacity => Ok(len),
            _ => Err(length),
        }
    }
}

fn default_capacity() -> usize {
    DEFAULT_MAX_VALUE_CAPACITY
}

/// Declarative protocol description, loadable from JSON.
///
/// ```json
/// {
///   "patterns": ["FF 00 FF A5 ** ** ** **"],
///   "length": { "prefixed": { "modifier": 2 } },
///   "max_value_capacity": 257
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProtocolSpec {
    pub patterns: Vec<TagPattern>,
    #[serde(default)]
    pub length: LengthField,
    #[serde(default = "default_capacity")]
    pub max_value_capacity: usize,
    #[serde(default)]
    pub oversize: OversizePolicy,
}

impl ProtocolSpec {
    /// Parse a JSON protocol document.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text)
            .map_err(|err| FrameError::InvalidConfig(format!("protocol document: {err}")))
    }

    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// Validate into a decoder configuration.
    pub fn build(&self) -> Result<DecoderConfig> {
        Ok(
            DecoderConfig::new(self.patterns.clone(), self.length, self.max_value_capacity)?
                .with_oversize_policy(self.oversize),
        )
    }
}

impl From<&DecoderConfig> for ProtocolSpec {
    fn from(config: &DecoderConfig) -> Self {
        Self {
            patterns: config.tags().patterns().to_vec(),
            length: config.length_field(),
            max_value_capacity: config.max_value_capacity(),
            oversize: config.oversize_policy(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exact(bytes: &[u8]) -> TagPattern {
        TagPattern::exact(bytes.to_vec()).unwrap()
    }

    #[test]
    fn resolve_applies_modifier() {
        assert_eq!(LengthField::Prefixed { modifier: 2 }.resolve(1), 3);
        assert_eq!(LengthField::Prefixed { modifier: -4 }.resolve(1), -3);
        assert_eq!(LengthField::Fixed(1).resolve(200), 1);
    }

    #[test]
    fn payload_len_checks_bounds() {
        let config =
            DecoderConfig::new(vec![exact(&[0x7E])], LengthField::Prefixed { modifier: -1 }, 8)
                .unwrap();
        assert_eq!(config.payload_len(1), Ok(0));
        assert_eq!(config.payload_len(9), Ok(8));
        assert_eq!(config.payload_len(10), Err(9));
        assert_eq!(config.payload_len(0), Err(-1));
    }

    #[test]
    fn rejects_zero_capacity() {
        let err = DecoderConfig::new(vec![exact(&[1])], LengthField::default(), 0).unwrap_err();
        assert!(matches!(err, FrameError::InvalidConfig(_)));
    }

    #[test]
    fn rejects_empty_patterns() {
        let err = DecoderConfig::new(Vec::new(), LengthField::default(), 16).unwrap_err();
        assert!(matches!(err, FrameError::InvalidConfig(_)));
    }

    #[test]
    fn rejects_fixed_size_above_capacity() {
        let err = DecoderConfig::new(vec![exact(&[1])], LengthField::Fixed(5), 4).unwrap_err();
        assert!(matches!(err, FrameError::InvalidConfig(_)));
    }

    #[test]
    fn default_policy_is_resync() {
        let config = DecoderConfig::new(vec![exact(&[1])], LengthField::default(), 4).unwrap();
        assert_eq!(config.oversize_policy(), OversizePolicy::Resync);
        let config = config.with_oversize_policy(OversizePolicy::Fail);
        assert_eq!(config.oversize_policy(), OversizePolicy::Fail);
    }

    #[test]
    fn protocol_spec_from_json() {
        let spec = ProtocolSpec::from_json(
            r#"{
                "patterns": ["FF 00 FF A5 ** ** ** **"],
                "length": { "prefixed": { "modifier": 2 } },
                "max_value_capacity": 257,
                "oversize": "fail"
            }"#,
        )
        .unwrap();
        let config = spec.build().unwrap();
        assert_eq!(config.tag_len(), 8);
        assert_eq!(config.length_field(), LengthField::Prefixed { modifier: 2 });
        assert_eq!(config.max_value_capacity(), 257);
        assert_eq!(config.oversize_policy(), OversizePolicy::Fail);
    }

    #[test]
    fn protocol_spec_defaults_and_fixed() {
        let spec = ProtocolSpec::from_json(r#"{ "patterns": ["99"], "length": { "fixed": 1 } }"#)
            .unwrap();
        assert_eq!(spec.max_value_capacity, DEFAULT_MAX_VALUE_CAPACITY);
        assert_eq!(spec.oversize, OversizePolicy::Resync);
        assert_eq!(spec.build().unwrap().length_field(), LengthField::Fixed(1));
    }

    #[test]
    fn protocol_spec_rejects_unknown_fields_and_bad_patterns() {
        assert!(ProtocolSpec::from_json(r#"{ "patterns": ["99"], "tag_len": 1 }"#).is_err());
        assert!(ProtocolSpec::from_json(r#"{ "patterns": ["9"] }"#).is_err());
        let empty = ProtocolSpec::from_json(r#"{ "patterns": [] }"#).unwrap();
        assert!(matches!(empty.build(), Err(FrameError::InvalidConfig(_))));
    }

    #[test]
    fn protocol_spec_roundtrips_config() {
        let config = DecoderConfig::new(
            vec![TagPattern::parse("DA BB AD 00").unwrap()],
            LengthField::Prefixed { modifier: 0 },
            64,
        )
        .unwrap();
        let spec = ProtocolSpec::from(&config);
        let reparsed = ProtocolSpec::from_json(&spec.to_json_pretty()).unwrap();
        assert_eq!(reparsed.build().unwrap(), config);
    }

    #[test]
    fn protocol_spec_roundtrips_masked_config() {
        let config = DecoderConfig::new(
            vec![TagPattern::masked([0x10, 0x20], [0x00, 0x01]).unwrap()],
            LengthField::Prefixed { modifier: 1 },
            32,
        )
        .unwrap()
        .with_oversize_policy(OversizePolicy::Fail);
        let spec = ProtocolSpec::from(&config);
        let reparsed = ProtocolSpec::from_json(&spec.to_json_pretty()).unwrap();
        assert_eq!(reparsed.build().unwrap(), config);
    }
}
