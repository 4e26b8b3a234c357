//! Tag patterns and the tag matcher.
//!
//! A [`TagPattern`] pairs a template with a per-byte mask. A non-zero mask byte
//! accepts any value at that position; a zero mask byte requires the candidate
//! byte to equal the template byte. A [`TagSet`] accepts a candidate window when
//! any of its patterns does.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{FrameError, Result};

/// Mask value marking a wildcard position.
pub const WILDCARD: u8 = 0xFF;

/// A tag template with a per-byte wildcard mask.
///
/// Serializes as its text form, e.g. `"FF 00 FF A5 ** ** ** **"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TagPattern {
    template: Vec<u8>,
    mask: Vec<u8>,
}

impl TagPattern {
    /// A pattern that only accepts exactly `template`.
    pub fn exact(template: impl Into<Vec<u8>>) -> Result<Self> {
        let template = template.into();
        let mask = vec![0; template.len()];
        Self::masked(template, mask)
    }

    /// A pattern with an explicit mask of the same length as `template`.
    ///
    /// Wildcard positions are stored as template `0` with mask [`WILDCARD`],
    /// so patterns that accept the same bytes compare equal and survive the
    /// text form unchanged.
    pub fn masked(template: impl Into<Vec<u8>>, mask: impl Into<Vec<u8>>) -> Result<Self> {
        let mut template = template.into();
        let mut mask = mask.into();
        if template.is_empty() {
            return Err(FrameError::InvalidConfig(
                "tag pattern must not be empty".to_string(),
            ));
        }
        if template.len() != mask.len() {
            return Err(FrameError::InvalidConfig(format!(
                "tag template has {} bytes but mask has {}",
                template.len(),
                mask.len()
            )));
        }
        for (byte, m) in template.iter_mut().zip(mask.iter_mut()) {
            if *m != 0 {
                *byte = 0;
                *m = WILDCARD;
            }
        }
        Ok(Self { template, mask })
    }

    /// Parse the text form: hex byte pairs, with `**` or `??` for wildcards.
    /// Whitespace between pairs is optional.
    pub fn parse(text: &str) -> Result<Self> {
        let compact: Vec<char> = text.chars().filter(|c| !c.is_whitespace()).collect();
        if compact.len() % 2 != 0 {
            return Err(FrameError::InvalidConfig(format!(
                "tag pattern {text:?} has an odd number of digits"
            )));
        }

        let mut template = Vec::with_capacity(compact.len() / 2);
        let mut mask = Vec::with_capacity(compact.len() / 2);
        for pair in compact.chunks(2) {
            match (pair[0], pair[1]) {
                ('*', '*') | ('?', '?') => {
                    template.push(0);
                    mask.push(WILDCARD);
                }
                (hi, lo) => {
                    let byte = hex_value(hi)
                        .zip(hex_value(lo))
                        .map(|(hi, lo)| (hi << 4) | lo)
                        .ok_or_else(|| {
                            FrameError::InvalidConfig(format!(
                                "invalid byte {hi}{lo} in tag pattern {text:?}"
                            ))
                        })?;
                    template.push(byte);
                    mask.push(0);
                }
            }
        }
        Self::masked(template, mask)
    }

    /// Number of bytes in the tag.
    pub fn len(&self) -> usize {
        self.template.len()
    }

    /// Always false: constructors reject empty patterns.
    pub fn is_empty(&self) -> bool {
        self.template.is_empty()
    }

    pub fn template(&self) -> &[u8] {
        &self.template
    }

    pub fn mask(&self) -> &[u8] {
        &self.mask
    }

    /// True if position `index` accepts any byte.
    pub fn is_wildcard(&self, index: usize) -> bool {
        self.mask.get(index).is_some_and(|m| *m != 0)
    }

    /// True if every position of `candidate` is either masked or equal to the
    /// template. Candidates of a different length never match.
    pub fn matches(&self, candidate: &[u8]) -> bool {
        candidate.len() == self.template.len()
            && self
                .template
                .iter()
                .zip(&self.mask)
                .zip(candidate)
                .all(|((&expected, &mask), &actual)| mask != 0 || actual == expected)
    }
}

impl fmt::Display for TagPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, byte) in self.template.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            if self.is_wildcard(i) {
                f.write_str("**")?;
            } else {
                write!(f, "{byte:02X}")?;
            }
        }
        Ok(())
    }
}

impl FromStr for TagPattern {
    type Err = FrameError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for TagPattern {
    type Error = FrameError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<TagPattern> for String {
    fn from(pattern: TagPattern) -> Self {
        pattern.to_string()
    }
}

fn hex_value(c: char) -> Option<u8> {
    c.to_digit(16).map(|d| d as u8)
}

/// An ordered, non-empty set of same-length tag patterns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSet {
    patterns: Vec<TagPattern>,
    tag_len: usize,
}

impl TagSet {
    /// Build a set. All patterns must share one length.
    pub fn new(patterns: Vec<TagPattern>) -> Result<Self> {
        let tag_len = match patterns.first() {
            Some(first) => first.len(),
            None => {
                return Err(FrameError::InvalidConfig(
                    "at least one tag pattern is required".to_string(),
                ))
            }
        };
        if let Some(odd) = patterns.iter().find(|p| p.len() != tag_len) {
            return Err(FrameError::InvalidConfig(format!(
                "tag pattern {odd} has {} bytes, expected {tag_len}",
                odd.len()
            )));
        }
        Ok(Self { patterns, tag_len })
    }

    pub fn tag_len(&self) -> usize {
        self.tag_len
    }

    pub fn patterns(&self) -> &[TagPattern] {
        &self.patterns
    }

    /// True if any pattern accepts `candidate`. Stops at the first match.
    pub fn matches(&self, candidate: &[u8]) -> bool {
        self.patterns.iter().any(|p| p.matches(candidate))
    }

    /// The first pattern accepting `candidate`, if any.
    pub fn matching(&self, candidate: &[u8]) -> Option<&TagPattern> {
        self.patterns.iter().find(|p| p.matches(candidate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_single_byte_is_equality() {
        let pattern = TagPattern::exact([0x99]).unwrap();
        assert!(pattern.matches(&[0x99]));
        assert!(!pattern.matches(&[0x98]));
        assert!(!pattern.matches(&[]));
        assert!(!pattern.matches(&[0x99, 0x99]));
    }

    #[test]
    fn masked_positions_accept_anything() {
        let pattern = TagPattern::parse("FF 00 FF A5 ** ** ** **").unwrap();
        assert_eq!(pattern.len(), 8);
        assert!(pattern.matches(&[0xFF, 0x00, 0xFF, 0xA5, 0x00, 0x11, 0x22, 0x33]));
        assert!(pattern.matches(&[0xFF, 0x00, 0xFF, 0xA5, 0xFF, 0xFF, 0xFF, 0xFF]));
        assert!(!pattern.matches(&[0xFF, 0x00, 0xFF, 0xA4, 0x00, 0x11, 0x22, 0x33]));
        assert!(!pattern.matches(&[0xFF, 0x00, 0xFF, 0xA5, 0x00]));
    }

    #[test]
    fn mask_byte_overrides_template() {
        let pattern = TagPattern::masked([0x10, 0x20], [0x00, 0x01]).unwrap();
        assert!(pattern.matches(&[0x10, 0x99]));
        assert!(!pattern.matches(&[0x11, 0x20]));
    }

    #[test]
    fn masked_normalizes_wildcard_positions() {
        let pattern = TagPattern::masked([0x10, 0x20], [0x00, 0x01]).unwrap();
        assert_eq!(pattern.template(), &[0x10, 0x00]);
        assert_eq!(pattern.mask(), &[0x00, WILDCARD]);
        assert_eq!(pattern, TagPattern::parse("10 **").unwrap());
        assert_eq!(pattern.to_string().parse::<TagPattern>().unwrap(), pattern);
    }

    #[test]
    fn parse_accepts_compact_and_question_marks() {
        let spaced = TagPattern::parse("da bb ?? 00").unwrap();
        let compact = TagPattern::parse("DABB**00").unwrap();
        assert_eq!(spaced, compact);
        assert!(spaced.is_wildcard(2));
        assert!(!spaced.is_wildcard(3));
    }

    #[test]
    fn parse_rejects_bad_text() {
        assert!(TagPattern::parse("").is_err());
        assert!(TagPattern::parse("F").is_err());
        assert!(TagPattern::parse("GG").is_err());
        assert!(TagPattern::parse("*0").is_err());
    }

    #[test]
    fn display_roundtrips_through_parse() {
        let pattern = TagPattern::parse("FF00FFA5********").unwrap();
        assert_eq!(pattern.to_string(), "FF 00 FF A5 ** ** ** **");
        assert_eq!(pattern.to_string().parse::<TagPattern>().unwrap(), pattern);
    }

    #[test]
    fn masked_rejects_length_mismatch() {
        let err = TagPattern::masked([1, 2, 3], [0, 0]).unwrap_err();
        assert!(matches!(err, FrameError::InvalidConfig(_)));
    }

    #[test]
    fn set_matches_any_pattern() {
        let set = TagSet::new(vec![
            TagPattern::exact([0xAA, 0x01]).unwrap(),
            TagPattern::parse("BB **").unwrap(),
        ])
        .unwrap();
        assert_eq!(set.tag_len(), 2);
        assert!(set.matches(&[0xAA, 0x01]));
        assert!(set.matches(&[0xBB, 0x42]));
        assert!(!set.matches(&[0xAA, 0x02]));
        assert_eq!(set.matching(&[0xBB, 0x00]), Some(&set.patterns()[1]));
    }

    #[test]
    fn set_rejects_empty_and_mixed_lengths() {
        assert!(matches!(
            TagSet::new(Vec::new()),
            Err(FrameError::InvalidConfig(_))
        ));
        let mixed = TagSet::new(vec![
            TagPattern::exact([0x01]).unwrap(),
            TagPattern::exact([0x01, 0x02]).unwrap(),
        ]);
        assert!(matches!(mixed, Err(FrameError::InvalidConfig(_))));
    }

    #[test]
    fn serde_uses_text_form() {
        let pattern = TagPattern::parse("7E").unwrap();
        let json = serde_json::to_string(&pattern).unwrap();
        assert_eq!(json, "\"7E\"");
        let back: TagPattern = serde_json::from_str("\"7e\"").unwrap();
        assert_eq!(back, pattern);
        assert!(serde_json::from_str::<TagPattern>("\"zz\"").is_err());
    }
}
