//! Version and range parsing

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

use crate::range::{Bound, VersionRange};
use crate::version::Version;

/// Error type for version parsing
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionParserError {
    #[error("Invalid version string \"{0}\"")]
    InvalidVersion(String),
    #[error("Invalid version range \"{range}\": {reason}")]
    InvalidRange { range: String, reason: String },
    #[error("Empty version range \"{0}\": no version can satisfy it")]
    EmptyRange(String),
}

lazy_static! {
    // major[.minor[.micro[.qualifier]]], optional leading v
    static ref VERSION_RE: Regex = Regex::new(
        r"(?i)^v?(\d+)(?:\.(\d+))?(?:\.(\d+))?(?:\.([A-Za-z0-9_-]+))?$"
    ).unwrap();

    // [low,high) style intervals; a high end of * is unbounded
    static ref INTERVAL_RE: Regex = Regex::new(
        r"^([\[(])\s*([^,\s]+)\s*,\s*([^,\s]+)\s*([\])])$"
    ).unwrap();
}

/// Parser for versions and version ranges
#[derive(Debug, Clone, Copy, Default)]
pub struct VersionParser;

impl VersionParser {
    pub fn new() -> Self {
        VersionParser
    }

    /// Parse a version string such as `1`, `1.2`, `1.2.3` or `1.2.3.qualifier`.
    pub fn parse_version(&self, input: &str) -> Result<Version, VersionParserError> {
        let trimmed = input.trim();
        let caps = VERSION_RE
            .captures(trimmed)
            .ok_or_else(|| VersionParserError::InvalidVersion(input.to_string()))?;

        let component = |idx: usize| -> Result<u32, VersionParserError> {
            match caps.get(idx) {
                Some(m) => m
                    .as_str()
                    .parse::<u32>()
                    .map_err(|_| VersionParserError::InvalidVersion(input.to_string())),
                None => Ok(0),
            }
        };

        let major = component(1)?;
        let minor = component(2)?;
        let micro = component(3)?;
        let qualifier = caps.get(4).map(|m| m.as_str()).unwrap_or("");

        Ok(Version::with_qualifier(major, minor, micro, qualifier))
    }

    /// Parse a version range.
    ///
    /// Accepted forms:
    /// - `""` or `*`: any version
    /// - `1.0`: at least 1.0
    /// - `[1.0,2.0)`, `(1.0,2.0]`, `[1.0,*)`: explicit interval
    pub fn parse_range(&self, input: &str) -> Result<VersionRange, VersionParserError> {
        let trimmed = input.trim();

        if trimmed.is_empty() || trimmed == "*" {
            return Ok(VersionRange::any());
        }

        if !trimmed.starts_with('[') && !trimmed.starts_with('(') {
            let low = self.parse_version(trimmed).map_err(|_| VersionParserError::InvalidRange {
                range: input.to_string(),
                reason: "not a version or interval".to_string(),
            })?;
            return Ok(VersionRange::at_least(low));
        }

        let caps = INTERVAL_RE.captures(trimmed).ok_or_else(|| VersionParserError::InvalidRange {
            range: input.to_string(),
            reason: "expected [low,high) interval syntax".to_string(),
        })?;

        let low_inclusive = &caps[1] == "[";
        let high_inclusive = &caps[4] == "]";

        let low = self.parse_version(&caps[2]).map_err(|e| VersionParserError::InvalidRange {
            range: input.to_string(),
            reason: e.to_string(),
        })?;

        let high = if &caps[3] == "*" {
            None
        } else {
            let version = self.parse_version(&caps[3]).map_err(|e| VersionParserError::InvalidRange {
                range: input.to_string(),
                reason: e.to_string(),
            })?;
            Some(Bound::new(version, high_inclusive))
        };

        let range = VersionRange::new(Bound::new(low, low_inclusive), high);
        if range.is_empty() {
            return Err(VersionParserError::EmptyRange(input.to_string()));
        }
        Ok(range)
    }
}
