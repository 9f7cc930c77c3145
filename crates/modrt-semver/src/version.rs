//! Version value type

use std::fmt;
use std::str::FromStr;

use crate::version_parser::{VersionParser, VersionParserError};

/// A package version: three numeric components and an optional qualifier.
///
/// Ordering is numeric on `major`, `minor`, `micro`, then lexicographic on
/// the qualifier. An empty qualifier sorts before any non-empty one, so
/// `1.0.0 < 1.0.0.beta`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Version {
    major: u32,
    minor: u32,
    micro: u32,
    qualifier: String,
}

impl Version {
    /// Create a version without a qualifier
    pub fn new(major: u32, minor: u32, micro: u32) -> Self {
        Version {
            major,
            minor,
            micro,
            qualifier: String::new(),
        }
    }

    /// Create a version with a qualifier
    pub fn with_qualifier(major: u32, minor: u32, micro: u32, qualifier: impl Into<String>) -> Self {
        Version {
            major,
            minor,
            micro,
            qualifier: qualifier.into(),
        }
    }

    /// The version every unversioned export defaults to (`0.0.0`)
    pub fn empty() -> Self {
        Version::default()
    }

    /// Parse a version string
    pub fn parse(input: &str) -> Result<Self, VersionParserError> {
        VersionParser::new().parse_version(input)
    }

    pub fn major(&self) -> u32 {
        self.major
    }

    pub fn minor(&self) -> u32 {
        self.minor
    }

    pub fn micro(&self) -> u32 {
        self.micro
    }

    pub fn qualifier(&self) -> &str {
        &self.qualifier
    }

    /// Check if this is the empty version
    pub fn is_empty(&self) -> bool {
        *self == Version::empty()
    }
}

impl FromStr for Version {
    type Err = VersionParserError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Version::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.micro)?;
        if !self.qualifier.is_empty() {
            write!(f, ".{}", self.qualifier)?;
        }
        Ok(())
    }
}
