//! VersionRange - an interval of acceptable versions

use std::fmt;
use std::str::FromStr;

use super::Bound;
use crate::version::Version;
use crate::version_parser::{VersionParser, VersionParserError};

/// An interval of versions an import accepts.
///
/// The upper end is optional; `None` means unbounded.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionRange {
    low: Bound,
    high: Option<Bound>,
}

impl VersionRange {
    /// Create a range from explicit bounds
    pub fn new(low: Bound, high: Option<Bound>) -> Self {
        VersionRange { low, high }
    }

    /// A range that matches every version
    pub fn any() -> Self {
        VersionRange::new(Bound::zero(), None)
    }

    /// A range that matches `version` and everything above it
    pub fn at_least(version: Version) -> Self {
        VersionRange::new(Bound::new(version, true), None)
    }

    /// Parse a range string
    pub fn parse(input: &str) -> Result<Self, VersionParserError> {
        VersionParser::new().parse_range(input)
    }

    pub fn low(&self) -> &Bound {
        &self.low
    }

    pub fn high(&self) -> Option<&Bound> {
        self.high.as_ref()
    }

    /// Check whether a version lies inside this range
    pub fn includes(&self, version: &Version) -> bool {
        if !self.low.admits_above(version) {
            return false;
        }
        match &self.high {
            Some(high) => high.admits_below(version),
            None => true,
        }
    }

    /// Check if this range matches every version
    pub fn is_any(&self) -> bool {
        self.low.is_zero() && self.high.is_none()
    }

    /// Check if no version can satisfy this range
    pub fn is_empty(&self) -> bool {
        let Some(high) = &self.high else {
            return false;
        };
        match self.low.version().cmp(high.version()) {
            std::cmp::Ordering::Greater => true,
            std::cmp::Ordering::Equal => !(self.low.is_inclusive() && high.is_inclusive()),
            std::cmp::Ordering::Less => false,
        }
    }

    /// Check whether some version satisfies both ranges
    pub fn intersects(&self, other: &VersionRange) -> bool {
        !self.intersection(other).is_empty()
    }

    /// The range of versions accepted by both `self` and `other`
    pub fn intersection(&self, other: &VersionRange) -> VersionRange {
        let low = Bound::max_lower(&self.low, &other.low);
        let high = match (&self.high, &other.high) {
            (Some(a), Some(b)) => Some(Bound::min_upper(a, b)),
            (Some(a), None) => Some(a.clone()),
            (None, Some(b)) => Some(b.clone()),
            (None, None) => None,
        };
        VersionRange::new(low, high)
    }
}

impl Default for VersionRange {
    fn default() -> Self {
        Self::any()
    }
}

impl FromStr for VersionRange {
    type Err = VersionParserError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VersionRange::parse(s)
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_any() {
            return write!(f, "*");
        }
        match &self.high {
            None if self.low.is_inclusive() => write!(f, "{}", self.low.version()),
            None => write!(f, "({},*)", self.low.version()),
            Some(high) => write!(
                f,
                "{}{},{}{}",
                if self.low.is_inclusive() { '[' } else { '(' },
                self.low.version(),
                high.version(),
                if high.is_inclusive() { ']' } else { ')' },
            ),
        }
    }
}
