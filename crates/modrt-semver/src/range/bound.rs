//! Bound type for range boundaries

use std::cmp::Ordering;
use std::fmt;

use crate::version::Version;

/// One end of a version range
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Bound {
    version: Version,
    is_inclusive: bool,
}

impl Bound {
    /// Create a new bound
    pub fn new(version: Version, is_inclusive: bool) -> Self {
        Bound {
            version,
            is_inclusive,
        }
    }

    /// The lowest possible bound (`0.0.0`, inclusive)
    pub fn zero() -> Self {
        Bound::new(Version::empty(), true)
    }

    /// Get the version
    pub fn version(&self) -> &Version {
        &self.version
    }

    /// Check if the bound is inclusive
    pub fn is_inclusive(&self) -> bool {
        self.is_inclusive
    }

    /// Check if this is the zero bound
    pub fn is_zero(&self) -> bool {
        self.version.is_empty() && self.is_inclusive
    }

    /// Check whether `version` lies above this bound when used as a lower end
    pub fn admits_above(&self, version: &Version) -> bool {
        match version.cmp(&self.version) {
            Ordering::Greater => true,
            Ordering::Equal => self.is_inclusive,
            Ordering::Less => false,
        }
    }

    /// Check whether `version` lies below this bound when used as an upper end
    pub fn admits_below(&self, version: &Version) -> bool {
        match version.cmp(&self.version) {
            Ordering::Less => true,
            Ordering::Equal => self.is_inclusive,
            Ordering::Greater => false,
        }
    }

    /// The tighter of two lower bounds
    pub(crate) fn max_lower(a: &Bound, b: &Bound) -> Bound {
        match a.version.cmp(&b.version) {
            Ordering::Greater => a.clone(),
            Ordering::Less => b.clone(),
            Ordering::Equal => Bound::new(a.version.clone(), a.is_inclusive && b.is_inclusive),
        }
    }

    /// The tighter of two upper bounds
    pub(crate) fn min_upper(a: &Bound, b: &Bound) -> Bound {
        match a.version.cmp(&b.version) {
            Ordering::Less => a.clone(),
            Ordering::Greater => b.clone(),
            Ordering::Equal => Bound::new(a.version.clone(), a.is_inclusive && b.is_inclusive),
        }
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}]",
            self.version,
            if self.is_inclusive {
                "inclusive"
            } else {
                "exclusive"
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bound_creation() {
        let bound = Bound::new(Version::new(1, 0, 0), true);
        assert_eq!(bound.version(), &Version::new(1, 0, 0));
        assert!(bound.is_inclusive());
    }

    #[test]
    fn test_zero_bound() {
        assert!(Bound::zero().is_zero());
        assert!(!Bound::new(Version::empty(), false).is_zero());
    }

    #[test]
    fn test_admits() {
        let inclusive = Bound::new(Version::new(1, 0, 0), true);
        let exclusive = Bound::new(Version::new(1, 0, 0), false);

        assert!(inclusive.admits_above(&Version::new(1, 0, 0)));
        assert!(!exclusive.admits_above(&Version::new(1, 0, 0)));
        assert!(exclusive.admits_above(&Version::new(1, 0, 1)));
        assert!(inclusive.admits_below(&Version::new(0, 9, 0)));
        assert!(!exclusive.admits_below(&Version::new(1, 0, 0)));
    }

    #[test]
    fn test_tighter_bounds() {
        let a = Bound::new(Version::new(1, 0, 0), true);
        let b = Bound::new(Version::new(1, 0, 0), false);
        assert!(!Bound::max_lower(&a, &b).is_inclusive());
        assert_eq!(
            Bound::min_upper(&a, &Bound::new(Version::new(2, 0, 0), true)).version(),
            &Version::new(1, 0, 0)
        );
    }
}
