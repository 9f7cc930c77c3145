//! Semver facade providing high-level version operations

use crate::{VersionParser, VersionParserError, VersionRange};
use crate::version::Version;

/// Main facade for string-level version operations
pub struct Semver;

impl Semver {
    /// Check if a version satisfies a range
    pub fn satisfies(version: &str, range: &str) -> bool {
        let parser = VersionParser::new();

        let version = match parser.parse_version(version) {
            Ok(v) => v,
            Err(_) => return false,
        };

        let range = match parser.parse_range(range) {
            Ok(r) => r,
            Err(_) => return false,
        };

        range.includes(&version)
    }

    /// Return all versions that satisfy the given range, in input order
    pub fn satisfied_by(versions: &[&str], range: &str) -> Vec<String> {
        let parser = VersionParser::new();
        let range = match parser.parse_range(range) {
            Ok(r) => r,
            Err(_) => return Vec::new(),
        };

        versions
            .iter()
            .filter(|v| {
                parser
                    .parse_version(v)
                    .map(|parsed| range.includes(&parsed))
                    .unwrap_or(false)
            })
            .map(|v| v.to_string())
            .collect()
    }

    /// Parse a range for repeated matching.
    pub fn parse_range(range: &str) -> Result<VersionRange, VersionParserError> {
        VersionParser::new().parse_range(range)
    }

    /// The highest version in `versions` accepted by `range`
    pub fn highest_satisfying(versions: &[&str], range: &str) -> Option<String> {
        let parser = VersionParser::new();
        let range = parser.parse_range(range).ok()?;

        versions
            .iter()
            .filter_map(|v| parser.parse_version(v).ok().map(|parsed| (parsed, *v)))
            .filter(|(parsed, _)| range.includes(parsed))
            .max_by(|(a, _), (b, _)| a.cmp(b))
            .map(|(_, original)| original.to_string())
    }

    /// Sort versions in ascending order. Unparseable entries are dropped.
    pub fn sort(versions: &[&str]) -> Vec<String> {
        Self::usort(versions, true)
    }

    /// Sort versions in descending order (reverse sort)
    pub fn rsort(versions: &[&str]) -> Vec<String> {
        Self::usort(versions, false)
    }

    fn usort(versions: &[&str], ascending: bool) -> Vec<String> {
        let parser = VersionParser::new();

        let mut parsed: Vec<(Version, usize)> = versions
            .iter()
            .enumerate()
            .filter_map(|(i, v)| parser.parse_version(v).ok().map(|p| (p, i)))
            .collect();

        // Stable sort keeps equal versions in input order
        parsed.sort_by(|(a, _), (b, _)| {
            let cmp = a.cmp(b);
            if ascending {
                cmp
            } else {
                cmp.reverse()
            }
        });

        parsed
            .into_iter()
            .map(|(_, i)| versions[i].to_string())
            .collect()
    }
}
