//! Version values and version ranges for module package declarations
//!
//! Versions are `major.minor.micro.qualifier` tuples; ranges use interval
//! notation (`[1.0,2.0)`), a bare version meaning "at least", or `*` for any.

pub mod range;
mod semver;
mod version;
mod version_parser;

pub use range::{Bound, VersionRange};
pub use semver::Semver;
pub use version::Version;
pub use version_parser::{VersionParser, VersionParserError};
