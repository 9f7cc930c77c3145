//! Version range types for import constraints

mod bound;
mod version_range;

pub use bound::Bound;
pub use version_range::VersionRange;
