use std::fmt;
use std::sync::Arc;

use modrt_semver::{Version, VersionRange};

use crate::error::Result;
use crate::module::ModuleRef;

/// Shared handle to a declaration. The registry compares these by pointer
/// identity when it asks whether an entry is a record's provider.
pub type EntryRef = Arc<PackageEntry>;

/// Whether a declaration provides or requires a package
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Export,
    Import,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Export => "export",
            Direction::Import => "import",
        }
    }
}

/// How an import takes part in resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ImportKind {
    /// Must be wired before the module may resolve
    #[default]
    Mandatory,
    /// Wired when possible, never blocks resolution
    Optional,
    /// Late-bound on first use after the module is running
    Dynamic,
}

/// One export or import declaration owned by a module generation.
///
/// Immutable once created.
#[derive(Debug, Clone, PartialEq)]
pub struct PackageEntry {
    name: String,
    version: Version,
    owner: ModuleRef,
    direction: Direction,
    range: Option<VersionRange>,
    kind: ImportKind,
}

impl PackageEntry {
    /// Declare that `owner` provides `name` at `version`
    pub fn export(owner: &ModuleRef, name: impl Into<String>, version: Version) -> Self {
        PackageEntry {
            name: name.into(),
            version,
            owner: owner.clone(),
            direction: Direction::Export,
            range: None,
            kind: ImportKind::Mandatory,
        }
    }

    /// Declare that `owner` requires `name` within `range`; `None` accepts any version
    pub fn import(owner: &ModuleRef, name: impl Into<String>, range: Option<VersionRange>) -> Self {
        let version = range
            .as_ref()
            .map(|r| r.low().version().clone())
            .unwrap_or_default();
        PackageEntry {
            name: name.into(),
            version,
            owner: owner.clone(),
            direction: Direction::Import,
            range,
            kind: ImportKind::Mandatory,
        }
    }

    /// Build an export from a version string
    pub fn parse_export(owner: &ModuleRef, name: impl Into<String>, version: &str) -> Result<Self> {
        Ok(Self::export(owner, name, Version::parse(version)?))
    }

    /// Build an import from a range string (`*` or empty for any version)
    pub fn parse_import(owner: &ModuleRef, name: impl Into<String>, range: &str) -> Result<Self> {
        let range = VersionRange::parse(range)?;
        let range = if range.is_any() { None } else { Some(range) };
        Ok(Self::import(owner, name, range))
    }

    /// Mark this import as optional
    pub fn optional(mut self) -> Self {
        self.kind = ImportKind::Optional;
        self
    }

    /// Mark this import as dynamic (late-bound)
    pub fn dynamic(mut self) -> Self {
        self.kind = ImportKind::Dynamic;
        self
    }

    pub fn shared(self) -> EntryRef {
        Arc::new(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    pub fn owner(&self) -> &ModuleRef {
        &self.owner
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn range(&self) -> Option<&VersionRange> {
        self.range.as_ref()
    }

    pub fn kind(&self) -> ImportKind {
        self.kind
    }

    pub fn is_export(&self) -> bool {
        self.direction == Direction::Export
    }

    pub fn is_import(&self) -> bool {
        self.direction == Direction::Import
    }

    pub fn is_mandatory(&self) -> bool {
        self.is_import() && self.kind == ImportKind::Mandatory
    }

    pub fn is_optional(&self) -> bool {
        self.is_import() && self.kind == ImportKind::Optional
    }

    pub fn is_dynamic(&self) -> bool {
        self.is_import() && self.kind == ImportKind::Dynamic
    }

    /// Check whether `provider` can satisfy this import.
    pub fn accepts(&self, provider: &PackageEntry) -> bool {
        if !provider.is_export() || provider.name != self.name {
            return false;
        }
        match &self.range {
            Some(range) => range.includes(&provider.version),
            None => true,
        }
    }
}

impl fmt::Display for PackageEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction {
            Direction::Export => write!(f, "export {} {} by {}", self.name, self.version, self.owner),
            Direction::Import => {
                write!(f, "import {}", self.name)?;
                if let Some(range) = &self.range {
                    write!(f, " {}", range)?;
                }
                match self.kind {
                    ImportKind::Mandatory => {}
                    ImportKind::Optional => write!(f, " (optional)")?,
                    ImportKind::Dynamic => write!(f, " (dynamic)")?,
                }
                write!(f, " by {}", self.owner)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::BasicModule;

    fn module(id: u64, name: &str) -> ModuleRef {
        ModuleRef::new(BasicModule::new(id, name))
    }

    #[test]
    fn test_accepts_within_range() {
        let a = module(1, "a");
        let b = module(2, "b");
        let export = PackageEntry::parse_export(&a, "p", "1.5").unwrap();
        let import = PackageEntry::parse_import(&b, "p", "[1.0,2.0)").unwrap();
        let too_new = PackageEntry::parse_export(&a, "p", "2.0").unwrap();

        assert!(import.accepts(&export));
        assert!(!import.accepts(&too_new));
    }

    #[test]
    fn test_accepts_checks_name_and_direction() {
        let a = module(1, "a");
        let export = PackageEntry::parse_export(&a, "q", "1.0").unwrap();
        let import = PackageEntry::parse_import(&a, "p", "*").unwrap();
        let other_import = PackageEntry::parse_import(&a, "p", "*").unwrap();

        assert!(!import.accepts(&export));
        assert!(!import.accepts(&other_import));
    }

    #[test]
    fn test_any_range_is_absent() {
        let a = module(1, "a");
        let import = PackageEntry::parse_import(&a, "p", "*").unwrap();
        assert!(import.range().is_none());
        assert!(import.version().is_empty());
    }

    #[test]
    fn test_import_kinds() {
        let a = module(1, "a");
        let import = PackageEntry::import(&a, "p", None);
        assert!(import.is_mandatory());
        assert!(import.clone().optional().is_optional());
        assert!(import.dynamic().is_dynamic());

        let export = PackageEntry::export(&a, "p", Version::new(1, 0, 0));
        assert!(!export.is_mandatory());
    }

    #[test]
    fn test_invalid_version_is_an_error() {
        let a = module(1, "a");
        assert!(PackageEntry::parse_export(&a, "p", "one.two").is_err());
        assert!(PackageEntry::parse_import(&a, "p", "[2.0,1.0]").is_err());
    }

    #[test]
    fn test_display() {
        let b = module(2, "b");
        let import = PackageEntry::parse_import(&b, "p", "[1.0,2.0)").unwrap().optional();
        assert_eq!(import.to_string(), "import p [1.0.0,2.0.0) (optional) by b#2.0");
    }
}
