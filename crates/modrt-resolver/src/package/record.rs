use std::sync::Arc;

use super::EntryRef;
use crate::module::ModuleState;

/// Everything the runtime knows about one package name.
///
/// Holds the exporters in registration order, the importers, and at most
/// one committed provider, which is always one of the exporters.
#[derive(Debug, Clone)]
pub struct PackageRecord {
    name: String,
    exporters: Vec<EntryRef>,
    importers: Vec<EntryRef>,
    provider: Option<EntryRef>,
    zombie: bool,
}

impl PackageRecord {
    pub fn new(name: impl Into<String>) -> Self {
        PackageRecord {
            name: name.into(),
            exporters: Vec::new(),
            importers: Vec::new(),
            provider: None,
            zombie: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn exporters(&self) -> &[EntryRef] {
        &self.exporters
    }

    pub fn importers(&self) -> &[EntryRef] {
        &self.importers
    }

    pub fn provider(&self) -> Option<&EntryRef> {
        self.provider.as_ref()
    }

    /// True once removal of the provider was refused because importers still
    /// rely on it.
    pub fn is_zombie(&self) -> bool {
        self.zombie
    }

    pub fn is_empty(&self) -> bool {
        self.exporters.is_empty() && self.importers.is_empty()
    }

    pub fn is_provider(&self, entry: &EntryRef) -> bool {
        self.provider.as_ref().is_some_and(|p| Arc::ptr_eq(p, entry))
    }

    /// Importers whose module has not been uninstalled
    pub fn live_importers(&self) -> impl Iterator<Item = &EntryRef> {
        self.importers
            .iter()
            .filter(|e| e.owner().state() != ModuleState::Uninstalled)
    }

    pub fn add_exporter(&mut self, entry: EntryRef) {
        if !self.exporters.iter().any(|e| Arc::ptr_eq(e, &entry)) {
            self.exporters.push(entry);
        }
    }

    pub fn add_importer(&mut self, entry: EntryRef) {
        if !self.importers.iter().any(|e| Arc::ptr_eq(e, &entry)) {
            self.importers.push(entry);
        }
    }

    /// Remove an exporter.
    ///
    /// Removing the current provider without `force` fails and marks the
    /// record as a zombie. With `force` the provider is cleared first.
    pub fn remove_exporter(&mut self, entry: &EntryRef, force: bool) -> bool {
        if self.is_provider(entry) {
            if !force {
                self.zombie = true;
                return false;
            }
            self.provider = None;
            self.zombie = false;
        }
        self.exporters.retain(|e| !Arc::ptr_eq(e, entry));
        true
    }

    /// Remove an importer, returning whether it was present
    pub fn remove_importer(&mut self, entry: &EntryRef) -> bool {
        let before = self.importers.len();
        self.importers.retain(|e| !Arc::ptr_eq(e, entry));
        self.importers.len() != before
    }

    /// Commit `entry` as provider. Only the first commit sticks; a record
    /// never switches provider while importers may be wired to it.
    pub(crate) fn set_provider(&mut self, entry: EntryRef) -> bool {
        if self.provider.is_some() {
            return false;
        }
        if !self.exporters.iter().any(|e| Arc::ptr_eq(e, &entry)) {
            return false;
        }
        self.provider = Some(entry);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::{BasicModule, ModuleRef};
    use crate::package::PackageEntry;
    use modrt_semver::Version;

    fn export(id: u64, version: Version) -> EntryRef {
        let owner = ModuleRef::new(BasicModule::new(id, format!("m{}", id)));
        PackageEntry::export(&owner, "p", version).shared()
    }

    #[test]
    fn test_add_is_idempotent() {
        let mut record = PackageRecord::new("p");
        let e = export(1, Version::new(1, 0, 0));
        record.add_exporter(e.clone());
        record.add_exporter(e.clone());
        assert_eq!(record.exporters().len(), 1);
    }

    #[test]
    fn test_set_provider_requires_exporter() {
        let mut record = PackageRecord::new("p");
        let registered = export(1, Version::new(1, 0, 0));
        let stranger = export(2, Version::new(1, 0, 0));
        record.add_exporter(registered.clone());

        assert!(!record.set_provider(stranger));
        assert!(record.set_provider(registered.clone()));
        assert!(record.is_provider(&registered));
    }

    #[test]
    fn test_at_most_one_provider() {
        let mut record = PackageRecord::new("p");
        let first = export(1, Version::new(1, 0, 0));
        let second = export(2, Version::new(1, 1, 0));
        record.add_exporter(first.clone());
        record.add_exporter(second.clone());

        assert!(record.set_provider(first.clone()));
        assert!(!record.set_provider(second));
        assert!(record.is_provider(&first));
    }

    #[test]
    fn test_remove_provider_without_force_marks_zombie() {
        let mut record = PackageRecord::new("p");
        let e = export(1, Version::new(1, 0, 0));
        record.add_exporter(e.clone());
        record.set_provider(e.clone());

        assert!(!record.remove_exporter(&e, false));
        assert!(record.is_zombie());
        assert!(record.is_provider(&e));

        assert!(record.remove_exporter(&e, true));
        assert!(!record.is_zombie());
        assert!(record.provider().is_none());
        assert!(record.is_empty());
    }

    #[test]
    fn test_remove_non_provider_exporter() {
        let mut record = PackageRecord::new("p");
        let provider = export(1, Version::new(1, 0, 0));
        let spare = export(2, Version::new(1, 0, 0));
        record.add_exporter(provider.clone());
        record.add_exporter(spare.clone());
        record.set_provider(provider);

        assert!(record.remove_exporter(&spare, false));
        assert!(!record.is_zombie());
        assert_eq!(record.exporters().len(), 1);
    }
}
