//! The package registry: who exports and imports what, and who provides
//! each package right now.

use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};

use crate::module::{ModuleKey, ModuleRef};
use crate::package::{EntryRef, PackageRecord};

/// Declarations registered by one module generation, in registration order
#[derive(Debug, Clone)]
struct OwnerDeclarations {
    module: ModuleRef,
    exports: Vec<EntryRef>,
    imports: Vec<EntryRef>,
}

impl OwnerDeclarations {
    fn new(module: ModuleRef) -> Self {
        Self {
            module,
            exports: Vec::new(),
            imports: Vec::new(),
        }
    }

    fn is_empty(&self) -> bool {
        self.exports.is_empty() && self.imports.is_empty()
    }
}

/// Result of an unregister call
#[derive(Debug, Clone, Default)]
pub struct Unregistration {
    /// Exports that were still providers and could not be removed
    pub protected: Vec<EntryRef>,
    /// Number of import declarations removed
    pub imports_removed: usize,
}

impl Unregistration {
    pub fn all_removed(&self) -> bool {
        self.protected.is_empty()
    }
}

/// Name-keyed map of package records plus a per-owner index.
#[derive(Debug, Clone, Default)]
pub struct PackageRegistry {
    packages: IndexMap<String, PackageRecord>,
    owners: IndexMap<ModuleKey, OwnerDeclarations>,
}

impl PackageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make declarations visible as candidates. No resolution happens here.
    pub fn register(&mut self, exports: &[EntryRef], imports: &[EntryRef]) {
        for export in exports {
            self.packages
                .entry(export.name().to_string())
                .or_insert_with(|| PackageRecord::new(export.name()))
                .add_exporter(export.clone());
            self.remember(export);
        }
        for import in imports {
            self.packages
                .entry(import.name().to_string())
                .or_insert_with(|| PackageRecord::new(import.name()))
                .add_importer(import.clone());
            self.remember(import);
        }
    }

    /// Remove declarations.
    ///
    /// A provider export is only removed when `force` is set; otherwise its
    /// record turns zombie and no import of this call is removed either.
    pub fn unregister(&mut self, exports: &[EntryRef], imports: &[EntryRef], force: bool) -> Unregistration {
        let mut outcome = Unregistration::default();

        for export in exports {
            let Some(record) = self.packages.get_mut(export.name()) else {
                continue;
            };
            if record.remove_exporter(export, force) {
                let prune = record.is_empty();
                self.forget(export);
                if prune {
                    self.packages.shift_remove(export.name());
                }
            } else {
                log::warn!(
                    "Package {} is still provided by {} for its importers; marked as zombie",
                    export.name(),
                    export.owner()
                );
                outcome.protected.push(export.clone());
            }
        }

        if !outcome.all_removed() {
            return outcome;
        }

        for import in imports {
            let Some(record) = self.packages.get_mut(import.name()) else {
                continue;
            };
            if record.remove_importer(import) {
                outcome.imports_removed += 1;
            }
            let prune = record.is_empty();
            self.forget(import);
            if prune {
                self.packages.shift_remove(import.name());
            }
        }

        outcome
    }

    /// Wire a late-bound importer to `provider`, committing the provider if
    /// the record had none.
    pub(crate) fn wire_dynamic(&mut self, import: &EntryRef, provider: &EntryRef) {
        let record = self
            .packages
            .entry(import.name().to_string())
            .or_insert_with(|| PackageRecord::new(import.name()));
        record.add_importer(import.clone());
        if record.provider().is_none() {
            record.set_provider(provider.clone());
        }
        self.remember(import);
    }

    /// Commit a provider chosen by a resolution transaction.
    pub(crate) fn commit_provider(&mut self, name: &str, provider: &EntryRef) -> bool {
        match self.packages.get_mut(name) {
            Some(record) => record.set_provider(provider.clone()),
            None => false,
        }
    }

    pub fn record(&self, name: &str) -> Option<&PackageRecord> {
        self.packages.get(name)
    }

    pub fn provider_of(&self, name: &str) -> Option<EntryRef> {
        self.packages.get(name).and_then(|r| r.provider().cloned())
    }

    /// Modules importing `name` that have not been uninstalled
    pub fn importers_of(&self, name: &str) -> Vec<ModuleRef> {
        let Some(record) = self.packages.get(name) else {
            return Vec::new();
        };
        let modules: IndexSet<ModuleRef> = record.live_importers().map(|e| e.owner().clone()).collect();
        modules.into_iter().collect()
    }

    pub fn exported_by(&self, module: &ModuleRef) -> Vec<EntryRef> {
        self.owners
            .get(&module.key())
            .map(|d| d.exports.clone())
            .unwrap_or_default()
    }

    pub fn imported_by(&self, module: &ModuleRef) -> Vec<EntryRef> {
        self.owners
            .get(&module.key())
            .map(|d| d.imports.clone())
            .unwrap_or_default()
    }

    /// The mandatory imports `module` registered, in registration order
    pub fn mandatory_imports_of(&self, module: &ModuleRef) -> Vec<EntryRef> {
        self.owners
            .get(&module.key())
            .map(|d| d.imports.iter().filter(|e| e.is_mandatory()).cloned().collect())
            .unwrap_or_default()
    }

    /// Every module generation that currently has declarations
    pub fn modules(&self) -> Vec<ModuleRef> {
        self.owners.values().map(|d| d.module.clone()).collect()
    }

    pub fn package_names(&self) -> impl Iterator<Item = &str> {
        self.packages.keys().map(|k| k.as_str())
    }

    pub fn zombie_packages(&self) -> Vec<String> {
        self.packages
            .values()
            .filter(|r| r.is_zombie())
            .map(|r| r.name().to_string())
            .collect()
    }

    /// Modules whose export is the provider of a zombie record
    pub fn zombie_providers(&self) -> Vec<ModuleRef> {
        let modules: IndexSet<ModuleRef> = self
            .packages
            .values()
            .filter(|r| r.is_zombie())
            .filter_map(|r| r.provider().map(|p| p.owner().clone()))
            .collect();
        modules.into_iter().collect()
    }

    /// Committed providers by package name, in record order
    pub fn providers(&self) -> Vec<(String, EntryRef)> {
        self.packages
            .values()
            .filter_map(|r| r.provider().map(|p| (r.name().to_string(), p.clone())))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    fn remember(&mut self, entry: &EntryRef) {
        let owner = entry.owner();
        let decls = self
            .owners
            .entry(owner.key())
            .or_insert_with(|| OwnerDeclarations::new(owner.clone()));
        let list = if entry.is_export() {
            &mut decls.exports
        } else {
            &mut decls.imports
        };
        if !list.iter().any(|e| Arc::ptr_eq(e, entry)) {
            list.push(entry.clone());
        }
    }

    fn forget(&mut self, entry: &EntryRef) {
        let key = entry.owner().key();
        let Some(decls) = self.owners.get_mut(&key) else {
            return;
        };
        decls.exports.retain(|e| !Arc::ptr_eq(e, entry));
        decls.imports.retain(|e| !Arc::ptr_eq(e, entry));
        if decls.is_empty() {
            self.owners.shift_remove(&key);
        }
    }
}
