//! Closure of modules affected by stale (zombie) providers.

use indexmap::IndexSet;

use crate::module::ModuleRef;
use crate::registry::PackageRegistry;

/// Compute the modules that must be torn down together to purge stale code.
///
/// Starts from `seed`, or from every module providing a zombie package if
/// `seed` is absent or empty, and adds every live importer of a package the
/// set provides until nothing new is found. The result is ordered by
/// start level, then module id.
pub fn zombie_affected(registry: &PackageRegistry, seed: Option<&[ModuleRef]>) -> IndexSet<ModuleRef> {
    let initial = match seed {
        Some(modules) if !modules.is_empty() => modules.to_vec(),
        _ => registry.zombie_providers(),
    };

    let mut affected: IndexSet<ModuleRef> = initial.into_iter().collect();
    let mut next = 0;
    while next < affected.len() {
        let module = affected[next].clone();
        next += 1;

        for export in registry.exported_by(&module) {
            let Some(record) = registry.record(export.name()) else {
                continue;
            };
            if !record.is_provider(&export) {
                continue;
            }
            for importer in record.live_importers() {
                if affected.insert(importer.owner().clone()) {
                    log::debug!("{} is affected through {} from {}", importer.owner(), export.name(), module);
                }
            }
        }
    }

    let mut ordered: Vec<ModuleRef> = affected.into_iter().collect();
    ordered.sort_by_key(|m| m.start_order());
    ordered.into_iter().collect()
}
