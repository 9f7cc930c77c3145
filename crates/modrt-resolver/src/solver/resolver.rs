use crate::module::{ModuleRef, ModuleState};
use crate::package::{EntryRef, PackageEntry, PackageRecord};
use crate::registry::PackageRegistry;

use super::policy::ProviderPolicy;
use super::transaction::ResolutionTransaction;

/// Provider search over a registry snapshot.
///
/// The resolver only reads the registry; every choice it makes goes into
/// the [`ResolutionTransaction`] passed in, which the caller commits or
/// drops.
pub struct Resolver<'a> {
    registry: &'a PackageRegistry,
    policy: ProviderPolicy,
}

impl<'a> Resolver<'a> {
    pub fn new(registry: &'a PackageRegistry, policy: ProviderPolicy) -> Self {
        Self { registry, policy }
    }

    /// Find providers for `entries` in list order.
    ///
    /// Returns the imports that could not be satisfied, in input order.
    pub fn resolve_list(&self, tx: &mut ResolutionTransaction, entries: &[EntryRef]) -> Vec<EntryRef> {
        entries
            .iter()
            .filter(|import| !self.resolve_import(tx, import))
            .cloned()
            .collect()
    }

    fn resolve_import(&self, tx: &mut ResolutionTransaction, import: &EntryRef) -> bool {
        let Some(record) = self.registry.record(import.name()) else {
            log::debug!("No record for {}", import);
            return false;
        };

        if record.is_zombie() {
            log::debug!("Package {} is a zombie; not wiring {}", import.name(), import);
            return false;
        }

        if let Some(provider) = record.provider() {
            return import.accepts(provider);
        }

        if let Some(provider) = tx.tentative_provider(import.name()) {
            return import.accepts(provider);
        }

        match self.pick_provider(tx, record, import) {
            Some(provider) if import.accepts(&provider) => {
                log::debug!("Tentatively wiring {} to {}", import, provider);
                tx.set_tentative_provider(import.name(), provider);
                true
            }
            _ => false,
        }
    }

    /// Choose an exporter of `record` for `import`.
    ///
    /// Exporters whose module is still installed are resolved recursively
    /// inside the transaction; a failed attempt is rolled back before the
    /// next candidate is tried.
    fn pick_provider(
        &self,
        tx: &mut ResolutionTransaction,
        record: &PackageRecord,
        import: &PackageEntry,
    ) -> Option<EntryRef> {
        for candidate in self.policy.order_candidates(record.exporters()) {
            if !import.accepts(&candidate) {
                continue;
            }

            let owner = candidate.owner();
            let state = owner.state();
            if state.allows_package_access() {
                return Some(candidate);
            }
            if state != ModuleState::Installed {
                continue;
            }

            // Already assumed resolved higher up: cycle
            if tx.is_tentatively_resolved(owner) {
                return Some(candidate);
            }

            let checkpoint = tx.checkpoint();
            tx.push_resolved(owner.clone());
            let imports = self.registry.mandatory_imports_of(owner);
            let unresolved = self.resolve_list(tx, &imports);
            if unresolved.is_empty() {
                return Some(candidate);
            }

            log::debug!(
                "Rolling back {}: {} import(s) unresolved",
                owner,
                unresolved.len()
            );
            tx.rollback(checkpoint);
        }
        None
    }

    /// Find a provider for a late-bound import.
    ///
    /// Unlike [`resolve_list`](Self::resolve_list) this never resolves
    /// installed modules; an exporter qualifies only if its module already
    /// allows package access or is assumed resolved by `open`. On failure the
    /// modules that were considered are returned.
    pub fn find_dynamic_provider(
        &self,
        open: Option<&ResolutionTransaction>,
        import: &PackageEntry,
    ) -> Result<EntryRef, Vec<ModuleRef>> {
        let Some(record) = self.registry.record(import.name()) else {
            return Err(Vec::new());
        };

        if let Some(provider) = record.provider() {
            if record.is_zombie() || !import.accepts(provider) {
                return Err(vec![provider.owner().clone()]);
            }
            return Ok(provider.clone());
        }

        let mut considered = Vec::new();
        for candidate in self.policy.order_candidates(record.exporters()) {
            let owner = candidate.owner();
            let resolvable = owner.state().allows_package_access()
                || open.is_some_and(|tx| tx.is_tentatively_resolved(owner));
            if resolvable && import.accepts(&candidate) {
                return Ok(candidate);
            }
            considered.push(owner.clone());
        }
        Err(considered)
    }
}
