use indexmap::IndexMap;

use crate::module::ModuleRef;
use crate::package::EntryRef;
use crate::registry::PackageRegistry;

/// Speculative state of one resolve attempt.
///
/// The first module in `resolved` is the one being resolved; the rest were
/// pulled in while satisfying its imports. Nothing here touches the
/// registry until [`commit`](ResolutionTransaction::commit).
#[derive(Debug, Clone)]
pub struct ResolutionTransaction {
    resolved: Vec<ModuleRef>,
    providers: IndexMap<String, EntryRef>,
}

/// A point the transaction can be rolled back to
#[derive(Debug, Clone)]
pub struct Checkpoint {
    providers: IndexMap<String, EntryRef>,
    resolved_len: usize,
}

/// What a commit wrote into the registry
#[derive(Debug, Clone, Default)]
pub struct CommittedTransaction {
    /// Every module assumed resolved, root first
    pub resolved: Vec<ModuleRef>,
    /// Providers newly committed, by package name
    pub providers: Vec<(String, EntryRef)>,
}

impl ResolutionTransaction {
    pub fn new(module: ModuleRef) -> Self {
        Self {
            resolved: vec![module],
            providers: IndexMap::new(),
        }
    }

    /// The module this transaction was opened for
    pub fn root(&self) -> &ModuleRef {
        &self.resolved[0]
    }

    pub fn resolved(&self) -> &[ModuleRef] {
        &self.resolved
    }

    pub fn is_tentatively_resolved(&self, module: &ModuleRef) -> bool {
        self.resolved.iter().any(|m| m == module)
    }

    pub fn push_resolved(&mut self, module: ModuleRef) {
        self.resolved.push(module);
    }

    pub fn tentative_provider(&self, name: &str) -> Option<&EntryRef> {
        self.providers.get(name)
    }

    pub fn set_tentative_provider(&mut self, name: impl Into<String>, provider: EntryRef) {
        self.providers.insert(name.into(), provider);
    }

    pub fn tentative_providers(&self) -> impl Iterator<Item = (&str, &EntryRef)> {
        self.providers.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            providers: self.providers.clone(),
            resolved_len: self.resolved.len(),
        }
    }

    /// Restore the provider map and drop modules appended after `checkpoint`.
    pub fn rollback(&mut self, checkpoint: Checkpoint) {
        self.providers = checkpoint.providers;
        self.resolved.truncate(checkpoint.resolved_len.max(1));
    }

    /// Write every tentative provider into the registry.
    pub fn commit(self, registry: &mut PackageRegistry) -> CommittedTransaction {
        let mut committed = CommittedTransaction {
            resolved: self.resolved,
            providers: Vec::with_capacity(self.providers.len()),
        };
        for (name, provider) in self.providers {
            if registry.commit_provider(&name, &provider) {
                committed.providers.push((name, provider));
            } else {
                log::debug!("Skipped committing {} for {}: record already wired or gone", provider, name);
            }
        }
        committed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::BasicModule;
    use crate::package::PackageEntry;

    fn module(id: u64) -> ModuleRef {
        ModuleRef::new(BasicModule::new(id, format!("m{}", id)))
    }

    fn export(owner: &ModuleRef, name: &str) -> EntryRef {
        PackageEntry::parse_export(owner, name, "1.0").unwrap().shared()
    }

    #[test]
    fn test_new_transaction_contains_root() {
        let root = module(1);
        let tx = ResolutionTransaction::new(root.clone());
        assert_eq!(tx.root(), &root);
        assert!(tx.is_tentatively_resolved(&root));
        assert!(!tx.is_tentatively_resolved(&module(2)));
    }

    #[test]
    fn test_rollback_restores_state() {
        let root = module(1);
        let other = module(2);
        let mut tx = ResolutionTransaction::new(root.clone());
        tx.set_tentative_provider("p", export(&root, "p"));

        let checkpoint = tx.checkpoint();
        tx.push_resolved(other.clone());
        tx.set_tentative_provider("q", export(&other, "q"));
        assert_eq!(tx.resolved().len(), 2);

        tx.rollback(checkpoint);
        assert_eq!(tx.resolved(), &[root]);
        assert!(tx.tentative_provider("p").is_some());
        assert!(tx.tentative_provider("q").is_none());
    }

    #[test]
    fn test_commit_writes_providers() {
        let root = module(1);
        let exporter = module(2);
        let p = export(&exporter, "p");
        let mut registry = PackageRegistry::new();
        registry.register(&[p.clone()], &[]);

        let mut tx = ResolutionTransaction::new(root);
        tx.push_resolved(exporter.clone());
        tx.set_tentative_provider("p", p.clone());
        tx.set_tentative_provider("gone", export(&exporter, "gone"));

        let committed = tx.commit(&mut registry);
        assert_eq!(committed.resolved.len(), 2);
        assert_eq!(committed.providers.len(), 1);
        assert!(std::sync::Arc::ptr_eq(&registry.provider_of("p").unwrap(), &p));
    }
}
