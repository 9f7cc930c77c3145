use std::sync::{Mutex, MutexGuard};
use std::thread::{self, ThreadId};
use std::time::Instant;

use indexmap::IndexSet;

use super::resolver::Resolver;
use super::transaction::ResolutionTransaction;
use crate::config::ResolverConfig;
use crate::error::{ResolverError, Result};
use crate::event::{
    DynamicImportFailedEvent, EventDispatcher, ResolveFailedEvent, ResolvedEvent, ZombieMarkedEvent,
};
use crate::module::ModuleRef;
use crate::package::EntryRef;
use crate::registry::PackageRegistry;
use crate::zombie::zombie_affected;

/// Result of a successful resolve.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub module: ModuleRef,
    /// Installed modules whose imports were satisfied as part of this resolve.
    /// The lifecycle manager should re-check and mark them resolved too.
    pub co_resolved: Vec<ModuleRef>,
    /// Providers committed by this resolve, by package name
    pub committed: Vec<(String, EntryRef)>,
}

/// The package resolution engine.
///
/// All operations run under one engine-wide lock, so registration,
/// resolution and queries are atomic with respect to each other and at
/// most one resolution transaction exists at a time. Events are dispatched
/// after the lock is released.
pub struct ResolutionEngine {
    registry: Mutex<PackageRegistry>,
    holder: Mutex<Option<ThreadId>>,
    config: ResolverConfig,
    events: EventDispatcher,
}

/// Engine lock plus the bookkeeping that lets us detect re-entry
struct EngineGuard<'a> {
    registry: MutexGuard<'a, PackageRegistry>,
    holder: &'a Mutex<Option<ThreadId>>,
}

impl Drop for EngineGuard<'_> {
    fn drop(&mut self) {
        *self.holder.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }
}

impl ResolutionEngine {
    pub fn new(config: ResolverConfig) -> Self {
        Self::with_dispatcher(config, EventDispatcher::new())
    }

    pub fn with_dispatcher(config: ResolverConfig, events: EventDispatcher) -> Self {
        Self {
            registry: Mutex::new(PackageRegistry::new()),
            holder: Mutex::new(None),
            config,
            events,
        }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Make a module's declarations visible as provider candidates.
    pub fn register(&self, exports: &[EntryRef], imports: &[EntryRef]) -> Result<()> {
        if let Some(bad) = exports.iter().find(|e| !e.is_export()) {
            return Err(ResolverError::InvalidDeclaration(format!("{} passed as an export", bad)));
        }
        if let Some(bad) = imports.iter().find(|e| !e.is_import()) {
            return Err(ResolverError::InvalidDeclaration(format!("{} passed as an import", bad)));
        }

        let mut guard = self.lock("register")?;
        guard.registry.register(exports, imports);
        log::debug!("Registered {} export(s), {} import(s)", exports.len(), imports.len());
        Ok(())
    }

    /// Remove declarations.
    ///
    /// Returns `false` if any export is still a provider and `force` is not
    /// set; in that case no import of this call is removed.
    pub fn unregister(&self, exports: &[EntryRef], imports: &[EntryRef], force: bool) -> Result<bool> {
        let outcome = {
            let mut guard = self.lock("unregister")?;
            guard.registry.unregister(exports, imports, force)
        };

        for export in &outcome.protected {
            self.events.dispatch(&ZombieMarkedEvent {
                module: export.owner().clone(),
                package: export.name().to_string(),
            });
        }
        Ok(outcome.all_removed())
    }

    /// Resolve `module` given its imports.
    ///
    /// Mandatory imports must all be satisfied, otherwise nothing is
    /// committed and [`ResolverError::Unresolved`] lists the imports that
    /// failed. Optional imports are wired when possible. Dynamic imports are
    /// left for [`register_dynamic_import`](Self::register_dynamic_import).
    pub fn resolve(&self, module: &ModuleRef, imports: &[EntryRef]) -> Result<Resolution> {
        let mandatory: Vec<EntryRef> = imports.iter().filter(|e| e.is_mandatory()).cloned().collect();
        let optional: Vec<EntryRef> = imports.iter().filter(|e| e.is_optional()).cloned().collect();

        let start = Instant::now();
        let outcome = {
            let mut guard = self.lock("resolve")?;
            let mut tx = ResolutionTransaction::new(module.clone());
            let resolver = Resolver::new(&guard.registry, self.config.provider_policy);

            let unresolved = resolver.resolve_list(&mut tx, &mandatory);
            if unresolved.is_empty() {
                for import in &optional {
                    let checkpoint = tx.checkpoint();
                    if !resolver.resolve_list(&mut tx, std::slice::from_ref(import)).is_empty() {
                        log::debug!("Optional {} left unwired", import);
                        tx.rollback(checkpoint);
                    }
                }
                Ok(tx.commit(&mut guard.registry))
            } else {
                Err(unresolved)
            }
        };

        match outcome {
            Ok(committed) => {
                log::info!(
                    "Resolved {} ({} provider(s), {} co-resolved) in {:?}",
                    module,
                    committed.providers.len(),
                    committed.resolved.len().saturating_sub(1),
                    start.elapsed()
                );
                let resolution = Resolution {
                    module: module.clone(),
                    co_resolved: committed.resolved.into_iter().skip(1).collect(),
                    committed: committed.providers,
                };
                self.events.dispatch(&ResolvedEvent {
                    module: resolution.module.clone(),
                    co_resolved: resolution.co_resolved.clone(),
                    providers: resolution.committed.clone(),
                });
                Ok(resolution)
            }
            Err(unresolved) => {
                log::info!("Could not resolve {}: {} unresolved import(s)", module, unresolved.len());
                self.events.dispatch(&ResolveFailedEvent {
                    module: module.clone(),
                    unresolved: unresolved.clone(),
                });
                Err(ResolverError::Unresolved {
                    module: module.clone(),
                    imports: unresolved,
                })
            }
        }
    }

    /// Wire a late-bound import for a running module.
    ///
    /// Returns `None` when the requester may not use packages yet or no
    /// exporter can serve it right now. Never resolves installed exporters.
    pub fn register_dynamic_import(&self, import: &EntryRef) -> Result<Option<EntryRef>> {
        if !import.is_import() {
            return Err(ResolverError::InvalidDeclaration(format!("{} is not an import", import)));
        }

        let requester = import.owner();
        if !requester.state().allows_package_access() {
            log::debug!("Ignoring dynamic import from {} in state {}", requester, requester.state());
            return Ok(None);
        }

        let found = {
            let mut guard = self.lock("dynamic import")?;
            // The engine lock excludes any open transaction here
            let found = Resolver::new(&guard.registry, self.config.provider_policy)
                .find_dynamic_provider(None, import);
            if let Ok(provider) = &found {
                guard.registry.wire_dynamic(import, provider);
            }
            found
        };

        match found {
            Ok(provider) => {
                log::debug!("Dynamically wired {} to {}", import, provider);
                Ok(Some(provider))
            }
            Err(considered) => {
                let names: Vec<String> = considered.iter().map(|m| m.to_string()).collect();
                log::warn!(
                    "No provider for dynamic {}; considered [{}]",
                    import,
                    names.join(", ")
                );
                if self.config.dynamic_import_events {
                    self.events.dispatch(&DynamicImportFailedEvent {
                        module: requester.clone(),
                        package: import.name().to_string(),
                        considered,
                    });
                }
                Ok(None)
            }
        }
    }

    /// Modules that must be purged together with `seed`, or with every
    /// zombie provider when `seed` is absent or empty, in start order.
    pub fn zombie_affected(&self, seed: Option<&[ModuleRef]>) -> Result<IndexSet<ModuleRef>> {
        let guard = self.lock("zombie closure")?;
        Ok(zombie_affected(&guard.registry, seed))
    }

    pub fn provider_of(&self, name: &str) -> Result<Option<EntryRef>> {
        Ok(self.lock("query")?.registry.provider_of(name))
    }

    pub fn importers_of(&self, name: &str) -> Result<Vec<ModuleRef>> {
        Ok(self.lock("query")?.registry.importers_of(name))
    }

    pub fn exported_by(&self, module: &ModuleRef) -> Result<Vec<EntryRef>> {
        Ok(self.lock("query")?.registry.exported_by(module))
    }

    pub fn imported_by(&self, module: &ModuleRef) -> Result<Vec<EntryRef>> {
        Ok(self.lock("query")?.registry.imported_by(module))
    }

    pub fn is_zombie(&self, name: &str) -> Result<bool> {
        Ok(self
            .lock("query")?
            .registry
            .record(name)
            .is_some_and(|r| r.is_zombie()))
    }

    pub fn zombie_packages(&self) -> Result<Vec<String>> {
        Ok(self.lock("query")?.registry.zombie_packages())
    }

    /// Run `f` against a consistent view of the registry.
    pub fn inspect<T>(&self, f: impl FnOnce(&PackageRegistry) -> T) -> Result<T> {
        let guard = self.lock("inspect")?;
        Ok(f(&guard.registry))
    }

    /// Take the engine lock, refusing re-entry from the thread holding it.
    ///
    /// Re-entry happens when a module's `state()` calls back into the
    /// engine during provider selection.
    fn lock(&self, operation: &'static str) -> Result<EngineGuard<'_>> {
        let current = thread::current().id();
        if *self.holder.lock().unwrap_or_else(|e| e.into_inner()) == Some(current) {
            log::error!("Re-entrant {} from the thread holding the resolver", operation);
            return Err(ResolverError::Reentrant { operation });
        }

        let registry = self.registry.lock().unwrap_or_else(|e| e.into_inner());
        *self.holder.lock().unwrap_or_else(|e| e.into_inner()) = Some(current);
        Ok(EngineGuard {
            registry,
            holder: &self.holder,
        })
    }
}

impl Default for ResolutionEngine {
    fn default() -> Self {
        Self::new(ResolverConfig::default())
    }
}

impl std::fmt::Debug for ResolutionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolutionEngine")
            .field("config", &self.config)
            .field("events", &self.events)
            .finish_non_exhaustive()
    }
}
