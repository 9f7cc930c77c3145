//! Module handles as seen by the resolver.
//!
//! The lifecycle subsystem owns modules; the resolver only needs their
//! identity, start level and current state. State is read live on every
//! access and never cached across a resolution.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

/// Lifecycle state of a module generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ModuleState {
    Installed = 0,
    Resolved = 1,
    Starting = 2,
    Active = 3,
    Stopping = 4,
    Uninstalled = 5,
}

impl ModuleState {
    /// Whether code in a module in this state may serve or use packages.
    pub fn allows_package_access(&self) -> bool {
        matches!(
            self,
            ModuleState::Resolved | ModuleState::Starting | ModuleState::Active | ModuleState::Stopping
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ModuleState::Installed => "installed",
            ModuleState::Resolved => "resolved",
            ModuleState::Starting => "starting",
            ModuleState::Active => "active",
            ModuleState::Stopping => "stopping",
            ModuleState::Uninstalled => "uninstalled",
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            0 => ModuleState::Installed,
            1 => ModuleState::Resolved,
            2 => ModuleState::Starting,
            3 => ModuleState::Active,
            4 => ModuleState::Stopping,
            _ => ModuleState::Uninstalled,
        }
    }
}

impl fmt::Display for ModuleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A module generation, implemented by the lifecycle subsystem.
pub trait Module: Send + Sync {
    /// Stable module id, shared by all generations of the module.
    fn id(&self) -> u64;

    /// Generation counter; bumped on every update.
    fn generation(&self) -> u32 {
        0
    }

    fn start_level(&self) -> i32;

    /// Current lifecycle state. May change concurrently with resolution.
    fn state(&self) -> ModuleState;

    /// Symbolic name used in diagnostics.
    fn name(&self) -> &str;
}

/// Identity of a module generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleKey {
    pub id: u64,
    pub generation: u32,
}

impl fmt::Display for ModuleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}.{}", self.id, self.generation)
    }
}

/// Shared handle to a module generation.
///
/// Equality and hashing go by [`ModuleKey`], so two generations of the
/// same module are distinct.
#[derive(Clone)]
pub struct ModuleRef(Arc<dyn Module>);

impl ModuleRef {
    pub fn new(module: impl Module + 'static) -> Self {
        ModuleRef(Arc::new(module))
    }

    pub fn from_arc(module: Arc<dyn Module>) -> Self {
        ModuleRef(module)
    }

    pub fn key(&self) -> ModuleKey {
        ModuleKey {
            id: self.0.id(),
            generation: self.0.generation(),
        }
    }

    /// Sort key used wherever modules must be processed in start order.
    pub fn start_order(&self) -> (i32, u64, u32) {
        (self.0.start_level(), self.0.id(), self.0.generation())
    }
}

impl Deref for ModuleRef {
    type Target = dyn Module;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}

impl PartialEq for ModuleRef {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for ModuleRef {}

impl Hash for ModuleRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Debug for ModuleRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.0.name(), self.key())
    }
}

impl fmt::Display for ModuleRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.0.name(), self.key())
    }
}

/// A plain module whose state is set by whoever drives its lifecycle.
#[derive(Debug)]
pub struct BasicModule {
    id: u64,
    generation: u32,
    start_level: i32,
    name: String,
    state: AtomicU8,
}

impl BasicModule {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        BasicModule {
            id,
            generation: 0,
            start_level: 1,
            name: name.into(),
            state: AtomicU8::new(ModuleState::Installed as u8),
        }
    }

    pub fn with_generation(mut self, generation: u32) -> Self {
        self.generation = generation;
        self
    }

    pub fn with_start_level(mut self, start_level: i32) -> Self {
        self.start_level = start_level;
        self
    }

    pub fn with_state(self, state: ModuleState) -> Self {
        self.set_state(state);
        self
    }

    pub fn set_state(&self, state: ModuleState) {
        self.state.store(state as u8, Ordering::SeqCst);
    }
}

impl Module for BasicModule {
    fn id(&self) -> u64 {
        self.id
    }

    fn generation(&self) -> u32 {
        self.generation
    }

    fn start_level(&self) -> i32 {
        self.start_level
    }

    fn state(&self) -> ModuleState {
        ModuleState::from_u8(self.state.load(Ordering::SeqCst))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_access_states() {
        assert!(!ModuleState::Installed.allows_package_access());
        assert!(ModuleState::Resolved.allows_package_access());
        assert!(ModuleState::Starting.allows_package_access());
        assert!(ModuleState::Active.allows_package_access());
        assert!(ModuleState::Stopping.allows_package_access());
        assert!(!ModuleState::Uninstalled.allows_package_access());
    }

    #[test]
    fn test_generations_are_distinct() {
        let old = ModuleRef::new(BasicModule::new(7, "a"));
        let new = ModuleRef::new(BasicModule::new(7, "a").with_generation(1));
        let same = ModuleRef::new(BasicModule::new(7, "a"));

        assert_ne!(old, new);
        assert_eq!(old, same);
        assert_eq!(new.to_string(), "a#7.1");
    }

    #[test]
    fn test_state_is_live() {
        let module = Arc::new(BasicModule::new(1, "live"));
        let handle = ModuleRef::from_arc(module.clone());

        assert_eq!(handle.state(), ModuleState::Installed);
        module.set_state(ModuleState::Active);
        assert_eq!(handle.state(), ModuleState::Active);
    }
}
