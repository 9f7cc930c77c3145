//! Package wiring for a dynamic module runtime.
//!
//! Modules export and import versioned packages. The [`ResolutionEngine`]
//! decides, for every imported package, which exporter provides it, keeping
//! at most one provider per package name. Resolution is all-or-nothing:
//! either every mandatory import of a module (and of any installed module
//! pulled in along the way) is wired, or nothing changes.
//!
//! ```rust
//! use modrt_resolver::{BasicModule, ModuleRef, ModuleState, PackageEntry, ResolutionEngine};
//!
//! let engine = ResolutionEngine::default();
//! let a = ModuleRef::new(BasicModule::new(1, "a").with_state(ModuleState::Resolved));
//! let b = ModuleRef::new(BasicModule::new(2, "b"));
//!
//! let p = PackageEntry::parse_export(&a, "p", "1.0").unwrap().shared();
//! let need = PackageEntry::parse_import(&b, "p", "[1.0,2.0)").unwrap().shared();
//! engine.register(&[p], &[]).unwrap();
//! engine.register(&[], &[need.clone()]).unwrap();
//!
//! let resolution = engine.resolve(&b, &[need]).unwrap();
//! assert_eq!(resolution.committed.len(), 1);
//! assert_eq!(engine.importers_of("p").unwrap(), vec![b]);
//! ```

pub mod config;
pub mod error;
pub mod event;
pub mod module;
pub mod package;
pub mod registry;
pub mod solver;
pub mod zombie;

pub use config::ResolverConfig;
pub use error::{ResolverError, Result};
pub use event::{EventDispatcher, EventListener, EventType, FrameworkEvent};
pub use module::{BasicModule, Module, ModuleKey, ModuleRef, ModuleState};
pub use package::{Direction, EntryRef, ImportKind, PackageEntry, PackageRecord};
pub use registry::PackageRegistry;
pub use solver::{ProviderPolicy, Resolution, ResolutionEngine};

pub use modrt_semver::{Version, VersionRange};
