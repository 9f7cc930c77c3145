//! Framework events emitted by the resolution engine.
//!
//! Each event type has its own struct with appropriate fields.
//! All events implement the `FrameworkEvent` trait. Events are dispatched
//! after the engine lock is released, so listeners may query the engine.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use crate::module::ModuleRef;
use crate::package::EntryRef;

/// Trait implemented by all framework events.
pub trait FrameworkEvent: Send + Sync + Any {
    /// Returns the event type identifier.
    fn event_type(&self) -> EventType;

    /// The module the event is about.
    fn module(&self) -> &ModuleRef;

    /// Downcast to a concrete event type.
    fn as_any(&self) -> &dyn Any;
}

/// Resolver event types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    Resolved,
    ResolveFailed,
    DynamicImportFailed,
    ZombieMarked,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Resolved => "resolved",
            EventType::ResolveFailed => "resolve-failed",
            EventType::DynamicImportFailed => "dynamic-import-failed",
            EventType::ZombieMarked => "zombie-marked",
        }
    }

    /// Returns all event types.
    pub fn all() -> &'static [EventType] {
        &[
            EventType::Resolved,
            EventType::ResolveFailed,
            EventType::DynamicImportFailed,
            EventType::ZombieMarked,
        ]
    }
}

/// Fired after a resolve transaction commits.
#[derive(Debug, Clone)]
pub struct ResolvedEvent {
    pub module: ModuleRef,
    /// Installed modules resolved along with `module`
    pub co_resolved: Vec<ModuleRef>,
    /// Providers committed by the transaction
    pub providers: Vec<(String, EntryRef)>,
}

impl FrameworkEvent for ResolvedEvent {
    fn event_type(&self) -> EventType {
        EventType::Resolved
    }

    fn module(&self) -> &ModuleRef {
        &self.module
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Fired when a resolve attempt is discarded.
#[derive(Debug, Clone)]
pub struct ResolveFailedEvent {
    pub module: ModuleRef,
    pub unresolved: Vec<EntryRef>,
}

impl FrameworkEvent for ResolveFailedEvent {
    fn event_type(&self) -> EventType {
        EventType::ResolveFailed
    }

    fn module(&self) -> &ModuleRef {
        &self.module
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Fired when a late-bound import finds no provider.
#[derive(Debug, Clone)]
pub struct DynamicImportFailedEvent {
    pub module: ModuleRef,
    pub package: String,
    /// Exporter modules that were looked at but could not serve the import
    pub considered: Vec<ModuleRef>,
}

impl FrameworkEvent for DynamicImportFailedEvent {
    fn event_type(&self) -> EventType {
        EventType::DynamicImportFailed
    }

    fn module(&self) -> &ModuleRef {
        &self.module
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Fired when removal of a provider export is refused.
#[derive(Debug, Clone)]
pub struct ZombieMarkedEvent {
    /// Owner of the stale provider
    pub module: ModuleRef,
    pub package: String,
}

impl FrameworkEvent for ZombieMarkedEvent {
    fn event_type(&self) -> EventType {
        EventType::ZombieMarked
    }

    fn module(&self) -> &ModuleRef {
        &self.module
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Trait for event listeners.
pub trait EventListener: Send + Sync {
    /// Handle an event.
    fn handle(&self, event: &dyn FrameworkEvent) -> anyhow::Result<()>;

    /// Listeners with higher priority run first.
    fn priority(&self) -> i32 {
        0
    }
}

/// Dispatches framework events to registered listeners.
#[derive(Default)]
pub struct EventDispatcher {
    listeners: HashMap<EventType, Vec<Arc<dyn EventListener>>>,
}

impl EventDispatcher {
    /// Create a new event dispatcher.
    pub fn new() -> Self {
        Self { listeners: HashMap::new() }
    }

    /// Add a listener for a specific event type.
    pub fn add_listener(&mut self, event_type: EventType, listener: Arc<dyn EventListener>) {
        self.listeners.entry(event_type).or_default().push(listener);
    }

    /// Add a listener for every event type.
    pub fn add_global_listener(&mut self, listener: Arc<dyn EventListener>) {
        for event_type in EventType::all() {
            self.add_listener(*event_type, listener.clone());
        }
    }

    pub fn has_listeners(&self, event_type: EventType) -> bool {
        self.listeners.get(&event_type).is_some_and(|l| !l.is_empty())
    }

    /// Dispatch an event to all registered listeners.
    ///
    /// Listener failures are logged and never propagate. Returns the number
    /// of listeners that handled the event successfully.
    pub fn dispatch(&self, event: &dyn FrameworkEvent) -> usize {
        let Some(listeners) = self.listeners.get(&event.event_type()) else {
            return 0;
        };

        let mut sorted_listeners: Vec<_> = listeners.iter().collect();
        sorted_listeners.sort_by(|a, b| b.priority().cmp(&a.priority()));

        let mut handled = 0;
        for listener in sorted_listeners {
            match listener.handle(event) {
                Ok(()) => handled += 1,
                Err(e) => log::error!(
                    "Listener for {} event on {} failed: {}",
                    event.event_type().as_str(),
                    event.module(),
                    e
                ),
            }
        }
        handled
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counts: HashMap<&str, usize> = self
            .listeners
            .iter()
            .map(|(k, v)| (k.as_str(), v.len()))
            .collect();
        f.debug_struct("EventDispatcher").field("listeners", &counts).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::module::BasicModule;

    struct Recorder {
        priority: i32,
        seen: Arc<Mutex<Vec<i32>>>,
    }

    impl EventListener for Recorder {
        fn handle(&self, _: &dyn FrameworkEvent) -> anyhow::Result<()> {
            self.seen.lock().unwrap().push(self.priority);
            Ok(())
        }

        fn priority(&self) -> i32 {
            self.priority
        }
    }

    struct Failing;

    impl EventListener for Failing {
        fn handle(&self, _: &dyn FrameworkEvent) -> anyhow::Result<()> {
            anyhow::bail!("listener exploded")
        }
    }

    fn zombie_event() -> ZombieMarkedEvent {
        ZombieMarkedEvent {
            module: ModuleRef::new(BasicModule::new(1, "a")),
            package: "p".to_string(),
        }
    }

    #[test]
    fn test_event_dispatcher_new() {
        let dispatcher = EventDispatcher::new();
        assert!(dispatcher.listeners.is_empty());
        assert_eq!(dispatcher.dispatch(&zombie_event()), 0);
    }

    #[test]
    fn test_dispatch_orders_by_priority() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut dispatcher = EventDispatcher::new();
        for priority in [1, 10, 5] {
            dispatcher.add_listener(
                EventType::ZombieMarked,
                Arc::new(Recorder { priority, seen: seen.clone() }),
            );
        }

        assert_eq!(dispatcher.dispatch(&zombie_event()), 3);
        assert_eq!(*seen.lock().unwrap(), vec![10, 5, 1]);
    }

    #[test]
    fn test_failing_listener_does_not_stop_others() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut dispatcher = EventDispatcher::new();
        dispatcher.add_global_listener(Arc::new(Failing));
        dispatcher.add_global_listener(Arc::new(Recorder { priority: -1, seen: seen.clone() }));

        assert!(dispatcher.has_listeners(EventType::Resolved));
        assert_eq!(dispatcher.dispatch(&zombie_event()), 1);
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_downcast() {
        let event = zombie_event();
        let as_dyn: &dyn FrameworkEvent = &event;
        let concrete = as_dyn.as_any().downcast_ref::<ZombieMarkedEvent>().unwrap();
        assert_eq!(concrete.package, "p");
    }
}
