use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::error::{NavError, Result};
use crate::screen::Screen;

pub type ScreenId = String;

/// Constructor used for deferred registrations. Called once per activation.
pub type ScreenFactory = Arc<dyn Fn(&ScreenArgs) -> Result<Box<dyn Screen>> + Send + Sync>;

/// Positional and named construction arguments stored with a deferred entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScreenArgs {
    pub positional: Vec<Value>,
    pub named: Map<String, Value>,
}

impl ScreenArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    pub fn named(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.named.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.named.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn nth(&self, index: usize) -> Option<&Value> {
        self.positional.get(index)
    }
}

/// Registration flavour of an identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// One instance, reused on every visit with its state intact.
    Live,
    /// Rebuilt from its constructor on every visit.
    Deferred,
}

enum RegistryEntry {
    /// `None` while the running navigator has the instance checked out.
    Live(Option<Box<dyn Screen>>),
    Deferred {
        factory: ScreenFactory,
        args: ScreenArgs,
    },
}

impl RegistryEntry {
    fn kind(&self) -> EntryKind {
        match self {
            RegistryEntry::Live(_) => EntryKind::Live,
            RegistryEntry::Deferred { .. } => EntryKind::Deferred,
        }
    }
}

/// A screen resolved for one activation.
///
/// Live screens must go back through [`ScreenRegistry::restore`]; deferred
/// ones are simply dropped when the activation ends.
pub struct ResolvedScreen {
    id: ScreenId,
    kind: EntryKind,
    screen: Box<dyn Screen>,
}

impl ResolvedScreen {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn is_fresh(&self) -> bool {
        self.kind == EntryKind::Deferred
    }

    pub fn screen_mut(&mut self) -> &mut dyn Screen {
        self.screen.as_mut()
    }
}

impl fmt::Debug for ResolvedScreen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedScreen")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .finish()
    }
}

/// Identifier-to-screen binding table. One entry per identifier; registering
/// an identifier again replaces its entry.
#[derive(Default)]
pub struct ScreenRegistry {
    entries: HashMap<ScreenId, RegistryEntry>,
}

impl ScreenRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `id` to a persistent instance. Returns the live instance it replaced, if any.
    pub fn register(
        &mut self,
        id: impl Into<ScreenId>,
        screen: Box<dyn Screen>,
    ) -> Option<Box<dyn Screen>> {
        let previous = self.entries.insert(id.into(), RegistryEntry::Live(Some(screen)));
        Self::live_instance(previous)
    }

    /// Bind `id` to a constructor run afresh on each activation.
    pub fn register_deferred(
        &mut self,
        id: impl Into<ScreenId>,
        factory: ScreenFactory,
        args: ScreenArgs,
    ) -> Option<Box<dyn Screen>> {
        let previous = self
            .entries
            .insert(id.into(), RegistryEntry::Deferred { factory, args });
        Self::live_instance(previous)
    }

    /// Produce the screen to activate for `id`.
    ///
    /// Live entries hand out their stored instance until [`restore`](Self::restore);
    /// deferred entries build a new one. Constructor failures are wrapped in
    /// [`NavError::Construction`].
    pub fn resolve(&mut self, id: &str) -> Result<ResolvedScreen> {
        let entry = self
            .entries
            .get_mut(id)
            .ok_or_else(|| NavError::UnknownScreen(id.to_string()))?;

        let kind = entry.kind();
        let screen = match entry {
            RegistryEntry::Live(slot) => slot
                .take()
                .ok_or_else(|| NavError::ScreenInUse(id.to_string()))?,
            RegistryEntry::Deferred { factory, args } => {
                (**factory)(&*args).map_err(|source| NavError::Construction {
                    id: id.to_string(),
                    source: Box::new(source),
                })?
            }
        };

        Ok(ResolvedScreen {
            id: id.to_string(),
            kind,
            screen,
        })
    }

    /// Return a live screen after its activation.
    ///
    /// If the binding was removed or replaced while the screen was out, the
    /// instance is handed back to the caller instead of being stored.
    pub fn restore(&mut self, resolved: ResolvedScreen) -> Option<Box<dyn Screen>> {
        if resolved.kind == EntryKind::Deferred {
            return None;
        }
        match self.entries.get_mut(&resolved.id) {
            Some(RegistryEntry::Live(slot)) if slot.is_none() => {
                *slot = Some(resolved.screen);
                None
            }
            _ => Some(resolved.screen),
        }
    }

    /// Remove the binding for `id`, returning the live instance if one was stored.
    pub fn remove(&mut self, id: &str) -> Result<Option<Box<dyn Screen>>> {
        let entry = self
            .entries
            .remove(id)
            .ok_or_else(|| NavError::UnknownScreen(id.to_string()))?;
        Ok(Self::live_instance(Some(entry)))
    }

    /// Borrow a stored live instance.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut dyn Screen> {
        match self.entries.get_mut(id) {
            Some(RegistryEntry::Live(Some(screen))) => Some(screen.as_mut()),
            _ => None,
        }
    }

    pub fn kind(&self, id: &str) -> Option<EntryKind> {
        self.entries.get(id).map(RegistryEntry::kind)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn ids(&self) -> Vec<ScreenId> {
        let mut ids: Vec<_> = self.entries.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn live_instance(entry: Option<RegistryEntry>) -> Option<Box<dyn Screen>> {
        match entry {
            Some(RegistryEntry::Live(screen)) => screen,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::ScreenEvent;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counter {
        visits: usize,
        editing: bool,
    }

    impl Counter {
        fn boxed() -> Box<dyn Screen> {
            Box::new(Counter {
                visits: 0,
                editing: false,
            })
        }
    }

    impl Screen for Counter {
        fn before_edit(&mut self) -> Result<()> {
            self.visits += 1;
            Ok(())
        }

        fn handle_event(&mut self, _event: &ScreenEvent) -> Result<()> {
            Ok(())
        }

        fn is_editing(&self) -> bool {
            self.editing
        }

        fn set_editing(&mut self, editing: bool) {
            self.editing = editing;
        }
    }

    #[test]
    fn unknown_id_fails() {
        let mut registry = ScreenRegistry::new();
        let err = registry.resolve("MISSING").unwrap_err();
        assert!(err.is_unknown_screen());
    }

    #[test]
    fn live_entry_is_checked_out_and_restored() {
        let mut registry = ScreenRegistry::new();
        registry.register("MAIN", Counter::boxed());

        let mut resolved = registry.resolve("MAIN").expect("resolve");
        assert_eq!(resolved.kind(), EntryKind::Live);
        resolved.screen_mut().before_edit().expect("hook");

        let err = registry.resolve("MAIN").unwrap_err();
        assert!(matches!(err, NavError::ScreenInUse(_)));
        assert!(registry.get_mut("MAIN").is_none());

        assert!(registry.restore(resolved).is_none());
        assert!(registry.get_mut("MAIN").is_some());
        assert!(registry.resolve("MAIN").is_ok());
    }

    #[test]
    fn deferred_entry_builds_each_time() {
        let builds = Arc::new(AtomicUsize::new(0));
        let counter = builds.clone();
        let factory: ScreenFactory = Arc::new(move |args: &ScreenArgs| {
            assert_eq!(args.get_str("name"), Some("Screen 3"));
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Counter::boxed())
        });

        let mut registry = ScreenRegistry::new();
        registry.register_deferred("THIRD", factory, ScreenArgs::new().named("name", "Screen 3"));
        let first = registry.resolve("THIRD").expect("first");
        let second = registry.resolve("THIRD").expect("second");
        assert!(first.is_fresh() && second.is_fresh());
        assert_eq!(builds.load(Ordering::SeqCst), 2);
        assert!(registry.restore(first).is_none());
    }

    #[test]
    fn failing_constructor_is_wrapped() {
        let factory: ScreenFactory =
            Arc::new(|_args: &ScreenArgs| Err(NavError::screen("no database")));
        let mut registry = ScreenRegistry::new();
        registry.register_deferred("BROKEN", factory, ScreenArgs::new());
        let err = registry.resolve("BROKEN").unwrap_err();
        assert!(matches!(err, NavError::Construction { ref id, .. } if id == "BROKEN"));
    }

    #[test]
    fn reregistering_replaces_entry() {
        let mut registry = ScreenRegistry::new();
        assert!(registry.register("MAIN", Counter::boxed()).is_none());
        assert!(registry.register("MAIN", Counter::boxed()).is_some());
        assert_eq!(registry.len(), 1);

        let factory: ScreenFactory = Arc::new(|_args: &ScreenArgs| Ok(Counter::boxed()));
        registry.register_deferred("MAIN", factory, ScreenArgs::new());
        assert_eq!(registry.kind("MAIN"), Some(EntryKind::Deferred));
    }

    #[test]
    fn removal_releases_binding() {
        let mut registry = ScreenRegistry::new();
        registry.register("MAIN", Counter::boxed());
        let removed = registry.remove("MAIN").expect("remove");
        assert!(removed.is_some());
        assert!(registry.resolve("MAIN").unwrap_err().is_unknown_screen());
        assert!(matches!(
            registry.remove("MAIN"),
            Err(NavError::UnknownScreen(_))
        ));
    }

    #[test]
    fn restore_after_removal_hands_instance_back() {
        let mut registry = ScreenRegistry::new();
        registry.register("MAIN", Counter::boxed());
        let resolved = registry.resolve("MAIN").expect("resolve");
        registry.remove("MAIN").expect("remove");
        assert!(registry.restore(resolved).is_some());
        assert!(!registry.contains("MAIN"));
    }
}
