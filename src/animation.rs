//! Animation state shared by UI components.
//!
//! Components that want scroll-triggered animations register their element
//! on mount and unregister on unmount; whatever drives viewport
//! intersection subscribes to the registry and observes the current set.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::store::{Store, SubscriptionId};

static NEXT_ELEMENT: AtomicU64 = AtomicU64::new(1);

/// Opaque handle to a visual element.
///
/// Every call to [`ElementHandle::new`] mints a distinct identity; clones
/// refer to the same element.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementHandle(u64);

impl ElementHandle {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self(NEXT_ELEMENT.fetch_add(1, Ordering::Relaxed))
    }
}

/// The set of elements observed for scroll animations.
#[derive(Debug, Default)]
pub struct ScrollRegistry {
    elements: Store<HashSet<ElementHandle>>,
}

impl ScrollRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `element`. Returns `false`, without notifying, if it was
    /// already registered.
    pub fn register(&mut self, element: &ElementHandle) -> bool {
        if self.elements.get().contains(element) {
            return false;
        }
        self.elements.update(|set| {
            set.insert(element.clone());
        });
        true
    }

    /// Removes `element`. Returns `false`, without notifying, if it was
    /// not registered.
    pub fn unregister(&mut self, element: &ElementHandle) -> bool {
        if !self.elements.get().contains(element) {
            return false;
        }
        self.elements.update(|set| {
            set.remove(element);
        });
        true
    }

    pub fn contains(&self, element: &ElementHandle) -> bool {
        self.elements.get().contains(element)
    }

    pub fn len(&self) -> usize {
        self.elements.get().len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.get().is_empty()
    }

    /// Observes the set; `f` runs immediately with the current contents.
    pub fn subscribe(&mut self, f: impl FnMut(&HashSet<ElementHandle>) + 'static) -> SubscriptionId {
        self.elements.subscribe(f)
    }
}

/// Per-tab animation state.
#[derive(Debug, Default)]
pub struct AnimationState {
    /// True while a page transition is running.
    pub page_transition: Store<bool>,
    pub scroll: ScrollRegistry,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_register_twice_keeps_one() {
        let mut registry = ScrollRegistry::new();
        let el = ElementHandle::new();
        assert!(registry.register(&el));
        assert!(!registry.register(&el.clone()));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unregister_missing_is_noop() {
        let mut registry = ScrollRegistry::new();
        let kept = ElementHandle::new();
        registry.register(&kept);

        assert!(!registry.unregister(&ElementHandle::new()));
        assert_eq!(registry.len(), 1);
        assert!(registry.contains(&kept));
    }

    #[test]
    fn test_register_then_unregister_restores_set() {
        let mut registry = ScrollRegistry::new();
        let existing = ElementHandle::new();
        registry.register(&existing);

        let el = ElementHandle::new();
        registry.register(&el);
        registry.unregister(&el);

        assert_eq!(registry.len(), 1);
        assert!(registry.contains(&existing));
        assert!(!registry.contains(&el));
    }

    #[test]
    fn test_distinct_handles_are_distinct_members() {
        let mut registry = ScrollRegistry::new();
        registry.register(&ElementHandle::new());
        registry.register(&ElementHandle::new());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_subscribers_only_see_changes() {
        let mut registry = ScrollRegistry::new();
        let sizes = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&sizes);
        registry.subscribe(move |set| sink.borrow_mut().push(set.len()));

        let el = ElementHandle::new();
        registry.register(&el);
        registry.register(&el);
        registry.unregister(&el);
        registry.unregister(&el);

        assert_eq!(*sizes.borrow(), vec![0, 1, 0]);
    }

    #[test]
    fn test_page_transition_flag() {
        let mut state = AnimationState::default();
        assert!(!*state.page_transition.get());
        state.page_transition.set(true);
        assert!(*state.page_transition.get());
        assert!(state.scroll.is_empty());
    }
}
