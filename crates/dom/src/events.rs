//! Event listeners and dispatch
//!
//! Design: callbacks are plain `Rc<dyn Fn(&Event)>`. Identity is the
//! pointer, so the same `Rc` that was registered is the one that removes.

use ahash::AHashMap;
use std::cell::Cell;
use std::rc::Rc;

use crate::types::NodeId;

/// Event listener callback
pub type Listener = Rc<dyn Fn(&Event)>;

/// A dispatched event
#[derive(Debug)]
pub struct Event {
    pub event_type: String,
    pub target: NodeId,
    pub bubbles: bool,
    current_target: Cell<NodeId>,
    propagation_stopped: Cell<bool>,
    default_prevented: Cell<bool>,
}

impl Event {
    pub fn new(event_type: impl Into<String>, target: NodeId, bubbles: bool) -> Self {
        Self {
            event_type: event_type.into(),
            target,
            bubbles,
            current_target: Cell::new(target),
            propagation_stopped: Cell::new(false),
            default_prevented: Cell::new(false),
        }
    }

    /// Node whose listener is currently running
    pub fn current_target(&self) -> NodeId {
        self.current_target.get()
    }

    pub(crate) fn set_current_target(&self, node_id: NodeId) {
        self.current_target.set(node_id);
    }

    pub fn stop_propagation(&self) {
        self.propagation_stopped.set(true);
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped.get()
    }

    pub fn prevent_default(&self) {
        self.default_prevented.set(true);
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented.get()
    }
}

/// Per-node listener lists keyed by event type
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: AHashMap<NodeId, Vec<(String, Listener)>>,
}

fn same_listener(a: &Listener, b: &Listener) -> bool {
    std::ptr::eq(Rc::as_ptr(a) as *const (), Rc::as_ptr(b) as *const ())
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener; registering the same one twice is a no-op
    pub fn add(&mut self, node_id: NodeId, event_type: &str, listener: Listener) {
        let entries = self.listeners.entry(node_id).or_default();
        if entries
            .iter()
            .any(|(t, l)| t == event_type && same_listener(l, &listener))
        {
            return;
        }
        entries.push((event_type.to_string(), listener));
    }

    /// Remove a listener. Returns whether it was registered.
    pub fn remove(&mut self, node_id: NodeId, event_type: &str, listener: &Listener) -> bool {
        let Some(entries) = self.listeners.get_mut(&node_id) else {
            return false;
        };
        let before = entries.len();
        entries.retain(|(t, l)| !(t == event_type && same_listener(l, listener)));
        let removed = entries.len() != before;
        if entries.is_empty() {
            self.listeners.remove(&node_id);
        }
        removed
    }

    /// Snapshot of the listeners for one node and type, in registration order
    pub fn listeners_for(&self, node_id: NodeId, event_type: &str) -> Vec<Listener> {
        self.listeners
            .get(&node_id)
            .map(|entries| {
                entries
                    .iter()
                    .filter(|(t, _)| t == event_type)
                    .map(|(_, l)| Rc::clone(l))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of listeners registered on a node (all types)
    pub fn count(&self, node_id: NodeId) -> usize {
        self.listeners.get(&node_id).map(Vec::len).unwrap_or(0)
    }
}

impl std::fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("nodes", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_add_remove_by_identity() {
        let hits = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&hits);
        let listener: Listener = Rc::new(move |_: &Event| *counter.borrow_mut() += 1);
        let other: Listener = Rc::new(|_: &Event| {});

        let mut registry = ListenerRegistry::new();
        registry.add(1, "click", Rc::clone(&listener));
        registry.add(1, "click", Rc::clone(&listener));
        registry.add(1, "click", Rc::clone(&other));
        assert_eq!(registry.count(1), 2);

        let event = Event::new("click", 1, true);
        for l in registry.listeners_for(1, "click") {
            l(&event);
        }
        assert_eq!(*hits.borrow(), 1);

        assert!(!registry.remove(1, "input", &listener));
        assert!(registry.remove(1, "click", &listener));
        assert_eq!(registry.listeners_for(1, "click").len(), 1);
    }

    #[test]
    fn test_event_flags() {
        let event = Event::new("submit", 4, true);
        assert!(!event.is_default_prevented());
        event.prevent_default();
        event.stop_propagation();
        assert!(event.is_default_prevented());
        assert!(event.is_propagation_stopped());
        assert_eq!(event.current_target(), 4);
    }
}
