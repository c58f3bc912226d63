//! Events - Event types and handler registry
//!
//! Handlers are registered either on an element (`Click`, `Submit`) or on the
//! window (`Scroll`). Element events bubble from the target up to `body`.
//!
//! Registration returns a [`ListenerId`]; removing it is how behaviors detach.
//! Dispatch takes a snapshot of matching handlers before calling any of them,
//! so handlers may add or remove listeners (including themselves) freely.

use std::collections::HashMap;
use std::rc::Rc;

use crate::types::ElementId;

use super::Page;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Viewport scroll offset changed (window-level).
    Scroll,
    Click,
    Submit,
}

/// An event travelling through dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub kind: EventKind,
    /// Element the event was fired at; `None` for window events.
    pub target: Option<ElementId>,
    /// Element whose handler is currently running.
    pub current_target: Option<ElementId>,
    default_prevented: bool,
}

impl Event {
    pub fn new(kind: EventKind, target: Option<ElementId>) -> Self {
        Self {
            kind,
            target,
            current_target: target,
            default_prevented: false,
        }
    }

    /// Suppress the host's default action (link jump, form submission).
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// Event handler. Receives the page it is attached to.
pub type EventHandler = Rc<dyn Fn(&Page, &mut Event)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

// =============================================================================
// HANDLER REGISTRY
// =============================================================================

#[derive(Default)]
pub(crate) struct ListenerRegistry {
    window: Vec<(u64, EventKind, EventHandler)>,
    element: HashMap<(ElementId, EventKind), Vec<(u64, EventHandler)>>,
    /// Reverse index so removal doesn't scan every list.
    owners: HashMap<u64, Option<(ElementId, EventKind)>>,
    next_id: u64,
}

impl ListenerRegistry {
    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub(crate) fn add(&mut self, el: ElementId, kind: EventKind, handler: EventHandler) -> ListenerId {
        let id = self.next_id();
        self.element.entry((el, kind)).or_default().push((id, handler));
        self.owners.insert(id, Some((el, kind)));
        ListenerId(id)
    }

    pub(crate) fn add_window(&mut self, kind: EventKind, handler: EventHandler) -> ListenerId {
        let id = self.next_id();
        self.window.push((id, kind, handler));
        self.owners.insert(id, None);
        ListenerId(id)
    }

    /// Returns `false` if the listener was already gone.
    pub(crate) fn remove(&mut self, id: ListenerId) -> bool {
        match self.owners.remove(&id.0) {
            Some(Some(key)) => {
                if let Some(list) = self.element.get_mut(&key) {
                    list.retain(|(l, _)| *l != id.0);
                    if list.is_empty() {
                        self.element.remove(&key);
                    }
                }
                true
            }
            Some(None) => {
                self.window.retain(|(l, _, _)| *l != id.0);
                true
            }
            None => false,
        }
    }

    pub(crate) fn window_handlers(&self, kind: EventKind) -> Vec<EventHandler> {
        self.window
            .iter()
            .filter(|(_, k, _)| *k == kind)
            .map(|(_, _, h)| h.clone())
            .collect()
    }

    pub(crate) fn element_handlers(&self, el: ElementId, kind: EventKind) -> Vec<EventHandler> {
        self.element
            .get(&(el, kind))
            .map(|list| list.iter().map(|(_, h)| h.clone()).collect())
            .unwrap_or_default()
    }

    pub(crate) fn len(&self) -> usize {
        self.owners.len()
    }
}
