//! Pointer event types and per-node listener registration.
//!
//! Listeners carry [`Action`] values instead of callbacks; dispatch collects
//! the actions that fired and the engine executes them afterwards. This keeps
//! the document borrowable while actions run, and gives listener identity a
//! concrete meaning: two registrations with equal (event, action, capture)
//! are the same listener, so re-registering is a no-op and removal works by
//! value. Lazy arming leans on that, the same way repeated
//! `addEventListener` calls with one function reference collapse.

use std::collections::HashMap;

use crate::dom::NodeId;
use crate::popover::InstanceId;

/// The pointer event vocabulary the engine needs. `MouseOver`/`MouseOut`
/// propagate through ancestors; `MouseEnter`/`MouseLeave` fire only on the
/// nodes actually entered or left. For one pointer move, over fires before
/// enter, which is what lets a listener registered *during* the over pass
/// still catch the enter that follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    MouseOver,
    MouseEnter,
    MouseOut,
    MouseLeave,
    Click,
}

impl EventType {
    pub fn bubbles(self) -> bool {
        matches!(self, Self::MouseOver | Self::MouseOut | Self::Click)
    }
}

/// What a listener does when it fires. Executed by the engine after
/// dispatch, with the firing node as context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// First-hover hook on a marked element: attach its tooltip on demand.
    LazyTooltip,
    /// Pointer entered an instance's anchor or container subtree.
    PointerEnter(InstanceId),
    /// Pointer left an instance's anchor or container subtree.
    PointerLeave(InstanceId),
    /// Click on a menu-role anchor.
    ToggleMenu(InstanceId),
    /// No engine effect. Lets host-page code tag listeners and watch them
    /// fire in order.
    Marker(u32),
}

/// One registered listener.
#[derive(Debug, Clone)]
pub struct Listener {
    pub event: EventType,
    pub action: Action,
    pub capture: bool,
    pub once: bool,
}

/// Per-node listener lists.
#[derive(Debug, Default)]
pub struct ListenerRegistry {
    listeners: HashMap<NodeId, Vec<Listener>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener unless an equal (event, action, capture) one is
    /// already present; the earlier registration's `once` flag wins.
    pub fn add(
        &mut self,
        node: NodeId,
        event: EventType,
        action: Action,
        capture: bool,
        once: bool,
    ) {
        let list = self.listeners.entry(node).or_default();
        if list
            .iter()
            .any(|l| l.event == event && l.capture == capture && l.action == action)
        {
            return;
        }
        list.push(Listener {
            event,
            action,
            capture,
            once,
        });
    }

    /// Remove the listener matching (event, action, capture). Returns whether
    /// one was found.
    pub fn remove(
        &mut self,
        node: NodeId,
        event: EventType,
        action: &Action,
        capture: bool,
    ) -> bool {
        let Some(list) = self.listeners.get_mut(&node) else {
            return false;
        };
        let Some(pos) = list
            .iter()
            .position(|l| l.event == event && l.capture == capture && l.action == *action)
        else {
            return false;
        };
        list.remove(pos);
        true
    }

    /// Snapshot of the listeners on `node` for one phase, in registration
    /// order. Cloned so dispatch can mutate the registry (removing `once`
    /// listeners) while iterating.
    pub fn matching(&self, node: NodeId, event: EventType, capture: bool) -> Vec<Listener> {
        self.listeners
            .get(&node)
            .map(|list| {
                list.iter()
                    .filter(|l| l.event == event && l.capture == capture)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn count(&self, node: NodeId) -> usize {
        self.listeners.get(&node).map_or(0, Vec::len)
    }
}
