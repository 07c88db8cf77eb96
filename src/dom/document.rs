//! The document: a node arena plus event listeners and mutation observers.

use std::collections::BTreeMap;

use super::node::{Node, NodeId, NodeKind};
use super::observer::{MutationKind, MutationRecord, ObserveOptions, ObserverId, ObserverState};
use crate::event::{Action, EventType, ListenerRegistry};

/// An in-memory document tree.
///
/// Node ids are arena indices and stay valid for the document's lifetime;
/// detaching a subtree keeps its nodes allocated so they can be re-appended
/// (popover containers cycle in and out of the tree this way). Ids from one
/// document are meaningless in another.
#[derive(Debug)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
    listeners: ListenerRegistry,
    observers: Vec<ObserverState>,
}

impl Document {
    /// Create an empty document with a `body` root element.
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            root: NodeId(0),
            listeners: ListenerRegistry::default(),
            observers: Vec::new(),
        };
        doc.root = doc.alloc(Node::element("body"));
        doc
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Create a detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.alloc(Node::element(tag))
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.alloc(Node::text(text))
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.nodes[id.0].is_element()
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.nodes[id.0].tag()
    }

    /// Text of a text node; `None` for elements.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.0].kind {
            NodeKind::Text(t) => Some(t),
            NodeKind::Element { .. } => None,
        }
    }

    /// Replace the text of a text node. No-op on elements.
    pub fn set_text(&mut self, id: NodeId, text: &str) {
        if let NodeKind::Text(t) = &mut self.nodes[id.0].kind {
            *t = text.to_string();
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Append `child` under `parent`, detaching it from any current parent
    /// first. Appends that would make a node its own ancestor are refused.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if parent == child || self.contains(child, parent) {
            tracing::warn!("Refusing to append {} under {}: would create a cycle", child, parent);
            return;
        }
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
        self.queue_child_list(parent, vec![child], Vec::new());
    }

    /// Unlink `child` from its parent, leaving the subtree intact. No-op for
    /// the root and for already-detached nodes.
    pub fn detach(&mut self, child: NodeId) {
        let Some(parent) = self.nodes[child.0].parent else {
            return;
        };
        self.nodes[child.0].parent = None;
        self.nodes[parent.0].children.retain(|c| *c != child);
        self.queue_child_list(parent, Vec::new(), vec![child]);
    }

    /// True when `node` is `ancestor` itself or sits inside its subtree.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cur = Some(node);
        while let Some(id) = cur {
            if id == ancestor {
                return true;
            }
            cur = self.nodes[id.0].parent;
        }
        false
    }

    /// True when the node is reachable from the document root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        self.contains(self.root, id)
    }

    /// Subtree of `id` in document order, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.nodes[id.0].children.iter().rev().copied().collect();
        while let Some(cur) = stack.pop() {
            out.push(cur);
            stack.extend(self.nodes[cur.0].children.iter().rev().copied());
        }
        out
    }

    /// Descendant elements of `root` carrying the given attribute, in
    /// document order. The equivalent of `querySelectorAll("[name]")`.
    pub fn descendants_with_attribute(&self, root: NodeId, name: &str) -> Vec<NodeId> {
        self.descendants(root)
            .into_iter()
            .filter(|id| self.has_attribute(*id, name))
            .collect()
    }

    /// First attached element whose `id` attribute equals `dom_id`.
    pub fn element_by_id(&self, dom_id: &str) -> Option<NodeId> {
        (0..self.nodes.len()).map(NodeId).find(|id| {
            self.attribute(*id, "id") == Some(dom_id) && self.is_attached(*id)
        })
    }

    /// Concatenated text of the subtree, in document order.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        if let Some(t) = self.text(id) {
            out.push_str(t);
        }
        for child in self.descendants(id) {
            if let Some(t) = self.text(child) {
                out.push_str(t);
            }
        }
        out
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.nodes[id.0].attrs()?.get(name).map(String::as_str)
    }

    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.attribute(id, name).is_some()
    }

    pub fn attrs(&self, id: NodeId) -> Option<&BTreeMap<String, String>> {
        self.nodes[id.0].attrs()
    }

    /// Write an attribute and queue a mutation record. Records fire on every
    /// write, including same-value rewrites. No-op on text nodes.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) {
        let NodeKind::Element { attrs, .. } = &mut self.nodes[id.0].kind else {
            return;
        };
        attrs.insert(name.to_string(), value.to_string());
        self.queue_attribute(id, name);
    }

    /// Remove an attribute, queuing a record when it was present.
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) {
        let NodeKind::Element { attrs, .. } = &mut self.nodes[id.0].kind else {
            return;
        };
        if attrs.remove(name).is_some() {
            self.queue_attribute(id, name);
        }
    }

    // ---- mutation observers ----------------------------------------------

    /// Register and connect an observer.
    pub fn register_observer(&mut self, options: ObserveOptions) -> ObserverId {
        self.observers.push(ObserverState {
            options,
            connected: true,
            queue: Vec::new(),
        });
        ObserverId(self.observers.len() - 1)
    }

    /// Reconnect a disconnected observer with its original options.
    pub fn observe(&mut self, id: ObserverId) {
        self.observers[id.0].connected = true;
    }

    /// Stop queuing records for this observer and discard anything still
    /// queued. Drain with [`Self::take_records`] first to avoid losing
    /// records across a disconnect/reconnect cycle.
    pub fn disconnect(&mut self, id: ObserverId) {
        let state = &mut self.observers[id.0];
        state.connected = false;
        state.queue.clear();
    }

    /// Drain the observer's queued records.
    pub fn take_records(&mut self, id: ObserverId) -> Vec<MutationRecord> {
        std::mem::take(&mut self.observers[id.0].queue)
    }

    pub fn has_pending_records(&self, id: ObserverId) -> bool {
        !self.observers[id.0].queue.is_empty()
    }

    /// Observers that currently have undelivered records.
    pub fn pending_observers(&self) -> Vec<ObserverId> {
        self.observers
            .iter()
            .enumerate()
            .filter(|(_, s)| !s.queue.is_empty())
            .map(|(i, _)| ObserverId(i))
            .collect()
    }

    fn queue_child_list(&mut self, target: NodeId, added: Vec<NodeId>, removed: Vec<NodeId>) {
        if self.observers.is_empty() || !self.is_attached(target) {
            return;
        }
        let in_scope = target == self.root;
        for state in &mut self.observers {
            if !state.connected || !state.options.child_list {
                continue;
            }
            if !state.options.subtree && !in_scope {
                continue;
            }
            state.queue.push(MutationRecord {
                target,
                kind: MutationKind::ChildList {
                    added: added.clone(),
                    removed: removed.clone(),
                },
            });
        }
    }

    fn queue_attribute(&mut self, target: NodeId, name: &str) {
        if self.observers.is_empty() || !self.is_attached(target) {
            return;
        }
        let in_scope = target == self.root;
        for state in &mut self.observers {
            if !state.connected || !state.options.wants_attribute(name) {
                continue;
            }
            if !state.options.subtree && !in_scope {
                continue;
            }
            state.queue.push(MutationRecord {
                target,
                kind: MutationKind::Attributes {
                    name: name.to_string(),
                },
            });
        }
    }

    // ---- event listeners --------------------------------------------------

    /// Register a listener. Re-registering an identical
    /// (event, action, capture) triple is a no-op, mirroring
    /// `addEventListener` identity semantics - repeated lazy arming of the
    /// same element relies on this.
    pub fn add_listener(
        &mut self,
        node: NodeId,
        event: EventType,
        action: Action,
        capture: bool,
        once: bool,
    ) {
        self.listeners.add(node, event, action, capture, once);
    }

    /// Remove a listener by identity. Returns whether one was removed.
    pub fn remove_listener(
        &mut self,
        node: NodeId,
        event: EventType,
        action: &Action,
        capture: bool,
    ) -> bool {
        self.listeners.remove(node, event, action, capture)
    }

    #[cfg(test)]
    pub(crate) fn listener_count(&self, node: NodeId) -> usize {
        self.listeners.count(node)
    }

    /// Dispatch an event at `target` and collect the actions fired, in
    /// firing order: capture phase root-to-target (capture listeners at the
    /// target fire before its bubble listeners), then bubbling back up for
    /// events that bubble. `once` listeners are removed as they fire.
    ///
    /// Actions are returned rather than executed so the caller can run them
    /// against engine state without re-entering the document mid-dispatch.
    pub fn dispatch(&mut self, target: NodeId, event: EventType) -> Vec<(NodeId, Action)> {
        let mut path = Vec::new();
        let mut cur = Some(target);
        while let Some(id) = cur {
            path.push(id);
            cur = self.nodes[id.0].parent;
        }
        path.reverse(); // root first, target last

        let mut fired = Vec::new();
        let (ancestors, target_only) = path.split_at(path.len() - 1);
        for &node in ancestors {
            self.fire_phase(node, event, true, &mut fired);
        }
        let target = target_only[0];
        self.fire_phase(target, event, true, &mut fired);
        self.fire_phase(target, event, false, &mut fired);
        if event.bubbles() {
            for &node in ancestors.iter().rev() {
                self.fire_phase(node, event, false, &mut fired);
            }
        }
        fired
    }

    fn fire_phase(
        &mut self,
        node: NodeId,
        event: EventType,
        capture: bool,
        fired: &mut Vec<(NodeId, Action)>,
    ) {
        for listener in self.listeners.matching(node, event, capture) {
            if listener.once {
                self.listeners.remove(node, event, &listener.action, capture);
            }
            fired.push((node, listener.action));
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
