//! Page environment: one document, its popover coordinator, the tooltip
//! watcher, and a virtual pointer.
//!
//! [`Page`] is the entry point for driving a markup file: load it, point the
//! pointer at elements by selector, advance virtual time, and read back
//! popover state. Every interaction drains pending mutation records first,
//! so observer work always lands before the next input, the way microtasks
//! settle between real browser events.

use std::path::Path;

use crate::dom::{Document, NodeId};
use crate::dump::{self, PageReport};
use crate::error::{Error, Result};
use crate::event::EventType;
use crate::loader;
use crate::popover::{Content, Coordinator, Hooks, InstanceId, PopoverProps};
use crate::tooltip::TooltipWatcher;

pub struct Page {
    doc: Document,
    popovers: Coordinator,
    watcher: TooltipWatcher,
    hovered: Option<NodeId>,
}

impl std::fmt::Debug for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Page")
            .field("popovers", &self.popovers.len())
            .field("visible", &self.popovers.visible())
            .field("hovered", &self.hovered)
            .field("now_ms", &self.popovers.now())
            .finish()
    }
}

impl Page {
    /// Empty page with the tooltip watcher installed.
    pub fn new() -> Self {
        let mut doc = Document::new();
        let watcher = TooltipWatcher::install(&mut doc);
        Self {
            doc,
            popovers: Coordinator::new(),
            watcher,
            hovered: None,
        }
    }

    /// Parse markup fragments into a fresh page. Elements carrying a
    /// tooltip marker or `title` are armed immediately.
    pub fn from_markup(markup: &str) -> Result<Self> {
        let mut doc = loader::parse_markup(markup)?;
        let watcher = TooltipWatcher::install(&mut doc);
        Ok(Self {
            doc,
            popovers: Coordinator::new(),
            watcher,
            hovered: None,
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let mut doc = loader::load_file(path)?;
        let watcher = TooltipWatcher::install(&mut doc);
        Ok(Self {
            doc,
            popovers: Coordinator::new(),
            watcher,
            hovered: None,
        })
    }

    /// Resolve a `#id` selector to a node.
    pub fn element(&self, selector: &str) -> Result<NodeId> {
        let dom_id = selector
            .strip_prefix('#')
            .ok_or_else(|| Error::BadSelector(selector.to_string()))?;
        self.doc
            .element_by_id(dom_id)
            .ok_or_else(|| Error::SelectorNotFound(selector.to_string()))
    }

    /// Drain observer records until none are produced. New records can
    /// appear while processing when an attached container is refreshed.
    fn pump(&mut self) {
        while self.watcher.pump(&mut self.doc, &mut self.popovers) > 0 {}
    }

    /// Process all pending mutation records now instead of on the next
    /// interaction.
    pub fn flush(&mut self) {
        self.pump();
    }

    fn fire(&mut self, target: NodeId, event: EventType) {
        let fired = self.doc.dispatch(target, event);
        self.popovers.run_actions(&mut self.doc, fired, self.hovered);
    }

    /// Move the pointer onto the element named by `selector`.
    pub fn hover(&mut self, selector: &str) -> Result<()> {
        let node = self.element(selector)?;
        self.point_at(Some(node));
        Ok(())
    }

    /// Move the pointer off whatever it is over.
    pub fn unhover(&mut self) {
        self.point_at(None);
    }

    /// Retarget the pointer. Fires the full event sequence for the move:
    /// `mouseout` on the old target, `mouseleave` innermost-first on every
    /// node left, `mouseover` on the new target, then `mouseenter`
    /// outermost-first on every node entered. Nodes shared by both chains
    /// see neither leave nor enter.
    pub fn point_at(&mut self, target: Option<NodeId>) {
        self.pump();
        if self.hovered == target {
            return;
        }
        let prev = self.hovered;
        self.hovered = target;

        if let Some(old) = prev {
            self.fire(old, EventType::MouseOut);
            for node in leave_chain(&self.doc, old, target) {
                self.fire(node, EventType::MouseLeave);
            }
        }
        if let Some(new) = target {
            self.fire(new, EventType::MouseOver);
            for node in enter_chain(&self.doc, new, prev) {
                self.fire(node, EventType::MouseEnter);
            }
        }
    }

    /// Click an element: hover it, run the pointer-down pass over visible
    /// popovers, then dispatch `click`.
    pub fn click(&mut self, selector: &str) -> Result<()> {
        let node = self.element(selector)?;
        self.point_at(Some(node));
        self.popovers.pointer_down(&mut self.doc, node);
        self.fire(node, EventType::Click);
        Ok(())
    }

    /// Update the pointer coordinates used by cursor-following tooltips.
    /// Independent of [`Self::hover`]: coordinates and the hovered element
    /// are separate inputs.
    pub fn move_mouse_to(&mut self, x: f64, y: f64) {
        self.pump();
        self.popovers.pointer_moved((x, y));
    }

    /// Advance virtual time, firing any show timers that come due.
    pub fn advance_ms(&mut self, ms: u64) {
        self.pump();
        self.popovers.advance(&mut self.doc, ms);
    }

    pub fn set_attribute(&mut self, selector: &str, name: &str, value: &str) -> Result<()> {
        let node = self.element(selector)?;
        self.doc.set_attribute(node, name, value);
        Ok(())
    }

    pub fn remove_attribute(&mut self, selector: &str, name: &str) -> Result<()> {
        let node = self.element(selector)?;
        self.doc.remove_attribute(node, name);
        Ok(())
    }

    /// Parse markup fragments and append them under `selector`.
    pub fn insert_markup(&mut self, selector: &str, markup: &str) -> Result<Vec<NodeId>> {
        let parent = self.element(selector)?;
        loader::parse_into(&mut self.doc, parent, markup)
    }

    /// Detach an element. If the pointer was inside the removed subtree it
    /// ends up on the parent, without leave events, as when a hovered node
    /// disappears out from under the cursor.
    pub fn remove(&mut self, selector: &str) -> Result<()> {
        let node = self.element(selector)?;
        if self
            .hovered
            .is_some_and(|h| self.doc.contains(node, h))
        {
            self.hovered = self.doc.parent(node);
        }
        self.doc.detach(node);
        Ok(())
    }

    /// Build a popover on the element named by `selector`.
    pub fn create_popover(
        &mut self,
        selector: &str,
        content: Content,
        props: PopoverProps,
        hooks: Hooks,
    ) -> Result<InstanceId> {
        self.pump();
        let anchor = self.element(selector)?;
        Ok(self
            .popovers
            .create_popover(&mut self.doc, anchor, content, props, hooks))
    }

    /// Attach (or refresh) a tooltip on an element from its markup
    /// attributes. Returns `None` when the element has no tooltip content.
    pub fn attach_tooltip(
        &mut self,
        selector: &str,
        content: Option<&str>,
    ) -> Result<Option<InstanceId>> {
        self.pump();
        let node = self.element(selector)?;
        Ok(self.popovers.attach_tooltip(&mut self.doc, node, content))
    }

    /// Show one-off feedback text as a tooltip on an element.
    pub fn show_temporary(&mut self, selector: &str, content: &str) -> Result<()> {
        self.pump();
        let node = self.element(selector)?;
        self.popovers
            .show_temporary_tooltip(&mut self.doc, node, content);
        Ok(())
    }

    pub fn show(&mut self, id: InstanceId) {
        self.popovers.show(&mut self.doc, id);
    }

    pub fn hide(&mut self, id: InstanceId) {
        self.popovers.hide(&mut self.doc, id);
    }

    pub fn destroy(&mut self, id: InstanceId) {
        self.popovers.destroy(&mut self.doc, id);
    }

    pub fn toggle(&mut self, id: InstanceId) {
        self.popovers.toggle(&mut self.doc, id);
    }

    pub fn set_props(&mut self, id: InstanceId, props: PopoverProps) {
        self.popovers.set_props(&mut self.doc, id, props);
    }

    pub fn set_content(&mut self, id: InstanceId, content: Content) {
        self.popovers.set_content(&mut self.doc, id, content);
    }

    pub fn doc(&self) -> &Document {
        &self.doc
    }

    /// Mutable document access for host-page edits that bypass the selector
    /// helpers. Mutations queue records like any other write.
    pub fn doc_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    pub fn popovers(&self) -> &Coordinator {
        &self.popovers
    }

    pub fn hovered(&self) -> Option<NodeId> {
        self.hovered
    }

    pub fn now_ms(&self) -> u64 {
        self.popovers.now()
    }

    pub fn mouse_position(&self) -> (f64, f64) {
        self.popovers.mouse_position()
    }

    /// Instance attached to the element named by `selector`, if any.
    pub fn instance_for(&self, selector: &str) -> Result<Option<InstanceId>> {
        let node = self.element(selector)?;
        Ok(self.popovers.instance_for(node))
    }

    /// Indented text dump of the tree and popover table.
    pub fn dump(&self, visible_only: bool) -> String {
        dump::format_page(&self.doc, &self.popovers, visible_only)
    }

    pub fn report(&self) -> PageReport {
        dump::page_report(&self.doc, &self.popovers)
    }

    /// Serialize the whole document back to markup.
    pub fn markup(&self) -> String {
        loader::to_markup(&self.doc, self.doc.root())
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}

/// Nodes left by a pointer move: ancestors of `old`, inclusive, up to but
/// excluding the first one that also contains `new`. Innermost first.
fn leave_chain(doc: &Document, old: NodeId, new: Option<NodeId>) -> Vec<NodeId> {
    let mut chain = Vec::new();
    let mut cur = Some(old);
    while let Some(node) = cur {
        if new.is_some_and(|n| doc.contains(node, n)) {
            break;
        }
        chain.push(node);
        cur = doc.parent(node);
    }
    chain
}

/// Nodes entered by a pointer move: ancestors of `new`, inclusive, down
/// from the first one outside the old hover chain. Outermost first.
fn enter_chain(doc: &Document, new: NodeId, old: Option<NodeId>) -> Vec<NodeId> {
    let mut chain = Vec::new();
    let mut cur = Some(new);
    while let Some(node) = cur {
        if old.is_some_and(|o| doc.contains(node, o)) {
            break;
        }
        chain.push(node);
        cur = doc.parent(node);
    }
    chain.reverse();
    chain
}

#[cfg(test)]
mod tests {
    use super::*;

    /// body > div > (a > inner, b)
    fn fixture() -> (Document, NodeId, NodeId, NodeId, NodeId) {
        let mut doc = Document::new();
        let div = doc.create_element("div");
        let a = doc.create_element("a");
        let inner = doc.create_element("span");
        let b = doc.create_element("b");
        doc.append_child(doc.root(), div);
        doc.append_child(div, a);
        doc.append_child(a, inner);
        doc.append_child(div, b);
        (doc, div, a, inner, b)
    }

    #[test]
    fn test_sibling_move_stops_at_common_ancestor() {
        let (doc, _, a, inner, b) = fixture();

        assert_eq!(leave_chain(&doc, inner, Some(b)), vec![inner, a]);
        assert_eq!(enter_chain(&doc, b, Some(inner)), vec![b]);
    }

    #[test]
    fn test_move_into_child_leaves_nothing() {
        let (doc, _, a, inner, _) = fixture();

        assert!(leave_chain(&doc, a, Some(inner)).is_empty());
        assert_eq!(enter_chain(&doc, inner, Some(a)), vec![inner]);
    }

    #[test]
    fn test_move_to_parent_enters_nothing() {
        let (doc, _, a, inner, _) = fixture();

        assert_eq!(leave_chain(&doc, inner, Some(a)), vec![inner]);
        assert!(enter_chain(&doc, a, Some(inner)).is_empty());
    }

    #[test]
    fn test_first_hover_enters_whole_ancestor_chain() {
        let (doc, div, a, inner, _) = fixture();

        assert_eq!(
            enter_chain(&doc, inner, None),
            vec![doc.root(), div, a, inner]
        );
    }
}
