//! Lazy tooltip attachment driven by document mutation.
//!
//! Building a popover instance is the expensive step, so marked elements are
//! only *armed*: a capture-phase, one-shot hover listener defers the real
//! attachment to the first pointer contact. Hover-propagation order makes
//! this seamless: the armed listener fires on the propagating hover event,
//! attaches the instance, and the instance's own enter listener then catches
//! the non-propagating enter event of the very same pointer move.
//!
//! A document-wide mutation watcher keeps the armed set current as the host
//! page inserts markup or rewrites the watched attributes.

use crate::dom::{Document, MutationKind, NodeId, ObserveOptions, ObserverId};
use crate::event::{Action, EventType};
use crate::popover::{Coordinator, TOOLTIP_CONTENT_ATTR};

/// Document-wide watcher for tooltip markers. One per document.
pub struct TooltipWatcher {
    observer: ObserverId,
}

impl TooltipWatcher {
    /// Register the mutation watcher (subtree, child-list, and exactly the
    /// marker and `title` attributes) and arm every marked element already
    /// in the document.
    pub fn install(doc: &mut Document) -> Self {
        let observer = doc.register_observer(ObserveOptions {
            subtree: true,
            child_list: true,
            attribute_filter: Some(vec![
                TOOLTIP_CONTENT_ATTR.to_string(),
                "title".to_string(),
            ]),
        });
        let root = doc.root();
        let armed = arm_descendants(doc, root);
        tracing::debug!("Tooltip watcher installed, {} element(s) armed", armed);
        Self { observer }
    }

    /// Process the queued mutation batch. Added element nodes get their
    /// marked descendants (and themselves, when marked) armed; a watched
    /// attribute change attaches eagerly, since the user may already be
    /// hovering the element. The watcher stays disconnected while the batch
    /// runs, so attribute writes made by attachment itself are dropped
    /// rather than re-entering here. Returns the number of records
    /// processed.
    pub fn pump(&self, doc: &mut Document, popovers: &mut Coordinator) -> usize {
        if !doc.has_pending_records(self.observer) {
            return 0;
        }
        let records = doc.take_records(self.observer);
        doc.disconnect(self.observer);
        for record in &records {
            match &record.kind {
                MutationKind::ChildList { added, .. } => {
                    for &node in added {
                        if !doc.is_element(node) {
                            continue;
                        }
                        arm_descendants(doc, node);
                        if doc.has_attribute(node, TOOLTIP_CONTENT_ATTR) {
                            arm(doc, node);
                        }
                    }
                }
                MutationKind::Attributes { .. } => {
                    popovers.attach_tooltip(doc, record.target, None);
                }
            }
        }
        doc.observe(self.observer);
        tracing::trace!("Processed {} mutation record(s)", records.len());
        records.len()
    }

    /// Whether a batch is waiting for the next pump.
    pub fn has_pending(&self, doc: &Document) -> bool {
        doc.has_pending_records(self.observer)
    }
}

/// Arm one element: a capture-phase, one-shot hover listener that performs
/// the attachment on first fire. `aria-label` is synthesized from the
/// marker content right away when the element has none, because assistive
/// tooling reads labels without hovering. Arming an armed element is a
/// no-op.
fn arm(doc: &mut Document, el: NodeId) {
    doc.add_listener(el, EventType::MouseOver, Action::LazyTooltip, true, true);

    if !doc.has_attribute(el, "aria-label") {
        let content = doc
            .attribute(el, TOOLTIP_CONTENT_ATTR)
            .unwrap_or_default()
            .to_string();
        if !content.is_empty() {
            doc.set_attribute(el, "aria-label", &content);
        }
    }
}

/// Arm every marked descendant of `root`, excluding `root` itself.
fn arm_descendants(doc: &mut Document, root: NodeId) -> usize {
    let marked = doc.descendants_with_attribute(root, TOOLTIP_CONTENT_ATTR);
    let count = marked.len();
    for el in marked {
        arm(doc, el);
    }
    count
}
