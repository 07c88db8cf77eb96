//! Mutation observation over the document tree.
//!
//! Observers never receive records synchronously: mutations queue per
//! connected observer and are drained in batches at flush points. A
//! disconnected observer stops queuing and loses whatever was still queued,
//! so a loss-free disconnect/reconnect cycle calls [`Document::take_records`]
//! before disconnecting.
//!
//! [`Document::take_records`]: super::Document::take_records

use super::node::NodeId;

/// Handle to a registered observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(pub(crate) usize);

/// What an observer wants to hear about.
#[derive(Debug, Clone, Default)]
pub struct ObserveOptions {
    /// Watch the whole tree, not only direct children of the root.
    pub subtree: bool,
    /// Report child insertion/removal.
    pub child_list: bool,
    /// Attribute names to report changes for. `None` reports no attribute
    /// changes at all.
    pub attribute_filter: Option<Vec<String>>,
}

impl ObserveOptions {
    pub(crate) fn wants_attribute(&self, name: &str) -> bool {
        match &self.attribute_filter {
            Some(filter) => filter.iter().any(|f| f == name),
            None => false,
        }
    }
}

/// One observed mutation.
#[derive(Debug, Clone)]
pub struct MutationRecord {
    /// The element whose children or attributes changed.
    pub target: NodeId,
    pub kind: MutationKind,
}

#[derive(Debug, Clone)]
pub enum MutationKind {
    /// Children of the target changed.
    ChildList {
        added: Vec<NodeId>,
        removed: Vec<NodeId>,
    },
    /// An attribute of the target was written or removed.
    Attributes { name: String },
}

/// Per-observer bookkeeping, owned by the document.
#[derive(Debug)]
pub(crate) struct ObserverState {
    pub(crate) options: ObserveOptions,
    pub(crate) connected: bool,
    pub(crate) queue: Vec<MutationRecord>,
}
