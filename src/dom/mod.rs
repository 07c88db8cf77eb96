//! Minimal host document model: a node arena with attributes, event
//! listeners, and mutation observers. Just enough surface for the popover
//! layer to run against; no styling, geometry, or script engine.

mod document;
mod node;
mod observer;

pub use document::Document;
pub use node::{Node, NodeId, NodeKind};
pub use observer::{MutationKind, MutationRecord, ObserveOptions, ObserverId};
