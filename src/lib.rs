//! Tooltip and popover simulator
//!
//! A deterministic model of a web page's tooltip layer: lazy attachment from
//! markup attributes, a single-active-tooltip coordinator, and a mutation
//! watcher that picks up content added or edited after load.

pub mod dom;
pub mod dump;
pub mod error;
pub mod event;
pub mod loader;
pub mod page;
pub mod popover;
pub mod timer;
pub mod tooltip;

pub use error::{Error, Result};
pub use page::Page;
pub use popover::{Content, Coordinator, InstanceId, PopoverProps, Role};
pub use tooltip::TooltipWatcher;
