//! Popover primitive and its coordinator.
//!
//! A popover is a floating container bound to one anchor element. Two roles
//! exist: tooltips, which show on hover and are mutually exclusive across
//! the document, and menus, which toggle on click and coexist freely. The
//! [`Coordinator`] owns every instance and is the only writer of the
//! visible set.

mod coordinator;
mod instance;

pub use coordinator::{Coordinator, TOOLTIP_CONTENT_ATTR, format_datetime};
pub use instance::{
    Content, FollowCursor, Hook, Hooks, InstanceId, Placement, PopoverInstance, PopoverProps,
    Role, Trigger,
};
