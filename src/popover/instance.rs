//! Popover instance state and its configuration types.

use std::fmt;

use crate::dom::{Document, NodeId};

/// Handle to a popover instance. Ids are never reused; operations on a
/// destroyed handle are silent no-ops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstanceId(pub(crate) usize);

impl InstanceId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "popover-{}", self.0)
    }
}

/// HTML role of a popover. Tooltip-role instances are mutually exclusive;
/// menu-role instances may coexist freely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Menu,
    Tooltip,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Menu => "menu",
            Self::Tooltip => "tooltip",
        }
    }
}

/// Preferred side and alignment of the container relative to its anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placement {
    Top,
    TopStart,
    TopEnd,
    Bottom,
    BottomStart,
    BottomEnd,
    Left,
    LeftStart,
    LeftEnd,
    Right,
    RightStart,
    RightEnd,
}

impl Placement {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::TopStart => "top-start",
            Self::TopEnd => "top-end",
            Self::Bottom => "bottom",
            Self::BottomStart => "bottom-start",
            Self::BottomEnd => "bottom-end",
            Self::Left => "left",
            Self::LeftStart => "left-start",
            Self::LeftEnd => "left-end",
            Self::Right => "right",
            Self::RightStart => "right-start",
            Self::RightEnd => "right-end",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "top" => Some(Self::Top),
            "top-start" => Some(Self::TopStart),
            "top-end" => Some(Self::TopEnd),
            "bottom" => Some(Self::Bottom),
            "bottom-start" => Some(Self::BottomStart),
            "bottom-end" => Some(Self::BottomEnd),
            "left" => Some(Self::Left),
            "left-start" => Some(Self::LeftStart),
            "left-end" => Some(Self::LeftEnd),
            "right" => Some(Self::Right),
            "right-start" => Some(Self::RightStart),
            "right-end" => Some(Self::RightEnd),
            _ => None,
        }
    }
}

/// Cursor-tracking behavior while an instance is shown. `Initial` records
/// the pointer position once at show time; `Horizontal`/`Vertical` track one
/// axis and freeze the other at its show-time value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FollowCursor {
    Off,
    Always,
    Horizontal,
    Vertical,
    Initial,
}

impl FollowCursor {
    /// Interpretation of the `data-tooltip-follow-cursor` attribute: absent
    /// or empty means off, the three axis keywords select their mode, and
    /// any other non-empty value enables full tracking.
    pub fn from_attr(value: Option<&str>) -> Self {
        match value {
            None | Some("") => Self::Off,
            Some("horizontal") => Self::Horizontal,
            Some("vertical") => Self::Vertical,
            Some("initial") => Self::Initial,
            Some(_) => Self::Always,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Always => "always",
            Self::Horizontal => "horizontal",
            Self::Vertical => "vertical",
            Self::Initial => "initial",
        }
    }
}

/// How an instance is opened. Unset, it follows the role: tooltips show on
/// hover, menus toggle on click. `Manual` instances only respond to explicit
/// show/hide calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    Hover,
    Click,
    Manual,
}

impl Trigger {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hover => "hover",
            Self::Click => "click",
            Self::Manual => "manual",
        }
    }
}

/// Popover content: plain text for tooltips, or an opaque subtree for menus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Text(String),
    Node(NodeId),
}

impl Content {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(t) => Some(t),
            Self::Node(_) => None,
        }
    }
}

/// Configuration for a popover instance. `theme` and `arrow` left unset are
/// resolved from the role and theme; known themes are "tooltip", "menu",
/// "box-with-header" and "bare".
#[derive(Debug, Clone, PartialEq)]
pub struct PopoverProps {
    pub role: Role,
    pub theme: Option<String>,
    pub placement: Placement,
    /// Unset defaults to an arrow for every theme except "bare".
    pub arrow: Option<bool>,
    /// Hide on any pointer-down landing outside the container.
    pub hide_on_click: bool,
    /// Keep the instance shown while the pointer is over its container.
    pub interactive: bool,
    pub follow_cursor: FollowCursor,
    /// Delay between a hover trigger and the show, in virtual ms. Explicit
    /// show calls are always immediate.
    pub delay_ms: u64,
    pub max_width: u32,
    pub trigger: Option<Trigger>,
}

impl Default for PopoverProps {
    fn default() -> Self {
        Self {
            role: Role::Menu,
            theme: None,
            placement: Placement::Top,
            arrow: None,
            hide_on_click: false,
            interactive: false,
            follow_cursor: FollowCursor::Off,
            delay_ms: 0,
            max_width: 500,
            trigger: None,
        }
    }
}

impl PopoverProps {
    pub fn resolved_theme(&self) -> &str {
        self.theme.as_deref().unwrap_or(self.role.as_str())
    }

    pub fn resolved_arrow(&self) -> bool {
        self.arrow.unwrap_or(self.resolved_theme() != "bare")
    }

    pub fn resolved_trigger(&self) -> Trigger {
        self.trigger.unwrap_or(match self.role {
            Role::Tooltip => Trigger::Hover,
            Role::Menu => Trigger::Click,
        })
    }
}

/// Lifecycle hook run against the document with the instance's handle. The
/// engine wraps these: visible-set bookkeeping always runs first.
pub type Hook = Box<dyn FnMut(&mut Document, InstanceId)>;

#[derive(Default)]
pub struct Hooks {
    pub on_show: Option<Hook>,
    pub on_hide: Option<Hook>,
    pub on_destroy: Option<Hook>,
}

/// One live popover: an anchor, a container subtree that mounts under the
/// document root while shown, and the resolved configuration.
pub struct PopoverInstance {
    pub(crate) anchor: NodeId,
    pub(crate) container: NodeId,
    pub(crate) content: Content,
    pub(crate) props: PopoverProps,
    pub(crate) hooks: Hooks,
    pub(crate) shown: bool,
    /// Arrow element, built once and re-parented as the props change.
    pub(crate) arrow_node: Option<NodeId>,
    /// One-shot flag: after the next hide completes, re-derive permanent
    /// content from the anchor's marker attribute and destroy the instance
    /// if there is none.
    pub(crate) temp_reset: bool,
    /// Pointer position being tracked while shown, for follow-cursor modes.
    pub(crate) position: Option<(f64, f64)>,
}

impl PopoverInstance {
    pub fn anchor(&self) -> NodeId {
        self.anchor
    }

    pub fn container(&self) -> NodeId {
        self.container
    }

    pub fn is_shown(&self) -> bool {
        self.shown
    }

    pub fn role(&self) -> Role {
        self.props.role
    }

    pub fn props(&self) -> &PopoverProps {
        &self.props
    }

    pub fn content(&self) -> &Content {
        &self.content
    }

    pub fn position(&self) -> Option<(f64, f64)> {
        self.position
    }
}
