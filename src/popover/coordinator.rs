//! The coordinator: instance registry, visible-set bookkeeping, and the
//! tooltip attachment layer on top of the generic popover primitive.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset};

use crate::dom::{Document, NodeId};
use crate::event::{Action, EventType};
use crate::timer::TimerQueue;

use super::instance::{
    Content, FollowCursor, Hooks, InstanceId, Placement, PopoverInstance, PopoverProps, Role,
    Trigger,
};

/// Attribute holding the canonical tooltip text.
pub const TOOLTIP_CONTENT_ATTR: &str = "data-tooltip-content";

/// One coordinator per document. Owns every popover instance, the ordered
/// set of currently visible ones, the show-delay timers and the virtual
/// clock and pointer position they run against.
///
/// At most one tooltip-role instance is visible at a time: showing one
/// force-hides every other visible tooltip-role instance first. Menu-role
/// instances are exempt and coexist freely, with each other and with the
/// visible tooltip.
#[derive(Default)]
pub struct Coordinator {
    instances: HashMap<InstanceId, PopoverInstance>,
    by_anchor: HashMap<NodeId, InstanceId>,
    /// Visible instances in the order they were shown.
    visible: Vec<InstanceId>,
    timers: TimerQueue,
    now_ms: u64,
    mouse: (f64, f64),
    next_id: usize,
}

impl Coordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Virtual clock, in ms since the coordinator was created.
    pub fn now(&self) -> u64 {
        self.now_ms
    }

    pub fn mouse_position(&self) -> (f64, f64) {
        self.mouse
    }

    pub fn instance(&self, id: InstanceId) -> Option<&PopoverInstance> {
        self.instances.get(&id)
    }

    /// The instance bound to `anchor`, if any.
    pub fn instance_for(&self, anchor: NodeId) -> Option<InstanceId> {
        self.by_anchor
            .get(&anchor)
            .copied()
            .filter(|id| self.instances.contains_key(id))
    }

    pub fn is_shown(&self, id: InstanceId) -> bool {
        self.instances.get(&id).is_some_and(|inst| inst.shown)
    }

    /// Currently visible instances, in show order.
    pub fn visible(&self) -> &[InstanceId] {
        &self.visible
    }

    /// All live instance ids, ordered by creation.
    pub fn ids(&self) -> Vec<InstanceId> {
        let mut ids: Vec<InstanceId> = self.instances.keys().copied().collect();
        ids.sort_by_key(|id| id.index());
        ids
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Whether `id` has a show pending on the delay timer.
    pub fn has_pending_show(&self, id: InstanceId) -> bool {
        self.timers.has_pending(id)
    }

    /// Create a popover bound to `anchor`. An anchor holds at most one live
    /// instance; any previous one is destroyed first. The container element
    /// is built immediately (detached) and mounts under the document root
    /// whenever the instance is shown. Menu-role anchors are marked with
    /// `aria-haspopup` for assistive technology.
    pub fn create_popover(
        &mut self,
        doc: &mut Document,
        anchor: NodeId,
        content: Content,
        props: PopoverProps,
        hooks: Hooks,
    ) -> InstanceId {
        if let Some(old) = self.instance_for(anchor) {
            tracing::debug!("Anchor {} already holds {}, replacing", anchor, old);
            self.destroy(doc, old);
        }

        let id = InstanceId(self.next_id);
        self.next_id += 1;

        let container = doc.create_element("div");
        doc.set_attribute(container, "id", &id.to_string());

        let role = props.role;
        self.instances.insert(
            id,
            PopoverInstance {
                anchor,
                container,
                content,
                props,
                hooks,
                shown: false,
                arrow_node: None,
                temp_reset: false,
                position: None,
            },
        );
        self.by_anchor.insert(anchor, id);

        self.refresh_container(doc, id);
        self.wire_triggers(doc, id);
        if role == Role::Menu {
            doc.set_attribute(anchor, "aria-haspopup", "true");
        }
        tracing::debug!("Created {} ({}) on anchor {}", id, role.as_str(), anchor);
        id
    }

    /// Show `id`. For tooltip-role instances, every other visible
    /// tooltip-role instance is force-hidden first; the instance then joins
    /// the visible set, its container mounts under the root, and the
    /// caller's on-show hook runs last.
    pub fn show(&mut self, doc: &mut Document, id: InstanceId) {
        self.timers.cancel(id);
        let Some(inst) = self.instances.get(&id) else {
            return;
        };
        if inst.shown {
            return;
        }

        if inst.props.role == Role::Tooltip {
            let others: Vec<InstanceId> =
                self.visible.iter().copied().filter(|v| *v != id).collect();
            for other in others {
                if self
                    .instances
                    .get(&other)
                    .is_some_and(|i| i.props.role == Role::Tooltip)
                {
                    self.hide(doc, other);
                }
            }
        }

        self.visible.push(id);
        let mouse = self.mouse;
        let Some(inst) = self.instances.get_mut(&id) else {
            return;
        };
        inst.shown = true;
        if inst.props.follow_cursor != FollowCursor::Off {
            inst.position = Some(mouse);
        }
        let (anchor, container, role) = (inst.anchor, inst.container, inst.props.role);

        let root = doc.root();
        doc.append_child(root, container);
        match role {
            Role::Tooltip => describedby_add(doc, anchor, &id.to_string()),
            Role::Menu => doc.set_attribute(anchor, "aria-expanded", "true"),
        }
        tracing::trace!("Showing {}", id);
        self.run_hook(doc, id, HookKind::Show);
    }

    /// Hide `id`, cancelling any pending delayed show. Hiding removes the
    /// instance from the visible set, detaches its container, and then runs
    /// the one-shot temporary-content reset if one is armed.
    pub fn hide(&mut self, doc: &mut Document, id: InstanceId) {
        self.timers.cancel(id);
        let Some(inst) = self.instances.get_mut(&id) else {
            return;
        };
        if !inst.shown {
            return;
        }
        inst.shown = false;
        inst.position = None;
        let (anchor, container, role) = (inst.anchor, inst.container, inst.props.role);

        self.visible.retain(|v| *v != id);
        doc.detach(container);
        match role {
            Role::Tooltip => describedby_remove(doc, anchor, &id.to_string()),
            Role::Menu => doc.set_attribute(anchor, "aria-expanded", "false"),
        }
        tracing::trace!("Hiding {}", id);
        self.run_hook(doc, id, HookKind::Hide);

        let reset = self
            .instances
            .get_mut(&id)
            .is_some_and(|inst| std::mem::take(&mut inst.temp_reset));
        if reset && self.attach_tooltip(doc, anchor, None).is_none() {
            self.destroy(doc, id);
        }
    }

    /// Destroy `id`: remove it from the visible set, detach its container,
    /// drop its trigger listeners and anchor binding. The handle becomes a
    /// silent no-op afterwards. Destruction does not run the temporary
    /// content reset.
    pub fn destroy(&mut self, doc: &mut Document, id: InstanceId) {
        if !self.instances.contains_key(&id) {
            return;
        }
        self.timers.cancel(id);
        self.visible.retain(|v| *v != id);
        self.unwire_triggers(doc, id);

        let Some(mut inst) = self.instances.remove(&id) else {
            return;
        };
        doc.detach(inst.container);
        describedby_remove(doc, inst.anchor, &id.to_string());
        if inst.props.role == Role::Menu {
            doc.remove_attribute(inst.anchor, "aria-expanded");
        }
        if self.by_anchor.get(&inst.anchor) == Some(&id) {
            self.by_anchor.remove(&inst.anchor);
        }
        tracing::debug!("Destroyed {}", id);
        if let Some(mut hook) = inst.hooks.on_destroy.take() {
            hook(doc, id);
        }
    }

    /// Replace the instance's configuration wholesale, re-resolving theme,
    /// arrow and trigger and re-wiring listeners. Content is untouched.
    pub fn set_props(&mut self, doc: &mut Document, id: InstanceId, props: PopoverProps) {
        let Some(inst) = self.instances.get(&id) else {
            return;
        };
        let (anchor, old_role, shown) = (inst.anchor, inst.props.role, inst.shown);

        self.unwire_triggers(doc, id);
        if let Some(inst) = self.instances.get_mut(&id) {
            inst.props = props;
        }
        let Some(inst) = self.instances.get(&id) else {
            return;
        };
        let new_role = inst.props.role;

        if shown && old_role != new_role {
            match old_role {
                Role::Tooltip => describedby_remove(doc, anchor, &id.to_string()),
                Role::Menu => doc.remove_attribute(anchor, "aria-expanded"),
            }
            match new_role {
                Role::Tooltip => describedby_add(doc, anchor, &id.to_string()),
                Role::Menu => doc.set_attribute(anchor, "aria-expanded", "true"),
            }
        }
        if new_role == Role::Menu {
            doc.set_attribute(anchor, "aria-haspopup", "true");
        }
        self.refresh_container(doc, id);
        self.wire_triggers(doc, id);
    }

    /// Replace the instance's content and rebuild the container children.
    pub fn set_content(&mut self, doc: &mut Document, id: InstanceId, content: Content) {
        let Some(inst) = self.instances.get_mut(&id) else {
            return;
        };
        inst.content = content;
        self.refresh_container(doc, id);
    }

    /// Attach a tooltip to `target`, or reconfigure the one it already has.
    ///
    /// Any native `title` is migrated into the marker attribute first
    /// (`relative-time` elements get their datetime reformatted on the way),
    /// then content comes from the `content` argument or the marker
    /// attribute. Absent or empty content attaches nothing and returns
    /// `None`. The resulting instance is tooltip-role with a 100ms show
    /// delay; placement, follow-cursor and interactive mode come from the
    /// target's `data-tooltip-*` attributes, and hide-on-click is suppressed
    /// for clipboard-copy anchors so the confirmation tooltip does not
    /// flicker across the click.
    pub fn attach_tooltip(
        &mut self,
        doc: &mut Document,
        target: NodeId,
        content: Option<&str>,
    ) -> Option<InstanceId> {
        switch_title_to_tooltip(doc, target);

        let content = match content {
            Some(text) => Some(text.to_string()),
            None => doc.attribute(target, TOOLTIP_CONTENT_ATTR).map(str::to_string),
        };
        let content = content.filter(|text| !text.is_empty())?;

        let hide_on_click = !doc.has_attribute(target, "data-clipboard-target");
        let placement = doc
            .attribute(target, "data-tooltip-placement")
            .and_then(Placement::from_str)
            .unwrap_or(Placement::TopStart);
        let follow_cursor =
            FollowCursor::from_attr(doc.attribute(target, "data-tooltip-follow-cursor"));
        let interactive = doc.attribute(target, "data-tooltip-interactive") == Some("true");

        let props = PopoverProps {
            role: Role::Tooltip,
            theme: Some("tooltip".to_string()),
            placement,
            hide_on_click,
            interactive,
            follow_cursor,
            delay_ms: 100,
            ..PopoverProps::default()
        };

        match self.instance_for(target) {
            Some(id) => {
                self.set_props(doc, id, props);
                self.set_content(doc, id, Content::Text(content));
                Some(id)
            }
            None => {
                let content = Content::Text(content);
                Some(self.create_popover(doc, target, content, props, Hooks::default()))
            }
        }
    }

    /// Show `content` on `target` right away, without touching the permanent
    /// tooltip text. When the next hide completes, the permanent content is
    /// re-derived from the marker attribute; instances with none are
    /// destroyed. Skipped entirely when `target` sits inside an open
    /// menu-role container, which is about to unmount anyway.
    pub fn show_temporary_tooltip(&mut self, doc: &mut Document, target: NodeId, content: &str) {
        for id in &self.visible {
            let Some(inst) = self.instances.get(id) else {
                continue;
            };
            if inst.props.role == Role::Menu && doc.contains(inst.container, target) {
                tracing::debug!("Suppressing temporary tooltip inside open menu {}", id);
                return;
            }
        }

        let id = match self.instance_for(target) {
            Some(id) => id,
            None => match self.attach_tooltip(doc, target, Some(content)) {
                Some(id) => id,
                None => return,
            },
        };
        self.set_content(doc, id, Content::Text(content.to_string()));
        if !self.is_shown(id) {
            self.show(doc, id);
        }
        if let Some(inst) = self.instances.get_mut(&id) {
            inst.temp_reset = true;
        }
    }

    /// Execute the actions collected from an event dispatch, in firing
    /// order. `hovered` is the node the pointer is currently over.
    pub fn run_actions(
        &mut self,
        doc: &mut Document,
        fired: Vec<(NodeId, Action)>,
        hovered: Option<NodeId>,
    ) {
        for (node, action) in fired {
            match action {
                Action::LazyTooltip => {
                    self.attach_tooltip(doc, node, None);
                }
                Action::PointerEnter(id) => self.pointer_enter(doc, id),
                Action::PointerLeave(id) => self.pointer_leave(doc, id, hovered),
                Action::ToggleMenu(id) => self.toggle(doc, id),
                Action::Marker(_) => {}
            }
        }
    }

    /// Hover reached the anchor (or container) of a hover-triggered
    /// instance: show after the configured delay.
    pub fn pointer_enter(&mut self, doc: &mut Document, id: InstanceId) {
        let Some(inst) = self.instances.get(&id) else {
            return;
        };
        if inst.props.resolved_trigger() != Trigger::Hover || inst.shown {
            return;
        }
        let delay = inst.props.delay_ms;
        if delay == 0 {
            self.show(doc, id);
        } else {
            self.timers.schedule(id, self.now_ms + delay);
        }
    }

    /// Hover left the anchor (or container): cancel a pending show, and hide
    /// unless an interactive instance still has the pointer within its
    /// anchor or container subtree.
    pub fn pointer_leave(&mut self, doc: &mut Document, id: InstanceId, hovered: Option<NodeId>) {
        self.timers.cancel(id);
        let Some(inst) = self.instances.get(&id) else {
            return;
        };
        if !inst.shown {
            return;
        }
        if inst.props.interactive {
            if let Some(node) = hovered {
                if doc.contains(inst.container, node) || doc.contains(inst.anchor, node) {
                    return;
                }
            }
        }
        self.hide(doc, id);
    }

    /// Click on a click-triggered anchor: toggle.
    pub fn toggle(&mut self, doc: &mut Document, id: InstanceId) {
        if self.is_shown(id) {
            self.hide(doc, id);
        } else {
            self.show(doc, id);
        }
    }

    /// Pointer-down pass over the visible set, run before click dispatch.
    /// Hides every `hide_on_click` instance, except when the press lands
    /// inside its container, or on the anchor of a click-triggered instance
    /// where the toggle is about to handle the same press.
    pub fn pointer_down(&mut self, doc: &mut Document, target: NodeId) {
        let visible = self.visible.clone();
        for id in visible {
            let Some(inst) = self.instances.get(&id) else {
                continue;
            };
            if !inst.props.hide_on_click {
                continue;
            }
            if doc.contains(inst.container, target) {
                continue;
            }
            if inst.props.resolved_trigger() == Trigger::Click
                && doc.contains(inst.anchor, target)
            {
                continue;
            }
            self.hide(doc, id);
        }
    }

    /// Record a pointer move and update follow-cursor positions of visible
    /// instances. `Initial` stays frozen at its show-time point.
    pub fn pointer_moved(&mut self, pos: (f64, f64)) {
        self.mouse = pos;
        for id in self.visible.clone() {
            let Some(inst) = self.instances.get_mut(&id) else {
                continue;
            };
            let Some(base) = inst.position else {
                continue;
            };
            inst.position = match inst.props.follow_cursor {
                FollowCursor::Off | FollowCursor::Initial => Some(base),
                FollowCursor::Always => Some(pos),
                FollowCursor::Horizontal => Some((pos.0, base.1)),
                FollowCursor::Vertical => Some((base.0, pos.1)),
            };
        }
    }

    /// Advance the virtual clock, firing due show timers in order.
    pub fn advance(&mut self, doc: &mut Document, ms: u64) {
        self.now_ms += ms;
        for id in self.timers.take_due(self.now_ms) {
            self.show(doc, id);
        }
    }

    fn run_hook(&mut self, doc: &mut Document, id: InstanceId, kind: HookKind) {
        let hook = self.instances.get_mut(&id).and_then(|inst| match kind {
            HookKind::Show => inst.hooks.on_show.take(),
            HookKind::Hide => inst.hooks.on_hide.take(),
        });
        let Some(mut hook) = hook else {
            return;
        };
        hook(doc, id);
        if let Some(inst) = self.instances.get_mut(&id) {
            match kind {
                HookKind::Show => inst.hooks.on_show = Some(hook),
                HookKind::Hide => inst.hooks.on_hide = Some(hook),
            }
        }
    }

    /// Rewrite the container's attributes and children from the current
    /// props and content. Runs detached or attached; mutation records only
    /// queue in the attached case.
    fn refresh_container(&mut self, doc: &mut Document, id: InstanceId) {
        let Some(inst) = self.instances.get_mut(&id) else {
            return;
        };
        let container = inst.container;
        doc.set_attribute(container, "data-popover-role", inst.props.role.as_str());
        doc.set_attribute(container, "data-theme", inst.props.resolved_theme());
        doc.set_attribute(container, "data-placement", inst.props.placement.as_str());

        for child in doc.children(container).to_vec() {
            doc.detach(child);
        }
        if inst.props.resolved_arrow() {
            let arrow = match inst.arrow_node {
                Some(arrow) => arrow,
                None => {
                    let arrow = build_arrow(doc);
                    inst.arrow_node = Some(arrow);
                    arrow
                }
            };
            doc.append_child(container, arrow);
        }
        match &inst.content {
            Content::Text(text) => {
                let node = doc.create_text(text);
                doc.append_child(container, node);
            }
            Content::Node(node) => doc.append_child(container, *node),
        }
    }

    fn wire_triggers(&mut self, doc: &mut Document, id: InstanceId) {
        let Some(inst) = self.instances.get(&id) else {
            return;
        };
        let (anchor, container) = (inst.anchor, inst.container);
        match inst.props.resolved_trigger() {
            Trigger::Hover => {
                let enter = Action::PointerEnter(id);
                let leave = Action::PointerLeave(id);
                doc.add_listener(anchor, EventType::MouseEnter, enter.clone(), false, false);
                doc.add_listener(anchor, EventType::MouseLeave, leave.clone(), false, false);
                if inst.props.interactive {
                    doc.add_listener(container, EventType::MouseEnter, enter, false, false);
                    doc.add_listener(container, EventType::MouseLeave, leave, false, false);
                }
            }
            Trigger::Click => {
                doc.add_listener(anchor, EventType::Click, Action::ToggleMenu(id), false, false);
            }
            Trigger::Manual => {}
        }
    }

    fn unwire_triggers(&mut self, doc: &mut Document, id: InstanceId) {
        let Some(inst) = self.instances.get(&id) else {
            return;
        };
        let (anchor, container) = (inst.anchor, inst.container);
        for (node, event, action) in [
            (anchor, EventType::MouseEnter, Action::PointerEnter(id)),
            (anchor, EventType::MouseLeave, Action::PointerLeave(id)),
            (container, EventType::MouseEnter, Action::PointerEnter(id)),
            (container, EventType::MouseLeave, Action::PointerLeave(id)),
            (anchor, EventType::Click, Action::ToggleMenu(id)),
        ] {
            doc.remove_listener(node, event, &action, false);
        }
    }
}

enum HookKind {
    Show,
    Hide,
}

/// Long-form date and time, rendered in the timestamp's own UTC offset.
/// Used when migrating a `relative-time` element's title.
pub fn format_datetime(datetime: &DateTime<FixedOffset>) -> String {
    datetime.format("%B %-d, %Y, %-I:%M %p").to_string()
}

/// Migrate a native `title` attribute into the marker attribute. The title
/// is blanked rather than removed: removing it makes some custom elements
/// re-add it, which would loop through the attribute watcher forever.
/// `aria-label` is updated only when the markup already carries one.
fn switch_title_to_tooltip(doc: &mut Document, target: NodeId) {
    let Some(title) = doc.attribute(target, "title").map(str::to_string) else {
        return;
    };
    if title.is_empty() {
        return;
    }
    let mut value = title;
    if doc.tag(target) == Some("relative-time") {
        if let Some(datetime) = doc.attribute(target, "datetime") {
            // an unparseable datetime keeps the raw title text
            if let Ok(parsed) = DateTime::parse_from_rfc3339(datetime) {
                value = format_datetime(&parsed);
            }
        }
    }
    doc.set_attribute(target, TOOLTIP_CONTENT_ATTR, &value);
    if doc.has_attribute(target, "aria-label") {
        doc.set_attribute(target, "aria-label", &value);
    }
    doc.set_attribute(target, "title", "");
    tracing::debug!("Migrated title of {} to tooltip content", target);
}

/// Build the standard arrow: a 16x7 chevron drawn as two stacked paths so
/// themes can stroke the outline and fill separately.
fn build_arrow(doc: &mut Document) -> NodeId {
    let svg = doc.create_element("svg");
    doc.set_attribute(svg, "width", "16");
    doc.set_attribute(svg, "height", "7");
    doc.set_attribute(svg, "class", "popover-arrow");
    let outer = doc.create_element("path");
    doc.set_attribute(outer, "d", "m0 7 8-7 8 7Z");
    doc.set_attribute(outer, "class", "popover-arrow-outer");
    let inner = doc.create_element("path");
    doc.set_attribute(inner, "d", "m0 8 8-7 8 7Z");
    doc.set_attribute(inner, "class", "popover-arrow-inner");
    doc.append_child(svg, outer);
    doc.append_child(svg, inner);
    svg
}

/// Append an id token to `aria-describedby`, preserving tokens other code
/// put there.
fn describedby_add(doc: &mut Document, anchor: NodeId, token: &str) {
    let current = doc
        .attribute(anchor, "aria-describedby")
        .unwrap_or_default()
        .to_string();
    if current.split_whitespace().any(|t| t == token) {
        return;
    }
    let value = if current.is_empty() {
        token.to_string()
    } else {
        format!("{current} {token}")
    };
    doc.set_attribute(anchor, "aria-describedby", &value);
}

/// Remove our id token from `aria-describedby`, dropping the attribute when
/// nothing is left.
fn describedby_remove(doc: &mut Document, anchor: NodeId, token: &str) {
    let Some(current) = doc.attribute(anchor, "aria-describedby").map(str::to_string) else {
        return;
    };
    let rest: Vec<&str> = current
        .split_whitespace()
        .filter(|t| *t != token)
        .collect();
    if rest.is_empty() {
        doc.remove_attribute(anchor, "aria-describedby");
    } else {
        doc.set_attribute(anchor, "aria-describedby", &rest.join(" "));
    }
}
