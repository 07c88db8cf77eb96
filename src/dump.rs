//! Page state dump and report utilities.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::dom::{Document, NodeId, NodeKind};
use crate::loader;
use crate::popover::{Content, Coordinator, FollowCursor, InstanceId, PopoverInstance};

/// Dump the document tree and the popover table as indented text.
pub fn format_page(doc: &Document, popovers: &Coordinator, visible_only: bool) -> String {
    let mut out = String::new();
    out.push_str("=== Document ===\n");
    format_node(doc, doc.root(), 0, &mut out);
    out.push_str("\n=== Popovers ===\n");
    format_popovers(doc, popovers, visible_only, &mut out);
    out
}

/// Recursively append one line per node.
fn format_node(doc: &Document, id: NodeId, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    match &doc.node(id).kind {
        NodeKind::Element { tag, attrs } => {
            out.push_str(&format!("{indent}{tag}{}\n", format_attrs(attrs)));
        }
        NodeKind::Text(text) => {
            out.push_str(&format!("{indent}{text:?}\n"));
        }
    }
    for &child in doc.children(id) {
        format_node(doc, child, depth + 1, out);
    }
}

/// Format attributes as ` key="value"` pairs; the map keeps them sorted.
fn format_attrs(attrs: &BTreeMap<String, String>) -> String {
    let mut s = String::new();
    for (key, value) in attrs {
        s.push_str(&format!(" {key}={value:?}"));
    }
    s
}

/// Append one summary line per popover, `(none)` when the table is empty.
fn format_popovers(doc: &Document, popovers: &Coordinator, visible_only: bool, out: &mut String) {
    let mut printed = 0;
    for id in popovers.ids() {
        let Some(inst) = popovers.instance(id) else { continue };
        if visible_only && !inst.is_shown() {
            continue;
        }
        out.push_str(&format_popover_line(doc, popovers, id, inst));
        printed += 1;
    }
    if printed == 0 {
        out.push_str("(none)\n");
    }
}

/// Format a single popover summary line.
fn format_popover_line(
    doc: &Document,
    popovers: &Coordinator,
    id: InstanceId,
    inst: &PopoverInstance,
) -> String {
    let props = inst.props();
    let vis = if inst.is_shown() { "shown" } else { "hidden" };
    let anchor = format_anchor(doc, inst.anchor());
    let content = format_content(doc, inst.content());
    let flags = format_popover_flags(popovers, id, inst);
    format!(
        "{id} [{}] on {anchor} {vis} content={content} placement={} theme={}{flags}\n",
        inst.role().as_str(),
        props.placement.as_str(),
        props.resolved_theme(),
    )
}

/// Display name for an anchor: tag plus DOM id when present, else node id.
fn format_anchor(doc: &Document, node: NodeId) -> String {
    let Some(tag) = doc.tag(node) else {
        return node.to_string();
    };
    match doc.attribute(node, "id") {
        Some(dom_id) => format!("{tag}#{dom_id}"),
        None => format!("{tag}({node})"),
    }
}

/// Short form of popover content for one-line display.
fn format_content(doc: &Document, content: &Content) -> String {
    match content {
        Content::Text(text) => format!("{text:?}"),
        Content::Node(node) => match doc.tag(*node) {
            Some(tag) => format!("<{tag}>({node})"),
            None => node.to_string(),
        },
    }
}

/// Trailing flags, each printed only when it applies.
fn format_popover_flags(
    popovers: &Coordinator,
    id: InstanceId,
    inst: &PopoverInstance,
) -> String {
    let props = inst.props();
    let mut flags = String::new();
    if props.resolved_arrow() {
        flags.push_str(" arrow");
    }
    if props.interactive {
        flags.push_str(" interactive");
    }
    if props.hide_on_click {
        flags.push_str(" hide-on-click");
    }
    if let Some(trigger) = props.trigger {
        flags.push_str(&format!(" trigger={}", trigger.as_str()));
    }
    if props.follow_cursor != FollowCursor::Off {
        flags.push_str(&format!(" follow-cursor={}", props.follow_cursor.as_str()));
    }
    if props.delay_ms != 0 {
        flags.push_str(&format!(" delay={}ms", props.delay_ms));
    }
    if let Some((x, y)) = inst.position() {
        flags.push_str(&format!(" at=({x}, {y})"));
    }
    if popovers.has_pending_show(id) {
        flags.push_str(" pending-show");
    }
    flags
}

/// Machine-readable page snapshot for `--json` output.
#[derive(Debug, Serialize)]
pub struct PageReport {
    pub now_ms: u64,
    pub mouse: (f64, f64),
    pub markup: String,
    pub popovers: Vec<PopoverReport>,
}

/// One popover entry in a [`PageReport`].
#[derive(Debug, Serialize)]
pub struct PopoverReport {
    pub id: String,
    pub role: String,
    pub anchor: String,
    pub shown: bool,
    pub content: String,
    pub placement: String,
    pub theme: String,
    pub arrow: bool,
    pub interactive: bool,
    pub hide_on_click: bool,
    pub trigger: String,
    pub follow_cursor: String,
    pub delay_ms: u64,
    pub max_width: u32,
    pub position: Option<(f64, f64)>,
    pub pending_show: bool,
}

/// Build a full report from live state.
pub fn page_report(doc: &Document, popovers: &Coordinator) -> PageReport {
    PageReport {
        now_ms: popovers.now(),
        mouse: popovers.mouse_position(),
        markup: loader::to_markup(doc, doc.root()),
        popovers: popovers
            .ids()
            .into_iter()
            .filter_map(|id| {
                let inst = popovers.instance(id)?;
                Some(popover_report(doc, popovers, id, inst))
            })
            .collect(),
    }
}

fn popover_report(
    doc: &Document,
    popovers: &Coordinator,
    id: InstanceId,
    inst: &PopoverInstance,
) -> PopoverReport {
    let props = inst.props();
    PopoverReport {
        id: id.to_string(),
        role: inst.role().as_str().to_string(),
        anchor: format_anchor(doc, inst.anchor()),
        shown: inst.is_shown(),
        content: match inst.content() {
            Content::Text(text) => text.clone(),
            Content::Node(node) => loader::to_markup(doc, *node),
        },
        placement: props.placement.as_str().to_string(),
        theme: props.resolved_theme().to_string(),
        arrow: props.resolved_arrow(),
        interactive: props.interactive,
        hide_on_click: props.hide_on_click,
        trigger: props.resolved_trigger().as_str().to_string(),
        follow_cursor: props.follow_cursor.as_str().to_string(),
        delay_ms: props.delay_ms,
        max_width: props.max_width,
        position: inst.position(),
        pending_show: popovers.has_pending_show(id),
    }
}
