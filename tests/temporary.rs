//! Tests for temporary (one-off feedback) tooltips.

mod common;

use common::{hover_and_wait, page};
use tipsim::popover::{Hooks, PopoverProps};
use tipsim::Content;

#[test]
fn test_temporary_tooltip_on_plain_element_shows_immediately() {
    let mut page = page(r#"<button id="b">do</button>"#);

    page.show_temporary("#b", "Done!").unwrap();
    let id = page.instance_for("#b").unwrap().unwrap();
    assert!(page.popovers().is_shown(id), "Temporary content skips the delay");
    assert_eq!(
        page.popovers().instance(id).unwrap().content().as_text(),
        Some("Done!")
    );
}

#[test]
fn test_temporary_instance_is_destroyed_after_hide() {
    let mut page = page(r#"<button id="b">do</button>"#);

    page.show_temporary("#b", "Done!").unwrap();
    let id = page.instance_for("#b").unwrap().unwrap();

    page.hide(id);
    assert!(
        page.instance_for("#b").unwrap().is_none(),
        "Nothing permanent backs this tooltip, so hiding destroys it"
    );
    assert!(page.popovers().is_empty());
}

#[test]
fn test_temporary_content_reverts_to_marker_after_hide() {
    let mut page = page(r#"<button id="b" data-tooltip-content="Copy"/>"#);

    hover_and_wait(&mut page, "#b");
    let id = page.instance_for("#b").unwrap().unwrap();

    page.show_temporary("#b", "Copied!").unwrap();
    assert_eq!(
        page.popovers().instance(id).unwrap().content().as_text(),
        Some("Copied!")
    );

    page.unhover();
    assert!(!page.popovers().is_shown(id));
    assert_eq!(
        page.popovers().instance(id).unwrap().content().as_text(),
        Some("Copy"),
        "Permanent content returns once the temporary showing ends"
    );
    assert_eq!(page.popovers().len(), 1);
}

#[test]
fn test_reset_happens_once_not_on_every_hide() {
    let mut page = page(r#"<button id="b" data-tooltip-content="Copy"/>"#);

    page.show_temporary("#b", "Copied!").unwrap();
    let id = page.instance_for("#b").unwrap().unwrap();
    page.hide(id);

    // Second cycle with content set through the plain API: no temporary
    // showing is armed, so hiding must leave it alone.
    page.set_content(id, Content::Text("Edited".to_string()));
    page.show(id);
    page.hide(id);
    assert_eq!(
        page.popovers().instance(id).unwrap().content().as_text(),
        Some("Edited"),
        "The reset is one-shot, bound to the temporary showing"
    );
}

#[test]
fn test_temporary_suppressed_inside_open_menu() {
    let mut page = page(
        r#"<button id="opener">menu</button><div id="list"><button id="item">copy</button></div>"#,
    );

    let list = page.element("#list").unwrap();
    let menu = page
        .create_popover(
            "#opener",
            Content::Node(list),
            PopoverProps::default(),
            Hooks::default(),
        )
        .unwrap();
    page.show(menu);

    page.show_temporary("#item", "Copied!").unwrap();
    assert!(
        page.instance_for("#item").unwrap().is_none(),
        "No tooltip may appear for targets inside an open menu"
    );
    assert_eq!(page.popovers().len(), 1);
    assert_eq!(page.popovers().visible(), &[menu]);
}

#[test]
fn test_temporary_reuses_existing_instance_once_menu_is_closed() {
    let mut page = page(
        r#"<button id="opener">menu</button><div id="list"><button id="item">copy</button></div>"#,
    );

    let list = page.element("#list").unwrap();
    let menu = page
        .create_popover(
            "#opener",
            Content::Node(list),
            PopoverProps::default(),
            Hooks::default(),
        )
        .unwrap();
    page.show(menu);
    page.hide(menu);

    // No open menu contains the target anymore, and the target already
    // holds an instance: that instance carries the temporary content.
    page.show_temporary("#opener", "Copied!").unwrap();
    assert_eq!(page.instance_for("#opener").unwrap(), Some(menu));
    assert!(page.popovers().is_shown(menu));
    assert_eq!(
        page.popovers().instance(menu).unwrap().content().as_text(),
        Some("Copied!")
    );
}

#[test]
fn test_clipboard_tooltip_survives_its_own_click() {
    let mut page = page(
        r##"<button id="copy" data-clipboard-target="#out" data-tooltip-content="Copy to clipboard"/>"##,
    );

    hover_and_wait(&mut page, "#copy");
    let id = page.instance_for("#copy").unwrap().unwrap();
    assert!(page.popovers().is_shown(id));
    assert!(
        !page.popovers().instance(id).unwrap().props().hide_on_click,
        "Clipboard anchors opt out of hide-on-click"
    );

    page.click("#copy").unwrap();
    assert!(page.popovers().is_shown(id), "The confirmation must not flicker");

    page.show_temporary("#copy", "Copied!").unwrap();
    assert_eq!(
        page.popovers().instance(id).unwrap().content().as_text(),
        Some("Copied!")
    );

    page.unhover();
    hover_and_wait(&mut page, "#copy");
    assert_eq!(
        page.popovers().instance(id).unwrap().content().as_text(),
        Some("Copy to clipboard")
    );
    assert!(page.popovers().is_shown(id));
}

#[test]
fn test_plain_tooltip_hides_on_own_anchor_click() {
    let mut page = page(r#"<span id="t" data-tooltip-content="Tip"/>"#);

    hover_and_wait(&mut page, "#t");
    let id = page.instance_for("#t").unwrap().unwrap();
    assert!(page.popovers().is_shown(id));

    page.click("#t").unwrap();
    assert!(
        !page.popovers().is_shown(id),
        "Default tooltips hide on any press outside their container"
    );
}
