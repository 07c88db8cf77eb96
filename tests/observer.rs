//! Tests for the mutation watcher: late markup, attribute edits, reentrancy.

mod common;

use common::{hover_and_wait, page};

#[test]
fn test_setting_marker_attaches_eagerly() {
    let mut page = page(r#"<span id="s">text</span>"#);

    page.set_attribute("#s", "data-tooltip-content", "Late tip").unwrap();
    page.flush();

    let id = page
        .instance_for("#s")
        .unwrap()
        .expect("Attribute edits attach without waiting for a hover");
    assert!(
        !page.popovers().is_shown(id),
        "Attachment alone does not show anything"
    );
}

#[test]
fn test_attached_after_edit_shows_on_next_hover() {
    let mut page = page(r#"<span id="s">text</span>"#);

    page.set_attribute("#s", "data-tooltip-content", "Late tip").unwrap();
    hover_and_wait(&mut page, "#s");

    let id = page.instance_for("#s").unwrap().unwrap();
    assert!(page.popovers().is_shown(id));
    assert_eq!(
        page.popovers().instance(id).unwrap().content().as_text(),
        Some("Late tip")
    );
}

#[test]
fn test_marker_edit_updates_existing_instance() {
    let mut page = page(r#"<span id="s" data-tooltip-content="Old"/>"#);

    hover_and_wait(&mut page, "#s");
    let id = page.instance_for("#s").unwrap().unwrap();

    page.set_attribute("#s", "data-tooltip-content", "New").unwrap();
    page.flush();
    assert_eq!(
        page.popovers().instance(id).unwrap().content().as_text(),
        Some("New")
    );
}

#[test]
fn test_inserted_subtree_is_armed() {
    let mut page = page(r#"<div id="main">start</div>"#);

    page.insert_markup(
        "#main",
        r#"<p><span id="new" data-tooltip-content="Fresh"/></p>"#,
    )
    .unwrap();

    hover_and_wait(&mut page, "#new");
    let id = page.instance_for("#new").unwrap().unwrap();
    assert!(page.popovers().is_shown(id));
    assert_eq!(page.popovers().len(), 1);
}

#[test]
fn test_all_marked_descendants_of_one_insert_are_armed() {
    let mut page = page(r#"<div id="main">start</div>"#);

    page.insert_markup(
        "#main",
        concat!(
            r#"<section>"#,
            r#"<span id="s1" data-tooltip-content="1"/>"#,
            r#"<div><span id="s2" data-tooltip-content="2"/><span id="s3" data-tooltip-content="3"/></div>"#,
            r#"<p><b><span id="s4" data-tooltip-content="4"/></b></p>"#,
            r#"<span id="s5" data-tooltip-content="5"/>"#,
            r#"</section>"#,
        ),
    )
    .unwrap();

    for selector in ["#s1", "#s2", "#s3", "#s4", "#s5"] {
        page.hover(selector).unwrap();
        assert!(
            page.instance_for(selector).unwrap().is_some(),
            "{selector} was not armed"
        );
    }
    assert_eq!(page.popovers().len(), 5, "One instance per marked element");

    page.hover("#s1").unwrap();
    assert_eq!(page.popovers().len(), 5, "Re-hover must not duplicate");
}

#[test]
fn test_inserted_marked_root_is_armed_itself() {
    let mut page = page(r#"<div id="main">start</div>"#);

    page.insert_markup("#main", r#"<span id="new" data-tooltip-content="Fresh"/>"#)
        .unwrap();

    hover_and_wait(&mut page, "#new");
    assert!(page.instance_for("#new").unwrap().is_some());
}

#[test]
fn test_insert_plus_edit_in_one_batch_yields_one_instance() {
    let mut page = page(r#"<div id="main">start</div>"#);

    page.insert_markup("#main", r#"<span id="new" data-tooltip-content="One"/>"#)
        .unwrap();
    page.set_attribute("#new", "data-tooltip-content", "Two").unwrap();
    page.flush();

    hover_and_wait(&mut page, "#new");
    assert_eq!(page.popovers().len(), 1, "Arming and eager attach must not double up");
    let id = page.instance_for("#new").unwrap().unwrap();
    assert_eq!(
        page.popovers().instance(id).unwrap().content().as_text(),
        Some("Two")
    );
}

#[test]
fn test_attachment_writes_do_not_feed_back_into_the_watcher() {
    // Migrating a title writes the watched attributes. Those writes happen
    // while the watcher is detached from the stream, so one flush settles
    // everything; this would otherwise spin forever.
    let mut page = page(r#"<span id="t" title="Native" data-tooltip-content="Marker"/>"#);

    page.hover("#t").unwrap();
    page.flush();
    page.flush();

    assert_eq!(page.popovers().len(), 1);
    let id = page.instance_for("#t").unwrap().unwrap();
    assert_eq!(
        page.popovers().instance(id).unwrap().content().as_text(),
        Some("Native")
    );
}

#[test]
fn test_title_edit_rederives_content() {
    let mut page = page(r#"<span id="t" data-tooltip-content="Marker"/>"#);

    hover_and_wait(&mut page, "#t");
    let id = page.instance_for("#t").unwrap().unwrap();

    page.set_attribute("#t", "title", "Fresh title").unwrap();
    page.flush();
    assert_eq!(
        page.popovers().instance(id).unwrap().content().as_text(),
        Some("Fresh title"),
        "A new title migrates over the old content"
    );
}

#[test]
fn test_removed_subtree_stops_producing_tooltips() {
    let mut page = page(
        r#"<div id="box"><span id="t" data-tooltip-content="Hi"/></div><span id="away">x</span>"#,
    );

    page.remove("#box").unwrap();
    page.flush();

    assert!(
        page.element("#t").is_err(),
        "Selector resolution only sees attached elements"
    );
    assert!(page.popovers().is_empty());
}
