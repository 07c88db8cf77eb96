//! Markup loading, selector resolution, and live tree edits through the
//! page surface.

mod common;

use tipsim::{Error, Page};

#[test]
fn test_page_parses_markup_and_resolves_selectors() {
    let page = common::page(r#"<div id="app"><span id="label">hi</span></div>"#);

    let app = page.element("#app").unwrap();
    let label = page.element("#label").unwrap();
    assert_eq!(page.doc().tag(app), Some("div"));
    assert_eq!(page.doc().parent(label), Some(app));
    assert_eq!(page.doc().text_content(label), "hi");
}

#[test]
fn test_selector_without_hash_is_rejected() {
    let page = common::page(r#"<div id="app"/>"#);

    let err = page.element("app").unwrap_err();
    match err {
        Error::BadSelector(s) => assert_eq!(s, "app"),
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_unknown_id_is_not_found() {
    let page = common::page(r#"<div id="app"/>"#);

    let err = page.element("#missing").unwrap_err();
    assert!(matches!(err, Error::SelectorNotFound(_)), "got {err:?}");
}

#[test]
fn test_malformed_markup_is_an_error_not_a_panic() {
    let err = Page::from_markup("<div><span/>").unwrap_err();
    assert!(matches!(err, Error::UnclosedElement(_)), "got {err:?}");

    let err = Page::from_markup("<div><span></div>").unwrap_err();
    assert!(matches!(err, Error::Markup(_)), "got {err:?}");
}

#[test]
fn test_insert_markup_appends_under_target() {
    let mut page = common::page(r#"<div id="host"/>"#);

    let inserted = page
        .insert_markup("#host", r#"<p id="one"/><p id="two"/>"#)
        .unwrap();

    assert_eq!(inserted.len(), 2);
    let host = page.element("#host").unwrap();
    assert_eq!(page.doc().children(host), &inserted[..]);
    assert!(page.element("#two").is_ok());
}

#[test]
fn test_remove_detaches_subtree_and_rehomes_hover() {
    let mut page = common::page(
        r#"<div id="wrap"><div id="box"><span id="inner">x</span></div></div>"#,
    );
    page.hover("#inner").unwrap();
    let wrap = page.element("#wrap").unwrap();

    page.remove("#box").unwrap();

    // The pointer lands on the removed node's parent, with no leave events
    assert_eq!(page.hovered(), Some(wrap));
    assert!(matches!(
        page.element("#inner"),
        Err(Error::SelectorNotFound(_))
    ));
}

#[test]
fn test_load_reads_page_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("page.html");
    std::fs::write(&path, r#"<main id="root"><span id="s">ok</span></main>"#).unwrap();

    let page = Page::load(&path).unwrap();
    assert!(page.element("#s").is_ok());

    let err = Page::load(&dir.path().join("gone.html")).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn test_markup_serializes_current_tree() {
    let mut page = common::page(r#"<div id="app">a &amp; b</div>"#);

    let markup = page.markup();
    assert!(markup.contains("a &amp; b"), "entities re-escape: {markup}");

    page.set_attribute("#app", "class", "done").unwrap();
    assert!(page.markup().contains(r#"class="done""#));
}

#[test]
fn test_debug_format_summarizes_page_state() {
    let page = common::page(r#"<div id="app"/>"#);
    assert_eq!(
        format!("{page:?}"),
        "Page { popovers: 0, visible: [], hovered: None, now_ms: 0 }"
    );
}
