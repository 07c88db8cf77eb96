//! Tests for cursor-following tooltip positions.

mod common;

use common::{hover_and_wait, page};
use tipsim::popover::FollowCursor;

#[test]
fn test_follow_cursor_always_tracks_both_axes() {
    let mut page = page(
        r#"<span id="t" data-tooltip-content="Hi" data-tooltip-follow-cursor="true"/>"#,
    );

    page.move_mouse_to(10.0, 20.0);
    hover_and_wait(&mut page, "#t");
    let id = page.instance_for("#t").unwrap().unwrap();
    let inst = page.popovers().instance(id).unwrap();
    assert_eq!(inst.props().follow_cursor, FollowCursor::Always);
    assert_eq!(inst.position(), Some((10.0, 20.0)));

    page.move_mouse_to(30.0, 40.0);
    assert_eq!(
        page.popovers().instance(id).unwrap().position(),
        Some((30.0, 40.0))
    );
}

#[test]
fn test_follow_cursor_horizontal_freezes_y() {
    let mut page = page(
        r#"<span id="t" data-tooltip-content="Hi" data-tooltip-follow-cursor="horizontal"/>"#,
    );

    page.move_mouse_to(10.0, 20.0);
    hover_and_wait(&mut page, "#t");
    let id = page.instance_for("#t").unwrap().unwrap();

    page.move_mouse_to(30.0, 40.0);
    assert_eq!(
        page.popovers().instance(id).unwrap().position(),
        Some((30.0, 20.0)),
        "Horizontal mode tracks x and keeps the show-time y"
    );
}

#[test]
fn test_follow_cursor_vertical_freezes_x() {
    let mut page = page(
        r#"<span id="t" data-tooltip-content="Hi" data-tooltip-follow-cursor="vertical"/>"#,
    );

    page.move_mouse_to(10.0, 20.0);
    hover_and_wait(&mut page, "#t");
    let id = page.instance_for("#t").unwrap().unwrap();

    page.move_mouse_to(30.0, 40.0);
    assert_eq!(
        page.popovers().instance(id).unwrap().position(),
        Some((10.0, 40.0))
    );
}

#[test]
fn test_follow_cursor_initial_freezes_at_show_point() {
    let mut page = page(
        r#"<span id="t" data-tooltip-content="Hi" data-tooltip-follow-cursor="initial"/>"#,
    );

    page.move_mouse_to(10.0, 20.0);
    hover_and_wait(&mut page, "#t");
    let id = page.instance_for("#t").unwrap().unwrap();

    page.move_mouse_to(99.0, 99.0);
    assert_eq!(
        page.popovers().instance(id).unwrap().position(),
        Some((10.0, 20.0))
    );
}

#[test]
fn test_no_follow_cursor_means_no_position() {
    let mut page = page(r#"<span id="t" data-tooltip-content="Hi"/>"#);

    page.move_mouse_to(10.0, 20.0);
    hover_and_wait(&mut page, "#t");
    let id = page.instance_for("#t").unwrap().unwrap();
    assert_eq!(page.popovers().instance(id).unwrap().position(), None);
}

#[test]
fn test_position_clears_on_hide() {
    let mut page = page(
        r#"<span id="t" data-tooltip-content="Hi" data-tooltip-follow-cursor="true"/><span id="away">x</span>"#,
    );

    page.move_mouse_to(5.0, 5.0);
    hover_and_wait(&mut page, "#t");
    let id = page.instance_for("#t").unwrap().unwrap();
    assert!(page.popovers().instance(id).unwrap().position().is_some());

    page.hover("#away").unwrap();
    assert_eq!(page.popovers().instance(id).unwrap().position(), None);
}
