//! `set_pos` protocol: clipping, refusal, descendant translation,
//! `WM_POSCHANGED` payloads.

mod common;

use common::*;
use core_geometry::Rect;
use core_window::{HandlerId, MessageData, WM_POSCHANGED};

#[test]
fn fully_offscreen_move_is_refused() {
    let mut ui = new_ui(80, 24);
    let root = ui.root();
    let w = ui
        .create_window(root, Some(Rect::sized(0, 0, 10, 5)), HandlerId::NULL, 0, leaf_flags())
        .unwrap();
    assert!(!ui.set_pos(w, Rect::sized(100, 0, 10, 5)));
    assert_eq!(ui.rect(w), Rect::sized(0, 0, 10, 5));
}

#[test]
fn partially_offscreen_move_clips() {
    let mut ui = new_ui(80, 24);
    let root = ui.root();
    let w = ui
        .create_window(root, Some(Rect::sized(0, 0, 20, 5)), HandlerId::NULL, 0, leaf_flags())
        .unwrap();
    assert!(ui.set_pos(w, Rect::sized(70, 0, 20, 5)));
    assert_eq!(ui.rect(w), Rect::new(70, 0, 80, 5));
}

#[test]
fn unchanged_rect_is_accepted_silently() {
    let mut ui = new_ui(80, 24);
    let log = new_log();
    let h = record_handler(&mut ui, &log, "w");
    let root = ui.root();
    let w = ui
        .create_window(root, Some(Rect::sized(3, 3, 10, 5)), h, 0, leaf_flags())
        .unwrap();
    log.borrow_mut().clear();
    assert!(ui.set_pos(w, Rect::sized(3, 3, 10, 5)));
    assert_eq!(count(&log, "w", WM_POSCHANGED), 0);
}

#[test]
fn poschanged_carries_parent_relative_rects_and_resized_flag() {
    let mut ui = new_ui(80, 24);
    let log = new_log();
    let h = record_handler(&mut ui, &log, "w");
    let root = ui.root();
    let w = ui
        .create_window(root, Some(Rect::sized(0, 0, 10, 5)), h, 0, leaf_flags())
        .unwrap();
    log.borrow_mut().clear();

    // Pure move: resized = false.
    assert!(ui.set_pos(w, Rect::sized(5, 2, 10, 5)));
    // Grow: resized = true.
    assert!(ui.set_pos(w, Rect::sized(5, 2, 12, 6)));

    let changes: Vec<_> = log
        .borrow()
        .iter()
        .filter_map(|(_, id, data)| match (id, data) {
            (&WM_POSCHANGED, MessageData::PosChanged { old, new, resized }) => {
                Some((*old, *new, *resized))
            }
            _ => None,
        })
        .collect();
    assert_eq!(
        changes,
        vec![
            (Rect::sized(0, 0, 10, 5), Rect::sized(5, 2, 10, 5), false),
            (Rect::sized(5, 2, 10, 5), Rect::sized(5, 2, 12, 6), true),
        ]
    );
}

#[test]
fn moving_a_window_translates_descendants() {
    let mut ui = new_ui(80, 24);
    let log = new_log();
    let hc = record_handler(&mut ui, &log, "child");
    let root = ui.root();
    let p = ui
        .create_window(root, Some(Rect::sized(5, 5, 20, 10)), HandlerId::NULL, 0, leaf_flags())
        .unwrap();
    let c = ui
        .create_window(p, Some(Rect::new(2, 1, 8, 4)), hc, 0, leaf_flags())
        .unwrap();
    assert_eq!(ui.screen_rect(c), Rect::new(7, 6, 13, 9));
    log.borrow_mut().clear();

    assert!(ui.set_pos(p, Rect::sized(10, 8, 20, 10)));
    // Child keeps its parent-relative rect; screen rect follows the delta.
    assert_eq!(ui.rect(c), Rect::new(2, 1, 8, 4));
    assert_eq!(ui.screen_rect(c), Rect::new(12, 9, 18, 12));
    // Pure translation dispatches no WM_POSCHANGED to the descendant.
    assert_eq!(count(&log, "child", WM_POSCHANGED), 0);
}

#[test]
fn root_resize_cascades_with_resized_flag() {
    let mut ui = new_ui(80, 24);
    let log = new_log();
    let h = record_handler(&mut ui, &log, "root");
    let root = ui.root();
    ui.set_handler(root, h);
    ui.surface_mut().set_size(100, 30);
    ui.resize().unwrap();
    assert_eq!(ui.screen_rect(root), Rect::sized(0, 0, 100, 30));
    let changes: Vec<_> = log
        .borrow()
        .iter()
        .filter_map(|(_, id, data)| match (id, data) {
            (&WM_POSCHANGED, MessageData::PosChanged { old, new, resized }) => {
                Some((*old, *new, *resized))
            }
            _ => None,
        })
        .collect();
    assert_eq!(
        changes,
        vec![(Rect::sized(0, 0, 80, 24), Rect::sized(0, 0, 100, 30), true)]
    );
}

#[test]
fn resize_with_unchanged_size_is_a_noop() {
    let mut ui = new_ui(80, 24);
    let log = new_log();
    let h = record_handler(&mut ui, &log, "root");
    let root = ui.root();
    ui.set_handler(root, h);
    ui.resize().unwrap();
    assert_eq!(count(&log, "root", WM_POSCHANGED), 0);
}
