//! Deferred paint scheduling: invalidate cascade, paint ordering, flush.

mod common;

use common::*;
use core_geometry::Rect;
use core_terminal::{Style, TestSurface};
use core_window::{MessageData, Ui, WM_PAINT};

#[test]
fn invalidate_root_paints_children_in_insertion_order() {
    let mut ui = new_ui(80, 24);
    let log = new_log();
    let hl = record_handler(&mut ui, &log, "L");
    let hr = record_handler(&mut ui, &log, "R");
    let root = ui.root();
    ui.create_window(root, Some(Rect::sized(0, 0, 40, 24)), hl, 0, leaf_flags())
        .unwrap();
    ui.create_window(root, Some(Rect::sized(40, 0, 40, 24)), hr, 0, leaf_flags())
        .unwrap();
    drain(&mut ui);
    log.borrow_mut().clear();
    let flushes_before = ui.surface().flush_count;

    ui.invalidate(root);
    drain(&mut ui);

    // Both children painted exactly once, L before R, then one flush.
    assert_eq!(count(&log, "L", WM_PAINT), 1);
    assert_eq!(count(&log, "R", WM_PAINT), 1);
    let paints: Vec<_> = sequence(&log)
        .into_iter()
        .filter(|(_, id)| *id == WM_PAINT)
        .collect();
    assert_eq!(
        paints,
        vec![("L".to_string(), WM_PAINT), ("R".to_string(), WM_PAINT)]
    );
    assert_eq!(ui.surface().flush_count, flushes_before + 1);
}

#[test]
fn paint_clip_covers_the_window() {
    let mut ui = new_ui(80, 24);
    let log = new_log();
    let h = record_handler(&mut ui, &log, "w");
    let root = ui.root();
    ui.create_window(root, Some(Rect::sized(5, 5, 30, 10)), h, 0, leaf_flags())
        .unwrap();
    drain(&mut ui);
    let clip = log
        .borrow()
        .iter()
        .find_map(|(_, id, data)| match (id, data) {
            (&WM_PAINT, MessageData::Paint { clip }) => Some(*clip),
            _ => None,
        })
        .expect("a paint was dispatched");
    assert_eq!(clip, Rect::sized(0, 0, 30, 10));
}

#[test]
fn hidden_windows_are_not_painted() {
    let mut ui = new_ui(80, 24);
    let log = new_log();
    let h = record_handler(&mut ui, &log, "w");
    let root = ui.root();
    let w = ui
        .create_window(root, Some(Rect::sized(0, 0, 10, 5)), h, 0, leaf_flags())
        .unwrap();
    drain(&mut ui);
    log.borrow_mut().clear();

    ui.set_visible(w, false);
    ui.invalidate(w);
    drain(&mut ui);
    assert_eq!(count(&log, "w", WM_PAINT), 0);
}

#[test]
fn painted_content_reaches_the_screen_after_flush() {
    let mut ui = new_ui(20, 4);
    let root = ui.root();
    let h = ui.handler_create(
        |ui: &mut Ui<TestSurface>, id: u32, data: &mut MessageData| {
            if id == WM_PAINT {
                if let MessageData::Paint { .. } = data {
                    let w = ui.focus().expect("focused in test");
                    ui.erase(w, Style::default());
                    ui.draw_text(w, 0, 0, "hello", Style::default());
                }
            }
            0u64
        },
    );
    let w = ui
        .create_window(root, Some(Rect::sized(2, 1, 10, 1)), h, 0, leaf_flags())
        .unwrap();
    ui.set_focus(Some(w));
    drain(&mut ui);
    assert_eq!(&ui.surface().row(1)[2..7], "hello");
}

#[test]
fn idle_without_damage_does_not_flush() {
    let mut ui = new_ui(20, 4);
    drain(&mut ui);
    let flushes = ui.surface().flush_count;
    drain(&mut ui);
    drain(&mut ui);
    assert_eq!(ui.surface().flush_count, flushes);
}
