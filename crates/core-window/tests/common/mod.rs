#![allow(dead_code)] // Shared across the integration tests; each binary uses a subset.

use core_terminal::TestSurface;
use core_window::{Handler, HandlerId, MessageData, Ui, WindowFlags, WindowId};
use std::cell::RefCell;
use std::rc::Rc;

pub type Log = Rc<RefCell<Vec<(String, u32, MessageData)>>>;

pub fn new_ui(cols: i32, rows: i32) -> Ui<TestSurface> {
    Ui::new(TestSurface::new(cols, rows)).expect("test surface init")
}

pub fn new_log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

/// A handler that appends `(tag, id, data)` to the shared log.
pub fn recorder(
    log: Log,
    tag: &str,
) -> impl Handler<TestSurface> + 'static {
    let tag = tag.to_string();
    move |_ui: &mut Ui<TestSurface>, id: u32, data: &mut MessageData| {
        log.borrow_mut().push((tag.clone(), id, data.clone()));
        0u64
    }
}

pub fn record_handler(ui: &mut Ui<TestSurface>, log: &Log, tag: &str) -> HandlerId {
    ui.handler_create(recorder(log.clone(), tag))
}

/// Pump the message loop until idle (this also runs the deferred paint
/// pass via the readable hook).
pub fn drain(ui: &mut Ui<TestSurface>) {
    while let Some(msg) = ui.get_message() {
        ui.dispatch(msg);
    }
}

pub fn leaf_flags() -> WindowFlags {
    WindowFlags::empty()
}

/// Ids of log entries recorded for `tag` with message id `id`.
pub fn count(log: &Log, tag: &str, id: u32) -> usize {
    log.borrow()
        .iter()
        .filter(|(t, i, _)| t == tag && *i == id)
        .count()
}

/// The `(tag, id)` sequence of the log, for ordering assertions.
pub fn sequence(log: &Log) -> Vec<(String, u32)> {
    log.borrow().iter().map(|(t, i, _)| (t.clone(), *i)).collect()
}

pub fn first_created(log: &Log, tag: &str) -> Option<WindowId> {
    log.borrow().iter().find_map(|(t, id, data)| {
        if t == tag && *id == core_window::WM_CREATE {
            if let MessageData::Create { w } = data {
                return Some(*w);
            }
        }
        None
    })
}
