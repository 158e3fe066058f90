#![allow(dead_code)] // Shared across the integration tests; each binary uses a subset.

use core_layout::{Laymgr, LayoutId};
use core_terminal::TestSurface;
use core_window::{HandlerId, Ui, WindowFlags, WindowId};

pub fn fixture(cols: i32, rows: i32) -> (Ui<TestSurface>, Laymgr<TestSurface>) {
    let mut ui = Ui::new(TestSurface::new(cols, rows)).expect("test surface init");
    let lm = Laymgr::new(&mut ui, None);
    (ui, lm)
}

/// A plain client window parented on the root; the layout engine will
/// position it.
pub fn client(ui: &mut Ui<TestSurface>) -> WindowId {
    ui.create_window(ui.root(), None, HandlerId::NULL, 0, WindowFlags::empty())
        .expect("client window")
}

/// Pump the message loop until idle, running deferred layout updates and
/// the paint pass.
pub fn drain(ui: &mut Ui<TestSurface>) {
    while let Some(msg) = ui.get_message() {
        ui.dispatch(msg);
    }
}

/// Recursive structural invariants over the public inspection API.
pub fn check_invariants(ui: &Ui<TestSurface>, lm: &Laymgr<TestSurface>, lay: LayoutId) {
    if !lm.is_container(lay) {
        return;
    }
    let kids = lm.children(lay);
    if lay != lm.root() {
        assert!(kids.len() >= 2, "non-root containers keep >= 2 children");
    }
    assert!(
        !lm.has_splitter(kids[0]),
        "first child never has a splitter"
    );
    let rc = lm.layout_rect(ui, lay);
    let extent = if lm.is_vert(lay) {
        rc.width()
    } else {
        rc.height()
    };
    let sum: i32 = kids
        .iter()
        .map(|k| lm.size(*k) + lm.has_splitter(*k) as i32)
        .sum();
    assert_eq!(sum, extent, "child sizes + splitters sum to the extent");
    let pct_sum: f32 = kids.iter().map(|k| lm.pct(*k)).sum();
    assert!(
        (pct_sum - 1.0).abs() < 1e-4,
        "sibling percentages sum to 1 (got {pct_sum})"
    );
    for k in kids {
        check_invariants(ui, lm, k);
    }
}
