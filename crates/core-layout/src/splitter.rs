//! Splitter windows: one-cell separator lines owned by non-first layout
//! children. A splitter is an ordinary leaf window on the host; it paints
//! a box-drawing line matching its orientation.

use core_terminal::{Style, Surface, symbols};
use core_window::{MessageData, Ui, WM_PAINT, WindowFlags, WindowId};
use std::cell::Cell;
use std::rc::Rc;
use tracing::warn;

pub(crate) struct SplitterWin {
    pub w: WindowId,
    pub h: core_window::HandlerId,
}

pub(crate) fn create_splitter<S: Surface + 'static>(
    ui: &mut Ui<S>,
    host: WindowId,
) -> Option<SplitterWin> {
    // The handler needs its own window id, which does not exist until the
    // window is created; the shared cell closes the loop.
    let slot: Rc<Cell<WindowId>> = Rc::new(Cell::new(WindowId::NULL));
    let slot_for_handler = slot.clone();
    let h = ui.handler_create(
        move |ui: &mut Ui<S>, id: u32, _data: &mut MessageData| {
            if id == WM_PAINT {
                let w = slot_for_handler.get();
                if !w.is_null() {
                    paint_splitter(ui, w);
                }
            }
            0u64
        },
    );
    match ui.create_window(host, None, h, 0, WindowFlags::empty()) {
        Ok(w) => {
            slot.set(w);
            Some(SplitterWin { w, h })
        }
        Err(e) => {
            warn!(target: "laymgr", error = %e, "splitter window refused");
            ui.handler_destroy(h);
            None
        }
    }
}

fn paint_splitter<S: Surface + 'static>(ui: &mut Ui<S>, w: WindowId) {
    let (width, height) = ui.window_size(w);
    ui.erase(w, Style::default());
    if width == 1 {
        ui.draw_vline(w, 0, 0, height, symbols::VLINE, Style::default());
    }
    if height == 1 {
        ui.draw_hline(w, 0, 0, width, symbols::HLINE, Style::bold());
    }
}
