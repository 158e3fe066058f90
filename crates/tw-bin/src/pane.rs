//! Demo panes: a container window holding a content area and a one-row
//! status bar, wired to layout commands.
//!
//! Keyboard commands (delivered to the focused pane):
//! * Ctrl-S / Ctrl-V — split below / to the right
//! * Ctrl-X — close the pane
//! * Ctrl-Q — quit
//! * Tab / Shift-Tab — cycle panes in order
//! * Alt-arrows — directional navigation
//! * Ctrl-arrows — push the matching edge outward one cell

use crate::app::App;
use anyhow::Result;
use core_events::{Key, Modifiers};
use core_geometry::Rect;
use core_layout::{Dir, SIZE_HALF};
use core_terminal::{Style, StyleFlags, TermSurface};
use core_window::{
    HandlerId, MessageData, Ui, WM_CHAR, WM_DESTROY, WM_GETMINSIZE, WM_KEY, WM_LOSEFOCUS,
    WM_PAINT, WM_POSCHANGED, WM_SETFOCUS, WindowFlags, WindowId,
};
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use tracing::debug;

pub struct Pane {
    app: Weak<App>,
    w: Cell<WindowId>,
    client: Cell<WindowId>,
    status: Cell<WindowId>,
    h: Cell<HandlerId>,
    client_h: Cell<HandlerId>,
    status_h: Cell<HandlerId>,
    title: RefCell<String>,
}

impl Pane {
    /// Build the pane window tree under the layout host. The pane window
    /// itself is a container; the layout engine positions it and the pane
    /// positions its two children.
    pub fn create(ui: &mut Ui<TermSurface>, app: &Rc<App>) -> Result<Rc<Pane>> {
        let n = app.next_pane_number();
        let pane = Rc::new(Pane {
            app: Rc::downgrade(app),
            w: Cell::new(WindowId::NULL),
            client: Cell::new(WindowId::NULL),
            status: Cell::new(WindowId::NULL),
            h: Cell::new(HandlerId::NULL),
            client_h: Cell::new(HandlerId::NULL),
            status_h: Cell::new(HandlerId::NULL),
            title: RefCell::new(format!("pane {n}")),
        });

        let host = app.lm.host();
        let h = {
            let pane = pane.clone();
            ui.handler_create(
                move |ui: &mut Ui<TermSurface>, id: u32, data: &mut MessageData| {
                    pane.on_pane(ui, id, data)
                },
            )
        };
        pane.h.set(h);
        let w = ui.create_window(host, None, h, 0, WindowFlags::CONTAINER)?;
        pane.w.set(w);

        let client_h = {
            let pane = pane.clone();
            ui.handler_create(
                move |ui: &mut Ui<TermSurface>, id: u32, data: &mut MessageData| {
                    pane.on_client(ui, id, data)
                },
            )
        };
        pane.client_h.set(client_h);
        let client = ui.create_window(w, None, client_h, 1, WindowFlags::empty())?;
        pane.client.set(client);

        let status_h = {
            let pane = pane.clone();
            ui.handler_create(
                move |ui: &mut Ui<TermSurface>, id: u32, data: &mut MessageData| {
                    pane.on_status(ui, id, data)
                },
            )
        };
        pane.status_h.set(status_h);
        let status = ui.create_window(w, None, status_h, 2, WindowFlags::empty())?;
        pane.status.set(status);

        debug!(target: "pane", ?w, title = pane.title.borrow().as_str(), "pane created");
        Ok(pane)
    }

    pub fn window(&self) -> WindowId {
        self.w.get()
    }

    fn on_pane(&self, ui: &mut Ui<TermSurface>, id: u32, data: &mut MessageData) -> u64 {
        match id {
            WM_POSCHANGED => {
                if let MessageData::PosChanged { new, resized: true, .. } = data {
                    let (width, height) = (new.width(), new.height());
                    ui.set_pos(
                        self.client.get(),
                        Rect::sized(0, 0, width, (height - 1).max(1)),
                    );
                    ui.set_pos(self.status.get(), Rect::new(0, height - 1, width, height));
                }
            }
            WM_GETMINSIZE => {
                if let Some(app) = self.app.upgrade() {
                    *data = MessageData::MinSize {
                        width: app.config.pane_min_width,
                        height: app.config.pane_min_height,
                    };
                }
            }
            WM_SETFOCUS | WM_LOSEFOCUS => ui.invalidate(self.w.get()),
            WM_CHAR => {
                if let MessageData::Char { ch, mods } = data {
                    self.on_char(ui, *ch, *mods);
                }
            }
            WM_KEY => {
                if let MessageData::Key { key, mods } = data {
                    self.on_key(ui, *key, *mods);
                }
            }
            WM_DESTROY => {
                ui.handler_destroy(self.h.get());
            }
            _ => {}
        }
        0
    }

    fn on_client(&self, ui: &mut Ui<TermSurface>, id: u32, _data: &mut MessageData) -> u64 {
        match id {
            WM_PAINT => {
                let w = self.client.get();
                let (cx, cy) = ui.window_size(w);
                ui.erase(w, Style::default());
                let text = format!("{cx}x{cy}");
                let x = ((cx - text.len() as i32) / 2).max(0);
                let y = (cy / 2).max(0);
                ui.draw_text(w, x, y, &text, Style::default());
            }
            WM_DESTROY => {
                ui.handler_destroy(self.client_h.get());
            }
            _ => {}
        }
        0
    }

    fn on_status(&self, ui: &mut Ui<TermSurface>, id: u32, _data: &mut MessageData) -> u64 {
        match id {
            WM_PAINT => {
                let w = self.status.get();
                ui.erase(w, Style::reverse());
                let focused = ui.focus() == Some(self.w.get());
                let title = self.title.borrow().clone();
                if focused {
                    let text = format!("{title} - focus");
                    let style = Style::new(StyleFlags::REVERSE | StyleFlags::BOLD);
                    ui.draw_text(w, 0, 0, &text, style);
                } else {
                    ui.draw_text(w, 0, 0, &title, Style::reverse());
                }
            }
            WM_DESTROY => {
                ui.handler_destroy(self.status_h.get());
            }
            _ => {}
        }
        0
    }

    fn on_char(&self, ui: &mut Ui<TermSurface>, ch: char, mods: Modifiers) {
        if !mods.contains(Modifiers::CTRL) {
            return;
        }
        match ch {
            's' => self.split(ui, Dir::Down),
            'v' => self.split(ui, Dir::Right),
            'x' => self.close(ui),
            'q' => ui.post_quit(),
            _ => {}
        }
    }

    fn on_key(&self, ui: &mut Ui<TermSurface>, key: Key, mods: Modifiers) {
        let dir = match key {
            Key::Left => Some(Dir::Left),
            Key::Up => Some(Dir::Up),
            Key::Right => Some(Dir::Right),
            Key::Down => Some(Dir::Down),
            _ => None,
        };
        match (key, dir) {
            (Key::Tab, _) => self.cycle(ui, !mods.contains(Modifiers::SHIFT)),
            (_, Some(dir)) if mods.contains(Modifiers::ALT) => self.navigate(ui, dir),
            (_, Some(dir)) if mods.contains(Modifiers::CTRL) => self.push_edge(ui, dir),
            _ => {}
        }
    }

    fn split(&self, ui: &mut Ui<TermSurface>, dir: Dir) {
        let Some(app) = self.app.upgrade() else { return };
        let Some(lay) = app.lm.find(self.w.get()) else { return };
        // Side-by-side splits get a splitter line (configurable); stacked
        // panes are already separated by status bars.
        let splitter = dir.is_vert() && app.config.splitters;
        let pane = match Pane::create(ui, &app) {
            Ok(p) => p,
            Err(e) => {
                debug!(target: "pane", error = %e, "pane creation failed");
                return;
            }
        };
        match app.lm.split(ui, lay, pane.window(), splitter, SIZE_HALF, dir) {
            Some(_) => ui.set_focus(Some(pane.window())),
            None => {
                debug!(target: "pane", "split refused");
                ui.destroy(pane.window());
            }
        }
    }

    fn close(&self, ui: &mut Ui<TermSurface>) {
        let Some(app) = self.app.upgrade() else { return };
        let Some(lay) = app.lm.find(self.w.get()) else { return };
        let next = app.lm.navigate_ordered(lay, true);
        if next == lay {
            return; // last pane stays
        }
        let next_w = app.lm.window(next);
        app.lm.close(ui, lay);
        ui.destroy(self.w.get());
        ui.set_focus(next_w);
    }

    fn cycle(&self, ui: &mut Ui<TermSurface>, forward: bool) {
        let Some(app) = self.app.upgrade() else { return };
        let Some(lay) = app.lm.find(self.w.get()) else { return };
        let next = app.lm.navigate_ordered(lay, forward);
        if let Some(w) = app.lm.window(next) {
            ui.set_focus(Some(w));
        }
    }

    fn navigate(&self, ui: &mut Ui<TermSurface>, dir: Dir) {
        let Some(app) = self.app.upgrade() else { return };
        let Some(lay) = app.lm.find(self.w.get()) else { return };
        let (cx, cy) = ui.window_size(self.w.get());
        let target = app.lm.navigate_dir(ui, lay, cx / 2, cy / 2, dir);
        if let Some(w) = target.and_then(|t| app.lm.window(t)) {
            ui.set_focus(Some(w));
        }
    }

    fn push_edge(&self, ui: &mut Ui<TermSurface>, dir: Dir) {
        let Some(app) = self.app.upgrade() else { return };
        let Some(lay) = app.lm.find(self.w.get()) else { return };
        let delta = if dir.is_prev() { -1 } else { 1 };
        app.lm.move_edge(ui, lay, delta, dir);
    }
}
