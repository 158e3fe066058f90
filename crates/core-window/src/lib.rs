//! Retained-mode window tree over an abstract terminal surface.
//!
//! [`Ui`] is the single-threaded context that owns everything: the window
//! arena, the handler arena, the message queue, focus, and the surface.
//! Handlers receive `&mut Ui` re-entrantly, so no handler may block; any
//! deferred work is posted back onto the queue.
//!
//! Painting is deferred to message-queue idle. `get_message` invokes the
//! readable hook when the queue drains; the built-in hook repaints one
//! invalid visible leaf per iteration in pre-order and flushes the virtual
//! screen once nothing is left. Windows are damage-tracked at window
//! granularity only.

mod handler;
mod message;

pub use handler::Handler;
pub use message::{
    HandlerId, MM_READABLE, MM_USER, Message, MessageData, WM_CHAR, WM_CREATE, WM_DESTROY,
    WM_GETMINSIZE, WM_KEY, WM_LOSEFOCUS, WM_PAINT, WM_POSCHANGED, WM_QUIT, WM_SETFOCUS, WM_USER,
    WindowId,
};

use anyhow::{Context, Result, bail};
use core_events::{HandleTable, Key, MessageQueue, Modifiers};
use core_geometry::Rect;
use core_terminal::{CellBufId, Style, Surface};
use crossbeam_channel::Receiver;
use std::rc::Rc;
use tracing::{debug, trace, warn};

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
    pub struct WindowFlags: u32 {
        /// No backing cell buffer; the window is fully covered by
        /// descendant leaves and is never painted.
        const CONTAINER = 1;
        /// Start hidden.
        const HIDDEN = 2;
    }
}

#[derive(Debug)]
struct Window {
    parent: Option<WindowId>,
    next: Option<WindowId>,
    first_child: Option<WindowId>,
    /// Screen coordinates, clipped to the root.
    rect: Rect,
    visible: bool,
    invalid: bool,
    id: i32,
    handler: HandlerId,
    buf: Option<CellBufId>,
}

/// Window-manager context. One per terminal; single-threaded.
pub struct Ui<S: Surface> {
    surface: S,
    windows: HandleTable<Window>,
    handlers: HandleTable<Rc<dyn Handler<S>>>,
    queue: MessageQueue<Message>,
    root: WindowId,
    focus: Option<WindowId>,
    invalid: bool,
    readable_hook: HandlerId,
}

impl<S: Surface + 'static> Ui<S> {
    /// Initialize the window manager: size the surface, create the root
    /// window wrapping the full screen, and register the paint scheduler
    /// as the queue's readable hook. On failure nothing is left behind
    /// (the surface is dropped with the error).
    pub fn new(mut surface: S) -> Result<Self> {
        let (cols, rows) = surface
            .refresh_size()
            .context("query terminal size at init")?;
        let screen = Rect::sized(0, 0, cols, rows);
        let buf = surface
            .alloc_cell_buf(screen)
            .context("allocate root cell buffer")?;

        let mut windows = HandleTable::new();
        let root = WindowId(windows.alloc(Window {
            parent: None,
            next: None,
            first_child: None,
            rect: screen,
            visible: true,
            invalid: false,
            id: 0,
            handler: HandlerId::NULL,
            buf: Some(buf),
        }));

        let mut ui = Self {
            surface,
            windows,
            handlers: HandleTable::new(),
            queue: MessageQueue::new(),
            root,
            focus: None,
            invalid: false,
            readable_hook: HandlerId::NULL,
        };
        let hook = ui.handler_create(|ui: &mut Ui<S>, id: u32, _data: &mut MessageData| {
            if id == MM_READABLE { ui.paint_pass() } else { 0 }
        });
        ui.readable_hook = hook;
        ui.invalidate(root);
        debug!(target: "winmgr", cols, rows, "initialized");
        Ok(ui)
    }

    /// Destroy the whole tree (dispatching `WM_DESTROY` bottom-up). The
    /// surface tears itself down when the `Ui` is dropped.
    pub fn shutdown(&mut self) {
        if !self.root.is_null() && self.win(self.root).is_some() {
            self.destroy(self.root);
        }
        self.root = WindowId::NULL;
    }

    pub fn root(&self) -> WindowId {
        self.root
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    // ---------------------------------------------------------------------
    // Handlers and messages
    // ---------------------------------------------------------------------

    pub fn handler_create(&mut self, h: impl Handler<S> + 'static) -> HandlerId {
        HandlerId(self.handlers.alloc(Rc::new(h)))
    }

    pub fn handler_destroy(&mut self, h: HandlerId) {
        self.handlers.free(h.0);
    }

    /// Invoke a handler synchronously. Null or stale handlers are a no-op
    /// returning 0.
    pub fn call_handler(&mut self, h: HandlerId, id: u32, data: &mut MessageData) -> u64 {
        let Some(f) = self.handlers.get(h.0).cloned() else {
            return 0;
        };
        f.handle(self, id, data)
    }

    /// Append a message to the queue.
    pub fn post(&mut self, target: HandlerId, id: u32, data: MessageData) {
        self.queue.post(Message { target, id, data });
    }

    /// Post `WM_QUIT` to the null handler; the application loop exits when
    /// it pops this message.
    pub fn post_quit(&mut self) {
        self.post(HandlerId::NULL, WM_QUIT, MessageData::None);
    }

    /// Pop the next message. Whenever the queue is observed empty the
    /// readable hook runs (this is where deferred painting happens); if the
    /// hook claims no further readiness the wakeup token is consumed so the
    /// outer selector blocks.
    pub fn get_message(&mut self) -> Option<Message> {
        let msg = self.queue.pop();
        if self.queue.is_empty() {
            let hook = self.readable_hook;
            let claimed = self.call_handler(hook, MM_READABLE, &mut MessageData::None) != 0;
            if !claimed && self.queue.is_empty() {
                self.queue.ack();
            }
        }
        msg
    }

    /// Route a popped message to its target handler.
    pub fn dispatch(&mut self, msg: Message) -> u64 {
        let mut data = msg.data;
        self.call_handler(msg.target, msg.id, &mut data)
    }

    /// Receiver the application selector blocks on.
    pub fn wake_receiver(&self) -> Receiver<()> {
        self.queue.wake_receiver()
    }

    /// Replace the readable hook, returning the previous one.
    pub fn set_readable_hook(&mut self, h: HandlerId) -> HandlerId {
        std::mem::replace(&mut self.readable_hook, h)
    }

    // ---------------------------------------------------------------------
    // Window tree
    // ---------------------------------------------------------------------

    fn win(&self, w: WindowId) -> Option<&Window> {
        self.windows.get(w.0)
    }

    fn win_mut(&mut self, w: WindowId) -> Option<&mut Window> {
        self.windows.get_mut(w.0)
    }

    fn children(&self, w: WindowId) -> Vec<WindowId> {
        let mut out = Vec::new();
        let mut cur = self.win(w).and_then(|x| x.first_child);
        while let Some(c) = cur {
            out.push(c);
            cur = self.win(c).and_then(|x| x.next);
        }
        out
    }

    /// Create a window. `rc` is parent-relative (`None` means 1×1 at the
    /// parent origin); the screen rectangle is clipped to the root before
    /// the backing buffer is allocated. Dispatches `WM_CREATE` and marks
    /// the new window invalid.
    pub fn create_window(
        &mut self,
        parent: WindowId,
        rc: Option<Rect>,
        handler: HandlerId,
        id: i32,
        flags: WindowFlags,
    ) -> Result<WindowId> {
        let Some(p) = self.win(parent) else {
            bail!("create_window: stale parent");
        };
        let (px, py) = (p.rect.left, p.rect.top);
        let rel = rc.unwrap_or_else(|| Rect::sized(0, 0, 1, 1));
        let screen_rc = rel.offset(px, py);
        let root_rect = self.win(self.root).expect("root is live").rect;
        let clipped = screen_rc.intersect(&root_rect);

        let buf = if flags.contains(WindowFlags::CONTAINER) {
            None
        } else {
            Some(
                self.surface
                    .alloc_cell_buf(clipped)
                    .context("allocate window cell buffer")?,
            )
        };

        let w = WindowId(self.windows.alloc(Window {
            parent: Some(parent),
            next: None,
            first_child: None,
            rect: clipped,
            visible: !flags.contains(WindowFlags::HIDDEN),
            invalid: false,
            id,
            handler,
            buf,
        }));
        self.append_child(parent, w);

        trace!(target: "winmgr", ?w, ?clipped, "window created");
        self.call_handler(handler, WM_CREATE, &mut MessageData::Create { w });
        self.invalidate(w);
        Ok(w)
    }

    fn append_child(&mut self, parent: WindowId, w: WindowId) {
        match self.win(parent).and_then(|p| p.first_child) {
            None => self.win_mut(parent).expect("parent is live").first_child = Some(w),
            Some(first) => {
                let mut tail = first;
                while let Some(next) = self.win(tail).and_then(|x| x.next) {
                    tail = next;
                }
                self.win_mut(tail).expect("tail is live").next = Some(w);
            }
        }
    }

    /// Destroy a window and all descendants: children first, then
    /// `WM_DESTROY`, then unlink and free.
    pub fn destroy(&mut self, w: WindowId) {
        if self.win(w).is_none() {
            return;
        }
        for c in self.children(w) {
            self.destroy(c);
        }
        let handler = self.win(w).expect("window is live").handler;
        self.call_handler(handler, WM_DESTROY, &mut MessageData::None);

        if self.focus == Some(w) {
            self.focus = None;
        }
        self.unlink(w);
        if let Some(buf) = self.win(w).and_then(|x| x.buf) {
            self.surface.free_cell_buf(buf);
        }
        self.windows.free(w.0);
        trace!(target: "winmgr", ?w, "window destroyed");
    }

    fn unlink(&mut self, w: WindowId) {
        let Some(parent) = self.win(w).and_then(|x| x.parent) else {
            return;
        };
        let next = self.win(w).and_then(|x| x.next);
        let first = self.win(parent).and_then(|p| p.first_child);
        if first == Some(w) {
            self.win_mut(parent).expect("parent is live").first_child = next;
            return;
        }
        let mut cur = first;
        while let Some(c) = cur {
            if self.win(c).and_then(|x| x.next) == Some(w) {
                self.win_mut(c).expect("sibling is live").next = next;
                return;
            }
            cur = self.win(c).and_then(|x| x.next);
        }
    }

    /// Linear search of direct children by application id.
    pub fn find_window(&self, parent: WindowId, id: i32) -> Option<WindowId> {
        self.children(parent)
            .into_iter()
            .find(|c| self.win(*c).map(|x| x.id) == Some(id))
    }

    /// Replace a window's handler, returning the previous one (subclass
    /// pattern: the new handler forwards explicitly to the old).
    pub fn set_handler(&mut self, w: WindowId, h: HandlerId) -> HandlerId {
        match self.win_mut(w) {
            Some(win) => std::mem::replace(&mut win.handler, h),
            None => HandlerId::NULL,
        }
    }

    pub fn window_handler(&self, w: WindowId) -> HandlerId {
        self.win(w).map(|x| x.handler).unwrap_or(HandlerId::NULL)
    }

    /// Parent-relative rectangle.
    pub fn rect(&self, w: WindowId) -> Rect {
        let Some(win) = self.win(w) else {
            return Rect::EMPTY;
        };
        match win.parent.and_then(|p| self.win(p)) {
            Some(p) => win.rect.offset(-p.rect.left, -p.rect.top),
            None => win.rect,
        }
    }

    /// Screen-coordinate rectangle.
    pub fn screen_rect(&self, w: WindowId) -> Rect {
        self.win(w).map(|x| x.rect).unwrap_or(Rect::EMPTY)
    }

    /// `(width, height)` of the window, for paint handlers.
    pub fn window_size(&self, w: WindowId) -> (i32, i32) {
        let rc = self.screen_rect(w);
        (rc.width(), rc.height())
    }

    pub fn is_visible(&self, w: WindowId) -> bool {
        self.win(w).map(|x| x.visible).unwrap_or(false)
    }

    pub fn set_visible(&mut self, w: WindowId, visible: bool) {
        let Some(win) = self.win_mut(w) else { return };
        if win.visible == visible {
            return;
        }
        win.visible = visible;
        if visible {
            self.invalidate(w);
        } else if let Some(parent) = self.win(w).and_then(|x| x.parent) {
            let rc = self.screen_rect(w);
            self.invalidate_screen_rect(parent, rc);
        }
    }

    /// Translate a point from `from`-local to `to`-local coordinates.
    pub fn map_point(&self, from: WindowId, to: WindowId, x: i32, y: i32) -> (i32, i32) {
        let f = self.screen_rect(from);
        let t = self.screen_rect(to);
        (x + f.left - t.left, y + f.top - t.top)
    }

    // ---------------------------------------------------------------------
    // Damage tracking and painting
    // ---------------------------------------------------------------------

    /// Mark the whole window as damaged.
    pub fn invalidate(&mut self, w: WindowId) {
        let rc = self.screen_rect(w);
        self.invalidate_screen_rect(w, rc);
    }

    /// Mark the part of `w` covered by `rc` (window-local) as damaged.
    pub fn invalidate_rect(&mut self, w: WindowId, rc: Rect) {
        let own = self.screen_rect(w);
        self.invalidate_screen_rect(w, rc.offset(own.left, own.top));
    }

    fn invalidate_screen_rect(&mut self, w: WindowId, rc: Rect) {
        // Clip up through every ancestor; bail if the area vanishes or any
        // ancestor is hidden.
        let mut area = rc;
        let mut cur = Some(w);
        while let Some(c) = cur {
            let Some(win) = self.win(c) else { return };
            if !win.visible {
                return;
            }
            area = area.intersect(&win.rect);
            if area.is_empty() {
                return;
            }
            cur = win.parent;
        }
        // Walk down marking every visible leaf that intersects.
        if self.mark_leaves(w, area) {
            self.invalid = true;
            self.queue.mark_readable();
        }
    }

    fn mark_leaves(&mut self, w: WindowId, area: Rect) -> bool {
        let Some(win) = self.win(w) else { return false };
        if !win.visible || area.intersect(&win.rect).is_empty() {
            return false;
        }
        if win.first_child.is_none() {
            if win.buf.is_some() {
                self.win_mut(w).expect("window is live").invalid = true;
                return true;
            }
            return false;
        }
        let mut marked = false;
        for c in self.children(w) {
            marked |= self.mark_leaves(c, area);
        }
        marked
    }

    /// Deferred paint pass, invoked via the readable hook at queue idle.
    /// One invalid visible leaf is painted per iteration, pre-order; when
    /// none remain the virtual screen is flushed. Returns 0 (no readiness
    /// claimed).
    pub fn paint_pass(&mut self) -> u64 {
        if !self.invalid {
            return 0;
        }
        loop {
            let Some(w) = self.find_invalid_leaf(self.root) else {
                if let Err(e) = self.surface.flush() {
                    warn!(target: "winmgr.paint", error = %e, "flush failed");
                }
                self.invalid = false;
                trace!(target: "winmgr.paint", "flush");
                return 0;
            };
            self.win_mut(w).expect("window is live").invalid = false;
            let (width, height) = self.window_size(w);
            let handler = self.window_handler(w);
            let mut data = MessageData::Paint {
                clip: Rect::sized(0, 0, width, height),
            };
            self.call_handler(handler, WM_PAINT, &mut data);
            if let Some(buf) = self.win(w).and_then(|x| x.buf) {
                self.surface.blit_to_virtual(buf);
            }
        }
    }

    fn find_invalid_leaf(&self, w: WindowId) -> Option<WindowId> {
        let win = self.win(w)?;
        if !win.visible {
            return None;
        }
        if win.first_child.is_none() {
            if win.invalid && win.buf.is_some() {
                return Some(w);
            }
            return None;
        }
        for c in self.children(w) {
            if let Some(found) = self.find_invalid_leaf(c) {
                return Some(found);
            }
        }
        None
    }

    // ---------------------------------------------------------------------
    // Geometry
    // ---------------------------------------------------------------------

    /// Move/resize a window. `rc` is parent-relative. Returns `false` when
    /// a non-root window clips to empty or the backing surface refuses the
    /// change; the old geometry then stays in effect.
    pub fn set_pos(&mut self, w: WindowId, rc: Rect) -> bool {
        let Some(win) = self.win(w) else { return false };
        let parent = win.parent;
        let old_screen = win.rect;
        let (px, py) = match parent.and_then(|p| self.win(p)) {
            Some(p) => (p.rect.left, p.rect.top),
            None => (0, 0),
        };
        let proposed = rc.offset(px, py);
        let new_screen = if parent.is_none() {
            proposed
        } else {
            let root_rect = self.win(self.root).expect("root is live").rect;
            let clipped = proposed.intersect(&root_rect);
            if clipped.is_empty() {
                return false;
            }
            clipped
        };
        if new_screen == old_screen {
            return true;
        }

        let moved =
            (new_screen.left, new_screen.top) != (old_screen.left, old_screen.top);
        let resized = new_screen.width() != old_screen.width()
            || new_screen.height() != old_screen.height();

        if let Some(buf) = self.win(w).and_then(|x| x.buf) {
            // Grow to the union first so the backend never sees a move that
            // leaves the buffer partially outside its old extent, then snap
            // to the final rectangle.
            if moved {
                let grown = old_screen.union(&new_screen);
                if let Err(e) = self.surface.move_resize(buf, grown) {
                    warn!(target: "winmgr", error = %e, "move_resize (grow) refused");
                    return false;
                }
            }
            if let Err(e) = self.surface.move_resize(buf, new_screen) {
                warn!(target: "winmgr", error = %e, "move_resize refused");
                return false;
            }
        }

        self.win_mut(w).expect("window is live").rect = new_screen;

        if moved {
            let dx = new_screen.left - old_screen.left;
            let dy = new_screen.top - old_screen.top;
            for c in self.children(w) {
                self.translate_tree(c, dx, dy);
            }
        }

        let damage = old_screen.union(&new_screen);
        let damage_target = parent.unwrap_or(w);
        self.invalidate_screen_rect(damage_target, damage);

        let old_rel = old_screen.offset(-px, -py);
        let new_rel = new_screen.offset(-px, -py);
        if old_rel != new_rel {
            let handler = self.window_handler(w);
            self.call_handler(
                handler,
                WM_POSCHANGED,
                &mut MessageData::PosChanged {
                    old: old_rel,
                    new: new_rel,
                    resized,
                },
            );
        }
        true
    }

    fn translate_tree(&mut self, w: WindowId, dx: i32, dy: i32) {
        let Some(win) = self.win_mut(w) else { return };
        win.rect = win.rect.offset(dx, dy);
        let rect = win.rect;
        let buf = win.buf;
        if let Some(buf) = buf {
            if let Err(e) = self.surface.move_resize(buf, rect) {
                warn!(target: "winmgr", error = %e, "translate refused");
            }
        }
        for c in self.children(w) {
            self.translate_tree(c, dx, dy);
        }
    }

    /// Re-query the terminal size and cascade a root geometry change
    /// through the tree. A no-op when the size is unchanged.
    pub fn resize(&mut self) -> Result<()> {
        let (cols, rows) = self
            .surface
            .refresh_size()
            .context("query terminal size on resize")?;
        let new_rect = Rect::sized(0, 0, cols, rows);
        if self.screen_rect(self.root) == new_rect {
            return Ok(());
        }
        debug!(target: "winmgr", cols, rows, "terminal resized");
        self.set_pos(self.root, new_rect);
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Focus and input
    // ---------------------------------------------------------------------

    /// Move keyboard focus. The previous holder gets `WM_LOSEFOCUS`, the
    /// new one `WM_SETFOCUS`; each carries the other window.
    pub fn set_focus(&mut self, w: Option<WindowId>) {
        if self.focus == w {
            return;
        }
        let old = std::mem::replace(&mut self.focus, w);
        if let Some(o) = old {
            let h = self.window_handler(o);
            self.call_handler(h, WM_LOSEFOCUS, &mut MessageData::FocusChange { other: w });
        }
        if let Some(n) = w {
            let h = self.window_handler(n);
            self.call_handler(h, WM_SETFOCUS, &mut MessageData::FocusChange { other: old });
        }
    }

    pub fn focus(&self) -> Option<WindowId> {
        self.focus
    }

    /// Post printable input to the focused window.
    pub fn send_char(&mut self, ch: char, mods: Modifiers) {
        let Some(target) = self.focus.map(|w| self.window_handler(w)) else {
            trace!(target: "winmgr.input", "char dropped: no focus");
            return;
        };
        self.post(target, WM_CHAR, MessageData::Char { ch, mods });
    }

    /// Post a non-character key to the focused window.
    pub fn send_key(&mut self, key: Key, mods: Modifiers) {
        let Some(target) = self.focus.map(|w| self.window_handler(w)) else {
            trace!(target: "winmgr.input", "key dropped: no focus");
            return;
        };
        self.post(target, WM_KEY, MessageData::Key { key, mods });
    }

    // ---------------------------------------------------------------------
    // Drawing passthroughs for paint handlers
    // ---------------------------------------------------------------------

    pub fn erase(&mut self, w: WindowId, style: Style) {
        if let Some(buf) = self.win(w).and_then(|x| x.buf) {
            self.surface.erase(buf, style);
        }
    }

    pub fn draw_text(&mut self, w: WindowId, x: i32, y: i32, text: &str, style: Style) {
        if let Some(buf) = self.win(w).and_then(|x| x.buf) {
            self.surface.put_text(buf, x, y, text, style);
        }
    }

    pub fn draw_hline(&mut self, w: WindowId, x: i32, y: i32, len: i32, ch: char, style: Style) {
        if let Some(buf) = self.win(w).and_then(|x| x.buf) {
            self.surface.hline(buf, x, y, len, ch, style);
        }
    }

    pub fn draw_vline(&mut self, w: WindowId, x: i32, y: i32, len: i32, ch: char, style: Style) {
        if let Some(buf) = self.win(w).and_then(|x| x.buf) {
            self.surface.vline(buf, x, y, len, ch, style);
        }
    }
}
