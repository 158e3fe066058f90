//! Recursive split-pane ("tiling") layout engine over the window tree.
//!
//! A [`Laymgr`] subdivides one host window into leaf panes separated by
//! one-cell splitter lines. Leaves hold client windows owned by the
//! caller; containers hold an ordered run of child layouts along one flow
//! axis. Structural operations (split, close, edge move) only touch the
//! tree and *schedule* a deferred update; the geometry is pushed onto the
//! window tree when the posted `LM_UPDATE` message is dispatched, so a
//! burst of changes coalesces into one reflow.
//!
//! Re-entrancy: the manager borrows its state for the duration of each
//! public call, and some operations dispatch messages (`WM_GETMINSIZE`,
//! `WM_POSCHANGED`) to client handlers while that borrow is held. Those
//! handlers must not call back into the same `Laymgr`.

mod dir;
mod engine;
mod splitter;

pub use dir::Dir;

use core_events::Handle;
use core_geometry::Rect;
use core_terminal::Surface;
use core_window::{MessageData, Ui, WM_POSCHANGED, WM_USER, WindowId};
use engine::LmState;
use std::cell::RefCell;
use std::marker::PhantomData;
use std::rc::Rc;
use tracing::trace;

/// Sentinel size: take half of the splittable extent.
pub const SIZE_HALF: i32 = -1;

/// Internal message the host handler uses for the deferred update pass.
pub const LM_UPDATE: u32 = WM_USER + 0x1000;

/// Default minimum leaf extent; a client may shrink it via
/// `WM_GETMINSIZE`.
pub const LAYOUT_MIN_WIDTH: i32 = 20;
pub const LAYOUT_MIN_HEIGHT: i32 = 2;

/// Identifier of a layout node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayoutId(pub(crate) Handle);

/// Manager of one layout tree subdividing a host window.
pub struct Laymgr<S: Surface> {
    state: Rc<RefCell<LmState>>,
    _surface: PhantomData<S>,
}

impl<S: Surface + 'static> Laymgr<S> {
    /// Install a layout manager on `host` (`None` = the root window). The
    /// host's handler is chained: geometry changes reach the manager
    /// first, then the previous handler.
    pub fn new(ui: &mut Ui<S>, host: Option<WindowId>) -> Self {
        let host = host.unwrap_or_else(|| ui.root());
        let state = Rc::new(RefCell::new(LmState::new(host)));

        let weak = Rc::downgrade(&state);
        let h = ui.handler_create(
            move |ui: &mut Ui<S>, id: u32, data: &mut MessageData| {
                let Some(state) = weak.upgrade() else { return 0 };
                match id {
                    WM_POSCHANGED => {
                        if let MessageData::PosChanged {
                            old,
                            new,
                            resized: true,
                        } = data
                        {
                            let (old, new) = (*old, *new);
                            {
                                let mut st = state.borrow_mut();
                                let root = st.root;
                                let dh = new.height() - old.height();
                                if dh != 0 {
                                    st.update_child_size(root, false, dh);
                                }
                                let dw = new.width() - old.width();
                                if dw != 0 {
                                    st.update_child_size(root, true, dw);
                                }
                            }
                            engine::schedule_update(&state, ui);
                        }
                    }
                    LM_UPDATE => {
                        engine::update_sync(&state, ui);
                    }
                    _ => {}
                }
                let h_old = state.borrow().h_old;
                ui.call_handler(h_old, id, data)
            },
        );
        let h_old = ui.set_handler(host, h);
        {
            let mut st = state.borrow_mut();
            st.h = h;
            st.h_old = h_old;
            let root = st.alloc_leaf(None, 0);
            st.root = root;
        }
        trace!(target: "laymgr", ?host, "created");
        Self {
            state,
            _surface: PhantomData,
        }
    }

    /// Tear down the layout tree (client windows are left alone) and
    /// restore the host's previous handler.
    pub fn destroy(self, ui: &mut Ui<S>) {
        let (host, h, h_old, root) = {
            let st = self.state.borrow();
            (st.host, st.h, st.h_old, st.root)
        };
        {
            let mut st = self.state.borrow_mut();
            engine::close_helper(&mut st, ui, root, true);
        }
        ui.set_handler(host, h_old);
        ui.handler_destroy(h);
        trace!(target: "laymgr", "destroyed");
    }

    pub fn root(&self) -> LayoutId {
        self.state.borrow().root
    }

    pub fn host(&self) -> WindowId {
        self.state.borrow().host
    }

    /// Locate the leaf holding `w`.
    pub fn find(&self, w: WindowId) -> Option<LayoutId> {
        let st = self.state.borrow();
        st.find(st.root, w)
    }

    /// The client window of a leaf, if any.
    pub fn window(&self, lay: LayoutId) -> Option<WindowId> {
        self.state.borrow().try_node(lay).and_then(|n| n.client)
    }

    /// Put `w` into a leaf. Does not validate minimum sizes (validation
    /// happens at split time). Fails on containers.
    pub fn set_window(&self, ui: &mut Ui<S>, lay: LayoutId, w: Option<WindowId>) -> bool {
        let mut st = self.state.borrow_mut();
        if st.node(lay).child.is_some() {
            return false;
        }
        st.node_mut(lay).client = w;
        engine::schedule_update_locked(&mut st, ui);
        true
    }

    /// Split `ref_lay`, putting `w` into the new pane on the `dir` side.
    /// `size` is the extent of the new pane along the split axis
    /// (`SIZE_HALF` for half of the splittable space). Returns the new
    /// layout, or `None` when the minimum sizes do not fit.
    pub fn split(
        &self,
        ui: &mut Ui<S>,
        ref_lay: LayoutId,
        w: WindowId,
        splitter: bool,
        size: i32,
        dir: Dir,
    ) -> Option<LayoutId> {
        let mut st = self.state.borrow_mut();
        engine::split(&mut st, ui, ref_lay, w, splitter, size, dir)
    }

    /// Remove a layout, giving its space to the adjacent sibling.
    /// Single-child containers left behind are promoted and same-flow
    /// containers merged. The client window is not destroyed.
    pub fn close(&self, ui: &mut Ui<S>, lay: LayoutId) {
        let mut st = self.state.borrow_mut();
        engine::close_helper(&mut st, ui, lay, true);
    }

    /// Drag the `edge` side of `lay` by `delta` cells, clamped so neither
    /// neighbor shrinks below its minimum. Returns `false` when nothing
    /// moved.
    pub fn move_edge(&self, ui: &mut Ui<S>, lay: LayoutId, delta: i32, edge: Dir) -> bool {
        let mut st = self.state.borrow_mut();
        engine::move_edge(&mut st, ui, lay, delta, edge)
    }

    /// Step to the neighboring leaf in `dir`, choosing the descendant
    /// nearest to the reference point `(x, y)` (local to `lay`'s client).
    pub fn navigate_dir(
        &self,
        ui: &mut Ui<S>,
        lay: LayoutId,
        x: i32,
        y: i32,
        dir: Dir,
    ) -> Option<LayoutId> {
        let st = self.state.borrow();
        engine::navigate_dir(&st, ui, lay, x, y, dir)
    }

    /// Step to the next/previous leaf in depth-first order, wrapping at
    /// the ends.
    pub fn navigate_ordered(&self, lay: LayoutId, next: bool) -> LayoutId {
        let st = self.state.borrow();
        engine::navigate_ordered(&st, lay, next)
    }

    /// Force a reflow. `async_update` posts the deduplicated `LM_UPDATE`
    /// message; otherwise the pass runs immediately.
    pub fn update(&self, ui: &mut Ui<S>, async_update: bool) {
        if async_update {
            engine::schedule_update(&self.state, ui);
        } else {
            engine::update_sync(&self.state, ui);
        }
    }

    /// Host-local rectangle a layout currently occupies.
    pub fn layout_rect(&self, ui: &Ui<S>, lay: LayoutId) -> Rect {
        let st = self.state.borrow();
        let host_rc = ui.screen_rect(st.host);
        let host_local = Rect::sized(0, 0, host_rc.width(), host_rc.height());
        engine::layout_rect(&st, host_local, lay)
    }

    // ------------------------------------------------------------------
    // Structure inspection (used by applications and tests)
    // ------------------------------------------------------------------

    pub fn parent(&self, lay: LayoutId) -> Option<LayoutId> {
        self.state.borrow().try_node(lay).and_then(|n| n.parent)
    }

    pub fn children(&self, lay: LayoutId) -> Vec<LayoutId> {
        self.state.borrow().children(lay)
    }

    pub fn is_container(&self, lay: LayoutId) -> bool {
        self.state
            .borrow()
            .try_node(lay)
            .is_some_and(|n| n.child.is_some())
    }

    /// Flow of a container: `true` means side-by-side children separated
    /// by vertical splitter lines.
    pub fn is_vert(&self, lay: LayoutId) -> bool {
        self.state.borrow().try_node(lay).is_some_and(|n| n.vert)
    }

    /// Extent along the parent's flow axis, excluding the splitter.
    pub fn size(&self, lay: LayoutId) -> i32 {
        self.state.borrow().try_node(lay).map_or(0, |n| n.size)
    }

    pub fn pct(&self, lay: LayoutId) -> f32 {
        self.state.borrow().try_node(lay).map_or(0.0, |n| n.pct)
    }

    pub fn has_splitter(&self, lay: LayoutId) -> bool {
        self.state
            .borrow()
            .try_node(lay)
            .is_some_and(|n| n.splitter.is_some())
    }

    /// Splitter window of `lay`, if one is present.
    pub fn splitter_window(&self, lay: LayoutId) -> Option<WindowId> {
        self.state
            .borrow()
            .try_node(lay)
            .and_then(|n| n.splitter.as_ref().map(|s| s.w))
    }
}
