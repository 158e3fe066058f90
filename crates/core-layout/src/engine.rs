//! Layout tree state and structural operations.
//!
//! Tree shape invariants maintained here:
//! * a container's children's `size + splitter` sum to its extent along
//!   the flow axis;
//! * the first child of a container never has a splitter;
//! * every non-root container keeps at least two children (close promotes
//!   a lone child and merges same-flow containers);
//! * `pct` is recomputed from sizes after every structural change, so
//!   sibling percentages always sum to 1.

use crate::splitter::{SplitterWin, create_splitter};
use crate::{Dir, LAYOUT_MIN_HEIGHT, LAYOUT_MIN_WIDTH, LM_UPDATE, LayoutId, SIZE_HALF};
use core_events::HandleTable;
use core_geometry::Rect;
use core_terminal::Surface;
use core_window::{HandlerId, MessageData, Ui, WM_GETMINSIZE, WindowId};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, trace};

pub(crate) struct LayoutNode {
    pub parent: Option<LayoutId>,
    pub next: Option<LayoutId>,
    /// First child; `Some` makes this a container and `client` must be
    /// `None`.
    pub child: Option<LayoutId>,
    pub client: Option<WindowId>,
    pub splitter: Option<SplitterWin>,
    /// Container flow: `true` = children side by side (vertical splitter
    /// lines), `false` = children stacked.
    pub vert: bool,
    /// Extent along the parent's flow axis, excluding the splitter.
    pub size: i32,
    /// Desired fraction of the parent's splittable extent.
    pub pct: f32,
}

pub(crate) struct LmState {
    pub host: WindowId,
    pub h: HandlerId,
    pub h_old: HandlerId,
    pub root: LayoutId,
    pub nodes: HandleTable<LayoutNode>,
    pub update_pending: bool,
}

impl LmState {
    pub fn new(host: WindowId) -> Self {
        Self {
            host,
            h: HandlerId::NULL,
            h_old: HandlerId::NULL,
            root: LayoutId(core_events::Handle::NULL),
            nodes: HandleTable::new(),
            update_pending: false,
        }
    }

    pub fn alloc_leaf(&mut self, client: Option<WindowId>, size: i32) -> LayoutId {
        LayoutId(self.nodes.alloc(LayoutNode {
            parent: None,
            next: None,
            child: None,
            client,
            splitter: None,
            vert: false,
            size,
            pct: 0.0,
        }))
    }

    pub fn node(&self, lay: LayoutId) -> &LayoutNode {
        self.nodes.get(lay.0).expect("live layout id")
    }

    pub fn node_mut(&mut self, lay: LayoutId) -> &mut LayoutNode {
        self.nodes.get_mut(lay.0).expect("live layout id")
    }

    pub fn try_node(&self, lay: LayoutId) -> Option<&LayoutNode> {
        self.nodes.get(lay.0)
    }

    pub fn children(&self, lay: LayoutId) -> Vec<LayoutId> {
        let mut out = Vec::new();
        let mut cur = self.try_node(lay).and_then(|n| n.child);
        while let Some(c) = cur {
            out.push(c);
            cur = self.node(c).next;
        }
        out
    }

    pub fn prev_sibling(&self, lay: LayoutId) -> Option<LayoutId> {
        let parent = self.node(lay).parent?;
        let mut cur = self.node(parent).child?;
        if cur == lay {
            return None;
        }
        while let Some(next) = self.node(cur).next {
            if next == lay {
                return Some(cur);
            }
            cur = next;
        }
        None
    }

    pub fn find(&self, lay: LayoutId, w: WindowId) -> Option<LayoutId> {
        if self.node(lay).client == Some(w) {
            return Some(lay);
        }
        for child in self.children(lay) {
            if let Some(found) = self.find(child, w) {
                return Some(found);
            }
        }
        None
    }

    /// Recompute sibling percentages from current sizes.
    pub fn update_child_pct(&mut self, parent: LayoutId) {
        let children = self.children(parent);
        let total: i32 = children.iter().map(|c| self.node(*c).size).sum();
        if total <= 0 {
            return;
        }
        for c in children {
            let size = self.node(c).size;
            self.node_mut(c).pct = size as f32 / total as f32;
        }
    }

    /// Distribute a size change along axis `vert` through the subtree of
    /// `parent`, by stored percentage, with integer rounding error pushed
    /// toward the last child.
    pub fn update_child_size(&mut self, parent: LayoutId, vert: bool, delta: i32) {
        if self.node(parent).child.is_none() {
            return;
        }
        if self.node(parent).vert != vert {
            for c in self.children(parent) {
                self.update_child_size(c, vert, delta);
            }
            return;
        }
        let children = self.children(parent);
        let total: i32 =
            children.iter().map(|c| self.node(*c).size).sum::<i32>() + delta;
        let mut remaining = total;
        for c in children {
            let pct = self.node(c).pct;
            let mut size_new = (pct * total as f32 + 0.5).floor() as i32;
            if size_new > remaining {
                size_new = remaining;
            }
            let d = size_new - self.node(c).size;
            if d != 0 {
                self.node_mut(c).size = size_new;
                if self.node(c).child.is_some() {
                    self.update_child_size(c, vert, d);
                }
            }
            remaining -= size_new;
        }
    }

    /// Grow/shrink `lay` (and its subtree) along the parent's flow axis,
    /// then refresh sibling percentages.
    pub fn adjust_size(&mut self, lay: LayoutId, delta: i32) {
        let Some(parent) = self.node(lay).parent else {
            return;
        };
        let pvert = self.node(parent).vert;
        self.update_child_size(lay, pvert, delta);
        self.node_mut(lay).size += delta;
        self.update_child_pct(parent);
    }
}

// ---------------------------------------------------------------------
// Update scheduling
// ---------------------------------------------------------------------

pub(crate) fn schedule_update_locked<S: Surface + 'static>(st: &mut LmState, ui: &mut Ui<S>) {
    if !st.update_pending {
        st.update_pending = true;
        ui.post(st.h, LM_UPDATE, MessageData::None);
    }
}

pub(crate) fn schedule_update<S: Surface + 'static>(state: &Rc<RefCell<LmState>>, ui: &mut Ui<S>) {
    let mut st = state.borrow_mut();
    schedule_update_locked(&mut st, ui);
}

/// Synchronous reflow: walk the tree assigning each splitter and client
/// its stripe, then push the rectangles onto the window tree. The window
/// moves happen after the state borrow is released so `WM_POSCHANGED`
/// handlers may consult the layout manager.
pub(crate) fn update_sync<S: Surface + 'static>(state: &Rc<RefCell<LmState>>, ui: &mut Ui<S>) {
    let assignments = {
        let mut st = state.borrow_mut();
        st.update_pending = false;
        let host_rc = ui.screen_rect(st.host);
        let host_local = Rect::sized(0, 0, host_rc.width(), host_rc.height());
        let root = st.root;
        validate(&st, host_local, root);
        let mut out = Vec::new();
        collect_rects(&st, root, host_local, &mut out);
        out
    };
    trace!(target: "laymgr.update", windows = assignments.len(), "reflow");
    for (w, rc) in assignments {
        ui.set_pos(w, rc);
    }
}

/// Assign `lay` the stripe `rc` (host-local, including its splitter) and
/// recurse.
fn collect_rects(st: &LmState, lay: LayoutId, rc: Rect, out: &mut Vec<(WindowId, Rect)>) {
    let node = st.node(lay);
    let mut rc_l = rc;
    if let (Some(spl), Some(parent)) = (node.splitter.as_ref(), node.parent) {
        if st.node(parent).vert {
            let strip = Rect { right: rc_l.left + 1, ..rc_l };
            out.push((spl.w, strip));
            rc_l.left += 1;
        } else {
            let strip = Rect { bottom: rc_l.top + 1, ..rc_l };
            out.push((spl.w, strip));
            rc_l.top += 1;
        }
    }

    let mut cur = rc_l;
    for child in st.children(lay) {
        let spl = st.node(child).splitter.is_some() as i32;
        let size = st.node(child).size;
        if node.vert {
            cur.right = cur.left + spl + size;
            collect_rects(st, child, cur, out);
            cur.left = cur.right;
        } else {
            cur.bottom = cur.top + spl + size;
            collect_rects(st, child, cur, out);
            cur.top = cur.bottom;
        }
    }

    if let Some(client) = node.client {
        out.push((client, rc_l));
    }
}

/// Host-local rectangle of `lay`, derived from sibling sizes.
pub(crate) fn layout_rect(st: &LmState, host_local: Rect, lay: LayoutId) -> Rect {
    let Some(parent) = st.node(lay).parent else {
        return host_local;
    };
    let mut rc = layout_rect(st, host_local, parent);
    let pvert = st.node(parent).vert;
    for child in st.children(parent) {
        let n = st.node(child);
        if pvert {
            if n.splitter.is_some() {
                rc.left += 1;
            }
            if child == lay {
                rc.right = rc.left + n.size;
                return rc;
            }
            rc.left += n.size;
        } else {
            if n.splitter.is_some() {
                rc.top += 1;
            }
            if child == lay {
                rc.bottom = rc.top + n.size;
                return rc;
            }
            rc.top += n.size;
        }
    }
    rc
}

fn validate(st: &LmState, host_local: Rect, lay: LayoutId) {
    if cfg!(debug_assertions) {
        let node = st.node(lay);
        if node.child.is_some() {
            debug_assert!(node.client.is_none(), "containers hold no client");
            let rc = layout_rect(st, host_local, lay);
            let mut sum = 0;
            for (i, child) in st.children(lay).into_iter().enumerate() {
                let n = st.node(child);
                debug_assert!(
                    i != 0 || n.splitter.is_none(),
                    "first child never has a splitter"
                );
                sum += n.size + n.splitter.is_some() as i32;
                if n.child.is_some() {
                    validate(st, host_local, child);
                }
            }
            let extent = if node.vert { rc.width() } else { rc.height() };
            debug_assert_eq!(sum, extent, "child sizes sum to the container extent");
        }
    }
}

// ---------------------------------------------------------------------
// Minimum sizes
// ---------------------------------------------------------------------

/// Bottom-up minimum of a subtree. Leaves ask their client via
/// `WM_GETMINSIZE` (defaults 20×2); containers accumulate children plus
/// splitter cells along the flow axis.
pub(crate) fn min_size<S: Surface + 'static>(
    st: &LmState,
    ui: &mut Ui<S>,
    lay: LayoutId,
) -> (i32, i32) {
    let mut width = 0;
    let mut height = 0;
    let vert = st.node(lay).vert;
    for child in st.children(lay) {
        let (cw, ch) = min_size(st, ui, child);
        let spl = st.node(child).splitter.is_some() as i32;
        if vert {
            height = height.max(ch);
            width += spl + cw;
        } else {
            width = width.max(cw);
            height += spl + ch;
        }
    }
    if let Some(client) = st.node(lay).client {
        return window_min_size(ui, client);
    }
    (width, height)
}

pub(crate) fn window_min_size<S: Surface + 'static>(ui: &mut Ui<S>, w: WindowId) -> (i32, i32) {
    let mut data = MessageData::MinSize {
        width: LAYOUT_MIN_WIDTH,
        height: LAYOUT_MIN_HEIGHT,
    };
    ui.call_handler(ui.window_handler(w), WM_GETMINSIZE, &mut data);
    match data {
        MessageData::MinSize { width, height } => (width, height),
        _ => (LAYOUT_MIN_WIDTH, LAYOUT_MIN_HEIGHT),
    }
}

// ---------------------------------------------------------------------
// Splitting
// ---------------------------------------------------------------------

fn set_splitter_visible<S: Surface + 'static>(
    st: &mut LmState,
    ui: &mut Ui<S>,
    lay: LayoutId,
    visible: bool,
) {
    if visible {
        if st.node(lay).splitter.is_none() {
            let host = st.host;
            if let Some(spl) = create_splitter(ui, host) {
                st.node_mut(lay).splitter = Some(spl);
            }
        }
    } else if let Some(spl) = st.node_mut(lay).splitter.take() {
        ui.destroy(spl.w);
        ui.handler_destroy(spl.h);
    }
}

/// Negotiate the size of a new pane carved out of `ref_lay`. The
/// splittable extent excludes the new splitter cell; both sides must keep
/// their minimums. Returns `None` when nothing fits.
fn check_split_size<S: Surface + 'static>(
    st: &LmState,
    ui: &mut Ui<S>,
    ref_lay: LayoutId,
    client: WindowId,
    splitter: bool,
    size_requested: i32,
    dir: Dir,
) -> Option<i32> {
    let (ref_w, ref_h) = min_size(st, ui, ref_lay);
    let (client_w, client_h) = window_min_size(ui, client);
    let (size_ref_min, size_client_min) = if dir.is_vert() {
        (ref_w, client_w)
    } else {
        (ref_h, client_h)
    };

    let inline = st
        .node(ref_lay)
        .parent
        .is_some_and(|p| st.node(p).vert == dir.is_vert());
    let extent = if inline {
        st.node(ref_lay).size
    } else {
        let host_rc = ui.screen_rect(st.host);
        let host_local = Rect::sized(0, 0, host_rc.width(), host_rc.height());
        let rc = layout_rect(st, host_local, ref_lay);
        if dir.is_vert() { rc.width() } else { rc.height() }
    };

    let avail = extent - splitter as i32;
    if size_ref_min + size_client_min > avail {
        return None;
    }
    let mut size = if size_requested == SIZE_HALF {
        avail / 2
    } else {
        size_requested
    };
    if avail - size >= size_ref_min {
        size = size.max(size_client_min);
    } else {
        size = avail - size_ref_min;
    }
    Some(size)
}

pub(crate) fn split<S: Surface + 'static>(
    st: &mut LmState,
    ui: &mut Ui<S>,
    ref_lay: LayoutId,
    w: WindowId,
    splitter: bool,
    size: i32,
    dir: Dir,
) -> Option<LayoutId> {
    let inline = st
        .node(ref_lay)
        .parent
        .is_some_and(|p| st.node(p).vert == dir.is_vert());
    let out = if inline {
        inline_split(st, ui, ref_lay, w, splitter, size, dir)
    } else {
        child_split(st, ui, ref_lay, w, splitter, size, dir)
    };
    if let Some(new_lay) = out {
        debug!(target: "laymgr.split", ?ref_lay, ?new_lay, ?dir, splitter, "split");
    }
    out
}

/// Insert a sibling of `ref_lay` on the `dir` side, inside the parent
/// whose flow already matches.
fn inline_split<S: Surface + 'static>(
    st: &mut LmState,
    ui: &mut Ui<S>,
    ref_lay: LayoutId,
    w: WindowId,
    splitter: bool,
    size: i32,
    dir: Dir,
) -> Option<LayoutId> {
    let parent = st.node(ref_lay).parent?;
    let size = check_split_size(st, ui, ref_lay, w, splitter, size, dir)?;
    let spl_cell = splitter as i32;

    let lay = st.alloc_leaf(Some(w), size);
    st.node_mut(lay).parent = Some(parent);

    if dir.is_prev() {
        if st.node(parent).child == Some(ref_lay) {
            // New first child: the splitter cell lands on ref.
            st.node_mut(lay).next = Some(ref_lay);
            st.node_mut(parent).child = Some(lay);
            st.adjust_size(ref_lay, -size - spl_cell);
            set_splitter_visible(st, ui, ref_lay, splitter);
        } else {
            let prev = st.prev_sibling(ref_lay).expect("ref is not first");
            st.node_mut(prev).next = Some(lay);
            st.node_mut(lay).next = Some(ref_lay);
            st.adjust_size(ref_lay, -size - spl_cell);
            let ref_had = st.node(ref_lay).splitter.is_some();
            set_splitter_visible(st, ui, lay, ref_had);
            set_splitter_visible(st, ui, ref_lay, splitter);
        }
    } else {
        st.node_mut(lay).next = st.node(ref_lay).next;
        st.node_mut(ref_lay).next = Some(lay);
        st.adjust_size(ref_lay, -size - spl_cell);
        set_splitter_visible(st, ui, lay, splitter);
    }

    schedule_update_locked(st, ui);
    Some(lay)
}

/// Re-parent `ref_lay` under a fresh container flowing along `dir`'s
/// axis, then split inline inside it. May replace the tree root.
fn child_split<S: Surface + 'static>(
    st: &mut LmState,
    ui: &mut Ui<S>,
    ref_lay: LayoutId,
    w: WindowId,
    splitter: bool,
    size: i32,
    dir: Dir,
) -> Option<LayoutId> {
    if st.node(ref_lay).child.is_some() {
        return None;
    }
    let size = check_split_size(st, ui, ref_lay, w, splitter, size, dir)?;

    let ref_parent = st.node(ref_lay).parent;
    let cont = st.alloc_leaf(None, st.node(ref_lay).size);
    st.node_mut(cont).parent = ref_parent;
    st.node_mut(cont).vert = dir.is_vert();
    st.node_mut(cont).pct = st.node(ref_lay).pct;
    let ref_had = st.node(ref_lay).splitter.is_some();
    set_splitter_visible(st, ui, cont, ref_had);

    // Take ref's slot in its parent list (or the root slot).
    match ref_parent {
        None => st.root = cont,
        Some(p) => {
            st.node_mut(cont).next = st.node(ref_lay).next;
            if st.node(p).child == Some(ref_lay) {
                st.node_mut(p).child = Some(cont);
            } else {
                let prev = st.prev_sibling(ref_lay).expect("ref is not first");
                st.node_mut(prev).next = Some(cont);
            }
        }
    }

    st.node_mut(ref_lay).parent = Some(cont);
    st.node_mut(ref_lay).next = None;
    st.node_mut(cont).child = Some(ref_lay);
    set_splitter_visible(st, ui, ref_lay, false);

    // ref spans the whole container along the split axis.
    let host_rc = ui.screen_rect(st.host);
    let host_local = Rect::sized(0, 0, host_rc.width(), host_rc.height());
    let rc = layout_rect(st, host_local, cont);
    st.node_mut(ref_lay).size = if dir.is_vert() { rc.width() } else { rc.height() };
    st.node_mut(ref_lay).pct = 1.0;

    let out = inline_split(st, ui, ref_lay, w, splitter, size, dir);
    debug_assert!(out.is_some(), "inline split after size check succeeds");
    out
}

// ---------------------------------------------------------------------
// Closing
// ---------------------------------------------------------------------

/// Close `lay`: children first, then donate the freed extent to the
/// adjacent sibling and (optionally) promote/merge what remains. The
/// client window is left for the caller to destroy.
pub(crate) fn close_helper<S: Surface + 'static>(
    st: &mut LmState,
    ui: &mut Ui<S>,
    lay: LayoutId,
    promote: bool,
) {
    while let Some(c) = st.node(lay).child {
        close_helper(st, ui, c, false);
    }

    if let Some(parent) = st.node(lay).parent {
        if st.node(parent).child == Some(lay) {
            // Removing the first child: the next sibling becomes first,
            // absorbing our size plus its own (now removed) splitter cell.
            let next = st.node(lay).next;
            st.node_mut(parent).child = next;
            if let Some(n) = next {
                let gain = st.node(lay).size + st.node(n).splitter.is_some() as i32;
                st.adjust_size(n, gain);
                set_splitter_visible(st, ui, n, false);
            }
        } else {
            let prev = st.prev_sibling(lay).expect("lay is not first");
            st.node_mut(prev).next = st.node(lay).next;
            let gain = st.node(lay).size + st.node(lay).splitter.is_some() as i32;
            st.adjust_size(prev, gain);
        }

        if promote {
            if let Some(only) = st.node(parent).child {
                if st.node(only).next.is_none() && st.node(parent).parent.is_some() {
                    promote_child(st, ui, only);
                }
            }
        }
    }

    schedule_update_locked(st, ui);
    set_splitter_visible(st, ui, lay, false);
    st.nodes.free(lay.0);
    debug!(target: "laymgr.close", ?lay, "closed");
}

/// Collapse redundant structure around `child`: a lone child replaces its
/// parent container, and a container whose flow matches its parent's is
/// spliced into it.
fn promote_child<S: Surface + 'static>(st: &mut LmState, ui: &mut Ui<S>, child: LayoutId) {
    let parent = st.node(child).parent.expect("promote needs a parent");
    if st.node(child).next.is_none() && st.node(parent).parent.is_some() {
        let grand = st.node(parent).parent.expect("checked above");
        st.node_mut(child).parent = Some(grand);
        st.node_mut(child).next = st.node(parent).next;
        if st.node(grand).child == Some(parent) {
            st.node_mut(grand).child = Some(child);
        } else {
            let prev = st.prev_sibling(parent).expect("parent is not first");
            st.node_mut(prev).next = Some(child);
        }
        st.node_mut(parent).child = None;

        // Adopt the parent's splitter state and size.
        let parent_spl = st.node(parent).splitter.is_some();
        set_splitter_visible(st, ui, child, parent_spl);
        let parent_size = st.node(parent).size;
        st.node_mut(child).size = parent_size;
        st.update_child_pct(grand);

        set_splitter_visible(st, ui, parent, false);
        st.nodes.free(parent.0);
    }

    // Same-flow container: splice its children into the parent's list.
    let cparent = st.node(child).parent.expect("still parented");
    if st.node(child).child.is_some() && st.node(cparent).vert == st.node(child).vert {
        let first_gc = st.node(child).child.expect("checked above");
        let mut last = first_gc;
        loop {
            st.node_mut(last).parent = Some(cparent);
            match st.node(last).next {
                Some(n) => last = n,
                None => break,
            }
        }
        st.node_mut(last).next = st.node(child).next;
        st.node_mut(child).next = Some(first_gc);
        st.node_mut(child).child = None;

        let child_spl = st.node(child).splitter.is_some();
        set_splitter_visible(st, ui, first_gc, child_spl);

        if st.node(cparent).child == Some(child) {
            st.node_mut(cparent).child = Some(first_gc);
        } else {
            let prev = st.prev_sibling(child).expect("child is not first");
            st.node_mut(prev).next = Some(first_gc);
        }
        st.update_child_pct(cparent);
        set_splitter_visible(st, ui, child, false);
        st.nodes.free(child.0);
    }
}

// ---------------------------------------------------------------------
// Edge move
// ---------------------------------------------------------------------

/// Walk up from `lay` to the layout owning the `edge` boundary: its
/// parent must flow along `edge`'s axis and it must have a neighbor on
/// that side.
fn find_move_layout(st: &LmState, lay: LayoutId, edge: Dir) -> Option<LayoutId> {
    let mut cur = lay;
    loop {
        let parent = st.node(cur).parent?;
        if st.node(parent).vert != edge.is_vert() {
            cur = parent;
            continue;
        }
        let at_edge = if edge.is_prev() {
            st.node(parent).child == Some(cur)
        } else {
            st.node(cur).next.is_none()
        };
        if at_edge {
            cur = parent;
            continue;
        }
        return Some(cur);
    }
}

pub(crate) fn move_edge<S: Surface + 'static>(
    st: &mut LmState,
    ui: &mut Ui<S>,
    lay: LayoutId,
    delta: i32,
    edge: Dir,
) -> bool {
    let (lay_t, edge) = match find_move_layout(st, lay, edge) {
        Some(l) => (l, edge),
        None => {
            let rev = edge.reverse();
            match find_move_layout(st, lay, rev) {
                Some(l) => (l, rev),
                None => return false,
            }
        }
    };

    // lay1 sits on the prev side of the shared edge, lay2 on the next.
    let (lay1, lay2) = if edge.is_prev() {
        (st.prev_sibling(lay_t).expect("not at edge"), lay_t)
    } else {
        (lay_t, st.node(lay_t).next.expect("not at edge"))
    };

    let parent = st.node(lay1).parent.expect("edge siblings are parented");
    let pvert = st.node(parent).vert;
    let mut delta = delta;
    if delta < 0 {
        let (wm, hm) = min_size(st, ui, lay1);
        let size_min = if pvert { wm } else { hm };
        if st.node(lay1).size + delta < size_min {
            delta = size_min - st.node(lay1).size;
        }
        if delta >= 0 {
            return false;
        }
    } else {
        let (wm, hm) = min_size(st, ui, lay2);
        let size_min = if pvert { wm } else { hm };
        if st.node(lay2).size - delta < size_min {
            delta = st.node(lay2).size - size_min;
        }
        if delta <= 0 {
            return false;
        }
    }

    st.adjust_size(lay1, delta);
    st.adjust_size(lay2, -delta);
    schedule_update_locked(st, ui);
    debug!(target: "laymgr.edge", ?lay1, ?lay2, delta, "edge moved");
    true
}

// ---------------------------------------------------------------------
// Navigation
// ---------------------------------------------------------------------

fn interval_distance(i: i32, lo: i32, hi: i32) -> i32 {
    if i < lo {
        lo - i
    } else if i >= hi {
        i - hi
    } else {
        0
    }
}

/// Descend to the leaf whose stripe is nearest the point, ties going to
/// the earliest child.
fn find_closest_layout(st: &LmState, host_local: Rect, lay: LayoutId, x: i32, y: i32) -> LayoutId {
    if st.node(lay).child.is_none() {
        return lay;
    }
    let mut rc = layout_rect(st, host_local, lay);
    let vert = st.node(lay).vert;
    let mut closest = None;
    let mut dist_min = i32::MAX;
    for child in st.children(lay) {
        let n = st.node(child);
        let dist;
        if vert {
            if n.splitter.is_some() {
                rc.left += 1;
            }
            let right = rc.left + n.size;
            dist = interval_distance(x, rc.left, right - 1);
            rc.left = right;
        } else {
            if n.splitter.is_some() {
                rc.top += 1;
            }
            let bottom = rc.top + n.size;
            dist = interval_distance(y, rc.top, bottom - 1);
            rc.top = bottom;
        }
        if dist < dist_min {
            dist_min = dist;
            closest = Some(child);
        }
    }
    find_closest_layout(st, host_local, closest.expect("container has children"), x, y)
}

pub(crate) fn navigate_dir<S: Surface + 'static>(
    st: &LmState,
    ui: &Ui<S>,
    lay: LayoutId,
    x: i32,
    y: i32,
    dir: Dir,
) -> Option<LayoutId> {
    let lay_t = find_move_layout(st, lay, dir)?;
    let target = if dir.is_prev() {
        st.prev_sibling(lay_t).expect("not at edge")
    } else {
        st.node(lay_t).next.expect("not at edge")
    };

    // Map the reference point into host coordinates.
    let (hx, hy) = match st.node(lay).client {
        Some(client) => ui.map_point(client, st.host, x, y),
        None => (x, y),
    };
    let host_rc = ui.screen_rect(st.host);
    let host_local = Rect::sized(0, 0, host_rc.width(), host_rc.height());
    Some(find_closest_layout(st, host_local, target, hx, hy))
}

/// Deepest first (for `next`) or last (for `prev`) leaf of a subtree.
fn find_child_ordered(st: &LmState, lay: LayoutId, next: bool) -> LayoutId {
    match st.node(lay).child {
        None => lay,
        Some(first) => {
            if next {
                find_child_ordered(st, first, next)
            } else {
                let mut last = first;
                while let Some(n) = st.node(last).next {
                    last = n;
                }
                find_child_ordered(st, last, next)
            }
        }
    }
}

fn navigate_ordered_helper(st: &LmState, lay: LayoutId, next: bool) -> Option<LayoutId> {
    let mut cur = lay;
    loop {
        let parent = st.node(cur).parent?;
        let at_end = if next {
            st.node(cur).next.is_none()
        } else {
            st.node(parent).child == Some(cur)
        };
        if at_end {
            cur = parent;
            continue;
        }
        break;
    }
    let step = if next {
        st.node(cur).next.expect("not at end")
    } else {
        st.prev_sibling(cur).expect("not at start")
    };
    Some(find_child_ordered(st, step, next))
}

/// In-order leaf traversal with wraparound at both ends.
pub(crate) fn navigate_ordered(st: &LmState, lay: LayoutId, next: bool) -> LayoutId {
    if let Some(t) = navigate_ordered_helper(st, lay, next) {
        return t;
    }
    // Nothing further in that direction; wrap to the opposite extreme.
    let mut t = lay;
    let mut cur = Some(lay);
    while let Some(c) = cur {
        t = c;
        cur = navigate_ordered_helper(st, c, !next);
    }
    t
}
