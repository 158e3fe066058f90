//! Message identifiers and payloads for window handlers.
//!
//! Identifiers below [`WM_USER`] are reserved for the system; applications
//! assign their own at or above it. [`MM_READABLE`] is the synthetic id the
//! queue's readable hook receives when the queue drains.
//!
//! The payload is a tagged sum rather than the classic untagged union; a
//! query message (`WM_GETMINSIZE`) receives `&mut MessageData` and writes
//! its answer in place.

use core_events::{Handle, Key, Modifiers};
use core_geometry::Rect;

/// Dispatched after a window is inserted into the tree; carries the new
/// window.
pub const WM_CREATE: u32 = 1;
/// Dispatched before a window is unlinked and freed.
pub const WM_DESTROY: u32 = 2;
/// Synchronous repaint request from the paint scheduler.
pub const WM_PAINT: u32 = 3;
/// Geometry changed; payload holds old/new parent-relative rectangles.
pub const WM_POSCHANGED: u32 = 4;
/// Query: the handler may shrink the default minimum size in place.
pub const WM_GETMINSIZE: u32 = 5;
pub const WM_SETFOCUS: u32 = 6;
pub const WM_LOSEFOCUS: u32 = 7;
/// Printable text input.
pub const WM_CHAR: u32 = 8;
/// Non-character key input.
pub const WM_KEY: u32 = 9;
/// Application-visible shutdown signal, posted to the null handler.
pub const WM_QUIT: u32 = 10;
/// First user-assignable id.
pub const WM_USER: u32 = 0x1000;

pub const MM_USER: u32 = 0xff00;
/// Sent to the readable hook when the message queue drains.
pub const MM_READABLE: u32 = MM_USER + 1;

/// Identifier of a window in the window arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct WindowId(pub(crate) Handle);

impl WindowId {
    pub const NULL: WindowId = WindowId(Handle::NULL);

    pub fn is_null(&self) -> bool {
        self.0.is_null()
    }
}

/// Identifier of a handler in the handler arena. The null handler is a
/// valid dispatch target that ignores everything and returns 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct HandlerId(pub(crate) Handle);

impl HandlerId {
    pub const NULL: HandlerId = HandlerId(Handle::NULL);

    pub fn is_null(&self) -> bool {
        self.0.is_null()
    }
}

/// Payload for every system message. User messages at or above `WM_USER`
/// typically carry `None` and communicate through their handler's own
/// state.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum MessageData {
    #[default]
    None,
    /// `WM_CREATE`: the freshly inserted window.
    Create { w: WindowId },
    /// `WM_PAINT`: rectangle to repaint, in window-local coordinates.
    Paint { clip: Rect },
    /// `WM_POSCHANGED`: parent-relative geometry before and after.
    PosChanged { old: Rect, new: Rect, resized: bool },
    /// `WM_SETFOCUS` / `WM_LOSEFOCUS`: the window on the other side of the
    /// focus change, if any.
    FocusChange { other: Option<WindowId> },
    /// `WM_GETMINSIZE`: defaults filled in by the sender; the handler may
    /// overwrite.
    MinSize { width: i32, height: i32 },
    /// `WM_CHAR`.
    Char { ch: char, mods: Modifiers },
    /// `WM_KEY`.
    Key { key: Key, mods: Modifiers },
}

/// One queued message: a target handler, an id, and the payload.
#[derive(Debug, Clone)]
pub struct Message {
    pub target: HandlerId,
    pub id: u32,
    pub data: MessageData,
}
