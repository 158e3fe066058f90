//! Terminal surface abstraction and its two implementations.
//!
//! The window manager draws into per-window cell buffers, composites them
//! onto a virtual screen, and flushes the virtual screen to the physical
//! terminal. All of that goes through the [`Surface`] trait so the core
//! never talks to a concrete terminal: [`TermSurface`] is the crossterm
//! backend, [`TestSurface`] is an in-memory backend for tests.

mod cell;
mod grid;
pub mod symbols;
mod term;
mod test;

pub use cell::{Cell, Style, StyleFlags};
pub use term::TermSurface;
pub use test::TestSurface;

use core_geometry::Rect;

/// Identifier for a cell buffer allocated from a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellBufId(pub(crate) usize);

#[derive(Debug, thiserror::Error)]
pub enum SurfaceError {
    #[error("terminal backend error: {0}")]
    Io(#[from] std::io::Error),
    #[error("unknown cell buffer")]
    BadBuffer,
    #[error("cell buffer rectangle is empty")]
    EmptyRect,
}

/// Abstract character-grid output target.
///
/// Coordinates handed to the drawing operations are local to the buffer
/// (`(0, 0)` is the buffer's top-left cell); the buffer's screen position
/// only matters when it is composited by `blit_to_virtual`.
pub trait Surface {
    /// Cached `(cols, rows)` of the screen.
    fn size(&self) -> (i32, i32);

    /// Re-query the backend size, resizing the virtual screen to match.
    fn refresh_size(&mut self) -> Result<(i32, i32), SurfaceError>;

    /// Allocate a cell buffer sized exactly to `rc` (screen coordinates).
    fn alloc_cell_buf(&mut self, rc: Rect) -> Result<CellBufId, SurfaceError>;

    fn free_cell_buf(&mut self, id: CellBufId);

    /// Move and/or resize a buffer. Content in the overlapping region is
    /// preserved; newly exposed cells are blank.
    fn move_resize(&mut self, id: CellBufId, rc: Rect) -> Result<(), SurfaceError>;

    /// Composite a buffer onto the virtual screen, clipped to it.
    fn blit_to_virtual(&mut self, id: CellBufId);

    /// Push the virtual screen to the physical terminal.
    fn flush(&mut self) -> Result<(), SurfaceError>;

    fn erase(&mut self, id: CellBufId, style: Style);
    fn put_text(&mut self, id: CellBufId, x: i32, y: i32, text: &str, style: Style);
    fn hline(&mut self, id: CellBufId, x: i32, y: i32, len: i32, ch: char, style: Style);
    fn vline(&mut self, id: CellBufId, x: i32, y: i32, len: i32, ch: char, style: Style);
}
