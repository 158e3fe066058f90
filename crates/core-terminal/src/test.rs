//! In-memory surface for tests.
//!
//! Behaves exactly like the crossterm backend up to the flush boundary:
//! `flush` copies the virtual screen into the physical mirror and bumps a
//! counter instead of emitting escape sequences. Tests can resize the
//! "terminal" with `set_size` and inspect rows as strings.

use crate::cell::{Cell, Style};
use crate::grid::SurfaceCore;
use crate::{CellBufId, Surface, SurfaceError};
use core_geometry::Rect;

pub struct TestSurface {
    core: SurfaceCore,
    pending_size: (i32, i32),
    pub flush_count: usize,
}

impl TestSurface {
    pub fn new(cols: i32, rows: i32) -> Self {
        Self {
            core: SurfaceCore::new(cols, rows),
            pending_size: (cols, rows),
            flush_count: 0,
        }
    }

    /// Stage a new terminal size; picked up at the next `refresh_size`,
    /// the way a real resize is observed.
    pub fn set_size(&mut self, cols: i32, rows: i32) {
        self.pending_size = (cols, rows);
    }

    /// Row `y` of the *flushed* (physical) screen as a string.
    pub fn row(&self, y: i32) -> String {
        (0..self.core.cols)
            .map(|x| self.core.phys.cell(x, y).unwrap_or_default().ch)
            .collect()
    }

    /// A flushed cell, for style assertions.
    pub fn cell(&self, x: i32, y: i32) -> Option<Cell> {
        self.core.phys.cell(x, y)
    }

    /// Row `y` of the virtual (pre-flush) screen.
    pub fn virtual_row(&self, y: i32) -> String {
        (0..self.core.cols)
            .map(|x| self.core.virt.cell(x, y).unwrap_or_default().ch)
            .collect()
    }
}

impl Surface for TestSurface {
    fn size(&self) -> (i32, i32) {
        (self.core.cols, self.core.rows)
    }

    fn refresh_size(&mut self) -> Result<(i32, i32), SurfaceError> {
        let (cols, rows) = self.pending_size;
        self.core.resize_screen(cols, rows);
        Ok((cols, rows))
    }

    fn alloc_cell_buf(&mut self, rc: Rect) -> Result<CellBufId, SurfaceError> {
        self.core.alloc(rc)
    }

    fn free_cell_buf(&mut self, id: CellBufId) {
        self.core.free(id);
    }

    fn move_resize(&mut self, id: CellBufId, rc: Rect) -> Result<(), SurfaceError> {
        self.core.move_resize(id, rc)
    }

    fn blit_to_virtual(&mut self, id: CellBufId) {
        self.core.blit(id);
    }

    fn flush(&mut self) -> Result<(), SurfaceError> {
        self.core.phys = self.core.virt.clone();
        self.flush_count += 1;
        Ok(())
    }

    fn erase(&mut self, id: CellBufId, style: Style) {
        self.core.erase(id, style);
    }

    fn put_text(&mut self, id: CellBufId, x: i32, y: i32, text: &str, style: Style) {
        self.core.put_text(id, x, y, text, style);
    }

    fn hline(&mut self, id: CellBufId, x: i32, y: i32, len: i32, ch: char, style: Style) {
        self.core.hline(id, x, y, len, ch, style);
    }

    fn vline(&mut self, id: CellBufId, x: i32, y: i32, len: i32, ch: char, style: Style) {
        self.core.vline(id, x, y, len, ch, style);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draw_blit_flush_round_trip() {
        let mut s = TestSurface::new(8, 2);
        let id = s.alloc_cell_buf(Rect::sized(1, 0, 5, 1)).unwrap();
        s.erase(id, Style::default());
        s.put_text(id, 0, 0, "hello", Style::default());
        s.blit_to_virtual(id);
        assert_eq!(s.row(0), "        ", "nothing visible before flush");
        s.flush().unwrap();
        assert_eq!(s.row(0), " hello  ");
        assert_eq!(s.flush_count, 1);
    }

    #[test]
    fn resize_is_deferred_until_refresh() {
        let mut s = TestSurface::new(8, 2);
        s.set_size(4, 1);
        assert_eq!(s.size(), (8, 2));
        assert_eq!(s.refresh_size().unwrap(), (4, 1));
        assert_eq!(s.size(), (4, 1));
    }

    #[test]
    fn lines_draw_in_both_orientations() {
        let mut s = TestSurface::new(4, 4);
        let id = s.alloc_cell_buf(Rect::sized(0, 0, 4, 4)).unwrap();
        s.hline(id, 0, 1, 4, '-', Style::default());
        s.vline(id, 2, 0, 4, '|', Style::default());
        s.blit_to_virtual(id);
        s.flush().unwrap();
        assert_eq!(s.row(0), "  | ");
        assert_eq!(s.row(1), "--|-");
    }
}
