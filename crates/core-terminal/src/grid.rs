//! Shared grid bookkeeping for both surface implementations.
//!
//! A `Grid` is a dense row-major cell array tied to a screen rectangle.
//! `SurfaceCore` owns the buffer slab plus the virtual/physical screen
//! pair; the two `Surface` impls differ only in how `flush` leaves the
//! process (escape sequences vs. a counter).

use crate::cell::{Cell, Style};
use crate::{CellBufId, SurfaceError};
use core_geometry::Rect;

#[derive(Debug, Clone)]
pub(crate) struct Grid {
    pub rect: Rect,
    pub cells: Vec<Cell>,
}

impl Grid {
    pub fn new(rect: Rect) -> Self {
        let len = (rect.width().max(0) * rect.height().max(0)) as usize;
        Self {
            rect,
            cells: vec![Cell::default(); len],
        }
    }

    pub fn width(&self) -> i32 {
        self.rect.width()
    }

    pub fn height(&self) -> i32 {
        self.rect.height()
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width() || y >= self.height() {
            return None;
        }
        Some((y * self.width() + x) as usize)
    }

    pub fn cell(&self, x: i32, y: i32) -> Option<Cell> {
        self.index(x, y).map(|i| self.cells[i])
    }

    pub fn set_cell(&mut self, x: i32, y: i32, cell: Cell) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] = cell;
        }
    }

    pub fn fill(&mut self, cell: Cell) {
        self.cells.fill(cell);
    }

    /// Re-anchor the grid at `rect`, preserving cell content that overlaps
    /// the old extent (position-independent: content sticks to the buffer,
    /// not to the screen).
    pub fn move_resize(&mut self, rect: Rect) {
        if rect.width() == self.width() && rect.height() == self.height() {
            self.rect = rect;
            return;
        }
        let mut next = Grid::new(rect);
        let copy_w = self.width().min(next.width());
        let copy_h = self.height().min(next.height());
        for y in 0..copy_h {
            for x in 0..copy_w {
                if let Some(c) = self.cell(x, y) {
                    next.set_cell(x, y, c);
                }
            }
        }
        *self = next;
    }
}

#[derive(Debug)]
pub(crate) struct SurfaceCore {
    pub cols: i32,
    pub rows: i32,
    pub virt: Grid,
    pub phys: Grid,
    bufs: Vec<Option<Grid>>,
}

impl SurfaceCore {
    pub fn new(cols: i32, rows: i32) -> Self {
        let screen = Rect::sized(0, 0, cols, rows);
        Self {
            cols,
            rows,
            virt: Grid::new(screen),
            phys: Grid::new(screen),
            bufs: Vec::new(),
        }
    }

    pub fn resize_screen(&mut self, cols: i32, rows: i32) {
        if cols == self.cols && rows == self.rows {
            return;
        }
        self.cols = cols;
        self.rows = rows;
        let screen = Rect::sized(0, 0, cols, rows);
        // Blank both sides; the window tree repaints everything after a
        // resize anyway, and a blank physical mirror forces a full emit.
        self.virt = Grid::new(screen);
        self.phys = Grid::new(screen);
    }

    pub fn alloc(&mut self, rc: Rect) -> Result<CellBufId, SurfaceError> {
        if rc.is_empty() {
            return Err(SurfaceError::EmptyRect);
        }
        let grid = Grid::new(rc);
        if let Some(slot) = self.bufs.iter_mut().position(|b| b.is_none()) {
            self.bufs[slot] = Some(grid);
            return Ok(CellBufId(slot));
        }
        self.bufs.push(Some(grid));
        Ok(CellBufId(self.bufs.len() - 1))
    }

    pub fn free(&mut self, id: CellBufId) {
        if let Some(slot) = self.bufs.get_mut(id.0) {
            *slot = None;
        }
    }

    pub fn buf(&self, id: CellBufId) -> Option<&Grid> {
        self.bufs.get(id.0).and_then(|b| b.as_ref())
    }

    pub fn buf_mut(&mut self, id: CellBufId) -> Option<&mut Grid> {
        self.bufs.get_mut(id.0).and_then(|b| b.as_mut())
    }

    pub fn move_resize(&mut self, id: CellBufId, rc: Rect) -> Result<(), SurfaceError> {
        if rc.is_empty() {
            return Err(SurfaceError::EmptyRect);
        }
        let grid = self.buf_mut(id).ok_or(SurfaceError::BadBuffer)?;
        grid.move_resize(rc);
        Ok(())
    }

    /// Copy a buffer onto the virtual screen, clipped to the screen.
    pub fn blit(&mut self, id: CellBufId) {
        let Some(grid) = self.bufs.get(id.0).and_then(|b| b.as_ref()) else {
            return;
        };
        let screen = Rect::sized(0, 0, self.cols, self.rows);
        let visible = grid.rect.intersect(&screen);
        if visible.is_empty() {
            return;
        }
        let cells: Vec<(i32, i32, Cell)> = (visible.top..visible.bottom)
            .flat_map(|sy| {
                (visible.left..visible.right).filter_map(move |sx| {
                    grid.cell(sx - grid.rect.left, sy - grid.rect.top)
                        .map(|c| (sx, sy, c))
                })
            })
            .collect();
        for (sx, sy, c) in cells {
            self.virt.set_cell(sx, sy, c);
        }
    }

    pub fn erase(&mut self, id: CellBufId, style: Style) {
        if let Some(grid) = self.buf_mut(id) {
            grid.fill(Cell::new(' ', style));
        }
    }

    pub fn put_text(&mut self, id: CellBufId, x: i32, y: i32, text: &str, style: Style) {
        if let Some(grid) = self.buf_mut(id) {
            for (i, ch) in text.chars().enumerate() {
                grid.set_cell(x + i as i32, y, Cell::new(ch, style));
            }
        }
    }

    pub fn hline(&mut self, id: CellBufId, x: i32, y: i32, len: i32, ch: char, style: Style) {
        if let Some(grid) = self.buf_mut(id) {
            for i in 0..len {
                grid.set_cell(x + i, y, Cell::new(ch, style));
            }
        }
    }

    pub fn vline(&mut self, id: CellBufId, x: i32, y: i32, len: i32, ch: char, style: Style) {
        if let Some(grid) = self.buf_mut(id) {
            for i in 0..len {
                grid.set_cell(x, y + i, Cell::new(ch, style));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_preserves_content_across_move_resize() {
        let mut g = Grid::new(Rect::sized(0, 0, 4, 2));
        g.set_cell(1, 1, Cell::new('x', Style::default()));
        g.move_resize(Rect::sized(10, 10, 6, 3));
        assert_eq!(g.cell(1, 1).unwrap().ch, 'x');
        assert_eq!(g.cell(5, 2).unwrap().ch, ' ');
    }

    #[test]
    fn blit_clips_to_screen() {
        let mut core = SurfaceCore::new(4, 4);
        let id = core.alloc(Rect::sized(2, 2, 4, 4)).unwrap();
        core.erase(id, Style::default());
        core.put_text(id, 0, 0, "abcd", Style::default());
        core.blit(id);
        assert_eq!(core.virt.cell(2, 2).unwrap().ch, 'a');
        assert_eq!(core.virt.cell(3, 2).unwrap().ch, 'b');
        // Cells beyond the screen are dropped silently.
        assert_eq!(core.virt.cell(0, 0).unwrap().ch, ' ');
    }

    #[test]
    fn alloc_rejects_empty() {
        let mut core = SurfaceCore::new(4, 4);
        assert!(matches!(
            core.alloc(Rect::EMPTY),
            Err(SurfaceError::EmptyRect)
        ));
    }

    #[test]
    fn freed_slot_is_reused() {
        let mut core = SurfaceCore::new(10, 10);
        let a = core.alloc(Rect::sized(0, 0, 2, 2)).unwrap();
        core.free(a);
        let b = core.alloc(Rect::sized(0, 0, 3, 3)).unwrap();
        assert_eq!(a, b);
    }
}
