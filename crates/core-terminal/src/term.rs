//! Crossterm-backed surface.
//!
//! Owns the raw-mode/alternate-screen lifecycle and restores the terminal
//! on drop even if the caller early-returns or panics. `flush` diffs the
//! virtual screen against a physical mirror and emits only changed runs.

use crate::cell::{Style, StyleFlags};
use crate::grid::SurfaceCore;
use crate::{CellBufId, Surface, SurfaceError};
use core_geometry::Rect;
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    execute, queue,
    style::{Attribute, Print, SetAttribute},
    terminal::{
        EnterAlternateScreen, LeaveAlternateScreen, SetTitle, disable_raw_mode, enable_raw_mode,
    },
};
use std::io::{Write, stdout};

pub struct TermSurface {
    core: SurfaceCore,
    entered: bool,
}

impl TermSurface {
    /// Enter raw mode and the alternate screen, then size the virtual
    /// screen to the live terminal.
    pub fn new() -> Result<Self, SurfaceError> {
        enable_raw_mode()?;
        if let Err(e) = execute!(stdout(), EnterAlternateScreen, Hide) {
            let _ = disable_raw_mode();
            return Err(e.into());
        }
        let (cols, rows) = crossterm::terminal::size()?;
        Ok(Self {
            core: SurfaceCore::new(cols as i32, rows as i32),
            entered: true,
        })
    }

    pub fn set_title(&mut self, title: &str) -> Result<(), SurfaceError> {
        execute!(stdout(), SetTitle(title))?;
        Ok(())
    }

    fn leave(&mut self) {
        if self.entered {
            let _ = execute!(stdout(), LeaveAlternateScreen, Show);
            let _ = disable_raw_mode();
            self.entered = false;
        }
    }

    fn queue_style(out: &mut impl Write, style: Style) -> std::io::Result<()> {
        queue!(out, SetAttribute(Attribute::Reset))?;
        if style.flags.contains(StyleFlags::BOLD) {
            queue!(out, SetAttribute(Attribute::Bold))?;
        }
        if style.flags.contains(StyleFlags::REVERSE) {
            queue!(out, SetAttribute(Attribute::Reverse))?;
        }
        if style.flags.contains(StyleFlags::UNDERLINE) {
            queue!(out, SetAttribute(Attribute::Underlined))?;
        }
        Ok(())
    }
}

impl Drop for TermSurface {
    fn drop(&mut self) {
        self.leave();
    }
}

impl Surface for TermSurface {
    fn size(&self) -> (i32, i32) {
        (self.core.cols, self.core.rows)
    }

    fn refresh_size(&mut self) -> Result<(i32, i32), SurfaceError> {
        let (cols, rows) = crossterm::terminal::size()?;
        self.core.resize_screen(cols as i32, rows as i32);
        Ok((self.core.cols, self.core.rows))
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
        let mut out = stdout();
        for y in 0..self.core.rows {
            let mut x = 0;
            while x < self.core.cols {
                let want = self.core.virt.cell(x, y).unwrap_or_default();
                let have = self.core.phys.cell(x, y).unwrap_or_default();
                if want == have {
                    x += 1;
                    continue;
                }
                // Collect a maximal changed run sharing one style.
                let style = want.style;
                let start = x;
                let mut run = String::new();
                while x < self.core.cols {
                    let w = self.core.virt.cell(x, y).unwrap_or_default();
                    let h = self.core.phys.cell(x, y).unwrap_or_default();
                    if w == h || w.style != style {
                        break;
                    }
                    run.push(w.ch);
                    self.core.phys.set_cell(x, y, w);
                    x += 1;
                }
                queue!(out, MoveTo(start as u16, y as u16))?;
                Self::queue_style(&mut out, style)?;
                queue!(out, Print(run))?;
            }
        }
        queue!(out, SetAttribute(Attribute::Reset))?;
        out.flush()?;
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
