//! Cell and style types for the character grid.

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct StyleFlags: u8 {
        const BOLD    = 1;
        const REVERSE = 2;
        const UNDERLINE = 4;
    }
}

/// Per-cell attributes. Color management is the backend's business; the
/// core only requests monochrome attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Style {
    pub flags: StyleFlags,
}

impl Style {
    pub const fn new(flags: StyleFlags) -> Self {
        Self { flags }
    }

    pub const fn bold() -> Self {
        Self::new(StyleFlags::BOLD)
    }

    pub const fn reverse() -> Self {
        Self::new(StyleFlags::REVERSE)
    }
}

/// One screen cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    pub ch: char,
    pub style: Style,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            style: Style::default(),
        }
    }
}

impl Cell {
    pub fn new(ch: char, style: Style) -> Self {
        Self { ch, style }
    }
}
